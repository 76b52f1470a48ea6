//! Decoding of inbound frames into canonical readings.
//!
//! The upstream producer does not use a single wire format. Frames arrive
//! either as plain JSON objects or in a key-value-store attribute encoding,
//! optionally wrapped in a `SensorData` key and/or an `M` map envelope:
//!
//! ```text
//! {"bmp_temp": {"N": "28.60"}, "probe_temp": {"N": "30.10"}, "pressure": {"N": "946.23"}}
//! {"SensorData": {"M": {"bmp_temp": {"N": "28.60"}, ...}}}
//! {"bmpTemp": 28.6, "probeTemp": 30.1, "pressure": 946.23}
//! ```
//!
//! [`normalize`] absorbs that variance so everything downstream sees a
//! [`CanonicalReading`].

use serde_json::{Map, Value};

use super::reading::{CanonicalReading, Metric};
use crate::error::Rejection;

/// Optional outer key wrapping the sensor fields.
const WRAPPER_KEY: &str = "SensorData";
/// Optional map-typed envelope inside the wrapper.
const ENVELOPE_KEY: &str = "M";
/// Attribute holding a number encoded as a string.
const NUMBER_ATTR: &str = "N";
/// Generic attribute fallback.
const VALUE_ATTR: &str = "value";

/// Decode one inbound text frame.
///
/// `received_at` becomes the reading's timestamp; frames carry no origin
/// time of their own. A reading is produced only when all three metrics
/// decode to finite numbers.
pub fn normalize(frame: &str, received_at: i64) -> Result<CanonicalReading, Rejection> {
    let raw: Value = serde_json::from_str(frame)?;
    let fields = unwrap_envelope(&raw).ok_or(Rejection::NotAnObject)?;

    let values = Metric::ALL.map(|metric| metric_value(fields, metric));
    let missing: Vec<Metric> = Metric::ALL
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| value.is_none())
        .map(|(metric, _)| *metric)
        .collect();

    match values {
        [Some(bmp_temp), Some(probe_temp), Some(pressure)] => Ok(CanonicalReading {
            bmp_temp,
            probe_temp,
            pressure,
            timestamp: received_at,
        }),
        _ => Err(Rejection::Incomplete { missing }),
    }
}

/// Strip the optional `SensorData` wrapper, then the optional `M` envelope.
fn unwrap_envelope(raw: &Value) -> Option<&Map<String, Value>> {
    let wrapper = match raw.get(WRAPPER_KEY) {
        Some(inner) if inner.is_object() => inner,
        _ => raw,
    };
    let fields = match wrapper.get(ENVELOPE_KEY) {
        Some(inner) if inner.is_object() => inner,
        _ => wrapper,
    };
    fields.as_object()
}

/// Look up a metric under either spelling and coerce it to a number.
fn metric_value(fields: &Map<String, Value>, metric: Metric) -> Option<f64> {
    let attr = fields
        .get(metric.snake_name())
        .filter(|v| !v.is_null())
        .or_else(|| fields.get(metric.camel_name()))?;
    coerce(attr)
}

/// Number, numeric string, `{"N": ..}` attribute, then `{"value": ..}` attribute.
fn coerce(attr: &Value) -> Option<f64> {
    match attr {
        Value::Object(attrs) => match attrs.get(NUMBER_ATTR) {
            Some(number) => scalar(number),
            None => attrs.get(VALUE_ATTR).and_then(scalar),
        },
        other => scalar(other),
    }
}

fn scalar(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
