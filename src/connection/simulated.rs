//! Synthetic sensor feed (`sim://`).
//!
//! Emits readings as a bounded random walk in the attribute wire encoding,
//! for running the client without hardware or a relay server.
//!
//! - BMP temperature: starts 28.6 °C, ±0.15 per tick, clamped to 25..32
//! - Probe temperature: starts 30.0 °C, ±0.1 per tick, clamped to 27..34
//! - Pressure: starts 946.23 hPa, ±0.75 per tick, clamped to 930..960

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{runtime, Connector, Link, LinkEnd, TransportEvent};
use crate::error::ConnectionError;

/// Default time between simulated readings.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Connector producing a synthetic feed on a fixed interval.
#[derive(Debug, Clone)]
pub struct SimulatedConnector {
    interval: Duration,
    seed: Option<u64>,
}

impl Default for SimulatedConnector {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl SimulatedConnector {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            seed: None,
        }
    }

    /// Use a fixed RNG seed so the feed is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Connector for SimulatedConnector {
    fn open(&self, target: &str) -> Result<Link, ConnectionError> {
        let runtime = runtime()?;
        let (link, end) = Link::pair(target);
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        runtime.spawn(run(end, self.interval, rng));
        Ok(link)
    }

    fn description(&self) -> &str {
        "simulated"
    }
}

/// Current simulated sensor values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorWalk {
    pub bmp_temp: f64,
    pub probe_temp: f64,
    pub pressure: f64,
}

impl Default for SensorWalk {
    fn default() -> Self {
        Self {
            bmp_temp: 28.6,
            probe_temp: 30.0,
            pressure: 946.23,
        }
    }
}

impl SensorWalk {
    /// Advance one tick.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        self.bmp_temp = (self.bmp_temp + (rng.gen::<f64>() - 0.5) * 0.3).clamp(25.0, 32.0);
        self.probe_temp = (self.probe_temp + (rng.gen::<f64>() - 0.5) * 0.2).clamp(27.0, 34.0);
        self.pressure = (self.pressure + (rng.gen::<f64>() - 0.5) * 1.5).clamp(930.0, 960.0);
    }

    /// Encode as an attribute-style frame with two-decimal strings.
    pub fn frame(&self) -> String {
        serde_json::json!({
            "bmp_temp": { "N": format!("{:.2}", self.bmp_temp) },
            "probe_temp": { "N": format!("{:.2}", self.probe_temp) },
            "pressure": { "N": format!("{:.2}", self.pressure) },
        })
        .to_string()
    }
}

async fn run(mut end: LinkEnd, period: Duration, mut rng: StdRng) {
    if !end.emit(TransportEvent::Opened).await {
        return;
    }
    info!("Simulated feed started, one reading every {:?}", period);

    let mut walk = SensorWalk::default();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                walk.step(&mut rng);
                if !end.emit(TransportEvent::Frame(walk.frame())).await {
                    break;
                }
            }
            outbound = end.next_outbound() => match outbound {
                Some(payload) => info!("Simulated feed received: {}", payload),
                None => {
                    debug!("Simulated feed stopped");
                    break;
                }
            },
        }
    }
}
