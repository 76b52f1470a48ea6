//! Reading models and the processing applied to each inbound frame.
//!
//! ## Submodules
//!
//! - [`reading`]: Canonical types ([`CanonicalReading`], [`DataPoint`], [`Metric`])
//! - [`normalize`]: Decoding of the accepted wire shapes into a [`CanonicalReading`]
//! - [`history`]: Bounded per-metric history ([`HistoryStore`], [`HistoricalData`])
//! - [`status`]: Normal/warning/critical classification and trend direction
//! - [`table`]: Index-paired rows over the history, with sorting
//! - [`export`]: CSV export of the history
//!
//! ## Data Flow
//!
//! ```text
//! inbound text frame
//!        │
//!        ▼
//! normalize() ──▶ Rejection (logged, dropped)
//!        │
//!        ▼
//! CanonicalReading
//!        │
//!        ├──▶ HistoryStore::append() (evicts oldest at capacity)
//!        │
//!        └──▶ ReadingStatus::derive() (against Ranges and the previous reading)
//! ```

pub mod export;
pub mod history;
pub mod normalize;
pub mod reading;
pub mod status;
pub mod table;

pub use history::{HistoricalData, HistoryStore, MetricHistory, DEFAULT_CAPACITY};
pub use normalize::normalize;
pub use reading::{now_millis, CanonicalReading, DataPoint, Metric};
pub use status::{
    Classification, MetricRange, MetricStatus, Ranges, ReadingStatus, Trend, TrendIndicator,
    TREND_DISPLAY_WINDOW,
};
pub use table::{HistoryRow, SortColumn};
