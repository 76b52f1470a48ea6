//! # syncpulse
//!
//! Client core for a live sensor telemetry dashboard.
//!
//! A sensor relay pushes readings (BMP temperature, probe temperature and
//! barometric pressure) over a persistent connection. This crate owns that
//! connection, turns each inbound frame into a canonical reading, keeps a
//! bounded history per metric, and derives a normal/warning/critical status
//! and a trend for every value.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Dashboard                           │
//! │  ┌────────────┐   frame   ┌───────────┐   ┌───────────────┐  │
//! │  │ connection │─────────▶ │ normalize │──▶│ HistoryStore  │  │
//! │  │  manager   │           └───────────┘   └───────┬───────┘  │
//! │  └─────┬──────┘                                   ▼          │
//! │        │ status                           ReadingStatus      │
//! │        ▼                                                     │
//! │  ws:// | wss:// | tcp:// | sim:// | channel                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`connection`]**: The [`ConnectionManager`] state machine and the
//!   transports behind the [`Connector`] trait
//! - **[`data`]**: Reading types, the normalizer, history, status derivation,
//!   table rows and CSV export
//! - **[`app`]**: [`Dashboard`], which wires a connection to its history
//! - **[`config`]**: Layered [`Settings`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Connect to a relay
//! syncpulse --connect ws://localhost:5000
//!
//! # Run against the built-in simulated feed and export what was received
//! syncpulse --simulate --limit 10 --export readings.csv
//! ```
//!
//! ### As a library
//!
//! ```
//! use syncpulse::{Dashboard, DashboardEvent, EndpointConnector, Settings};
//!
//! let settings = Settings::default();
//! let mut dashboard = Dashboard::new(Box::new(EndpointConnector::default()), &settings);
//!
//! let event = dashboard.ingest(
//!     r#"{"SensorData":{"bmp_temp":28.6,"probe_temp":30.1,"pressure":946.23}}"#,
//!     1_700_000_000_000,
//! );
//! assert!(event.is_reading());
//! assert_eq!(dashboard.current().map(|r| r.pressure), Some(946.23));
//! ```
//!
//! ### With a live connection
//!
//! ```no_run
//! use syncpulse::{Dashboard, EndpointConnector, Settings};
//!
//! # tokio_test::block_on(async {
//! let mut dashboard = Dashboard::new(Box::new(EndpointConnector::default()), &Settings::default());
//! dashboard.connect(Some("ws://localhost:5000")).unwrap();
//!
//! while let Some(event) = dashboard.next_event().await {
//!     println!("{}", event);
//! }
//! # });
//! ```

pub mod app;
pub mod config;
pub mod connection;
pub mod data;
pub mod error;
pub mod events;

// Re-export main types for convenience
pub use app::Dashboard;
pub use config::Settings;
pub use connection::{
    ChannelConnector, ConnectionManager, ConnectionState, ConnectionStatus, Connector,
    EndpointConnector, RemotePeer, SimulatedConnector, TransportEvent,
};
pub use data::{
    normalize, CanonicalReading, Classification, DataPoint, HistoricalData, HistoryStore, Metric,
    MetricRange, Ranges, ReadingStatus, Trend,
};
pub use error::{ConfigError, ConnectionError, ExportError, Rejection};
pub use events::DashboardEvent;
