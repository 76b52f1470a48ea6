//! Dashboard state: one connection, its history, and derived status.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::Settings;
use crate::connection::{ConnectionManager, ConnectionState, ConnectionStatus, Connector, TransportEvent};
use crate::data::{
    export, normalize, now_millis, table, CanonicalReading, HistoricalData, HistoryRow,
    HistoryStore, Metric, MetricStatus, Ranges, ReadingStatus, SortColumn, Trend,
    TrendIndicator,
};
use crate::error::{ConnectionError, ExportError};
use crate::events::DashboardEvent;

/// Owns the connection manager and the history it feeds.
///
/// Every frame is processed to completion (normalize, append, derive)
/// before the next transport event is taken, so the history and the
/// derived status always describe the same reading. Dropping the dashboard
/// closes any open connection.
#[derive(Debug)]
pub struct Dashboard {
    manager: ConnectionManager,
    store: HistoryStore,
    ranges: Ranges,
    status: ReadingStatus,
    trends: [TrendIndicator; 3],
}

impl Dashboard {
    /// Create a dashboard with the given connector and settings.
    pub fn new(connector: Box<dyn Connector>, settings: &Settings) -> Self {
        Self {
            manager: ConnectionManager::new(connector, settings.endpoint.clone()),
            store: HistoryStore::new(settings.capacity),
            ranges: settings.ranges,
            status: ReadingStatus::default(),
            trends: Default::default(),
        }
    }

    pub fn connect(&mut self, target: Option<&str>) -> Result<(), ConnectionError> {
        self.manager.connect(target)
    }

    pub fn disconnect(&mut self) {
        self.manager.disconnect()
    }

    pub fn send_message(&self, payload: &str) -> Result<(), ConnectionError> {
        self.manager.send_message(payload)
    }

    pub fn connection_status(&self) -> &ConnectionStatus {
        self.manager.status()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.manager.state()
    }

    /// Returns a description of the connector in use.
    pub fn connector_description(&self) -> &str {
        self.manager.connector_description()
    }

    /// Wait for the next transport event and process it.
    ///
    /// Returns `None` when there is no connection to wait on.
    pub async fn next_event(&mut self) -> Option<DashboardEvent> {
        let event = self.manager.next_event().await?;
        Some(self.process(event))
    }

    /// Process the next transport event if one is ready.
    pub fn poll_event(&mut self) -> Option<DashboardEvent> {
        let event = self.manager.poll_event()?;
        Some(self.process(event))
    }

    fn process(&mut self, event: TransportEvent) -> DashboardEvent {
        match event {
            TransportEvent::Frame(frame) => self.ingest(&frame, now_millis()),
            _ => DashboardEvent::Status(self.manager.status().clone()),
        }
    }

    /// Run one inbound frame through the pipeline.
    ///
    /// On success the reading becomes current, is appended to history, and
    /// its status is derived against the reading it replaced. A rejected
    /// frame leaves all state untouched.
    pub fn ingest(&mut self, frame: &str, received_at: i64) -> DashboardEvent {
        let reading = match normalize(frame, received_at) {
            Ok(reading) => reading,
            Err(rejection) => {
                warn!("Dropping frame: {}", rejection);
                return DashboardEvent::Rejected(rejection);
            }
        };

        let status = ReadingStatus::derive(&reading, self.store.current(), &self.ranges);
        self.store.append(reading);
        self.status = status;

        let now = Instant::now();
        for (metric, indicator) in Metric::ALL.iter().zip(self.trends.iter_mut()) {
            indicator.set(status.get(*metric).trend, now);
        }

        debug!(
            bmp_temp = reading.bmp_temp,
            probe_temp = reading.probe_temp,
            pressure = reading.pressure,
            worst = status.worst().symbol(),
            "Reading accepted"
        );
        DashboardEvent::Reading { reading, status }
    }

    /// The most recent accepted reading.
    pub fn current(&self) -> Option<&CanonicalReading> {
        self.store.current()
    }

    pub fn history(&self) -> &HistoricalData {
        self.store.history()
    }

    pub fn ranges(&self) -> &Ranges {
        &self.ranges
    }

    /// Status derived for the current reading, with trends as derived.
    pub fn reading_status(&self) -> &ReadingStatus {
        &self.status
    }

    /// Status of one metric as it should be displayed at `now`: the
    /// classification of the current value, with the trend decayed once
    /// its display window has passed. Normal and flat with no data.
    pub fn metric_status(&self, metric: Metric, now: Instant) -> MetricStatus {
        match self.store.current() {
            Some(_) => MetricStatus {
                classification: self.status.get(metric).classification,
                trend: self.trend_at(metric, now),
            },
            None => MetricStatus::for_display(None, self.ranges.get(metric), None),
        }
    }

    /// Trend arrow to show for `metric` at `now`.
    pub fn trend_at(&self, metric: Metric, now: Instant) -> Trend {
        self.trends[metric_index(metric)].current(now)
    }

    /// History rows paired by index, sorted by `column`.
    pub fn rows(&self, column: SortColumn, ascending: bool) -> Vec<HistoryRow> {
        let mut rows = table::rows(self.store.history());
        table::sort_rows(&mut rows, column, ascending);
        rows
    }

    /// Forget all readings. The connection is not affected.
    pub fn clear(&mut self) {
        self.store.clear();
        self.status = ReadingStatus::default();
        for indicator in &mut self.trends {
            indicator.clear();
        }
    }

    /// Render the history as CSV.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        export::to_csv(self.store.history())
    }

    /// Write the history as CSV to `path`.
    pub fn export_to_file(&self, path: &Path) -> Result<(), ExportError> {
        export::export_to_file(self.store.history(), path)
    }
}

fn metric_index(metric: Metric) -> usize {
    match metric {
        Metric::BmpTemp => 0,
        Metric::ProbeTemp => 1,
        Metric::Pressure => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ChannelConnector, EndpointConnector, RemotePeer};
    use crate::data::{Classification, TREND_DISPLAY_WINDOW};
    use crate::error::Rejection;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn frame(bmp: f64, probe: f64, pressure: f64) -> String {
        format!(
            r#"{{"bmp_temp":{},"probe_temp":{},"pressure":{}}}"#,
            bmp, probe, pressure
        )
    }

    fn dashboard(capacity: usize) -> (Dashboard, UnboundedReceiver<RemotePeer>) {
        let (connector, peers) = ChannelConnector::create();
        let settings = Settings {
            endpoint: Some("ws://sensors".to_string()),
            capacity,
            ..Settings::default()
        };
        (Dashboard::new(Box::new(connector), &settings), peers)
    }

    #[test]
    fn test_ingest_first_reading() {
        let (mut dashboard, _peers) = dashboard(20);
        let event = dashboard.ingest(&frame(28.6, 30.1, 946.23), 1_000);

        match event {
            DashboardEvent::Reading { reading, status } => {
                assert_eq!(reading.timestamp, 1_000);
                assert_eq!(status.worst(), Classification::Normal);
                assert_eq!(status.bmp_temp.trend, Trend::Unchanged);
            }
            other => panic!("expected reading, got {:?}", other),
        }
        assert_eq!(dashboard.current().map(|r| r.pressure), Some(946.23));
        assert_eq!(dashboard.history().max_len(), 1);
    }

    #[test]
    fn test_ingest_derives_trend_against_previous() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(28.0, 30.0, 950.0), 1);
        dashboard.ingest(&frame(29.0, 29.0, 950.0), 2);

        let status = dashboard.reading_status();
        assert_eq!(status.bmp_temp.trend, Trend::Up);
        assert_eq!(status.probe_temp.trend, Trend::Down);
        assert_eq!(status.pressure.trend, Trend::Unchanged);
    }

    #[test]
    fn test_rejected_frame_leaves_state() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(28.0, 30.0, 950.0), 1);

        let event = dashboard.ingest(r#"{"bmp_temp":1,"probe_temp":2}"#, 2);
        assert!(matches!(event, DashboardEvent::Rejected(Rejection::Incomplete { .. })));
        assert!(matches!(
            dashboard.ingest("not json", 3),
            DashboardEvent::Rejected(Rejection::Malformed(_))
        ));

        assert_eq!(dashboard.current().map(|r| r.timestamp), Some(1));
        assert_eq!(dashboard.history().max_len(), 1);
    }

    #[test]
    fn test_history_bounded_by_capacity() {
        let (mut dashboard, _peers) = dashboard(3);
        for i in 0..5 {
            dashboard.ingest(&frame(25.0 + i as f64, 30.0, 950.0), i);
        }
        let values = dashboard.history().bmp_temp.values();
        assert_eq!(values, vec![27.0, 28.0, 29.0]);
    }

    #[test]
    fn test_classification_uses_configured_ranges() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(33.0, 40.0, 950.0), 1);

        let now = Instant::now();
        assert_eq!(
            dashboard.metric_status(Metric::BmpTemp, now).classification,
            Classification::Warning
        );
        assert_eq!(
            dashboard.metric_status(Metric::ProbeTemp, now).classification,
            Classification::Critical
        );
        assert_eq!(dashboard.reading_status().worst(), Classification::Critical);
    }

    #[test]
    fn test_trend_decays_after_window() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(28.0, 30.0, 950.0), 1);
        dashboard.ingest(&frame(29.0, 30.0, 950.0), 2);

        let now = Instant::now();
        assert_eq!(dashboard.trend_at(Metric::BmpTemp, now), Trend::Up);
        let later = now + TREND_DISPLAY_WINDOW + Duration::from_millis(1);
        assert_eq!(dashboard.trend_at(Metric::BmpTemp, later), Trend::Unchanged);
        // The derived trend is unaffected by the display timer.
        assert_eq!(dashboard.reading_status().bmp_temp.trend, Trend::Up);
    }

    #[test]
    fn test_metric_status_without_data() {
        let (dashboard, _peers) = dashboard(20);
        assert_eq!(
            dashboard.metric_status(Metric::Pressure, Instant::now()),
            MetricStatus::default()
        );
    }

    #[test]
    fn test_rows_default_newest_first() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(28.0, 30.0, 950.0), 1_000);
        dashboard.ingest(&frame(29.0, 31.0, 951.0), 2_000);

        let rows = dashboard.rows(SortColumn::default(), false);
        let timestamps: Vec<_> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![2_000, 1_000]);
    }

    #[test]
    fn test_clear() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(28.0, 30.0, 950.0), 1);
        dashboard.ingest(&frame(29.0, 30.0, 950.0), 2);
        dashboard.clear();

        assert!(dashboard.current().is_none());
        assert!(dashboard.history().is_empty());
        assert_eq!(dashboard.trend_at(Metric::BmpTemp, Instant::now()), Trend::Unchanged);
        assert!(matches!(dashboard.export_csv(), Err(ExportError::NoData)));
    }

    #[test]
    fn test_export() {
        let (mut dashboard, _peers) = dashboard(20);
        dashboard.ingest(&frame(28.6, 30.1, 946.23), 1_700_000_000_000);

        let csv = dashboard.export_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Timestamp,BMP Temperature,Probe Temperature,Pressure",
                "2023-11-14T22:13:20.000Z,28.6,30.1,946.23",
            ]
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        dashboard.export_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);
    }

    #[test]
    fn test_transport_events_flow_through() {
        let (mut dashboard, mut peers) = dashboard(20);
        dashboard.connect(None).unwrap();
        let peer = peers.try_recv().unwrap();

        peer.open();
        peer.frame(frame(28.6, 30.1, 946.23));
        peer.frame("{}");

        match dashboard.poll_event() {
            Some(DashboardEvent::Status(status)) => assert!(status.connected),
            other => panic!("expected status, got {:?}", other),
        }
        assert!(matches!(dashboard.poll_event(), Some(DashboardEvent::Reading { .. })));
        assert!(matches!(dashboard.poll_event(), Some(DashboardEvent::Rejected(_))));
        assert!(dashboard.poll_event().is_none());

        peer.close();
        match dashboard.poll_event() {
            Some(DashboardEvent::Status(status)) => {
                assert!(!status.connected);
                assert_eq!(status.error.as_deref(), Some("Connection closed"));
            }
            other => panic!("expected status, got {:?}", other),
        }
        // History survives the close.
        assert_eq!(dashboard.history().max_len(), 1);
    }

    #[test]
    fn test_connect_outside_runtime_reports_failure() {
        let settings = Settings {
            endpoint: Some("sim://".to_string()),
            ..Settings::default()
        };
        let mut dashboard = Dashboard::new(Box::new(EndpointConnector::default()), &settings);

        assert!(matches!(
            dashboard.connect(None),
            Err(ConnectionError::Transport(_))
        ));
        assert_eq!(dashboard.connection_state(), ConnectionState::Errored);
        let status = dashboard.connection_status();
        assert!(!status.connected);
        assert_eq!(status.error.as_deref(), Some("Failed to connect"));

        for target in ["ws://localhost:5000", "tcp://localhost:9090"] {
            assert!(dashboard.connect(Some(target)).is_err());
            assert_eq!(dashboard.connection_state(), ConnectionState::Errored);
        }
    }

    #[test]
    fn test_drop_disconnects() {
        let (mut dashboard, mut peers) = dashboard(20);
        dashboard.connect(None).unwrap();
        let peer = peers.try_recv().unwrap();
        peer.open();

        drop(dashboard);
        assert!(peer.is_detached());
    }

    #[tokio::test]
    async fn test_next_event() {
        let (mut dashboard, mut peers) = dashboard(20);
        assert!(dashboard.next_event().await.is_none());

        dashboard.connect(None).unwrap();
        let peer = peers.try_recv().unwrap();
        peer.open();
        peer.frame(frame(28.6, 30.1, 946.23));

        assert!(matches!(dashboard.next_event().await, Some(DashboardEvent::Status(_))));
        assert!(dashboard.next_event().await.unwrap().is_reading());
        assert_eq!(dashboard.connector_description(), "channel");
    }
}
