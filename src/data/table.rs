//! Row view over the three history series.
//!
//! Rows pair the series by index. Series filled through
//! [`HistoricalData::append`] always line up; if one was pushed on its own
//! the pairing is best effort and missing cells are `None`.

use std::cmp::Ordering;

use super::history::HistoricalData;
use super::reading::Metric;

/// One row of the history table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRow {
    /// Timestamp of the first series that has a point at this index.
    pub timestamp: i64,
    pub bmp_temp: Option<f64>,
    pub probe_temp: Option<f64>,
    pub pressure: Option<f64>,
}

impl HistoryRow {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::BmpTemp => self.bmp_temp,
            Metric::ProbeTemp => self.probe_temp,
            Metric::Pressure => self.pressure,
        }
    }
}

/// Column to sort the table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Timestamp,
    BmpTemp,
    ProbeTemp,
    Pressure,
}

/// Build rows oldest first, one per index up to the longest series.
pub fn rows(history: &HistoricalData) -> Vec<HistoryRow> {
    (0..history.max_len())
        .map(|i| {
            let point = |metric: Metric| history.series(metric).get(i).copied();
            let (bmp, probe, pressure) =
                (point(Metric::BmpTemp), point(Metric::ProbeTemp), point(Metric::Pressure));
            let timestamp = bmp
                .or(probe)
                .or(pressure)
                .map(|p| p.timestamp)
                .unwrap_or_default();
            HistoryRow {
                timestamp,
                bmp_temp: bmp.map(|p| p.value),
                probe_temp: probe.map(|p| p.value),
                pressure: pressure.map(|p| p.value),
            }
        })
        .collect()
}

/// Sort rows in place. Missing values always sort last.
pub fn sort_rows(rows: &mut [HistoryRow], column: SortColumn, ascending: bool) {
    rows.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::Timestamp => Some(a.timestamp.cmp(&b.timestamp)),
            SortColumn::BmpTemp => compare_cells(a.bmp_temp, b.bmp_temp),
            SortColumn::ProbeTemp => compare_cells(a.probe_temp, b.probe_temp),
            SortColumn::Pressure => compare_cells(a.pressure, b.pressure),
        };
        match ordering {
            Some(ord) if ascending => ord,
            Some(ord) => ord.reverse(),
            None => missing_last(column, a, b),
        }
    });
}

/// `None` when at least one side is missing.
fn compare_cells(a: Option<f64>, b: Option<f64>) -> Option<Ordering> {
    Some(a?.total_cmp(&b?))
}

fn missing_last(column: SortColumn, a: &HistoryRow, b: &HistoryRow) -> Ordering {
    let metric = match column {
        SortColumn::Timestamp => return Ordering::Equal,
        SortColumn::BmpTemp => Metric::BmpTemp,
        SortColumn::ProbeTemp => Metric::ProbeTemp,
        SortColumn::Pressure => Metric::Pressure,
    };
    match (a.value(metric), b.value(metric)) {
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CanonicalReading, DataPoint};

    fn history() -> HistoricalData {
        let mut history = HistoricalData::new(10);
        for (i, bmp) in [28.0, 26.5, 30.2].iter().enumerate() {
            history.append(&CanonicalReading {
                bmp_temp: *bmp,
                probe_temp: 30.0,
                pressure: 950.0 + i as f64,
                timestamp: (i as i64 + 1) * 1000,
            });
        }
        history
    }

    #[test]
    fn test_rows_pair_by_index() {
        let rows = rows(&history());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].timestamp, 1000);
        assert_eq!(rows[2].bmp_temp, Some(30.2));
        assert_eq!(rows[1].pressure, Some(951.0));
    }

    #[test]
    fn test_rows_with_diverged_series() {
        let mut history = history();
        history.push(Metric::Pressure, DataPoint { value: 960.0, timestamp: 9000 });

        let rows = rows(&history);
        assert_eq!(rows.len(), 4);
        let last = rows[3];
        assert_eq!(last.bmp_temp, None);
        assert_eq!(last.probe_temp, None);
        assert_eq!(last.pressure, Some(960.0));
        assert_eq!(last.timestamp, 9000);
    }

    #[test]
    fn test_sort_by_timestamp_descending() {
        let mut rows = rows(&history());
        sort_rows(&mut rows, SortColumn::Timestamp, false);
        let stamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![3000, 2000, 1000]);
    }

    #[test]
    fn test_sort_by_value_missing_last() {
        let mut history = history();
        history.push(Metric::Pressure, DataPoint { value: 940.0, timestamp: 9000 });
        let mut rows = rows(&history);

        sort_rows(&mut rows, SortColumn::BmpTemp, true);
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.bmp_temp).collect();
        assert_eq!(values, vec![Some(26.5), Some(28.0), Some(30.2), None]);

        sort_rows(&mut rows, SortColumn::BmpTemp, false);
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.bmp_temp).collect();
        assert_eq!(values, vec![Some(30.2), Some(28.0), Some(26.5), None]);
    }
}
