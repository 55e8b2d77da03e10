use std::collections::VecDeque;

use chrono::{DateTime, Local};
use color_eyre::Result;
use serde::Serialize;

use crate::config::OutputFormat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanOutcome {
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScanRecord {
    pub code: String,
    pub outcome: ScanOutcome,
    pub at: DateTime<Local>,
}

impl ScanRecord {
    pub fn new<T: Into<String>>(code: T, outcome: ScanOutcome) -> Self {
        Self {
            code: code.into(),
            outcome,
            at: Local::now(),
        }
    }
}

/// Outcomes of the current session, newest first.
///
/// Only the latest `capacity` records are kept, nothing is written to disk.
#[derive(Clone, Debug)]
pub struct ScanHistory {
    records: VecDeque<ScanRecord>,
    capacity: usize,
}

impl ScanHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, record: ScanRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_back();
        }
        self.records.push_front(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn latest(&self) -> Option<&ScanRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Text printed for the accepted codes when the program exits, `None` when
/// nothing should be printed.
pub fn report(accepted: &[ScanRecord], format: OutputFormat) -> Result<Option<String>> {
    Ok(match format {
        OutputFormat::None => None,
        _ if accepted.is_empty() => None,
        OutputFormat::Lines => Some(
            accepted
                .iter()
                .map(|r| r.code.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        OutputFormat::Json => Some(serde_json::to_string_pretty(accepted)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_bounded() {
        let mut history = ScanHistory::new(2);
        history.push(ScanRecord::new("a", ScanOutcome::Accepted));
        history.push(ScanRecord::new("b", ScanOutcome::Rejected));
        history.push(ScanRecord::new("c", ScanOutcome::Accepted));

        assert_eq!(history.len(), 2);
        let codes: Vec<&str> = history.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["c", "b"]);
        assert_eq!(history.latest().unwrap().code, "c");
    }

    #[test]
    fn clear_empties_history() {
        let mut history = ScanHistory::new(10);
        history.push(ScanRecord::new("1", ScanOutcome::Accepted));
        history.push(ScanRecord::new("2", ScanOutcome::Rejected));
        history.push(ScanRecord::new("3", ScanOutcome::Accepted));

        let codes: Vec<&str> = history.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["3", "2", "1"]);

        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = ScanHistory::new(0);
        history.push(ScanRecord::new("a", ScanOutcome::Accepted));
        assert!(history.is_empty());
    }

    #[test]
    fn report_formats() {
        assert!(report(&[], OutputFormat::Lines).unwrap().is_none());

        let accepted = [
            ScanRecord::new("1", ScanOutcome::Accepted),
            ScanRecord::new("3", ScanOutcome::Accepted),
        ];

        assert_eq!(report(&accepted, OutputFormat::Lines).unwrap().unwrap(), "1\n3");
        assert!(report(&accepted, OutputFormat::None).unwrap().is_none());

        let json = report(&accepted, OutputFormat::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[1]["code"], "3");
        assert_eq!(value[1]["outcome"], "accepted");
    }

    #[test]
    fn serializes_outcome_lowercase() {
        let record = ScanRecord::new("123", ScanOutcome::Rejected);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["code"], "123");
        assert_eq!(json["outcome"], "rejected");
    }
}
