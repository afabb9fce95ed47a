//! Per-logger and manager-wide overrides of sink minimum levels

use super::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Key under which the global floor appears in [`SinkFilter::read`].
pub const ALL_SINKS_KEY: &str = "_all";

/// Map from sink name to a filter level, with an optional floor applied to
/// every sink.
///
/// When both a per-sink entry and the floor are set, the less permissive of
/// the two wins.
///
/// # Example
///
/// ```
/// use axe_logger::{Severity, SinkFilter};
///
/// let mut filter = SinkFilter::new();
/// filter.set("Console", Severity::Verbose);
/// filter.set_all(Some(Severity::Log));
///
/// assert_eq!(filter.get("Console"), Some(Severity::Log));
/// assert_eq!(filter.get("File"), Some(Severity::Log));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkFilter {
    filters: HashMap<String, Severity>,
    all: Option<Severity>,
}

impl SinkFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective override for `sink_name`, if any is defined.
    pub fn get(&self, sink_name: &str) -> Option<Severity> {
        match (self.all, self.filters.get(sink_name).copied()) {
            (None, None) => None,
            (Some(level), None) | (None, Some(level)) => Some(level),
            (Some(all), Some(entry)) => Some(Severity::stricter(all, entry)),
        }
    }

    pub fn set(&mut self, sink_name: impl Into<String>, level: Severity) {
        self.filters.insert(sink_name.into(), level);
    }

    pub fn remove(&mut self, sink_name: &str) {
        self.filters.remove(sink_name);
    }

    /// Clears per-sink entries and the global floor.
    pub fn clear(&mut self) {
        self.filters.clear();
        self.all = None;
    }

    pub fn all(&self) -> Option<Severity> {
        self.all
    }

    pub fn set_all(&mut self, level: Option<Severity>) {
        self.all = level;
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.all.is_none()
    }

    /// Snapshot of the defined entries; the floor appears under `_all`.
    pub fn read(&self) -> BTreeMap<String, Severity> {
        let mut out: BTreeMap<String, Severity> = self
            .filters
            .iter()
            .map(|(name, level)| (name.clone(), *level))
            .collect();
        if let Some(all) = self.all {
            out.insert(ALL_SINKS_KEY.to_string(), all);
        }
        out
    }
}
