use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated by the reactor over its lifetime.
#[derive(Debug, Default, Clone)]
pub struct ReactorMetrics {
    events: u64,
    relayouts: u64,
    maximizer_passes: u64,
    rebuilds: u64,
    redraws: u64,
}

impl ReactorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self) {
        self.events = self.events.saturating_add(1);
    }

    pub fn record_relayout(&mut self, passes: usize) {
        self.relayouts = self.relayouts.saturating_add(1);
        self.maximizer_passes = self.maximizer_passes.saturating_add(passes as u64);
    }

    pub fn record_rebuild(&mut self) {
        self.rebuilds = self.rebuilds.saturating_add(1);
    }

    pub fn record_redraw(&mut self) {
        self.redraws = self.redraws.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            events: self.events,
            relayouts: self.relayouts,
            maximizer_passes: self.maximizer_passes,
            rebuilds: self.rebuilds,
            redraws: self.redraws,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub events: u64,
    pub relayouts: u64,
    pub maximizer_passes: u64,
    pub rebuilds: u64,
    pub redraws: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target.to_string(),
            "reactor_metrics".to_string(),
            self.as_fields(),
        )
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("events".to_string(), json!(self.events));
        map.insert("relayouts".to_string(), json!(self.relayouts));
        map.insert("maximizer_passes".to_string(), json!(self.maximizer_passes));
        map.insert("rebuilds".to_string(), json!(self.rebuilds));
        map.insert("redraws".to_string(), json!(self.redraws));
        map
    }
}
