//! Prometheus metrics for the helpdesk daemon

use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Registry, TextEncoder,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct HelpdeskMetrics {
    /// Accepted status transitions by from/to pair
    pub transitions_total: IntCounterVec,
    /// Rejected operations by operation and reason
    pub rejections_total: IntCounterVec,
    /// Handled requests by route
    pub requests_total: IntCounterVec,

    registry: Arc<Registry>,
}

impl HelpdeskMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let transitions_total = register_int_counter_vec_with_registry!(
            "helpdesk_transitions_total",
            "Accepted ticket status transitions",
            &["from", "to"],
            registry
        )?;

        let rejections_total = register_int_counter_vec_with_registry!(
            "helpdesk_rejections_total",
            "Rejected helpdesk operations by reason",
            &["operation", "reason"],
            registry
        )?;

        let requests_total = register_int_counter_vec_with_registry!(
            "helpdesk_requests_total",
            "Handled API requests by route",
            &["route"],
            registry
        )?;

        Ok(Self {
            transitions_total,
            rejections_total,
            requests_total,
            registry: Arc::new(registry),
        })
    }

    pub fn record_transition(&self, from: &str, to: &str) {
        self.transitions_total.with_label_values(&[from, to]).inc();
    }

    pub fn record_rejection(&self, operation: &str, reason: &str) {
        self.rejections_total
            .with_label_values(&[operation, reason])
            .inc();
    }

    pub fn record_request(&self, route: &str) {
        self.requests_total.with_label_values(&[route]).inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&metric_families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
