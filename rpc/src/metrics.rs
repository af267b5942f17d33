//! Prometheus metrics for the HTTP front end.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that `/metrics` encodes into
//! the Prometheus text exposition format.

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, HistogramOpts, HistogramVec, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,

    /// Requests by route and response status.
    pub requests: IntCounterVec,
    /// Handler latency by route, in seconds.
    pub request_duration: HistogramVec,
    /// Registrations accepted (new requests and resends).
    pub registrations: IntCounter,
    /// Registrations confirmed and staked.
    pub confirmations: IntCounter,
}

impl RpcMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = register_int_counter_vec_with_registry!(
            Opts::new("vulcan_http_requests_total", "HTTP requests handled"),
            &["route", "status"],
            registry
        )?;
        let request_duration = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "vulcan_http_request_duration_seconds",
                "Time spent handling HTTP requests"
            ),
            &["route"],
            registry
        )?;
        let registrations = register_int_counter_with_registry!(
            Opts::new("vulcan_registrations_total", "Registrations accepted"),
            registry
        )?;
        let confirmations = register_int_counter_with_registry!(
            Opts::new("vulcan_confirmations_total", "Registrations confirmed"),
            registry
        )?;

        Ok(Self {
            registry,
            requests,
            request_duration,
            registrations,
            confirmations,
        })
    }

    pub fn observe(&self, route: &str, status: u16, seconds: f64) {
        self.requests
            .with_label_values(&[route, &status.to_string()])
            .inc();
        self.request_duration
            .with_label_values(&[route])
            .observe(seconds);
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_requests_show_up_in_text_output() {
        let metrics = RpcMetrics::new().unwrap();
        metrics.observe("register", 200, 0.01);
        metrics.observe("register", 429, 0.01);
        metrics.confirmations.inc();

        let text = metrics.encode().unwrap();
        assert!(text.contains(r#"vulcan_http_requests_total{route="register",status="429"} 1"#));
        assert!(text.contains("vulcan_confirmations_total 1"));
    }
}
