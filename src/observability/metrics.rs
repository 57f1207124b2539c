use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub pickup_requests_total: IntCounterVec,
    pub dispatch_latency_seconds: HistogramVec,
    pub riders_connected: IntGauge,
    pub messages_pushed_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let pickup_requests_total = IntCounterVec::new(
            Opts::new("pickup_requests_total", "Pickup requests by outcome"),
            &["outcome"],
        )
        .expect("valid pickup_requests_total metric");

        let dispatch_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "dispatch_latency_seconds",
                "Latency of pickup dispatch in seconds",
            ),
            &["outcome"],
        )
        .expect("valid dispatch_latency_seconds metric");

        let riders_connected = IntGauge::new(
            "riders_connected",
            "Riders with a live push session",
        )
        .expect("valid riders_connected metric");

        let messages_pushed_total = IntCounterVec::new(
            Opts::new("messages_pushed_total", "Messages pushed to riders by kind"),
            &["kind"],
        )
        .expect("valid messages_pushed_total metric");

        registry
            .register(Box::new(pickup_requests_total.clone()))
            .expect("register pickup_requests_total");
        registry
            .register(Box::new(dispatch_latency_seconds.clone()))
            .expect("register dispatch_latency_seconds");
        registry
            .register(Box::new(riders_connected.clone()))
            .expect("register riders_connected");
        registry
            .register(Box::new(messages_pushed_total.clone()))
            .expect("register messages_pushed_total");

        Self {
            registry,
            pickup_requests_total,
            dispatch_latency_seconds,
            riders_connected,
            messages_pushed_total,
        }
    }

    pub fn observe_pickup(&self, outcome: &str, elapsed_seconds: f64) {
        self.pickup_requests_total
            .with_label_values(&[outcome])
            .inc();
        self.dispatch_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
