use prometheus::{Counter, Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounter,
    pub accepts_total: IntCounterVec,
    pub transitions_total: IntCounterVec,
    pub driver_payout_total: Counter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders created")
                .expect("valid orders_created_total metric");

        let accepts_total = IntCounterVec::new(
            Opts::new("accepts_total", "Assignment attempts by outcome"),
            &["outcome"],
        )
        .expect("valid accepts_total metric");

        let transitions_total = IntCounterVec::new(
            Opts::new("transitions_total", "Status transitions by outcome"),
            &["outcome"],
        )
        .expect("valid transitions_total metric");

        let driver_payout_total = Counter::new(
            "driver_payout_total",
            "Sum of driver payouts on completed orders",
        )
        .expect("valid driver_payout_total metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(accepts_total.clone()))
            .expect("register accepts_total");
        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(driver_payout_total.clone()))
            .expect("register driver_payout_total");

        Self {
            registry,
            orders_created_total,
            accepts_total,
            transitions_total,
            driver_payout_total,
        }
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
