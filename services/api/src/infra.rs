use async_trait::async_trait;
use courier_risk::checks::{Language, PhoneNumber};
use courier_risk::lookup::{CourierSource, LookupError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Source that answers every lookup with one saved payload.
pub(crate) struct FixedPayloadSource {
    payload: Value,
}

impl FixedPayloadSource {
    pub(crate) fn new(payload: Value) -> Self {
        Self { payload }
    }
}

#[async_trait]
impl CourierSource for FixedPayloadSource {
    async fn fetch(&self, _phone: &PhoneNumber, _language: Language) -> Result<Value, LookupError> {
        Ok(self.payload.clone())
    }
}
