use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::services::backend::Backend;

/// Shared application state passed to all route handlers.
pub struct AppState<B> {
    pub backend: Arc<B>,
    /// Absent when no Prometheus recorder is installed (e.g. in tests).
    pub metrics: Option<Arc<PrometheusHandle>>,
}

impl<B: Backend> AppState<B> {
    pub fn new(backend: B, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            backend: Arc::new(backend),
            metrics: metrics.map(Arc::new),
        }
    }
}

// Manual impl: `B` itself need not be `Clone`.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            metrics: self.metrics.clone(),
        }
    }
}
