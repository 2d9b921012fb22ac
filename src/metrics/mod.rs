// Metrics module - Prometheus metrics for watermark operations
//
// Provides:
// - Operation counters by kind (text, image) and outcome
// - Operation latency histograms
// - Font fallback counter

use crate::watermark::WatermarkError;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramTimer, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Which engine operation a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkKind {
    Text,
    Image,
}

impl WatermarkKind {
    /// Get the metric label for this kind
    pub fn as_label(&self) -> &'static str {
        match self {
            WatermarkKind::Text => "text",
            WatermarkKind::Image => "image",
        }
    }
}

/// Metric label for the outcome of an operation.
pub fn outcome_label<T>(result: &Result<T, WatermarkError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(WatermarkError::DecodeError(_)) => "decode_error",
        Err(WatermarkError::WriteError { .. }) => "write_error",
    }
}

/// Global metrics registry for the watermark engine
pub struct WatermarkMetrics {
    /// Operations by kind and outcome
    pub requests: IntCounterVec,

    /// Operation duration histogram (in seconds)
    pub duration: HistogramVec,

    /// Named fonts that could not be loaded and were replaced by the default
    pub font_fallbacks: IntCounter,
}

/// Global singleton instance of metrics
static METRICS: OnceLock<WatermarkMetrics> = OnceLock::new();

impl WatermarkMetrics {
    /// Initialize and return the global metrics instance
    ///
    /// Metrics are registered with the default Prometheus registry on first use.
    pub fn global() -> &'static Self {
        METRICS.get_or_init(|| {
            let requests = register_int_counter_vec!(
                "watermark_requests_total",
                "Total number of watermark operations by kind and outcome",
                &["kind", "outcome"]
            )
            .expect("Failed to register watermark_requests_total metric");

            let duration = register_histogram_vec!(
                "watermark_duration_seconds",
                "Duration of watermark operations in seconds",
                &["kind"],
                vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
            )
            .expect("Failed to register watermark_duration_seconds metric");

            let font_fallbacks = register_int_counter!(
                "watermark_font_fallbacks_total",
                "Named fonts replaced by the default font"
            )
            .expect("Failed to register watermark_font_fallbacks_total metric");

            WatermarkMetrics {
                requests,
                duration,
                font_fallbacks,
            }
        })
    }

    /// Start timing an operation; the duration is recorded when the timer drops.
    pub fn start_timer(&self, kind: WatermarkKind) -> HistogramTimer {
        self.duration
            .with_label_values(&[kind.as_label()])
            .start_timer()
    }

    /// Count a finished operation.
    pub fn record<T>(&self, kind: WatermarkKind, result: &Result<T, WatermarkError>) {
        self.requests
            .with_label_values(&[kind.as_label(), outcome_label(result)])
            .inc();
    }

    pub fn request_count(&self, kind: WatermarkKind, outcome: &str) -> u64 {
        self.requests
            .with_label_values(&[kind.as_label(), outcome])
            .get()
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn export_text() -> Result<String, String> {
    // Make sure our metrics exist even before the first request
    WatermarkMetrics::global();

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}
