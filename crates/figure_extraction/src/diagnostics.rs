use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

use crate::{
    algorithms::ExtractionThresholds,
    traits::DiagnosticSink,
    types::BoundingBox,
};

/// Why a contour did not become a region
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Contour area below the page-relative minimum
    Area { area: f64, min_area: f64 },
    /// Bounding box outside the height/width envelope
    Size { bbox: BoundingBox, limits: ExtractionThresholds },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Area { .. } => write!(f, "failed area check"),
            Self::Size { bbox, .. } => write!(f, "failed min/max check: {}", bbox),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub contour_index: usize,
    pub reason: RejectionReason,
}

/// Default sink: emits `tracing` debug events and stays silent without a subscriber
#[derive(Debug, Clone, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn thresholds(&self, thresholds: &ExtractionThresholds) {
        tracing::debug!(
            min_area = thresholds.min_area,
            min_height = thresholds.min_height,
            max_height = thresholds.max_height,
            min_width = thresholds.min_width,
            max_width = thresholds.max_width,
            "contour thresholds"
        );
    }

    fn rejected(&self, rejection: &Rejection) {
        match &rejection.reason {
            RejectionReason::Area { area, min_area } => tracing::debug!(
                contour = rejection.contour_index,
                area,
                min_area,
                "{}",
                rejection.reason
            ),
            RejectionReason::Size { bbox, limits } => tracing::debug!(
                contour = rejection.contour_index,
                width = bbox.width,
                height = bbox.height,
                min_width = limits.min_width,
                max_width = limits.max_width,
                min_height = limits.min_height,
                max_height = limits.max_height,
                "{}",
                rejection.reason
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NoopDiagnostics;

impl DiagnosticSink for NoopDiagnostics {
    fn rejected(&self, _rejection: &Rejection) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    thresholds: Mutex<Vec<ExtractionThresholds>>,
    rejections: Mutex<Vec<Rejection>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejections(&self) -> Vec<Rejection> {
        self.rejections
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn thresholds_seen(&self) -> Vec<ExtractionThresholds> {
        self.thresholds
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn thresholds(&self, thresholds: &ExtractionThresholds) {
        let mut seen = self.thresholds.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.push(*thresholds);
    }

    fn rejected(&self, rejection: &Rejection) {
        let mut seen = self.rejections.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.push(rejection.clone());
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<T> {
    fn thresholds(&self, thresholds: &ExtractionThresholds) {
        (**self).thresholds(thresholds)
    }

    fn rejected(&self, rejection: &Rejection) {
        (**self).rejected(rejection)
    }
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn thresholds(&self, thresholds: &ExtractionThresholds) {
        (**self).thresholds(thresholds)
    }

    fn rejected(&self, rejection: &Rejection) {
        (**self).rejected(rejection)
    }
}
