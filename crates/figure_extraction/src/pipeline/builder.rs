use crate::{
    config::FilterConfiguration,
    diagnostics::{NoopDiagnostics, TracingDiagnostics},
    ops::ImageprocOps,
    pipeline::FigureExtractor,
    traits::{DiagnosticSink, ImageOps},
};

/// Builder for swapping the vision backend or the diagnostic sink
pub struct FigureExtractorBuilder<O = ImageprocOps, D = TracingDiagnostics> {
    config: FilterConfiguration,
    ops: O,
    diagnostics: D,
}

impl FigureExtractorBuilder {
    pub fn new(config: FilterConfiguration) -> Self {
        Self {
            config,
            ops: ImageprocOps,
            diagnostics: TracingDiagnostics,
        }
    }
}

impl<O, D> FigureExtractorBuilder<O, D>
where
    O: ImageOps,
    D: DiagnosticSink,
{
    /// Set the vision backend (replaces the default imageproc one)
    pub fn with_ops<P>(self, ops: P) -> FigureExtractorBuilder<P, D>
    where
        P: ImageOps,
    {
        FigureExtractorBuilder {
            config: self.config,
            ops,
            diagnostics: self.diagnostics,
        }
    }

    /// Set where rejections are reported
    pub fn with_diagnostics<S>(self, diagnostics: S) -> FigureExtractorBuilder<O, S>
    where
        S: DiagnosticSink,
    {
        FigureExtractorBuilder {
            config: self.config,
            ops: self.ops,
            diagnostics,
        }
    }

    /// Drop all diagnostics
    pub fn silent(self) -> FigureExtractorBuilder<O, NoopDiagnostics> {
        self.with_diagnostics(NoopDiagnostics)
    }

    pub fn build(self) -> FigureExtractor<O, D> {
        FigureExtractor::from_parts(self.config, self.ops, self.diagnostics)
    }
}
