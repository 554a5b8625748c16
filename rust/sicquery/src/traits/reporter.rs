use std::error::Error;

/// Status/error channel shared by the pipeline components.
///
/// Injected at construction instead of relying on ambient event dispatch;
/// the orchestrator decides where messages go.
pub trait StatusReporter {
    fn report_status(&self, message: &str);
    fn report_warning(&self, message: &str);
    fn report_error(&self, message: &str, cause: Option<&dyn Error>);
    /// `percent_complete` is in `[0, 100]`.
    fn report_progress(&self, percent_complete: f32);
}

/// Default reporter: forwards everything to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report_status(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn report_warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn report_error(&self, message: &str, cause: Option<&dyn Error>) {
        match cause {
            Some(cause) => tracing::error!(cause = %cause, "{}", message),
            None => tracing::error!("{}", message),
        }
    }

    fn report_progress(&self, percent_complete: f32) {
        tracing::debug!(percent_complete, "progress");
    }
}

/// Discards everything; handy for tests and benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl StatusReporter for SilentReporter {
    fn report_status(&self, _message: &str) {}
    fn report_warning(&self, _message: &str) {}
    fn report_error(&self, _message: &str, _cause: Option<&dyn Error>) {}
    fn report_progress(&self, _percent_complete: f32) {}
}
