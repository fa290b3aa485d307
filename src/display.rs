//! Display adapters for emotion frames

/// Renders a single animation frame identified by file name
///
/// Implementations must be cheap and non-blocking; the feedback animator
/// calls this from its background loop once per frame interval.
pub trait DisplayAdapter: Send + Sync {
    fn show_frame(&self, frame: &str);
}

/// Prints frames to stdout, used in console mode
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDisplay;

impl DisplayAdapter for ConsoleDisplay {
    fn show_frame(&self, frame: &str) {
        println!("(表情) {frame}");
    }
}

/// Panel driver that traces frames instead of driving hardware
#[derive(Debug, Default, Clone, Copy)]
pub struct PanelDisplay;

impl DisplayAdapter for PanelDisplay {
    fn show_frame(&self, frame: &str) {
        tracing::debug!(frame, "panel frame");
    }
}
