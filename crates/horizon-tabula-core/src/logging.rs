//! Logging facilities for Horizon Tabula.
//!
//! Horizon Tabula uses the `tracing` crate for instrumentation. Install a
//! subscriber in the embedding application to see the logs:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_tabula=debug")
//!     .init();
//! ```
//!
//! Each subsystem logs under its own target (see [`targets`]), so a filter
//! such as `horizon_tabula::pager=trace` isolates pager button layout.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "horizon_tabula_core";
    /// Page and control arena target.
    pub const PAGE: &str = "horizon_tabula::page";
    /// Table drawing and sorting target.
    pub const TABLE: &str = "horizon_tabula::table";
    /// Column rendering and form handling target.
    pub const COLUMN: &str = "horizon_tabula::column";
    /// Data pager target.
    pub const PAGER: &str = "horizon_tabula::pager";
    /// Data loading target.
    pub const DATA: &str = "horizon_tabula::data";
    /// Page state target.
    pub const STATE: &str = "horizon_tabula::state";
    /// Performance spans target.
    pub const PERF: &str = "horizon_tabula::perf";
}

/// A guard that keeps a performance span entered until dropped.
///
/// This is useful for tracking the duration of draw passes and state
/// serialization.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_tabula::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        let _span = PerfSpan::new("test_operation");
        tracing::debug!(target: targets::PERF, rows = 3, "inside perf span");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::PAGE,
            targets::TABLE,
            targets::COLUMN,
            targets::PAGER,
            targets::DATA,
            targets::STATE,
        ] {
            assert!(target.starts_with("horizon_tabula::"));
        }
    }
}
