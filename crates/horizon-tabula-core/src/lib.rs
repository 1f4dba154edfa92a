//! Core primitives for Horizon Tabula.
//!
//! This crate provides the framework-independent building blocks of the
//! Horizon Tabula table subsystem:
//!
//! - **Errors**: [`TabulaError`] and the crate-wide [`Result`] alias
//! - **Values**: [`Value`], the dynamic cell/row type, and the [`Record`] trait
//! - **Signals**: [`Signal`] for change notification between controls
//! - **Cancellation**: [`CancellationToken`] carried by each request
//! - **Configuration**: [`TabulaConfig`] construction-time defaults
//! - **Logging**: `tracing` targets and [`PerfSpan`]
//!
//! # Signal Example
//!
//! ```
//! use horizon_tabula_core::Signal;
//!
//! let sort_changed = Signal::<String>::new();
//! sort_changed.connect(|column| println!("sorted by {}", column));
//! sort_changed.emit("name".to_string());
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod signal;
pub mod value;

pub use cancel::CancellationToken;
pub use config::TabulaConfig;
pub use error::{BoxError, Result, TabulaError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use value::{Record, Value};
