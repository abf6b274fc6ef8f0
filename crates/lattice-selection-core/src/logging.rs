//! Logging facilities for the selection runtime.
//!
//! Everything is instrumented with the `tracing` crate. Nothing here installs a
//! subscriber; the host application does that:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_selection=debug,lattice_selection_core=trace")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "lattice_selection_core";
    /// Delayed task scheduler target.
    pub const SCHEDULER: &str = "lattice_selection_core::scheduler";
    /// Signal emission target.
    pub const SIGNAL: &str = "lattice_selection_core::signal";
    /// Tokio-backed scheduler target.
    pub const ASYNC: &str = "lattice_selection_core::async_runtime";
}
