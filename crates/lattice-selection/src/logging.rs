//! Tracing targets for the selection crate.
//!
//! Filter with e.g. `RUST_LOG=lattice_selection::loader=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Loader runtime: scheduling, cancellation, notifications.
    pub const LOADER: &str = "lattice_selection::loader";
    /// Pure state transitions.
    pub const REDUCER: &str = "lattice_selection::reducer";
    /// Row collection maintenance.
    pub const ROWS: &str = "lattice_selection::rows";
    /// Configuration loading.
    pub const CONFIG: &str = "lattice_selection::config";
}
