//! Optional-child-state loading with cancellable delayed activation.
//!
//! A list screen owns rows with a count each. Picking a row opens a detail
//! slot that starts out loading; after a fixed delay the detail is filled in
//! from the row. Leaving the detail writes its count back to the row and
//! cancels a load that has not finished yet. Picking another row while a load
//! is pending supersedes it; a superseded load is never observed.
//!
//! - [`LoaderState`] and [`LoaderState::reduce`]: the pure state machine
//! - [`Detail`] and [`DetailAction`]: the child counter and its reducer
//! - [`SelectionLoader`]: the state machine driven by a
//!   [`Scheduler`](lattice_selection_core::Scheduler)
//! - [`LoaderConfig`]: delay and seed rows from TOML
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use lattice_selection::{LoadPhase, LoaderConfig, SelectionLoader};
//! use lattice_selection_core::{ManualClock, SharedTaskScheduler};
//!
//! let scheduler = SharedTaskScheduler::new(ManualClock::new());
//! let loader = SelectionLoader::from_config(&LoaderConfig::default(), scheduler.clone())?;
//! let rows = loader.rows();
//!
//! loader.select(rows[0].id);
//! loader.select(rows[1].id);
//! scheduler.advance(loader.load_delay());
//!
//! assert_eq!(loader.phase(), LoadPhase::Loaded(rows[1].id, 42));
//! # Ok::<(), lattice_selection::ConfigError>(())
//! ```

mod config;
mod detail;
mod error;
mod loader;
pub mod logging;
mod model;
pub mod reducer;
mod rows;

pub use config::{LoaderConfig, DEFAULT_LOAD_DELAY_MS};
pub use detail::{Detail, DetailAction};
pub use error::{ConfigError, ConfigResult, RowError, RowResult};
pub use loader::SelectionLoader;
pub use model::{LoadPhase, Row, RowId, Selection};
pub use reducer::{Effect, LoaderAction, LoaderState};
pub use rows::RowCollection;

static_assertions::assert_impl_all!(
    SelectionLoader<lattice_selection_core::SharedTaskScheduler>: Send, Sync, Clone
);
