//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Loggers stamp each reading with a device-clock nanosecond value (`time`)
//! - Merged records carry a millisecond-resolution wall-clock `timestamp`
//!   derived from that value

mod canonical;
mod config;
mod error;
mod kind;
mod reading;
mod record;
mod store;

pub use canonical::*;
pub use config::*;
pub use error::*;
pub use kind::SensorKind;
pub use reading::*;
pub use record::*;
pub use store::*;
