//! Command implementations.

mod normalize;
mod serve;
mod validate;

pub use normalize::run_normalize;
pub use serve::{resolve_serve_config, run_serve};
pub use validate::run_validate;
