//! Ruin operator for ruin-and-recreate restarts.
//!
//! - [`Ruin`] — Unassigns whole clusters or scattered customers

mod config;
mod operator;

pub use config::RuinConfig;
pub use operator::{Ruin, RuinType};
