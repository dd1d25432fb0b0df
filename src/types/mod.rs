//! Data types for the grid: column and table configuration, tuning options,
//! and the events the grid emits to its host.

mod column;
mod config;
mod events;

pub use column::*;
pub use config::*;
pub use events::*;
