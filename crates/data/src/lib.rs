//! Economy config loading and save files.

pub mod load;
pub mod save;

pub use load::*;
pub use save::*;
