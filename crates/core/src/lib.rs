//! Pack economy engine. Keep this crate free of IO and platform concerns.

pub mod cards;
pub mod config;
pub mod economy;
pub mod events;
pub mod inventory;
pub mod progress;
pub mod rng;
pub mod skills;
pub mod snapshot;
pub mod state;

pub use cards::*;
pub use config::*;
pub use economy::*;
pub use events::*;
pub use inventory::*;
pub use progress::*;
pub use rng::*;
pub use skills::*;
pub use snapshot::*;
pub use state::*;
