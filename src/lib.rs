pub mod backing;
pub mod constants;
pub mod dump;
pub mod error;
pub mod memory;
pub mod page_table;
pub mod script;
pub mod sim;

// Re-export commonly used items for convenience
pub use constants::*;
pub use error::{SimError, SimResult};
pub use sim::Simulation;
