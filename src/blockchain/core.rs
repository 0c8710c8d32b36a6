// core.rs splits responsibilities into submodules for easier maintenance.
pub mod chain;
pub mod head;
pub mod state;
pub mod validation;

pub use chain::*;
pub use head::*;
pub use state::*;
pub use validation::*;
