// Operations module - state refresh, fleet analysis and intent execution

pub mod executor;
pub mod fleet;
pub mod state;

pub use executor::*;
pub use fleet::*;
pub use state::*;
