// Models module - intents, snapshots and API results

pub mod api_result;
pub mod intent;
pub mod ship;
pub mod snapshot;

pub use api_result::*;
pub use intent::*;
pub use ship::*;
pub use snapshot::*;
