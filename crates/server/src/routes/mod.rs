mod health;
mod inventory;
mod probe;
mod runs;

pub use health::*;
pub use inventory::*;
pub use probe::*;
pub use runs::*;
