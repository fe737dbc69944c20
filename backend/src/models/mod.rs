pub mod analysis;
pub mod macros;
pub mod mission;

pub use analysis::*;
pub use mission::*;
