pub mod observation;
pub mod statistics;

pub use observation::*;
pub use statistics::*;
