pub mod id;
pub mod mask;
pub mod pose;

pub use id::*;
pub use mask::*;
pub use pose::*;
