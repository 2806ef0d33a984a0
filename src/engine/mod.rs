pub mod amounts;
pub mod position;
pub mod range;
