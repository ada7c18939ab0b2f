pub mod explanation;
pub mod segment;
