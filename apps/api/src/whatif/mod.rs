pub mod handlers;
pub mod impact;
pub mod segment_changes;
pub mod word_diff;
