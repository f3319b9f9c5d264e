//! Character and line primitives shared by the tagmate crates.
//!
//! Nothing in here knows about documents, selections or tags; it only
//! answers questions about chars and the line structure of a `RopeSlice`.

pub mod chars;
pub mod line_ending;
