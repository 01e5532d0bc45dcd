// Scratch storage for uploaded documents

pub mod scratch;

pub use scratch::*;
