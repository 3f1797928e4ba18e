//! In-process forecast engines

pub mod baseline;

pub use baseline::BaselineEngine;
