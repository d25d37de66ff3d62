//! Crisis-keyword classification of user input.

pub mod detector;

pub use detector::CrisisDetector;
