//! Ready-made nets consumed by the binary and the end-to-end tests.

pub mod alternator;
pub mod multiplicator;
