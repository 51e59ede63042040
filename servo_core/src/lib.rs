// servo_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod driver;
pub mod error;
pub mod features;
pub mod lie;
pub mod prelude;
pub mod simulator;
pub mod task;
pub mod types;
