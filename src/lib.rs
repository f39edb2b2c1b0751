pub mod config;
pub mod domain;
pub mod error;
pub mod exam;
pub mod handlers;
pub mod paths;
pub mod profiling;
pub mod quiz;
pub mod scoring;
pub mod services;
pub mod session;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
