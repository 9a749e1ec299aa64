// Library exports for the binary and tests
pub mod aggregate;
pub mod analyze;
pub mod config;
pub mod demo;
pub mod logging;
pub mod progress;
pub mod renderer;
pub mod source;
pub mod status;
pub mod summary;
pub mod timestamps;
