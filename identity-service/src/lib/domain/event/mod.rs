pub mod models;
pub mod ports;
pub mod recorder;
pub mod throttle;
