pub mod authorizer;
pub mod models;
pub mod ports;
