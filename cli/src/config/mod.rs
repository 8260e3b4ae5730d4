//! Deployment configuration

pub mod env;
pub mod legacy;
pub mod model;
pub mod secrets;
pub mod store;
