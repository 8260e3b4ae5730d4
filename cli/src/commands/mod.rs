//! Command implementations

pub mod config_cmd;
pub mod down;
pub mod launch;
pub mod model;
pub mod prompt;
pub mod purge;
pub mod smoke;

/// Persistent volume holding the postgres data directory
pub const POSTGRES_VOLUME: &str = "postgres_data";

/// Network created by the compose stack
pub const STACK_NETWORK: &str = "liquid_labs_network";

/// Where the stack serves the model API
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
