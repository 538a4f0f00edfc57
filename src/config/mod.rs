mod settings;

pub use settings::{Config, LogConfig, ReplayConfig, ServerConfig, EXAMPLE_CONFIG};
