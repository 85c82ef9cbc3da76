pub mod config;
pub mod error;
pub mod templates;
pub mod vocabulary;

pub use config::Config;
pub use error::ConfigError;
