//! Ambient infrastructure shared by the Yatra crates.
//!
//! - [`logging`]: installs the `tracing` subscriber
//! - [`config`]: TOML files, `.env` loading and redacted secrets

pub mod config;
pub mod logging;

pub use config::{ConfigError, Secret, load_dotenv, load_toml, optional_secret_from_env, secret_from_env};
pub use logging::{LoggingConfig, TracingFormat, TracingSetup};
