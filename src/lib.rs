pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, infra, rag};
pub use cli::Cli;
pub use config::AppConfig;
pub use domain::types;
pub use infrastructure::{model, server, vector};
