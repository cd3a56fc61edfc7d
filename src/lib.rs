pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod services;
pub mod session;
pub mod tenant;

pub use console::Console;
pub use error::{BootstrapError, GatewayError};
