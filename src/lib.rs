pub mod api;
pub mod args;
pub mod cache;
pub mod commands;
mod config;
mod error;
pub mod model;
mod utils;
pub mod view;


pub use api::Mode;
pub use cache::{FinanceCache, FinanceState, LoadError};
pub use config::Config;
pub use error::{Error, Operation, Result, TransportError, TransportErrorKind};
