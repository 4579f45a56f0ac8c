//! # Remindd Core
//!
//! Shared foundation for the remindd workspace: the unified error enum,
//! the configuration system, and the subscriber data model that the store,
//! channel, and scheduler crates all speak.

pub mod config;
pub mod error;
pub mod types;

pub use config::RemindConfig;
pub use error::{RemindError, Result};
pub use types::{RawRemindTime, Subscriber};
