pub mod config;
pub mod error;
pub mod hostname;
pub mod provision;
pub mod script;
pub mod task;
pub mod tasks;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::{HostConfig, Profile, Settings};
pub use crate::error::{Error, Result};
pub use crate::provision::{Driver, Outcome, Report, Status};
pub use crate::task::Task;
pub use crate::transport::{Connector, Transport};
