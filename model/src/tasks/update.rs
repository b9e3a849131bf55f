use crate::config::HostConfig;
use crate::error::Result;
use crate::task::Task;
use crate::transport::Transport;

/**
 * Bring the package index and installed packages up to date.
 *
 * There is no cheap way to tell whether this has been done, so it is always
 * applied.
 */
pub struct Update;

impl Task for Update {
    fn name(&self) -> &'static str {
        "update"
    }

    fn is_complete(&self, _config: &HostConfig, _transport: &dyn Transport) -> Result<bool> {
        Ok(false)
    }

    fn commands(&self, _config: &HostConfig, _transport: &dyn Transport) -> Result<Vec<String>> {
        Ok(vec!["apt-get update && apt-get upgrade -y".into()])
    }
}
