use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::tasks::*;
use crate::transport::Transport;

/**
 * A Task is one named step in setting up a device.
 *
 * Tasks hold no state of their own, everything they know about the device is
 * read through the transport each time they are asked. That is what lets an
 * interrupted run be resumed: the next run simply asks again.
 */
pub trait Task {
    fn name(&self) -> &'static str;

    /**
     * Whether the effect of this task is already present on the device
     */
    fn is_complete(&self, config: &HostConfig, transport: &dyn Transport) -> Result<bool>;

    /**
     * The commands which apply this task, in the order they must run.
     *
     * Building them may itself require reading from the device.
     */
    fn commands(&self, config: &HostConfig, transport: &dyn Transport) -> Result<Vec<String>>;
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({})", self.name())
    }
}

/**
 * Every task, in the order they must be applied.
 *
 * Later tasks depend on the effects of earlier ones, e.g. the NFS tasks look
 * for the hostname which only the last task rewrites.
 */
pub fn catalog() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(Update),
        Box::new(Dhcp),
        Box::new(NfsFstab),
        Box::new(NfsExports),
        Box::new(Ssh),
        Box::new(Password),
        Box::new(Hosts),
        Box::new(Hostname),
    ]
}

/**
 * Look a task up by name
 */
pub fn find(name: &str) -> Result<Box<dyn Task>> {
    catalog()
        .into_iter()
        .find(|task| task.name() == name)
        .ok_or_else(|| Error::UnknownTask(name.to_string()))
}

/**
 * The catalog restricted to the named tasks, still in catalog order.
 *
 * No names at all means the whole catalog.
 */
pub fn select(names: &[String]) -> Result<Vec<Box<dyn Task>>> {
    if names.is_empty() {
        return Ok(catalog());
    }

    for name in names {
        find(name)?;
    }

    Ok(catalog()
        .into_iter()
        .filter(|task| names.iter().any(|n| n == task.name()))
        .collect())
}
