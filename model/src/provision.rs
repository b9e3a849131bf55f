use log::*;
use std::path::PathBuf;

use crate::config::{Device, HostConfig, Profile};
use crate::error::Result;
use crate::hostname;
use crate::task::Task;
use crate::transport::{Connector, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Already present on the device, nothing was run
    Skipped,
    Applied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Complete,
    Pending,
}

/**
 * A Report is what a provisioning run did to the device
 */
#[derive(Clone, Debug)]
pub struct Report {
    pub config: HostConfig,
    pub outcomes: Vec<(&'static str, Outcome)>,
}

impl Report {
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == Outcome::Applied)
            .count()
    }
}

/**
 * Apply the tasks in order, skipping those which are already complete.
 *
 * The first error stops the run, whatever has been applied until then stays
 * applied.
 */
pub fn apply(
    config: &HostConfig,
    transport: &dyn Transport,
    tasks: &[Box<dyn Task>],
) -> Result<Vec<(&'static str, Outcome)>> {
    let mut outcomes = vec![];

    for task in tasks.iter() {
        if task.is_complete(config, transport)? {
            info!("Skipping {}.", task.name());
            outcomes.push((task.name(), Outcome::Skipped));
            continue;
        }

        info!("Running {}.", task.name());
        for command in task.commands(config, transport)? {
            debug!("{}: {}", task.name(), command);
            let output = transport.run(&command)?;
            if !output.is_empty() {
                debug!("{}", output);
            }
        }
        outcomes.push((task.name(), Outcome::Applied));
    }

    Ok(outcomes)
}

/**
 * Ask every task whether it is complete without applying anything
 */
pub fn check(
    config: &HostConfig,
    transport: &dyn Transport,
    tasks: &[Box<dyn Task>],
) -> Result<Vec<(&'static str, Status)>> {
    tasks
        .iter()
        .map(|task| {
            let status = if task.is_complete(config, transport)? {
                Status::Complete
            } else {
                Status::Pending
            };
            Ok((task.name(), status))
        })
        .collect()
}

/**
 * The Driver walks one device from factory state to provisioned
 */
pub struct Driver<'a, C: Connector> {
    connector: &'a C,
    device: Device,
    artifact_dir: PathBuf,
    keys: PathBuf,
    tasks: Vec<Box<dyn Task>>,
}

impl<'a, C: Connector> Driver<'a, C> {
    pub fn new(
        connector: &'a C,
        device: Device,
        artifact_dir: PathBuf,
        keys: PathBuf,
        tasks: Vec<Box<dyn Task>>,
    ) -> Self {
        Self {
            connector,
            device,
            artifact_dir,
            keys,
            tasks,
        }
    }

    /**
     * Upload the keys, open the session, pick the hostname and apply every
     * task which is not already complete.
     */
    pub fn provision(&self, profile: Profile) -> Result<Report> {
        info!(
            "Uploading {} to {}",
            self.keys.display(),
            self.device.remote_keys_path
        );
        self.connector
            .upload(&self.keys, &self.device.remote_keys_path)?;

        let session = self.connector.open()?;
        let config = self.host_config(profile)?;
        info!("Provisioning {} as {}", config.address, config.hostname);

        let outcomes = apply(&config, &session, &self.tasks)?;
        Ok(Report { config, outcomes })
    }

    /**
     * Open the session and report which tasks are still pending
     */
    pub fn inspect(&self, profile: Profile) -> Result<(HostConfig, Vec<(&'static str, Status)>)> {
        let session = self.connector.open()?;
        let config = self.host_config(profile)?;
        let statuses = check(&config, &session, &self.tasks)?;
        Ok((config, statuses))
    }

    fn host_config(&self, profile: Profile) -> Result<HostConfig> {
        let hostname = hostname::generate(&self.artifact_dir, &profile.hostname_prefix)?;
        Ok(profile.with_hostname(hostname, self.device.clone()))
    }
}
