use log::*;
use serde_json::json;

use super::{file_contains, read, EXPORTS, FSTAB, HOSTNAME};
use crate::config::HostConfig;
use crate::error::Result;
use crate::script::{self, quote};
use crate::task::Task;
use crate::transport::Transport;

const FSTAB_LINE: &str = "{{device}} {{path}} ext4 defaults,noatime 0 2";
const EXPORTS_LINE: &str = "{{path}} {{network}}/24(rw,sync,no_root_squash,no_subtree_check)";

/**
 * Install the NFS server and create the data directory, both NFS tasks start
 * with this
 */
fn prepare(config: &HostConfig) -> Vec<String> {
    vec![
        "apt-get install -y nfs-kernel-server".into(),
        format!("mkdir -p {}", quote(&config.data_dir())),
    ]
}

/**
 * Whether `path` mentions the hostname the device currently has.
 *
 * This is the hostname on the device, not the one being assigned, since the
 * hostname task only runs after the NFS tasks.
 */
fn mentions_current_hostname(transport: &dyn Transport, path: &str) -> Result<bool> {
    let current = read(transport, HOSTNAME)?;
    let current = current.trim();

    if current.is_empty() {
        warn!("{} is empty on the device, treating {} as unconfigured", HOSTNAME, path);
        return Ok(false);
    }
    file_contains(transport, path, current)
}

/**
 * Mount the data device under /var/<hostname>-data
 */
pub struct NfsFstab;

impl Task for NfsFstab {
    fn name(&self) -> &'static str {
        "nfs_fstab"
    }

    fn is_complete(&self, config: &HostConfig, transport: &dyn Transport) -> Result<bool> {
        if !config.share_nfs {
            return Ok(true);
        }
        mentions_current_hostname(transport, FSTAB)
    }

    fn commands(&self, config: &HostConfig, _transport: &dyn Transport) -> Result<Vec<String>> {
        let line = script::render(
            FSTAB_LINE,
            &json!({"device": config.device.data_device, "path": config.data_dir()}),
        )?;

        let mut commands = prepare(config);
        commands.push(script::append(&line, FSTAB));
        Ok(commands)
    }
}

/**
 * Export the data directory to the device's /24
 */
pub struct NfsExports;

impl Task for NfsExports {
    fn name(&self) -> &'static str {
        "nfs_exports"
    }

    fn is_complete(&self, config: &HostConfig, transport: &dyn Transport) -> Result<bool> {
        if !config.share_nfs {
            return Ok(true);
        }
        mentions_current_hostname(transport, EXPORTS)
    }

    fn commands(&self, config: &HostConfig, _transport: &dyn Transport) -> Result<Vec<String>> {
        let line = script::render(
            EXPORTS_LINE,
            &json!({"path": config.data_dir(), "network": config.router().to_string()}),
        )?;

        let mut commands = prepare(config);
        commands.push(script::append(&line, EXPORTS));
        Ok(commands)
    }
}
