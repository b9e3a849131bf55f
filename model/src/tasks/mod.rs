//! The individual provisioning tasks, see `crate::task::catalog` for the
//! order in which they are applied.

mod dhcp;
mod nfs;
mod password;
mod rename;
mod ssh;
mod update;

pub use dhcp::Dhcp;
pub use nfs::{NfsExports, NfsFstab};
pub use password::Password;
pub use rename::{Hostname, Hosts};
pub use ssh::Ssh;
pub use update::Update;

use crate::error::Result;
use crate::script;
use crate::transport::Transport;

pub const DHCPCD_CONF: &str = "/etc/dhcpcd.conf";
pub const FSTAB: &str = "/etc/fstab";
pub const EXPORTS: &str = "/etc/exports";
pub const HOSTS: &str = "/etc/hosts";
pub const HOSTNAME: &str = "/etc/hostname";

/**
 * Read a file on the device
 */
fn read(transport: &dyn Transport, path: &str) -> Result<String> {
    transport.run(&script::read(path))
}

/**
 * Literal substring check against a file on the device
 */
fn file_contains(transport: &dyn Transport, path: &str, needle: &str) -> Result<bool> {
    Ok(read(transport, path)?.contains(needle))
}
