use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/**
 * The default name of the settings file, looked up in the working directory
 */
pub const SETTINGS_FILE: &str = "cuddleberry.yml";

/**
 * Settings are the on-disk defaults for a provisioning run.
 *
 * Every field is optional in the YAML file, a missing file is equivalent to an
 * empty one.
 */
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub defaults: Defaults,
    pub device: Device,
    pub keys: Keys,
    /// Directory holding the `cuddleberry.<hostname>` artifacts
    pub artifact_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            device: Device::default(),
            keys: Keys::default(),
            artifact_dir: PathBuf::from("."),
        }
    }
}

/**
 * Answers used when the operator just presses enter at a prompt
 */
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    pub hostname_prefix: String,
    pub password_suffix: String,
    pub share_nfs: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            hostname_prefix: "drone".into(),
            password_suffix: "cuddle".into(),
            share_nfs: false,
        }
    }
}

/**
 * What a freshly imaged device looks like before it has been touched
 */
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Device {
    /// Login which is provisioned, and used to connect
    pub user: String,
    /// Factory default password for `user`
    pub password: String,
    /// Hostname the image ships with, replaced in /etc/hosts and /etc/hostname
    pub placeholder: String,
    /// Local network name the device announces itself under
    pub mdns_name: String,
    pub port: u16,
    pub interface: String,
    pub dns: String,
    /// Block device mounted under the NFS data directory
    pub data_device: String,
    /// Where the authorized keys are uploaded before being installed
    pub remote_keys_path: String,
}

impl Default for Device {
    fn default() -> Self {
        Self {
            user: "pi".into(),
            password: "raspberry".into(),
            placeholder: "raspberrypi".into(),
            mdns_name: "raspberrypi.local".into(),
            port: 22,
            interface: "eth0".into(),
            dns: "1.1.1.1".into(),
            data_device: "/dev/sda1".into(),
            remote_keys_path: "/tmp/authorized_keys".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Keys {
    /// Local file holding the public keys to install
    pub file: PathBuf,
    /// Base URL of the key host, `<url><user>.keys` is fetched
    pub url: String,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            file: PathBuf::from("cuddleberry_authorized_keys"),
            url: "https://github.com/".into(),
        }
    }
}

impl Settings {
    /**
     * Load settings from the given path.
     *
     * A missing file yields the default settings, a malformed one is an error
     */
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.artifact_dir.as_os_str().is_empty() {
            self.artifact_dir = PathBuf::from(".");
        }
        self
    }
}

/**
 * A Profile is everything collected from the operator before the device has
 * been looked at.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub address: Ipv4Addr,
    pub hostname_prefix: String,
    pub password_suffix: String,
    pub share_nfs: bool,
}

impl Profile {
    /**
     * Assign the allocated hostname, this is the only point at which a
     * HostConfig comes into existence.
     */
    pub fn with_hostname(self, hostname: String, device: Device) -> HostConfig {
        HostConfig {
            address: self.address,
            hostname_prefix: self.hostname_prefix,
            hostname,
            password_suffix: self.password_suffix,
            share_nfs: self.share_nfs,
            device,
        }
    }
}

/**
 * Parse an operator supplied address
 */
pub fn parse_address(address: &str) -> Result<Ipv4Addr> {
    address
        .trim()
        .parse()
        .map_err(|_| Error::Address(address.to_string()))
}

/**
 * HostConfig is the immutable description of the one device a run targets
 */
#[derive(Clone, Debug, PartialEq)]
pub struct HostConfig {
    pub address: Ipv4Addr,
    pub hostname_prefix: String,
    pub hostname: String,
    pub password_suffix: String,
    pub share_nfs: bool,
    pub device: Device,
}

impl HostConfig {
    /**
     * The gateway is assumed to sit at `.1` of the device's network
     */
    pub fn router(&self) -> Ipv4Addr {
        let [a, b, c, _] = self.address.octets();
        Ipv4Addr::new(a, b, c, 1)
    }

    pub fn password(&self) -> String {
        format!("{}{}", self.hostname, self.password_suffix)
    }

    pub fn data_dir(&self) -> String {
        format!("/var/{}-data", self.hostname)
    }

    pub fn home_dir(&self) -> String {
        format!("/home/{}", self.device.user)
    }
}

#[cfg(test)]
pub(crate) fn test_config(address: &str, share_nfs: bool) -> HostConfig {
    Profile {
        address: parse_address(address).expect("Failed to parse the address"),
        hostname_prefix: "drone".into(),
        password_suffix: "cuddle".into(),
        share_nfs,
    }
    .with_hostname("drone0".into(), Device::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_empty_settings() {
        let s: Settings = serde_yaml::from_str("---\n{}").expect("Failed to deser");
        assert_eq!(s.defaults.hostname_prefix, "drone");
        assert_eq!(s.device.user, "pi");
        assert_eq!(s.keys.url, "https://github.com/");
    }

    #[test]
    fn deserialize_partial_settings() {
        let buf = r#"
---
defaults:
  share_nfs: true
device:
  interface: wlan0
  dns: 9.9.9.9"#;
        let s: Settings = serde_yaml::from_str(&buf).expect("Failed to deser");
        assert!(s.defaults.share_nfs);
        assert_eq!(s.defaults.password_suffix, "cuddle");
        assert_eq!(s.device.interface, "wlan0");
        assert_eq!(s.device.dns, "9.9.9.9");
        assert_eq!(s.device.placeholder, "raspberrypi");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to make a tempdir");
        let s = Settings::load(&dir.path().join(SETTINGS_FILE)).expect("Failed to load");
        assert_eq!(s.artifact_dir, PathBuf::from("."));
    }

    #[test]
    fn load_empty_file() {
        let dir = tempfile::tempdir().expect("Failed to make a tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "\n").expect("Failed to write");
        let s = Settings::load(&path).expect("Failed to load");
        assert_eq!(s.device.mdns_name, "raspberrypi.local");
    }

    #[test]
    fn load_malformed_file() {
        let dir = tempfile::tempdir().expect("Failed to make a tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "defaults: [1, 2").expect("Failed to write");
        assert!(matches!(Settings::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn router_replaces_last_octet() {
        let config = test_config("10.0.0.42", false);
        assert_eq!(config.router().to_string(), "10.0.0.1");
    }

    #[test]
    fn password_is_hostname_and_suffix() {
        let config = test_config("10.0.0.42", false);
        assert_eq!(config.password(), "drone0cuddle");
        assert_eq!(config.data_dir(), "/var/drone0-data");
    }

    #[test]
    fn parse_address_rejects_hostnames() {
        assert!(matches!(
            parse_address("raspberrypi.local"),
            Err(Error::Address(_))
        ));
        assert_eq!(
            parse_address(" 192.168.1.50\n").unwrap(),
            Ipv4Addr::new(192, 168, 1, 50)
        );
    }
}
