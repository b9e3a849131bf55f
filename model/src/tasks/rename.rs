use super::{file_contains, read, HOSTNAME, HOSTS};
use crate::config::HostConfig;
use crate::error::Result;
use crate::script;
use crate::task::Task;
use crate::transport::Transport;

/**
 * Task is complete once the image's placeholder hostname is gone from `path`
 */
fn placeholder_gone(config: &HostConfig, transport: &dyn Transport, path: &str) -> Result<bool> {
    Ok(!file_contains(transport, path, &config.device.placeholder)?)
}

/**
 * Rewrite `path` with every occurrence of the placeholder replaced
 */
fn substitute(config: &HostConfig, transport: &dyn Transport, path: &str) -> Result<Vec<String>> {
    let existing = read(transport, path)?;
    let renamed = existing.replace(&config.device.placeholder, &config.hostname);
    Ok(vec![script::overwrite(&renamed, path)])
}

pub struct Hosts;

impl Task for Hosts {
    fn name(&self) -> &'static str {
        "hosts"
    }

    fn is_complete(&self, config: &HostConfig, transport: &dyn Transport) -> Result<bool> {
        placeholder_gone(config, transport, HOSTS)
    }

    fn commands(&self, config: &HostConfig, transport: &dyn Transport) -> Result<Vec<String>> {
        substitute(config, transport, HOSTS)
    }
}

pub struct Hostname;

impl Task for Hostname {
    fn name(&self) -> &'static str {
        "hostname"
    }

    fn is_complete(&self, config: &HostConfig, transport: &dyn Transport) -> Result<bool> {
        placeholder_gone(config, transport, HOSTNAME)
    }

    fn commands(&self, config: &HostConfig, transport: &dyn Transport) -> Result<Vec<String>> {
        substitute(config, transport, HOSTNAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::testing::FakeHost;

    const TWICE: &str = "127.0.0.1\tlocalhost raspberrypi\n127.0.1.1\traspberrypi\n";

    #[test]
    fn replaces_every_occurrence() {
        let host = FakeHost::new().with_file(HOSTS, TWICE);
        let config = test_config("10.0.0.42", false);
        assert!(!Hosts.is_complete(&config, &host).unwrap());

        for command in Hosts.commands(&config, &host).unwrap() {
            host.run(&command).unwrap();
        }

        let hosts = host.file(HOSTS);
        assert_eq!(hosts.matches("raspberrypi").count(), 0);
        assert_eq!(hosts.matches("drone0").count(), 2);
        assert_eq!(hosts, "127.0.0.1\tlocalhost drone0\n127.0.1.1\tdrone0\n");
        assert!(Hosts.is_complete(&config, &host).unwrap());
    }

    #[test]
    fn substitution_is_literal() {
        let host = FakeHost::new().with_file(HOSTNAME, "raspberrypi-2\n");
        let config = test_config("10.0.0.42", false);
        assert_eq!(
            Hostname.commands(&config, &host).unwrap(),
            vec![r"printf '%s\n' 'drone0-2' > '/etc/hostname'"]
        );
    }

    #[test]
    fn hostname_complete_once_renamed() {
        let host = FakeHost::fresh();
        let config = test_config("10.0.0.42", false);
        assert!(!Hostname.is_complete(&config, &host).unwrap());

        for command in Hostname.commands(&config, &host).unwrap() {
            host.run(&command).unwrap();
        }
        assert_eq!(host.file(HOSTNAME), "drone0\n");
        assert!(Hostname.is_complete(&config, &host).unwrap());
    }

    #[test]
    fn hostname_with_a_quote() {
        let host = FakeHost::fresh();
        let mut config = test_config("10.0.0.42", false);
        config.hostname = "o'drone".into();

        for command in Hostname.commands(&config, &host).unwrap() {
            host.run(&command).unwrap();
        }
        assert_eq!(host.file(HOSTNAME), "o'drone\n");
    }
}
