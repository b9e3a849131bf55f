use crate::config::HostConfig;
use crate::error::Result;
use crate::script::quote;
use crate::task::Task;
use crate::transport::Transport;

/**
 * Install the uploaded public keys for the provisioning user
 */
pub struct Ssh;

impl Task for Ssh {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn is_complete(&self, _config: &HostConfig, _transport: &dyn Transport) -> Result<bool> {
        Ok(false)
    }

    fn commands(&self, config: &HostConfig, _transport: &dyn Transport) -> Result<Vec<String>> {
        let user = &config.device.user;
        let dir = format!("{}/.ssh", config.home_dir());
        let keys = format!("{}/authorized_keys", dir);

        Ok(vec![
            format!("mkdir -p {}", quote(&dir)),
            format!(
                "cp {} {}",
                quote(&config.device.remote_keys_path),
                quote(&keys)
            ),
            format!("chown -R {} {}", quote(&format!("{}:{}", user, user)), quote(&dir)),
            format!("chmod 700 {}", quote(&dir)),
            format!("chmod 600 {}", quote(&keys)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::testing::FakeHost;

    #[test]
    fn installs_keys_for_pi() {
        let config = test_config("10.0.0.42", false);
        assert_eq!(
            Ssh.commands(&config, &FakeHost::fresh()).unwrap(),
            vec![
                "mkdir -p '/home/pi/.ssh'",
                "cp '/tmp/authorized_keys' '/home/pi/.ssh/authorized_keys'",
                "chown -R 'pi:pi' '/home/pi/.ssh'",
                "chmod 700 '/home/pi/.ssh'",
                "chmod 600 '/home/pi/.ssh/authorized_keys'",
            ]
        );
    }

    #[test]
    fn never_complete() {
        let config = test_config("10.0.0.42", false);
        assert!(!Ssh.is_complete(&config, &FakeHost::fresh()).unwrap());
    }
}
