use log::*;

use crate::config::HostConfig;
use crate::error::{Error, Result};
use crate::script::quote;
use crate::task::Task;
use crate::transport::Transport;

/**
 * Replace the factory password with `<hostname><suffix>`.
 *
 * The salted SHA-512 crypt hash is computed on the device itself, so only the
 * hash ever reaches chpasswd. Always applied, there is no way to tell from
 * the outside which password is set.
 */
pub struct Password;

impl Password {
    fn hash_command(config: &HostConfig) -> String {
        format!(
            "printf '%s\\n' {} | openssl passwd -6 -stdin",
            quote(&config.password())
        )
    }
}

impl Task for Password {
    fn name(&self) -> &'static str {
        "password"
    }

    fn is_complete(&self, _config: &HostConfig, _transport: &dyn Transport) -> Result<bool> {
        Ok(false)
    }

    fn commands(&self, config: &HostConfig, transport: &dyn Transport) -> Result<Vec<String>> {
        let output = transport.run(&Self::hash_command(config))?;
        let hash = output.trim();

        if !hash.starts_with('$') || hash.contains(char::is_whitespace) {
            return Err(Error::Remote(format!(
                "could not hash the new password for {}: {}",
                config.device.user, output
            )));
        }
        debug!("computed password hash for {}", config.device.user);

        Ok(vec![format!(
            "printf '%s\\n' {} | chpasswd --encrypted",
            quote(&format!("{}:{}", config.device.user, hash))
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::script::split_words;
    use crate::testing::{FakeHost, FAKE_HASH};

    #[test]
    fn never_complete() {
        let config = test_config("10.0.0.42", false);
        assert!(!Password.is_complete(&config, &FakeHost::fresh()).unwrap());
    }

    #[test]
    fn hashes_on_the_device() {
        let host = FakeHost::fresh();
        let config = test_config("10.0.0.42", false);
        let commands = Password.commands(&config, &host).unwrap();

        assert_eq!(
            host.commands(),
            vec![r"printf '%s\n' 'drone0cuddle' | openssl passwd -6 -stdin"]
        );
        assert_eq!(
            commands,
            vec![format!(
                r"printf '%s\n' 'pi:{}' | chpasswd --encrypted",
                FAKE_HASH
            )]
        );
    }

    #[test]
    fn password_with_quotes_stays_one_word() {
        let mut config = test_config("10.0.0.42", false);
        config.password_suffix = "it's $HOME".into();
        let words = split_words(&Password::hash_command(&config));
        assert_eq!(words[2], "drone0it's $HOME");
    }

    #[test]
    fn garbage_hash_is_an_error() {
        struct Broken;
        impl Transport for Broken {
            fn run(&self, _command: &str) -> Result<String> {
                Ok("openssl: command not found".into())
            }
        }

        let config = test_config("10.0.0.42", false);
        assert!(matches!(
            Password.commands(&config, &Broken),
            Err(Error::Remote(_))
        ));
    }
}
