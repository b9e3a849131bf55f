use cuddleberry_model::{Error, Result};
use log::*;
use std::path::Path;
use std::time::Duration;
use url::Url;

/**
 * A KeySource hands out the public keys of a user, newline separated
 */
pub trait KeySource {
    fn fetch(&self, user: &str) -> Result<String>;
}

/**
 * GithubKeys fetches `<base><user>.keys`, which GitHub serves for every
 * account
 */
pub struct GithubKeys {
    base: Url,
    client: reqwest::blocking::Client,
}

impl GithubKeys {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| Error::Config(format!("invalid key url `{}`: {}", base, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Keys(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { base, client })
    }

    pub fn url_for(&self, user: &str) -> Result<Url> {
        let valid = !user.is_empty()
            && user
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Keys(format!("`{}` is not a valid username", user)));
        }

        self.base
            .join(&format!("{}.keys", user))
            .map_err(|e| Error::Keys(format!("failed to build key url: {}", e)))
    }
}

impl KeySource for GithubKeys {
    fn fetch(&self, user: &str) -> Result<String> {
        let url = self.url_for(user)?;
        debug!("Fetching keys from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| Error::Keys(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Keys(format!(
                "unexpected response from {}: {}",
                url,
                response.status()
            )));
        }

        let keys = response
            .text()
            .map_err(|e| Error::Keys(format!("failed to read response from {}: {}", url, e)))?;

        if keys.trim().is_empty() {
            return Err(Error::Keys(format!("no keys found for {}", user)));
        }
        Ok(keys)
    }
}

/**
 * Make sure the authorized keys file exists, fetching the keys of the user
 * named by `user` when it does not.
 *
 * An existing file is always used as is.
 */
pub fn ensure_authorized_keys<U>(path: &Path, source: &dyn KeySource, user: U) -> Result<()>
where
    U: FnOnce() -> Result<String>,
{
    if path.exists() {
        info!("Using keys from existing '{}'", path.display());
        return Ok(());
    }

    info!("Creating '{}'", path.display());
    let user = user()?;
    let keys = source.fetch(&user)?;

    std::fs::write(path, keys)
        .map_err(|e| Error::io(format!("failed to write {}", path.display()), e))
}
