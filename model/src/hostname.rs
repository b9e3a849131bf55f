use glob::Pattern;
use log::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::HostConfig;
use crate::error::{Error, Result};

/**
 * Every artifact recording a provisioned device is named
 * `cuddleberry.<hostname>`
 */
pub const ARTIFACT_PREFIX: &str = "cuddleberry.";

/**
 * What gets written into an artifact when a run records one
 */
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Artifact {
    pub hostname: String,
    pub address: String,
    pub share_nfs: bool,
}

/**
 * Generate the next unused hostname for `prefix`.
 *
 * The artifacts in `dir` are scanned for `cuddleberry.<prefix><number>`, and
 * the hostname after the highest number is returned, or `<prefix>0` when
 * there is none. Nothing is written, asking twice gives the same answer.
 */
pub fn generate(dir: &Path, prefix: &str) -> Result<String> {
    let pattern = Pattern::new(&format!("{}{}*", ARTIFACT_PREFIX, Pattern::escape(prefix)))
        .map_err(|e| Error::Config(format!("invalid hostname prefix `{}`: {}", prefix, e)))?;

    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::io(format!("failed to read {}", dir.display()), e))?;

    let mut highest: Option<u64> = None;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(format!("failed to read {}", dir.display()), e))?;
        let name = entry.file_name();

        let name = match name.to_str() {
            Some(name) if pattern.matches(name) => name.to_string(),
            _ => continue,
        };

        match number_of(&name, prefix) {
            Some(number) => {
                debug!("{} is taken", name);
                highest = Some(highest.map_or(number, |h| h.max(number)));
            }
            None => warn!("Ignoring {}, it does not carry a number after `{}`", name, prefix),
        }
    }

    Ok(match highest {
        Some(number) => format!("{}{}", prefix, number.saturating_add(1)),
        None => format!("{}0", prefix),
    })
}

/**
 * Fish the number out of an artifact name, e.g. 3 from `cuddleberry.drone3`
 * or `cuddleberry.drone3.yml`
 */
fn number_of(name: &str, prefix: &str) -> Option<u64> {
    let rest = name.strip_prefix(ARTIFACT_PREFIX)?.strip_prefix(prefix)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/**
 * Record a provisioned device so that the next run moves on to the following
 * hostname
 */
pub fn record(dir: &Path, config: &HostConfig) -> Result<PathBuf> {
    let artifact = Artifact {
        hostname: config.hostname.clone(),
        address: config.address.to_string(),
        share_nfs: config.share_nfs,
    };
    let path = dir.join(format!("{}{}", ARTIFACT_PREFIX, config.hostname));
    let buf = serde_yaml::to_string(&artifact)
        .map_err(|e| Error::Config(format!("failed to serialize artifact: {}", e)))?;

    std::fs::write(&path, buf)
        .map_err(|e| Error::io(format!("failed to write {}", path.display()), e))?;
    info!("Recorded {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "").expect("Failed to create artifact");
    }

    #[test]
    fn empty_directory_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(generate(dir.path(), "drone").unwrap(), "drone0");
    }

    #[test]
    fn picks_one_past_the_highest() {
        let dir = tempfile::tempdir().unwrap();
        for n in &["cuddleberry.drone0", "cuddleberry.drone1", "cuddleberry.drone3"] {
            touch(dir.path(), n);
        }
        assert_eq!(generate(dir.path(), "drone").unwrap(), "drone4");
    }

    #[test]
    fn deterministic() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cuddleberry.drone7");
        let first = generate(dir.path(), "drone").unwrap();
        let second = generate(dir.path(), "drone").unwrap();
        assert_eq!(first, "drone8");
        assert_eq!(first, second);
    }

    #[test]
    fn other_prefixes_and_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cuddleberry.rover9");
        touch(dir.path(), "cuddleberry.droneking5");
        touch(dir.path(), "cuddleberry_authorized_keys");
        touch(dir.path(), "drone12");
        touch(dir.path(), "cuddleberry.drone2.yml");
        assert_eq!(generate(dir.path(), "drone").unwrap(), "drone3");
    }

    #[test]
    fn numbers_compare_numerically() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cuddleberry.drone9");
        touch(dir.path(), "cuddleberry.drone10");
        assert_eq!(generate(dir.path(), "drone").unwrap(), "drone11");
    }

    #[test]
    fn glob_characters_in_prefix_are_literal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cuddleberry.drone5");
        touch(dir.path(), "cuddleberry.dr[o]ne1");
        assert_eq!(generate(dir.path(), "dr[o]ne").unwrap(), "dr[o]ne2");
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            generate(&dir.path().join("nope"), "drone"),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn record_advances_the_series() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config("10.0.0.42", true);
        let path = record(dir.path(), &config).unwrap();
        assert_eq!(path.file_name().unwrap(), "cuddleberry.drone0");

        let artifact: Artifact =
            serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(artifact.address, "10.0.0.42");
        assert!(artifact.share_nfs);

        assert_eq!(generate(dir.path(), "drone").unwrap(), "drone1");
    }
}
