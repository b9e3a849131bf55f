use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/**
 * Everything that can abort a provisioning run.
 *
 * Remote commands which fail on the device are *not* represented here, their
 * complaints come back as text in the command output. Only failures to reach
 * or talk to the device are errors.
 */
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to {address}: {message}")]
    Connection { address: String, message: String },

    #[error("authentication as `{user}` was rejected: {message}")]
    Authentication { user: String, message: String },

    #[error("failed to transfer {} to {remote}: {message}", .local.display())]
    Transfer {
        local: PathBuf,
        remote: String,
        message: String,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected output from the device: {0}")]
    Remote(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("failed to render command template: {0}")]
    Template(String),

    #[error("failed to fetch public keys: {0}")]
    Keys(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("`{0}` is not an IPv4 address")]
    Address(String),
}

impl Error {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_display() {
        let err = Error::Transfer {
            local: PathBuf::from("cuddleberry_authorized_keys"),
            remote: "/tmp/authorized_keys".into(),
            message: "channel closed".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to transfer cuddleberry_authorized_keys to /tmp/authorized_keys: channel closed"
        );
    }

    #[test]
    fn io_keeps_source() {
        let err = Error::io(
            "failed to read .",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "failed to read .: gone");
        assert!(std::error::Error::source(&err).is_some());
    }
}
