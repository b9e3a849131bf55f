use std::path::Path;

use crate::error::Result;
use crate::script::quote;

/**
 * Lines starting with these tokens are complaints from the remote shell or
 * from sudo (e.g. `sudo: unable to resolve host drone0`) rather than output
 * of the command itself.
 */
const NOISE: &[&str] = &["bash:", "sudo:"];

/**
 * The Transport trait is the only way anything reads or changes the state of
 * the device being provisioned.
 */
pub trait Transport {
    /**
     * Run the command on the device with elevated privileges and return its
     * cleaned output.
     *
     * Commands which fail on the device are not errors, their output is
     * returned like any other. Only losing the connection is.
     */
    fn run(&self, command: &str) -> Result<String>;
}

/**
 * A Connector knows how to reach exactly one device with its default
 * credentials
 */
pub trait Connector {
    type Session: Transport;

    /**
     * Copy the local file to `remote` over a dedicated transfer connection
     */
    fn upload(&self, local: &Path, remote: &str) -> Result<()>;

    /**
     * Open the command session used for the rest of the run
     */
    fn open(&self) -> Result<Self::Session>;
}

/**
 * Wrap the command so that the remote shell sees a single privileged
 * invocation
 */
pub fn elevate(command: &str) -> String {
    format!("sudo bash -c {}", quote(command))
}

/**
 * Drop shell and sudo noise from raw command output
 */
pub fn clean_output(raw: &str) -> String {
    raw.lines()
        .filter(|line| match line.split_whitespace().next() {
            Some(first) => !NOISE.contains(&first),
            None => true,
        })
        .collect::<Vec<&str>>()
        .join("\n")
}
