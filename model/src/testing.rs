use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Result;
use crate::script::split_words;
use crate::transport::{clean_output, Transport};

pub(crate) const FAKE_HASH: &str = "$6$fakesalt$fakehash";

/**
 * FakeHost is a device which only has files.
 *
 * It understands the shapes of command the catalog emits for reading and
 * writing files, answers password hashing with a fixed hash, and records
 * every command it was given.
 */
#[derive(Default)]
pub(crate) struct FakeHost {
    files: RefCell<HashMap<String, String>>,
    log: RefCell<Vec<String>>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /**
     * A host as it comes out of a fresh Raspberry Pi OS image
     */
    pub(crate) fn fresh() -> Self {
        Self::new()
            .with_file("/etc/hostname", "raspberrypi\n")
            .with_file(
                "/etc/hosts",
                "127.0.0.1\tlocalhost\n::1\t\tlocalhost ip6-localhost ip6-loopback\n127.0.1.1\traspberrypi\n",
            )
            .with_file("/etc/dhcpcd.conf", "hostname\nclientid\npersistent\n")
            .with_file("/etc/fstab", "proc /proc proc defaults 0 0\n")
    }

    pub(crate) fn with_file(self, path: &str, contents: &str) -> Self {
        self.files
            .borrow_mut()
            .insert(path.to_string(), contents.to_string());
        self
    }

    pub(crate) fn file(&self, path: &str) -> String {
        self.files.borrow().get(path).cloned().unwrap_or_default()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Transport for FakeHost {
    fn run(&self, command: &str) -> Result<String> {
        self.log.borrow_mut().push(command.to_string());
        let words = split_words(command);
        let words: Vec<&str> = words.iter().map(|w| w.as_str()).collect();

        match words.as_slice() {
            ["cat", path] => match self.files.borrow().get(*path) {
                Some(contents) => Ok(clean_output(contents)),
                None => Ok(format!("cat: {}: No such file or directory", path)),
            },
            ["printf", _, body, ">>", path] => {
                let mut files = self.files.borrow_mut();
                let file = files.entry(path.to_string()).or_default();
                file.push_str(body);
                file.push('\n');
                Ok(String::new())
            }
            ["printf", _, body, ">", path] => {
                self.files
                    .borrow_mut()
                    .insert(path.to_string(), format!("{}\n", body));
                Ok(String::new())
            }
            _ if words.contains(&"openssl") => Ok(clean_output(&format!(
                "bash: warning: setlocale: LC_ALL: cannot change locale\n{}",
                FAKE_HASH
            ))),
            _ => Ok(String::new()),
        }
    }
}
