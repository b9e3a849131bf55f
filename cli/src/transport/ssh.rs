use cuddleberry_model::config::Device;
use cuddleberry_model::transport::{clean_output, elevate};
use cuddleberry_model::{Connector, Error, Result, Transport};

use log::*;
use ssh2::{ExtendedData, Session};
use std::io::prelude::*;
use std::net::{Ipv4Addr, TcpStream};
use std::path::Path;

/**
 * Ssh reaches a device with its factory default password
 */
#[derive(Clone, Debug)]
pub struct Ssh {
    address: Ipv4Addr,
    port: u16,
    user: String,
    password: String,
}

impl Ssh {
    pub fn new(address: Ipv4Addr, device: &Device) -> Self {
        Self {
            address,
            port: device.port,
            user: device.user.clone(),
            password: device.password.clone(),
        }
    }

    fn connection_error(&self, message: impl std::fmt::Display) -> Error {
        Error::Connection {
            address: format!("{}:{}", self.address, self.port),
            message: message.to_string(),
        }
    }

    /**
     * Connect, handshake and authenticate a fresh session
     */
    fn session(&self) -> Result<Session> {
        let tcp = TcpStream::connect((self.address, self.port))
            .map_err(|e| self.connection_error(e))?;
        let mut sess = Session::new().map_err(|e| self.connection_error(e))?;
        sess.set_tcp_stream(tcp);
        sess.handshake().map_err(|e| self.connection_error(e))?;

        sess.userauth_password(&self.user, &self.password)
            .map_err(|e| Error::Authentication {
                user: self.user.clone(),
                message: e.to_string(),
            })?;

        if !sess.authenticated() {
            return Err(Error::Authentication {
                user: self.user.clone(),
                message: "the server did not accept the password".into(),
            });
        }
        debug!("Authenticated to {} as {}", self.address, self.user);
        Ok(sess)
    }
}

impl Connector for Ssh {
    type Session = SshSession;

    fn upload(&self, local: &Path, remote: &str) -> Result<()> {
        let transfer_error = |message: String| Error::Transfer {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            message,
        };

        let contents = std::fs::read(local).map_err(|e| transfer_error(e.to_string()))?;
        let sess = self.session()?;

        let mut channel = sess
            .scp_send(Path::new(remote), 0o644, contents.len() as u64, None)
            .map_err(|e| transfer_error(e.to_string()))?;
        channel
            .write_all(&contents)
            .map_err(|e| transfer_error(e.to_string()))?;
        channel.send_eof().map_err(|e| transfer_error(e.to_string()))?;
        channel.wait_eof().map_err(|e| transfer_error(e.to_string()))?;
        channel.close().map_err(|e| transfer_error(e.to_string()))?;
        channel
            .wait_close()
            .map_err(|e| transfer_error(e.to_string()))?;

        debug!("Uploaded {} bytes to {}", contents.len(), remote);
        Ok(())
    }

    fn open(&self) -> Result<SshSession> {
        Ok(SshSession {
            ssh: self.clone(),
            session: self.session()?,
        })
    }
}

/**
 * The command session for the rest of a provisioning run
 */
pub struct SshSession {
    ssh: Ssh,
    session: Session,
}

impl Transport for SshSession {
    fn run(&self, command: &str) -> Result<String> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| self.ssh.connection_error(e))?;
        // stderr is read along with stdout, sudo and bash noise is dropped below
        channel
            .handle_extended_data(ExtendedData::Merge)
            .map_err(|e| self.ssh.connection_error(e))?;
        channel
            .exec(&elevate(command))
            .map_err(|e| self.ssh.connection_error(e))?;

        let mut s = String::new();
        channel
            .read_to_string(&mut s)
            .map_err(|e| self.ssh.connection_error(e))?;
        channel
            .wait_close()
            .map_err(|e| self.ssh.connection_error(e))?;

        match channel.exit_status() {
            Ok(0) => {}
            Ok(status) => debug!("`{}` exited with {}", command, status),
            Err(e) => return Err(self.ssh.connection_error(e)),
        }

        Ok(clean_output(&s))
    }
}
