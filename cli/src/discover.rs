use log::*;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::time::Duration;

/**
 * Resolve a local network name to its first IPv4 address
 */
pub fn resolve(name: &str, port: u16) -> Option<Ipv4Addr> {
    match (name, port).to_socket_addrs() {
        Ok(addrs) => addrs
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(*v4.ip()),
                SocketAddr::V6(_) => None,
            })
            .next(),
        Err(err) => {
            debug!("Failed to resolve {}: {}", name, err);
            None
        }
    }
}

/**
 * Keep looking for the device until it shows up on the network
 */
pub fn discover(name: &str, port: u16, interval: Duration) -> Ipv4Addr {
    loop {
        info!("searching for {}...", name);
        if let Some(address) = resolve(name, port) {
            info!("found {} at {}", name, address);
            return address;
        }
        std::thread::sleep(interval);
    }
}
