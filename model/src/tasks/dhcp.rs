use serde_json::json;

use super::{file_contains, DHCPCD_CONF};
use crate::config::HostConfig;
use crate::error::Result;
use crate::script;
use crate::task::Task;
use crate::transport::Transport;

const STANZA: &str = "interface {{interface}}
static ip_address={{address}}/24
static routers={{router}}
static domain_name_servers={{dns}}";

/**
 * Pin the device to the address it was provisioned at
 */
pub struct Dhcp;

impl Dhcp {
    fn stanza(config: &HostConfig) -> Result<String> {
        script::render(
            STANZA,
            &json!({
                "interface": config.device.interface,
                "address": config.address.to_string(),
                "router": config.router().to_string(),
                "dns": config.device.dns,
            }),
        )
    }
}

impl Task for Dhcp {
    fn name(&self) -> &'static str {
        "dhcp"
    }

    fn is_complete(&self, config: &HostConfig, transport: &dyn Transport) -> Result<bool> {
        file_contains(transport, DHCPCD_CONF, &config.address.to_string())
    }

    fn commands(&self, config: &HostConfig, _transport: &dyn Transport) -> Result<Vec<String>> {
        Ok(vec![script::append(&Self::stanza(config)?, DHCPCD_CONF)])
    }
}
