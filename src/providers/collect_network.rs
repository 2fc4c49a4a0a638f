use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;

use serde_json::Value;

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::Facter;
use crate::providers::command::run_command;
use crate::providers::sysfs::{key_suffix, list_dir_names, read_to_string_trim, read_to_u64};

const SYS_CLASS_NET: &str = "/sys/class/net";

#[derive(Debug, Clone, PartialEq)]
struct IpAddress {
    family: String,
    address: String,
    prefix: u8,
    scope: String,
}

#[derive(Debug, Clone, PartialEq)]
struct InterfaceAddrs {
    name: String,
    addresses: Vec<IpAddress>,
}

/// Interface names, MAC/MTU from sysfs and addresses from `ip -j addr`.
pub fn collect_network_facts(facter: &mut Facter, config: &Config) -> Result<()> {
    let sys_class_net = Path::new(SYS_CLASS_NET);
    let names = list_dir_names(sys_class_net).map_err(|e| {
        FacterError::Provider(format!("cannot read {}: {}", SYS_CLASS_NET, e))
    })?;

    facter.add("interfaces", names.join(","));
    for name in &names {
        let iface_path = sys_class_net.join(name);
        let suffix = key_suffix(name);
        if let Some(mac) = read_to_string_trim(iface_path.join("address")) {
            facter.add(format!("macaddress_{}", suffix), mac);
        }
        if let Some(mtu) = read_to_u64(iface_path.join("mtu")) {
            facter.add(format!("mtu_{}", suffix), mtu);
        }
    }

    // Facts above survive even if `ip` is missing
    let output = run_command("ip", &["-j", "addr"], config.command_timeout)?;
    let interfaces = parse_ip_addr_json(output.as_bytes())?;
    add_address_facts(facter, &interfaces);

    if let Some(primary) = primary_interface(&interfaces) {
        if let Some(addr) = first_address(primary, "inet") {
            facter.add("ipaddress", addr.address.as_str());
            facter.add("netmask", ipv4_netmask(addr.prefix).to_string());
        }
        if let Some(addr) = first_address(primary, "inet6") {
            facter.add("ipaddress6", addr.address.as_str());
        }
        if let Some(mac) = read_to_string_trim(sys_class_net.join(&primary.name).join("address")) {
            facter.add("macaddress", mac);
        }
    }

    Ok(())
}

fn parse_ip_addr_json(raw: &[u8]) -> Result<Vec<InterfaceAddrs>> {
    let json: Value = serde_json::from_slice(raw)
        .map_err(|e| FacterError::Provider(format!("unparsable `ip -j addr` output: {}", e)))?;

    let arr = json
        .as_array()
        .ok_or_else(|| FacterError::Provider("`ip -j addr` did not return an array".to_string()))?;

    let mut interfaces = Vec::new();
    for iface in arr {
        let name = match iface.get("ifname").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };

        let mut addresses = Vec::new();
        if let Some(addr_info) = iface.get("addr_info").and_then(|v| v.as_array()) {
            for addr in addr_info {
                let local = addr.get("local").and_then(|v| v.as_str()).unwrap_or("");
                if local.is_empty() {
                    continue;
                }
                addresses.push(IpAddress {
                    family: addr.get("family").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                    address: local.to_string(),
                    prefix: addr.get("prefixlen").and_then(|v| v.as_u64()).unwrap_or(0) as u8,
                    scope: addr.get("scope").and_then(|v| v.as_str()).unwrap_or("").to_string(),
                });
            }
        }

        interfaces.push(InterfaceAddrs { name, addresses });
    }

    Ok(interfaces)
}

fn add_address_facts(facter: &mut Facter, interfaces: &[InterfaceAddrs]) {
    for iface in interfaces {
        let suffix = key_suffix(&iface.name);
        if let Some(addr) = first_address(iface, "inet") {
            facter.add(format!("ipaddress_{}", suffix), addr.address.as_str());
            facter.add(format!("netmask_{}", suffix), ipv4_netmask(addr.prefix).to_string());
        }
        if let Some(addr) = first_address(iface, "inet6") {
            facter.add(format!("ipaddress6_{}", suffix), addr.address.as_str());
            facter.add(format!("netmask6_{}", suffix), ipv6_netmask(addr.prefix).to_string());
        }
    }
}

/// Prefer global addresses; fall back to whatever is configured.
fn first_address<'a>(iface: &'a InterfaceAddrs, family: &str) -> Option<&'a IpAddress> {
    iface
        .addresses
        .iter()
        .find(|a| a.family == family && a.scope == "global")
        .or_else(|| iface.addresses.iter().find(|a| a.family == family))
}

/// First non-loopback interface carrying a global IPv4 address.
fn primary_interface(interfaces: &[InterfaceAddrs]) -> Option<&InterfaceAddrs> {
    interfaces.iter().find(|iface| {
        iface.name != "lo"
            && iface
                .addresses
                .iter()
                .any(|a| a.family == "inet" && a.scope == "global")
    })
}

fn ipv4_netmask(prefix: u8) -> Ipv4Addr {
    let bits = u32::MAX.checked_shl(32 - u32::from(prefix.min(32))).unwrap_or(0);
    Ipv4Addr::from(bits)
}

fn ipv6_netmask(prefix: u8) -> Ipv6Addr {
    let bits = u128::MAX.checked_shl(128 - u32::from(prefix.min(128))).unwrap_or(0);
    Ipv6Addr::from(bits)
}
