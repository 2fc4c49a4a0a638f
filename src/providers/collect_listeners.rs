use std::net::SocketAddr;

use procfs::net::{TcpState, UdpState};
use tracing::debug;

use crate::cli::Config;
use crate::error::Result;
use crate::facts::Facter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Listener {
    protocol: Protocol,
    local_address: SocketAddr,
}

/// TCP sockets in LISTEN and unconnected UDP sockets, as one `listeners`
/// fact. IPv6 tables are optional since the stack may be disabled.
pub fn collect_listener_facts(facter: &mut Facter, _config: &Config) -> Result<()> {
    let mut listeners = Vec::new();

    let tcp = procfs::net::tcp()?;
    let tcp6 = procfs::net::tcp6().unwrap_or_else(|e| {
        debug!(error = %e, "Skipping IPv6 TCP listeners");
        Vec::new()
    });
    listeners.extend(
        tcp.iter()
            .chain(tcp6.iter())
            .filter(|entry| entry.state == TcpState::Listen)
            .map(|entry| Listener {
                protocol: Protocol::Tcp,
                local_address: entry.local_address,
            }),
    );

    let udp = procfs::net::udp()?;
    let udp6 = procfs::net::udp6().unwrap_or_else(|e| {
        debug!(error = %e, "Skipping IPv6 UDP listeners");
        Vec::new()
    });
    listeners.extend(
        udp.iter()
            .chain(udp6.iter())
            .filter(|entry| entry.state == UdpState::Close)
            .map(|entry| Listener {
                protocol: Protocol::Udp,
                local_address: entry.local_address,
            }),
    );

    facter.add("listeners", format_listeners(&listeners));
    Ok(())
}

/// `tcp:0.0.0.0:22,udp:127.0.0.53:53`
fn format_listeners(listeners: &[Listener]) -> String {
    listeners
        .iter()
        .map(|l| {
            format!(
                "{}:{}:{}",
                l.protocol.as_str(),
                l.local_address.ip(),
                l.local_address.port()
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}
