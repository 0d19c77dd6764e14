//! LAN address discovery.
//!
//! The primary IPv4 address is found by "connecting" a UDP socket towards a
//! public address and reading back the local address the OS picked. No
//! packet is sent.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Any routable address works; only the route lookup matters.
const PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 9);

/// The IPv4 address other machines on the LAN most likely reach us at.
pub fn primary_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect(PROBE_ADDR).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Some(ip),
        _ => None,
    }
}

/// URLs a browser can use to reach a server bound to `bound`.
///
/// A wildcard bind is reachable on loopback and on the primary LAN address.
pub fn reachable_urls(bound: SocketAddr) -> Vec<String> {
    let port = bound.port();
    let mut hosts: Vec<IpAddr> = Vec::new();

    if bound.ip().is_unspecified() {
        hosts.push(IpAddr::V4(Ipv4Addr::LOCALHOST));
        if let Some(lan) = primary_ipv4() {
            hosts.push(IpAddr::V4(lan));
        }
    } else {
        hosts.push(bound.ip());
    }

    hosts
        .into_iter()
        .map(|ip| format!("http://{}/", SocketAddr::new(ip, port)))
        .collect()
}
