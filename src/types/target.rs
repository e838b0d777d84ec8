//! Target specification types with CIDR and hostname support.
//!
//! A target is one rsync endpoint: a resolved IP address plus the daemon port.
//! Specifications accept:
//! - Single IP addresses
//! - CIDR notation (192.168.1.0/24)
//! - Hostnames (mirror.example.org)

use super::Port;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A single rsync endpoint that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname, IP or CIDR string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
    /// Daemon port.
    pub port: Port,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr, port: Port) -> Self {
        Self {
            original: original.into(),
            ip,
            port,
        }
    }

    /// Socket address to connect to.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port.as_u16())
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("CIDR range too large: {0} addresses (max: {1})")]
    CidrTooLarge(u128, u128),
}

/// A target specification that may expand to several hosts.
#[derive(Debug, Clone)]
pub enum TargetSpec {
    /// A single IP address.
    Single(IpAddr),
    /// A CIDR network range.
    Cidr(IpNetwork),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Maximum number of hosts allowed in a CIDR range.
    pub const MAX_CIDR_HOSTS: u128 = 65536;

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;

            let host_count = network_size(&network);
            if host_count > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(host_count, Self::MAX_CIDR_HOSTS));
            }

            return Ok(Self::Cidr(network));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve this specification to concrete endpoints on `port`.
    ///
    /// CIDR ranges expand to their host addresses (network and broadcast
    /// addresses excluded for IPv4 prefixes shorter than /31). Hostnames
    /// resolve to their first address.
    pub async fn resolve(&self, port: Port) -> Result<Vec<ScanTarget>, TargetError> {
        match self {
            Self::Single(ip) => Ok(vec![ScanTarget::new(ip.to_string(), *ip, port)]),

            Self::Cidr(network) => {
                let original = network.to_string();
                Ok(network
                    .iter()
                    .filter(|ip| match (network, ip) {
                        (IpNetwork::V4(net), IpAddr::V4(addr)) if net.prefix() < 31 => {
                            *addr != net.network() && *addr != net.broadcast()
                        }
                        _ => true,
                    })
                    .map(|ip| ScanTarget::new(original.clone(), ip, port))
                    .collect())
            }

            Self::Hostname(hostname) => {
                let resolver = TokioAsyncResolver::tokio(
                    ResolverConfig::default(),
                    ResolverOpts::default(),
                );

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                let ip = response
                    .iter()
                    .next()
                    .ok_or_else(|| TargetError::NoAddressesFound(hostname.clone()))?;

                Ok(vec![ScanTarget::new(hostname.clone(), ip, port)])
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

fn network_size(network: &IpNetwork) -> u128 {
    match network {
        IpNetwork::V4(net) => net.size() as u128,
        IpNetwork::V6(net) => {
            let prefix = net.prefix() as u32;
            if prefix == 0 {
                u128::MAX
            } else if prefix >= 128 {
                1
            } else {
                1u128 << (128 - prefix)
            }
        }
    }
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && label.chars().next().map_or(false, |c| c.is_alphanumeric())
            && label.chars().last().map_or(false, |c| c.is_alphanumeric())
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert!(matches!(spec, TargetSpec::Single(IpAddr::V4(_))));
    }

    #[test]
    fn test_parse_hostname() {
        let spec = TargetSpec::parse("mirror.example.org").unwrap();
        assert!(matches!(spec, TargetSpec::Hostname(_)));
    }

    #[test]
    fn test_cidr_too_large() {
        let result = TargetSpec::parse("10.0.0.0/8");
        assert!(matches!(result, Err(TargetError::CidrTooLarge(_, _))));
    }

    #[test]
    fn test_invalid_target() {
        assert!(TargetSpec::parse("-bad-.com").is_err());
        assert!(TargetSpec::parse("10.0.0.0/99").is_err());
    }

    #[tokio::test]
    async fn test_resolve_cidr_skips_network_and_broadcast() {
        let spec = TargetSpec::parse("192.168.10.0/30").unwrap();
        let targets = spec.resolve(Port::RSYNC).await.unwrap();
        let ips: Vec<String> = targets.iter().map(|t| t.ip.to_string()).collect();
        assert_eq!(ips, vec!["192.168.10.1", "192.168.10.2"]);
        assert!(targets.iter().all(|t| t.port == Port::RSYNC));
    }

    #[tokio::test]
    async fn test_resolve_single() {
        let spec = TargetSpec::parse("127.0.0.1").unwrap();
        let targets = spec.resolve(Port::new(8873).unwrap()).await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].addr().to_string(), "127.0.0.1:8873");
        assert_eq!(targets[0].to_string(), "127.0.0.1:8873");
    }
}
