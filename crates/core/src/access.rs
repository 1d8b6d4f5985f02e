//! Admin IP allow-list.
//!
//! When restricted access is on, admin requests are only served to clients
//! whose address matches one of the configured rules. Rules are single
//! addresses (`10.0.0.5`) or CIDR networks (`192.168.1.0/24`, `fd00::/8`).
//! Entries that fail to parse are skipped when the list is built.

use std::net::IpAddr;
use std::str::FromStr;

use crate::error::CoreError;

/// One allow-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpRule {
    Single(IpAddr),
    Network { base: IpAddr, prefix: u8 },
}

impl IpRule {
    pub fn matches(&self, ip: IpAddr) -> bool {
        match *self {
            IpRule::Single(allowed) => allowed == ip,
            IpRule::Network { base, prefix } => match (base, ip) {
                (IpAddr::V4(b), IpAddr::V4(c)) => {
                    let mask = mask_u32(prefix);
                    u32::from(b) & mask == u32::from(c) & mask
                }
                (IpAddr::V6(b), IpAddr::V6(c)) => {
                    let mask = mask_u128(prefix);
                    u128::from(b) & mask == u128::from(c) & mask
                }
                _ => false,
            },
        }
    }
}

fn mask_u32(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn mask_u128(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}

impl FromStr for IpRule {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || CoreError::Validation(format!("Invalid admin IP rule '{s}'"));

        match s.split_once('/') {
            None => s.parse::<IpAddr>().map(IpRule::Single).map_err(|_| invalid()),
            Some((addr, prefix)) => {
                let base: IpAddr = addr.parse().map_err(|_| invalid())?;
                let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
                let max = if base.is_ipv4() { 32 } else { 128 };
                if prefix > max {
                    return Err(invalid());
                }
                Ok(IpRule::Network { base, prefix })
            }
        }
    }
}

/// Access settings for the admin surface.
#[derive(Debug, Clone, Default)]
pub struct AdminAccessConfig {
    /// When `false`, every address may reach the admin routes (role checks
    /// still apply).
    pub restricted: bool,
    pub allowed: Vec<IpRule>,
}

impl AdminAccessConfig {
    /// Build from a comma-separated list, skipping unparseable entries.
    pub fn from_list(restricted: bool, list: &str) -> Self {
        let allowed = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<IpRule>().ok())
            .collect();
        Self {
            restricted,
            allowed,
        }
    }

    pub fn is_allowed(&self, ip: Option<IpAddr>) -> bool {
        if !self.restricted {
            return true;
        }
        match ip {
            Some(ip) => self.allowed.iter().any(|rule| rule.matches(ip)),
            None => false,
        }
    }
}

/// Resolve the client address: first `X-Forwarded-For` entry, else the peer.
pub fn client_ip(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Option<IpAddr> {
    forwarded_for
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .or(peer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn single_address_rule() {
        let rule: IpRule = "10.0.0.5".parse().unwrap();
        assert!(rule.matches(ip("10.0.0.5")));
        assert!(!rule.matches(ip("10.0.0.6")));
    }

    #[test]
    fn cidr_v4_rule() {
        let rule: IpRule = "192.168.1.0/24".parse().unwrap();
        assert!(rule.matches(ip("192.168.1.200")));
        assert!(!rule.matches(ip("192.168.2.1")));
        assert!(!rule.matches(ip("::1")));
    }

    #[test]
    fn cidr_v6_and_zero_prefix() {
        let rule: IpRule = "fd00::/8".parse().unwrap();
        assert!(rule.matches(ip("fd12:3456::1")));
        assert!(!rule.matches(ip("fe80::1")));
        let any: IpRule = "0.0.0.0/0".parse().unwrap();
        assert!(any.matches(ip("8.8.8.8")));
    }

    #[test]
    fn bad_rules_rejected_and_skipped() {
        assert!("10.0.0.0/33".parse::<IpRule>().is_err());
        assert!("not-an-ip".parse::<IpRule>().is_err());
        let cfg = AdminAccessConfig::from_list(true, "garbage, 127.0.0.1 ,10.1.0.0/16");
        assert_eq!(cfg.allowed.len(), 2);
        assert!(cfg.is_allowed(Some(ip("10.1.44.3"))));
        assert!(!cfg.is_allowed(Some(ip("10.2.0.1"))));
        assert!(!cfg.is_allowed(None));
    }

    #[test]
    fn unrestricted_allows_everyone() {
        let cfg = AdminAccessConfig::from_list(false, "");
        assert!(cfg.is_allowed(Some(ip("203.0.113.9"))));
        assert!(cfg.is_allowed(None));
    }

    #[test]
    fn forwarded_for_takes_first_entry() {
        let peer = Some(ip("172.16.0.1"));
        assert_eq!(client_ip(Some("203.0.113.7, 10.0.0.1"), peer), Some(ip("203.0.113.7")));
        assert_eq!(client_ip(Some("bogus"), peer), peer);
        assert_eq!(client_ip(None, peer), peer);
    }
}
