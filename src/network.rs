//! IP and CIDR allowlist entries.

use std::fmt;
use std::net::IpAddr;

use ipnet::IpNet;

/// A single parsed entry of the IP allowlist.
///
/// Entries are parsed leniently: anything that is neither an address nor a
/// network is kept as [`IpRule::Unparsed`] and never matches.
///
/// # Examples
///
/// ```
/// use devgate::IpRule;
///
/// let rule = IpRule::parse("192.168.0.0/16");
/// assert!(rule.matches_str("192.168.45.100"));
/// assert!(!rule.matches_str("10.0.0.1"));
/// assert!(!rule.matches_str("::1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpRule {
    /// A single address, matched by equality
    Address(IpAddr),
    /// A network in `address/prefix` form
    Network(IpNet),
    /// An entry that is neither; kept for diagnostics only
    Unparsed(String),
}

impl IpRule {
    /// Parses one allowlist entry.
    pub fn parse(entry: &str) -> Self {
        let trimmed = entry.trim();

        if trimmed.contains('/') {
            return match trimmed.parse::<IpNet>() {
                Ok(net) => IpRule::Network(net),
                Err(_) => IpRule::Unparsed(entry.to_string()),
            };
        }

        match trimmed.parse::<IpAddr>() {
            Ok(addr) => IpRule::Address(addr),
            Err(_) => IpRule::Unparsed(entry.to_string()),
        }
    }

    /// Returns true if `client` is covered by this entry.
    ///
    /// A family mismatch (IPv4 client, IPv6 entry or the reverse) is a plain
    /// non-match.
    pub fn matches(&self, client: IpAddr) -> bool {
        match self {
            IpRule::Address(addr) => *addr == client,
            IpRule::Network(net) => net.contains(&client),
            IpRule::Unparsed(_) => false,
        }
    }

    /// Same as [`matches`](Self::matches) for a client address in string
    /// form. Unparseable clients match nothing.
    pub fn matches_str(&self, client: &str) -> bool {
        client
            .trim()
            .parse::<IpAddr>()
            .map(|addr| self.matches(addr))
            .unwrap_or(false)
    }

    /// Returns true if the entry could not be parsed.
    pub fn is_unparsed(&self) -> bool {
        matches!(self, IpRule::Unparsed(_))
    }
}

impl fmt::Display for IpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpRule::Address(addr) => write!(f, "{}", addr),
            IpRule::Network(net) => write!(f, "{}", net),
            IpRule::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}
