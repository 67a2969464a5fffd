// =====================================================================================
// File: src/geo/ipv6.rs
// Description: IPv6 CIDR parsing, expansion and membership testing (§4.A)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::error::{FraudGuardError, FraudGuardResult};
use rand::Rng;
use serde::Deserialize;
use std::net::Ipv6Addr;

/// A parsed IPv6 CIDR block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    pub network: Ipv6Addr,
    pub prefix_len: u8,
}

impl Cidr {
    pub fn parse(s: &str) -> FraudGuardResult<Self> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| FraudGuardError::MalformedCoordinate(s.to_string()))?;
        let network: Ipv6Addr = addr
            .parse()
            .map_err(|_| FraudGuardError::MalformedCoordinate(s.to_string()))?;
        let prefix_len: u8 = len
            .parse()
            .map_err(|_| FraudGuardError::MalformedCoordinate(s.to_string()))?;
        if prefix_len > 128 {
            return Err(FraudGuardError::MalformedCoordinate(s.to_string()));
        }
        Ok(Self { network, prefix_len })
    }

    /// Test whether `addr` falls within this block, masking both addresses
    /// to the prefix length.
    pub fn contains(&self, addr: Ipv6Addr) -> bool {
        mask(self.network, self.prefix_len) == mask(addr, self.prefix_len)
    }

    /// Fill the host bits beyond the prefix with uniform random bits,
    /// producing a concrete address drawn from this block (§4.A).
    pub fn sample(&self, rng: &mut impl Rng) -> Ipv6Addr {
        let net = u128::from(self.network);
        let host_bits = 128 - self.prefix_len as u32;
        let host_mask: u128 = if host_bits == 0 {
            0
        } else {
            (1u128 << host_bits) - 1
        };
        let random_host: u128 = rng.gen::<u128>() & host_mask;
        Ipv6Addr::from((net & !host_mask) | random_host)
    }
}

fn mask(addr: Ipv6Addr, prefix_len: u8) -> u128 {
    let bits = u128::from(addr);
    if prefix_len == 0 {
        0
    } else if prefix_len >= 128 {
        bits
    } else {
        bits & (!0u128 << (128 - prefix_len as u32))
    }
}

/// Synthesize a fully random IPv6 address: 8 uniform 16-bit hex groups.
pub fn random_address(rng: &mut impl Rng) -> Ipv6Addr {
    Ipv6Addr::from(rng.gen::<u128>())
}

/// On-disk shape of `data/vpn-ipv6-blacklist.json` (§6).
#[derive(Debug, Deserialize)]
struct BlacklistFile {
    #[allow(dead_code)]
    description: Option<String>,
    list: Vec<String>,
}

/// Process-wide, read-only VPN/Tor CIDR blacklist, loaded once at startup.
#[derive(Debug, Clone)]
pub struct VpnBlacklist {
    ranges: Vec<Cidr>,
}

impl VpnBlacklist {
    /// Parse a blacklist from raw JSON. Startup fails (§9) if the file is
    /// missing or unparsable; that decision belongs to the caller (`load`).
    pub fn from_json(raw: &str) -> FraudGuardResult<Self> {
        let file: BlacklistFile = serde_json::from_str(raw)
            .map_err(|e| FraudGuardError::StartupResource(format!("vpn blacklist: {e}")))?;
        let ranges = file
            .list
            .iter()
            .map(|s| Cidr::parse(s))
            .collect::<FraudGuardResult<Vec<_>>>()
            .map_err(|e| FraudGuardError::StartupResource(format!("vpn blacklist: {e}")))?;
        Ok(Self { ranges })
    }

    /// Load and parse from the filesystem. Fails fast on missing/unparsable
    /// file; the engine cannot start without this table.
    pub fn load(path: &str) -> FraudGuardResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FraudGuardError::StartupResource(format!("{path}: {e}")))?;
        Self::from_json(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn contains(&self, addr: Ipv6Addr) -> bool {
        self.ranges.iter().any(|c| c.contains(addr))
    }

    /// Pick a random CIDR from the table and expand it to a concrete address
    /// (used by the IPv6 generator's 5% VPN-origin branch).
    pub fn sample_address(&self, rng: &mut impl Rng) -> Option<Ipv6Addr> {
        if self.ranges.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.ranges.len());
        Some(self.ranges[idx].sample(rng))
    }
}
