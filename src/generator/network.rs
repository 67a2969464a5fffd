// =====================================================================================
// File: src/generator/network.rs
// Description: IPv6 sub-generator (§4.C.3)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::geo::ipv6::{random_address, VpnBlacklist};
use rand::Rng;

/// Draw a synthetic source address. With probability 0.05 it is sampled
/// from a random CIDR in the VPN blacklist; otherwise it is 8 uniform
/// 16-bit hex groups.
pub fn generate(rng: &mut impl Rng, vpn: &VpnBlacklist) -> String {
    if rng.gen_bool(0.05) {
        if let Some(addr) = vpn.sample_address(rng) {
            return addr.to_string();
        }
    }
    random_address(rng).to_string()
}
