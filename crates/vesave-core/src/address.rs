//! Address helpers shared by clients, server and CLI.

use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("static address pattern"));

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_PATTERN.is_match(address)
}

pub fn is_zero_address(address: &str) -> bool {
    addresses_match(address, ZERO_ADDRESS)
}

/// Addresses compare case-insensitively; checksum casing is presentation only.
pub fn addresses_match(left: &str, right: &str) -> bool {
    left.eq_ignore_ascii_case(right)
}

/// `0x1234…abcd` style abbreviation for display.
pub fn shorten_address(address: Option<&str>, chars: usize) -> String {
    let Some(address) = address.filter(|a| !a.is_empty()) else {
        return "—".to_string();
    };
    if address.len() <= chars * 2 + 2 || !address.is_ascii() {
        return address.to_string();
    }
    format!(
        "{}…{}",
        &address[..chars + 2],
        &address[address.len() - chars..]
    )
}
