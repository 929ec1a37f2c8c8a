const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// `0x` followed by exactly 40 hex digits. Checksum casing is not verified.
pub fn is_wallet_address(address: &str) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Parses a JSON-RPC quantity such as `0x1bc16d674ec80000`.
pub fn parse_quantity(quantity: &str) -> Option<u128> {
    let hex = quantity.strip_prefix("0x")?;
    if hex.is_empty() {
        return Some(0);
    }
    u128::from_str_radix(hex, 16).ok()
}

/// Formats a wei amount as an ether decimal string, e.g. `1.5` or `0.0`.
pub fn format_ether(wei: u128) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fraction = wei % WEI_PER_ETHER;
    if fraction == 0 {
        return format!("{}.0", whole);
    }
    let digits = format!("{:018}", fraction);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_hex_addresses_of_the_right_length() {
        assert!(is_wallet_address("0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(is_wallet_address("0xde709f2102306220921060314715629080e2fb77"));
        assert!(!is_wallet_address("0xabc"));
        assert!(!is_wallet_address("52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_wallet_address("0xZZ908400098527886E0F7030069857D2E4169EE7"));
    }

    #[test]
    fn formats_wei_as_ether() {
        assert_eq!(format_ether(0), "0.0");
        assert_eq!(format_ether(WEI_PER_ETHER), "1.0");
        assert_eq!(format_ether(1_500_000_000_000_000_000), "1.5");
        assert_eq!(format_ether(1), "0.000000000000000001");
    }

    #[test]
    fn parses_rpc_quantities() {
        assert_eq!(parse_quantity("0x0"), Some(0));
        assert_eq!(parse_quantity("0x1bc16d674ec80000"), Some(2_000_000_000_000_000_000));
        assert_eq!(parse_quantity("12"), None);
    }
}
