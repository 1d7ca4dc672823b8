//! XOR checksum validation for DCC packets

/// XOR all bytes of a slice together.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, b| acc ^ b)
}

/// Check a packet's trailing checksum byte.
///
/// The last byte must equal the XOR of all preceding bytes. Packets shorter
/// than two bytes cannot carry a checksum and fail the check.
pub fn verify_checksum(packet: &[u8]) -> bool {
    match packet.split_last() {
        Some((last, rest)) if !rest.is_empty() => xor_checksum(rest) == *last,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_checksum() {
        assert_eq!(xor_checksum(&[]), 0);
        assert_eq!(xor_checksum(&[0x55]), 0x55);
        assert_eq!(xor_checksum(&[0x03, 0x60]), 0x63);
        assert_eq!(xor_checksum(&[0xFF, 0x00, 0xFF]), 0x00);
    }

    #[test]
    fn test_verify_checksum() {
        // Speed/direction packet for loco 3
        assert!(verify_checksum(&[0x03, 0x60, 0x63]));
        assert!(!verify_checksum(&[0x03, 0x60, 0x62]));
        // Idle packet
        assert!(verify_checksum(&[0xFF, 0x00, 0xFF]));
    }

    #[test]
    fn test_verify_checksum_too_short() {
        assert!(!verify_checksum(&[]));
        assert!(!verify_checksum(&[0x00]));
    }
}
