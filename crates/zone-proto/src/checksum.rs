// checksum.rs — position/weapon packet checksum.
// Converted from: myq2-common/src/crc.rs's pattern of a tiny, named
// checksum primitive kept separate from the buffer code that uses it.
// spec.md §4.1/§4.3: "Checksum is XOR of the first 22 bytes; must be 0"
// on the way in, and "recompute the 1-byte XOR checksum over the first
// 22 bytes" when building the outbound Weapon shape.

/// XOR-folds `bytes` into a single byte. Used both to validate an
/// incoming Position packet's checksum field and to recompute the
/// checksum of an outbound Weapon packet after the shaper edits fields.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_for_empty() {
        assert_eq!(xor_checksum(&[]), 0);
    }

    #[test]
    fn folds_all_bytes() {
        assert_eq!(xor_checksum(&[0x0f, 0xf0]), 0xff);
        assert_eq!(xor_checksum(&[0x0f, 0xf0, 0xff]), 0x00);
    }
}
