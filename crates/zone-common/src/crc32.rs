// crc32.rs — content-hash helper for hot-reloadable resource files.
// Converted from: myq2-common/src/crc.rs, which delegates to the `crc`
// crate for a 16-bit CCITT checksum; here the obscene word-list reload
// check (spec.md §4.6) wants a 32-bit hash, so this uses the same crate's
// CRC-32/ISO-HDLC table instead of hand-rolling one.

use crc::{Crc, CRC_32_ISO_HDLC};

const CRC32_CALC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub fn crc32_block(data: &[u8]) -> u32 {
    CRC32_CALC.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_across_calls() {
        let data = b"idiot\nlamer\n";
        assert_eq!(crc32_block(data), crc32_block(data));
    }

    #[test]
    fn differs_on_change() {
        assert_ne!(crc32_block(b"idiot\n"), crc32_block(b"idiot\nlamer\n"));
    }
}
