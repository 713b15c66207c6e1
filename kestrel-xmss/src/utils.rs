//! Utility functions for XMSS.
//!
//! Integer/byte conversions and the base-w encoding used by WOTS+
//! (RFC 8391, Sections 2.4 and 2.6).

/// Convert a byte array to an integer (big-endian).
#[must_use]
pub fn to_int(x: &[u8]) -> u64 {
    debug_assert!(x.len() <= 8);
    let mut total: u64 = 0;
    for &byte in x {
        total = (total << 8) | u64::from(byte);
    }
    total
}

/// Convert an integer to a byte array of specified length (big-endian).
///
/// RFC 8391, Section 2.4: toByte(x, y)
#[must_use]
pub fn to_byte<const N: usize>(x: u64) -> [u8; N] {
    let mut result = [0u8; N];
    write_int(&mut result, x);
    result
}

/// Write `x` big-endian into `out`, using all of its bytes.
pub fn write_int(out: &mut [u8], x: u64) {
    let mut val = x;
    for byte in out.iter_mut().rev() {
        *byte = (val & 0xFF) as u8;
        val >>= 8;
    }
}

/// Split `x` into base-w digits, most significant bits first.
///
/// RFC 8391, Algorithm 1: base_w(X, w, out_len), where `out.len()` is out_len
/// and `log_w` is log2(w). Only `log_w` dividing 8 is supported.
pub fn base_w(out: &mut [u32], x: &[u8], log_w: u32) {
    debug_assert!(log_w == 2 || log_w == 4);
    debug_assert!(out.len() * log_w as usize <= x.len() * 8);

    let mask = (1u32 << log_w) - 1;
    let mut bits: u32 = 0;
    let mut total: u32 = 0;
    let mut input = 0;

    for digit in out.iter_mut() {
        if bits == 0 {
            total = u32::from(x[input]);
            input += 1;
            bits = 8;
        }
        bits -= log_w;
        *digit = (total >> bits) & mask;
    }
}

/// Compute the WOTS+ checksum over message digits.
///
/// csum = sum(w - 1 - msg[i])
#[must_use]
pub fn wots_checksum(msg: &[u32], w: u32) -> u32 {
    let mut csum: u32 = 0;
    for &m in msg {
        csum += w - 1 - m;
    }
    csum
}

/// Encode a checksum as `out.len()` base-w digits.
///
/// The checksum is shifted so its digits start at the most significant bit of
/// the smallest byte string that holds them.
pub fn encode_checksum(out: &mut [u32], csum: u32, log_w: u32) {
    let len2 = out.len();
    let bits = len2 * log_w as usize;
    let csum_bytes_len = bits.div_ceil(8);
    let shifted = csum << ((8 - bits % 8) % 8);

    let mut buf = [0u8; 4];
    write_int(&mut buf[4 - csum_bytes_len..], u64::from(shifted));
    base_w(out, &buf[4 - csum_bytes_len..], log_w);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int_and_to_byte() {
        assert_eq!(to_int(&[0x01, 0x02, 0x03]), 0x010203);
        assert_eq!(to_byte::<4>(0x01020304), [1, 2, 3, 4]);
        assert_eq!(to_byte::<2>(0x01020304), [3, 4]);

        let wide = to_byte::<32>(512);
        assert_eq!(&wide[..30], &[0u8; 30]);
        assert_eq!(&wide[30..], &[0x02, 0x00]);
    }

    #[test]
    fn test_write_int_width() {
        let mut out = [0xFFu8; 3];
        write_int(&mut out, 0xABCDEF);
        assert_eq!(out, [0xAB, 0xCD, 0xEF]);
        assert_eq!(to_int(&out), 0xABCDEF);
    }

    #[test]
    fn test_base_w_16() {
        let mut out = [0u32; 4];
        base_w(&mut out, &[0x12, 0x34], 4);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn test_base_w_4() {
        let mut out = [0u32; 4];
        base_w(&mut out, &[0b1110_0100], 2);
        assert_eq!(out, [3, 2, 1, 0]);
    }

    #[test]
    fn test_base_w_partial_output() {
        // Only the leading digits are extracted.
        let mut out = [0u32; 3];
        base_w(&mut out, &[0xAB, 0xCD], 4);
        assert_eq!(out, [0xA, 0xB, 0xC]);
    }

    #[test]
    fn test_checksum_bounds() {
        let zeros = [0u32; 64];
        assert_eq!(wots_checksum(&zeros, 16), 64 * 15);
        let max = [15u32; 64];
        assert_eq!(wots_checksum(&max, 16), 0);
    }

    #[test]
    fn test_encode_checksum_w16() {
        // len2 = 3, 12 bits: shifted left by 4 into two bytes.
        let mut out = [0u32; 3];
        encode_checksum(&mut out, 960, 4);
        assert_eq!(out, [0x3, 0xC, 0x0]);
    }

    #[test]
    fn test_encode_checksum_w4() {
        // len2 = 5, 10 bits: shifted left by 6 into two bytes.
        let mut out = [0u32; 5];
        encode_checksum(&mut out, 384, 2);
        assert_eq!(out, [1, 2, 0, 0, 0]);
    }
}
