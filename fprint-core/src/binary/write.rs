use byteorder::{ByteOrder, LittleEndian};

pub fn write_u16_le(
    buf: &mut Vec<u8>,
    val: u16,
) {
    let mut b = [0u8; 2];
    LittleEndian::write_u16(&mut b, val);
    buf.extend_from_slice(&b);
}

pub fn write_u32_le(
    buf: &mut Vec<u8>,
    val: u32,
) {
    let mut b = [0u8; 4];
    LittleEndian::write_u32(&mut b, val);
    buf.extend_from_slice(&b);
}

pub fn write_u64_le(
    buf: &mut Vec<u8>,
    val: u64,
) {
    let mut b = [0u8; 8];
    LittleEndian::write_u64(&mut b, val);
    buf.extend_from_slice(&b);
}

/// Перезаписывает u32 по фиксированному смещению (поля, известные только
/// после сборки тела).
pub fn patch_u32_le(
    buf: &mut [u8],
    off: usize,
    val: u32,
) {
    LittleEndian::write_u32(&mut buf[off..off + 4], val);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_little_endian() {
        let mut buf = Vec::new();
        write_u16_le(&mut buf, 0x0102);
        write_u32_le(&mut buf, 0x0A0B_0C0D);
        write_u64_le(&mut buf, 1);

        assert_eq!(&buf[0..2], &[0x02, 0x01]);
        assert_eq!(&buf[2..6], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&buf[6..14], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_patch_u32() {
        let mut buf = vec![0u8; 8];
        patch_u32_le(&mut buf, 4, 0xDEAD_BEEF);

        assert_eq!(&buf[4..8], &[0xEF, 0xBE, 0xAD, 0xDE]);
    }
}
