use byteorder::{ByteOrder, LittleEndian};

use crate::error::{FprintError, FprintResult};

/// Возвращает `n` байт начиная с `*off` и сдвигает смещение.
pub fn read_bytes<'a>(
    buf: &'a [u8],
    off: &mut usize,
    n: usize,
) -> FprintResult<&'a [u8]> {
    let end = off
        .checked_add(n)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| {
            FprintError::corrupted(format!(
                "unexpected end of data: need {n} bytes at offset {}, have {}",
                *off,
                buf.len()
            ))
        })?;

    let bytes = &buf[*off..end];
    *off = end;

    Ok(bytes)
}

pub fn read_u8_at(
    buf: &[u8],
    off: &mut usize,
) -> FprintResult<u8> {
    Ok(read_bytes(buf, off, 1)?[0])
}

pub fn read_u16_le(
    buf: &[u8],
    off: &mut usize,
) -> FprintResult<u16> {
    Ok(LittleEndian::read_u16(read_bytes(buf, off, 2)?))
}

pub fn read_u32_le(
    buf: &[u8],
    off: &mut usize,
) -> FprintResult<u32> {
    Ok(LittleEndian::read_u32(read_bytes(buf, off, 4)?))
}

pub fn read_u64_le(
    buf: &[u8],
    off: &mut usize,
) -> FprintResult<u64> {
    Ok(LittleEndian::read_u64(read_bytes(buf, off, 8)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_advances_offset() {
        let buf = [0x01, 0x02, 0x00, 0x78, 0x56, 0x34, 0x12];
        let mut off = 0;

        assert_eq!(read_u8_at(&buf, &mut off).unwrap(), 1);
        assert_eq!(read_u16_le(&buf, &mut off).unwrap(), 2);
        assert_eq!(read_u32_le(&buf, &mut off).unwrap(), 0x1234_5678);
        assert_eq!(off, 7);
    }

    #[test]
    fn test_read_past_end_is_corrupted() {
        let buf = [0u8; 3];
        let mut off = 0;

        let err = read_u32_le(&buf, &mut off).unwrap_err();

        assert!(matches!(err, FprintError::Corrupted(_)));
        assert_eq!(off, 0, "offset must not move on failure");
    }
}
