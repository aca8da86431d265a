//! Формат таблиц FPT версии 1
//!
//! Колоночное бинарное представление декодированной таблицы. Все числа в
//! little-endian, как и в сырых захватах.
//!
//! ```text
//! [0..4]   MAGIC       b"FPTB"
//! [4]      VERSION     u8
//! [5]      FLAGS       u8   (bit 0: тело сжато LZ4)
//! [6]      KIND        u8   (0 = CE, 1 = AUX, 2 = INFO)
//! [7]      reserved
//! [8..10]  N_COLUMNS   u16
//! [10..18] N_ROWS      u64
//! [18..22] BODY_LEN    u32  (длина тела в файле)
//! [22..26] HEADER_CRC  u32  (CRC32 по [0..22) и каталогу колонок)
//! каталог: на колонку u8 длина имени, имя, u8 dtype
//! тело:    колонки подряд, значения LE (LZ4 size-prepended при FLAG_LZ4)
//! BODY_CRC u32 (CRC32 по телу в файле)
//! ```

use byteorder::{ByteOrder, LittleEndian};
use crc32fast::Hasher;
use fprint_types::{DType, RecordKind};

use crate::{
    binary::{
        patch_u32_le, read_bytes, read_u16_le, read_u32_le, read_u64_le, read_u8_at, write_u16_le,
        write_u32_le, write_u64_le,
    },
    error::{FprintError, FprintResult},
    table::{Column, ColumnData, Table},
};

/// Магическое число FPT файлов: b"FPTB"
pub const FPT_MAGIC: [u8; 4] = [b'F', b'P', b'T', b'B'];

/// Текущая версия формата
pub const FPT_VERSION: u8 = 1;

/// Размер фиксированной части заголовка
pub const FPT_HEADER_SIZE: usize = 26;

/// Флаг: тело сжато LZ4
pub const FLAG_LZ4: u8 = 0x01;

const HEADER_CRC_OFFSET: usize = 22;

/// Сериализует таблицу в байты FPT.
pub fn serialize_table(
    table: &Table,
    compress: bool,
) -> FprintResult<Vec<u8>> {
    let n_columns = u16::try_from(table.n_columns())
        .map_err(|_| FprintError::corrupted(format!("too many columns: {}", table.n_columns())))?;

    let raw_body = encode_body(table);
    let body = if compress {
        lz4_flex::compress_prepend_size(&raw_body)
    } else {
        raw_body
    };

    let body_len = u32::try_from(body.len())
        .map_err(|_| FprintError::corrupted(format!("body too large: {} bytes", body.len())))?;

    let mut buf = Vec::with_capacity(FPT_HEADER_SIZE + 32 * table.n_columns() + body.len() + 4);

    buf.extend_from_slice(&FPT_MAGIC);
    buf.push(FPT_VERSION);
    buf.push(if compress { FLAG_LZ4 } else { 0 });
    buf.push(table.kind().as_u8());
    buf.push(0); // reserved
    write_u16_le(&mut buf, n_columns);
    write_u64_le(&mut buf, table.n_rows() as u64);
    write_u32_le(&mut buf, body_len);
    write_u32_le(&mut buf, 0); // HEADER_CRC, заполняется ниже

    for column in table.columns() {
        let name = column.name.as_bytes();
        let name_len = u8::try_from(name.len()).map_err(|_| {
            FprintError::corrupted(format!("column name too long: '{}'", column.name))
        })?;

        buf.push(name_len);
        buf.extend_from_slice(name);
        buf.push(column.data.dtype().as_u8());
    }

    let header_crc = header_checksum(&buf[..HEADER_CRC_OFFSET], &buf[FPT_HEADER_SIZE..]);
    patch_u32_le(&mut buf, HEADER_CRC_OFFSET, header_crc);

    buf.extend_from_slice(&body);
    write_u32_le(&mut buf, crc32_checksum(&body));

    Ok(buf)
}

/// Десериализует и проверяет таблицу FPT.
pub fn deserialize_table(buf: &[u8]) -> FprintResult<Table> {
    if buf.len() < FPT_HEADER_SIZE {
        return Err(FprintError::corrupted(format!(
            "file too small: {} bytes",
            buf.len()
        )));
    }

    if buf[0..4] != FPT_MAGIC {
        return Err(FprintError::invalid_magic("Invalid FPT magic number"));
    }

    let version = buf[4];
    if version != FPT_VERSION {
        return Err(FprintError::UnsupportedVersion {
            found: version,
            expected: FPT_VERSION,
        });
    }

    let flags = buf[5];
    if flags & !FLAG_LZ4 != 0 {
        return Err(FprintError::corrupted(format!("unknown flags: {flags:#04x}")));
    }

    let kind = RecordKind::from_u8(buf[6])?;

    let mut off = 8;
    let n_columns = read_u16_le(buf, &mut off)? as usize;
    let n_rows = read_u64_le(buf, &mut off)?;
    let body_len = read_u32_le(buf, &mut off)? as usize;
    let stored_header_crc = read_u32_le(buf, &mut off)?;

    let mut directory = Vec::with_capacity(n_columns);
    for _ in 0..n_columns {
        let name_len = read_u8_at(buf, &mut off)? as usize;
        let name = std::str::from_utf8(read_bytes(buf, &mut off, name_len)?)
            .map_err(|e| FprintError::corrupted(format!("column name is not UTF-8: {e}")))?
            .to_string();
        let dtype_byte = read_u8_at(buf, &mut off)?;
        let dtype = DType::from_u8(dtype_byte)
            .ok_or_else(|| FprintError::corrupted(format!("unknown dtype {dtype_byte}")))?;
        directory.push((name, dtype));
    }

    let calculated_header_crc =
        header_checksum(&buf[..HEADER_CRC_OFFSET], &buf[FPT_HEADER_SIZE..off]);
    if stored_header_crc != calculated_header_crc {
        return Err(FprintError::CrcMismatch {
            expected: calculated_header_crc,
            found: stored_header_crc,
        });
    }

    let body = read_bytes(buf, &mut off, body_len)?;
    let stored_body_crc = read_u32_le(buf, &mut off)?;
    let calculated_body_crc = crc32_checksum(body);
    if stored_body_crc != calculated_body_crc {
        return Err(FprintError::CrcMismatch {
            expected: calculated_body_crc,
            found: stored_body_crc,
        });
    }

    if off != buf.len() {
        return Err(FprintError::corrupted(format!(
            "{} unexpected bytes after body",
            buf.len() - off
        )));
    }

    let decompressed;
    let body = if flags & FLAG_LZ4 != 0 {
        decompressed = lz4_flex::decompress_size_prepended(body)
            .map_err(|e| FprintError::corrupted(format!("LZ4 decompression failed: {e}")))?;
        decompressed.as_slice()
    } else {
        body
    };

    let n_rows = usize::try_from(n_rows)
        .map_err(|_| FprintError::corrupted(format!("row count {n_rows} out of range")))?;
    let row_size: usize = directory.iter().map(|(_, d)| d.size()).sum();
    let expected = n_rows
        .checked_mul(row_size)
        .ok_or_else(|| FprintError::corrupted("row count overflows body size"))?;

    if body.len() != expected {
        return Err(FprintError::corrupted(format!(
            "body is {} bytes, {n_rows} rows × {row_size} B = {expected}",
            body.len()
        )));
    }

    let mut columns = Vec::with_capacity(directory.len());
    let mut body_off = 0;

    for (name, dtype) in directory {
        let bytes = &body[body_off..body_off + n_rows * dtype.size()];
        body_off += bytes.len();
        columns.push(Column {
            name,
            data: decode_column(dtype, bytes, n_rows),
        });
    }

    if columns.is_empty() && n_rows != 0 {
        return Err(FprintError::corrupted("rows declared without columns"));
    }

    Table::from_columns(kind, columns)
}

/// CRC32 (IEEE 802.3 / crc32fast)
pub fn crc32_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn header_checksum(
    fixed: &[u8],
    directory: &[u8],
) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(fixed);
    hasher.update(directory);
    hasher.finalize()
}

fn encode_body(table: &Table) -> Vec<u8> {
    let row_size: usize = table.columns().iter().map(|c| c.data.dtype().size()).sum();
    let mut body = vec![0u8; row_size * table.n_rows()];
    let mut off = 0;

    for column in table.columns() {
        let len = column.data.len() * column.data.dtype().size();
        let dst = &mut body[off..off + len];
        match &column.data {
            ColumnData::Int64(v) => LittleEndian::write_i64_into(v, dst),
            ColumnData::Float32(v) => LittleEndian::write_f32_into(v, dst),
            ColumnData::Float64(v) => LittleEndian::write_f64_into(v, dst),
        }
        off += len;
    }

    body
}

fn decode_column(
    dtype: DType,
    bytes: &[u8],
    n_rows: usize,
) -> ColumnData {
    match dtype {
        DType::Int64 => {
            let mut v = vec![0i64; n_rows];
            LittleEndian::read_i64_into(bytes, &mut v);
            ColumnData::Int64(v)
        }
        DType::Float32 => {
            let mut v = vec![0f32; n_rows];
            LittleEndian::read_f32_into(bytes, &mut v);
            ColumnData::Float32(v)
        }
        DType::Float64 => {
            let mut v = vec![0f64; n_rows];
            LittleEndian::read_f64_into(bytes, &mut v);
            ColumnData::Float64(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use fprint_types::Schema;

    use super::*;
    use crate::{decoder::Decoder, stream::RawStream, table::Value};

    fn ce_table(records: usize) -> Table {
        let mut values = Vec::new();
        for r in 0..records {
            values.push((1_000 + r) as f32); // TTI
            values.push((r % 100) as f32); // SC_ID
            values.extend((0..8).map(|i| i as f32 * 0.25));
            values.push(123.0);
        }
        Decoder::new(&Schema::channel_estimate())
            .decode(&RawStream::from_values(&values))
            .table
    }

    #[test]
    fn test_header_byte_layout() {
        let table = ce_table(3);
        let bytes = serialize_table(&table, false).unwrap();

        assert_eq!(&bytes[0..4], b"FPTB", "magic");
        assert_eq!(bytes[4], 1, "version");
        assert_eq!(bytes[5], 0, "flags = uncompressed");
        assert_eq!(bytes[6], 0, "kind = CE");
        assert_eq!(&bytes[8..10], &[10, 0], "n_columns LE");
        assert_eq!(&bytes[10..18], &[3, 0, 0, 0, 0, 0, 0, 0], "n_rows LE");
        // 2 × i64 + 8 × f32 = 48 байт на строку
        assert_eq!(&bytes[18..22], &(48u32 * 3).to_le_bytes(), "body_len");
        // Первая колонка в каталоге: "TTI", dtype Int64
        assert_eq!(bytes[26], 3);
        assert_eq!(&bytes[27..30], b"TTI");
        assert_eq!(bytes[30], DType::Int64.as_u8());
    }

    #[test]
    fn test_table_round_trip() {
        let table = ce_table(25);

        for compress in [false, true] {
            let bytes = serialize_table(&table, compress).unwrap();
            let parsed = deserialize_table(&bytes).unwrap();

            assert_eq!(parsed, table);
            assert_eq!(parsed.value(24, 0), Some(Value::Int(1_024)));
        }
    }

    #[test]
    fn test_lz4_smaller_for_repetitive_data() {
        let table = ce_table(2_000);

        let plain = serialize_table(&table, false).unwrap();
        let packed = serialize_table(&table, true).unwrap();

        assert!(packed.len() < plain.len(), "{} < {}", packed.len(), plain.len());
        assert_eq!(packed[5], FLAG_LZ4);
    }

    #[test]
    fn test_empty_table_round_trip() {
        let table = Table::empty(&Schema::auxiliary());
        let parsed = deserialize_table(&serialize_table(&table, true).unwrap()).unwrap();

        assert_eq!(parsed.kind(), fprint_types::RecordKind::Auxiliary);
        assert_eq!(parsed.n_columns(), 21);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let a = serialize_table(&ce_table(10), true).unwrap();
        let b = serialize_table(&ce_table(10), true).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_corrupted_header_crc() {
        let mut bytes = serialize_table(&ce_table(2), false).unwrap();
        bytes[HEADER_CRC_OFFSET] ^= 0xFF;

        let err = deserialize_table(&bytes).unwrap_err();

        assert!(err.to_string().contains("CRC"));
    }

    #[test]
    fn test_corrupted_column_name_detected() {
        let mut bytes = serialize_table(&ce_table(2), false).unwrap();
        bytes[27] = b'X'; // "TTI" -> "XTI"

        assert!(matches!(
            deserialize_table(&bytes),
            Err(FprintError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_corrupted_body_crc() {
        let mut bytes = serialize_table(&ce_table(2), false).unwrap();
        let mid = bytes.len() - 10;
        bytes[mid] ^= 0x55;

        assert!(matches!(
            deserialize_table(&bytes),
            Err(FprintError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_magic_and_version() {
        let bytes = serialize_table(&ce_table(1), false).unwrap();

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'G';
        assert!(matches!(
            deserialize_table(&bad_magic),
            Err(FprintError::InvalidMagic(_))
        ));

        let mut bad_version = bytes;
        bad_version[4] = 9;
        assert!(matches!(
            deserialize_table(&bad_version),
            Err(FprintError::UnsupportedVersion { found: 9, .. })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let bytes = serialize_table(&ce_table(4), false).unwrap();

        for cut in [0, 10, FPT_HEADER_SIZE + 5, bytes.len() - 1] {
            assert!(deserialize_table(&bytes[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let mut bytes = serialize_table(&ce_table(1), false).unwrap();
        bytes.push(0);

        assert!(deserialize_table(&bytes).is_err());
    }
}
