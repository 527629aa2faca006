//! BIL16 sample decoding.
//!
//! BIL16 tiles are raw row-major grids of signed 16-bit integers, two bytes
//! per sample, with selectable byte order. Besides the configured no-data
//! sentinel, the reserved short values `32767` and `-32768` are always
//! treated as invalid.

/// Default no-data sentinel for BIL16 elevation tiles.
pub const DEFAULT_NO_DATA: i16 = -9999;

/// Decode one elevation sample from a BIL16 buffer.
///
/// `width` is the number of samples per row; the sample offset is
/// `(y * width + x) * 2`. Out-of-bounds positions, the `no_data` sentinel,
/// and the reserved values `i16::MAX` / `i16::MIN` all decode to `None`.
///
/// This function performs no I/O, never panics, and is deterministic for a
/// given buffer and parameters.
///
/// # Example
///
/// ```
/// use biltile::decode::decode_sample;
///
/// // Two samples in a 2x1 grid, big-endian: 1000 and -9999 (no data).
/// let data = [0x03, 0xE8, 0xD8, 0xF1];
/// assert_eq!(decode_sample(&data, 2, 0, 0, -9999, false), Some(1000));
/// assert_eq!(decode_sample(&data, 2, 1, 0, -9999, false), None);
/// ```
pub fn decode_sample(
    data: &[u8],
    width: usize,
    x: usize,
    y: usize,
    no_data: i16,
    little_endian: bool,
) -> Option<i16> {
    let index = y.checked_mul(width)?.checked_add(x)?;
    let offset = index.checked_mul(2)?;
    let end = offset.checked_add(2)?;
    let raw = data.get(offset..end)?;

    let value = if little_endian {
        i16::from_le_bytes([raw[0], raw[1]])
    } else {
        i16::from_be_bytes([raw[0], raw[1]])
    };

    if value == no_data || value == i16::MAX || value == i16::MIN {
        None
    } else {
        Some(value)
    }
}
