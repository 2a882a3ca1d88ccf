//! Unpacking of interleaved sample bytes for the supported storage formats.

use super::DecodeError;

/// Sample value WFDB uses to mark an invalid reading, per format.
fn invalid_marker(format: u16) -> i32 {
    match format {
        16 => i16::MIN as i32,
        212 => -2048,
        80 => -128,
        _ => i32::MIN,
    }
}

/// Whether `format` can be decoded.
pub fn is_supported(format: u16) -> bool {
    matches!(format, 16 | 212 | 80)
}

/// Number of bytes needed to store `count` samples, `None` on overflow.
pub fn bytes_for(format: u16, count: usize) -> Option<usize> {
    match format {
        16 => count.checked_mul(2),
        212 => count.checked_mul(3).map(|n| n.div_ceil(2)),
        _ => Some(count),
    }
}

/// Number of whole samples stored in `len` bytes.
pub fn samples_in(format: u16, len: usize) -> usize {
    match format {
        16 => len / 2,
        212 => len / 3 * 2 + (len % 3) * 2 / 3,
        _ => len,
    }
}

/// Unpack `count` samples from `bytes`. Invalid-sample markers become `None`.
pub fn unpack(format: u16, bytes: &[u8], count: usize) -> Result<Vec<Option<i32>>, DecodeError> {
    if !is_supported(format) {
        return Err(DecodeError::UnsupportedFormat(format));
    }
    let expected = bytes_for(format, count)
        .ok_or_else(|| DecodeError::Header("sample count too large".into()))?;
    if bytes.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let marker = invalid_marker(format);
    let mut out = Vec::with_capacity(count);

    match format {
        16 => {
            for chunk in bytes.chunks_exact(2).take(count) {
                out.push(i16::from_le_bytes([chunk[0], chunk[1]]) as i32);
            }
        }
        212 => {
            // Two 12-bit samples share three bytes; the middle byte holds
            // the high nibbles of both.
            for i in 0..count {
                let base = (i / 2) * 3;
                let raw = if i % 2 == 0 {
                    bytes[base] as i32 | ((bytes[base + 1] as i32 & 0x0f) << 8)
                } else {
                    bytes[base + 2] as i32 | ((bytes[base + 1] as i32 & 0xf0) << 4)
                };
                out.push(if raw > 2047 { raw - 4096 } else { raw });
            }
        }
        _ => {
            for &b in bytes.iter().take(count) {
                out.push(b as i32 - 128);
            }
        }
    }

    Ok(out
        .into_iter()
        .map(|v| if v == marker { None } else { Some(v) })
        .collect())
}
