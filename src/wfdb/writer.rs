//! Writing of format-16 WFDB records.

use std::fmt::Write as _;
use std::path::Path;

use ndarray::Array2;

use super::{with_suffix, DecodeError};

/// Write `data` (samples × signals, physical units) as `<record>.hea` plus
/// `<record>.dat` in format 16.
///
/// Values are scaled by `gain` and rounded; values outside the 16-bit range
/// are clamped just above the invalid-sample marker, and `NaN` is stored as
/// the marker itself.
pub fn write_record(
    record: &Path,
    data: &Array2<f64>,
    sampling_frequency: f64,
    gain: f64,
    descriptions: &[&str],
) -> Result<(), DecodeError> {
    let (num_samples, num_signals) = data.dim();
    if descriptions.len() != num_signals {
        return Err(DecodeError::Header(format!(
            "{} descriptions for {num_signals} signals",
            descriptions.len()
        )));
    }

    let name = record
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DecodeError::Header(format!("bad record path {}", record.display())))?;
    let dat_name = format!("{name}.dat");

    let digital: Vec<i16> = data.iter().map(|&v| to_digital(v, gain)).collect();

    let mut bytes = Vec::with_capacity(digital.len() * 2);
    for v in &digital {
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    let mut text = format!("{name} {num_signals} {sampling_frequency} {num_samples}\n");
    for (sig, desc) in descriptions.iter().enumerate() {
        let first = digital.get(sig).copied().unwrap_or(0);
        let checksum = digital
            .iter()
            .skip(sig)
            .step_by(num_signals.max(1))
            .fold(0i16, |acc, &v| acc.wrapping_add(v));
        // writeln! into a String cannot fail
        let _ = writeln!(
            text,
            "{dat_name} 16 {gain:?}(0)/mV 16 0 {first} {checksum} 0 {desc}"
        );
    }

    if let Some(parent) = record.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DecodeError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let hea = with_suffix(record, ".hea");
    std::fs::write(&hea, text).map_err(|source| DecodeError::Io { path: hea, source })?;
    let dat = with_suffix(record, ".dat");
    std::fs::write(&dat, bytes).map_err(|source| DecodeError::Io { path: dat, source })?;
    Ok(())
}

fn to_digital(value: f64, gain: f64) -> i16 {
    if value.is_nan() {
        return i16::MIN;
    }
    (value * gain).round().clamp(i16::MIN as f64 + 1.0, i16::MAX as f64) as i16
}
