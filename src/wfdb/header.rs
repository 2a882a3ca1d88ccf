//! Parsing of WFDB `.hea` header files.
//!
//! Only single-segment records are understood. A header looks like:
//!
//! ```text
//! 00001_lr 12 100 1000
//! 00001_lr.dat 16 1000.0(0)/mV 16 0 -119 1508 0 I
//! 00001_lr.dat 16 1000.0(0)/mV 16 0 -55 723 0 II
//! ...
//! ```

use super::DecodeError;

/// Gain applied when a header leaves it unspecified or zero (adu per mV).
pub const DEFAULT_GAIN: f64 = 200.0;

/// Parsed record line plus one [`SignalSpec`] per signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub record_name: String,
    pub sampling_frequency: f64,
    /// Samples per signal, `None` when the header omits it.
    pub num_samples: Option<usize>,
    pub signals: Vec<SignalSpec>,
}

/// One signal specification line.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSpec {
    pub file_name: String,
    pub format: u16,
    /// Byte offset of the first sample in the signal file.
    pub byte_offset: u64,
    pub gain: f64,
    pub baseline: i32,
    pub units: String,
    pub adc_resolution: u32,
    pub adc_zero: i32,
    pub description: String,
}

impl SignalSpec {
    /// Convert a stored sample to physical units.
    pub fn to_physical(&self, digital: i32) -> f64 {
        (digital as f64 - self.baseline as f64) / self.gain
    }
}

/// Parse the text of a header file.
pub fn parse(text: &str) -> Result<Header, DecodeError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'));

    let record_line = lines
        .next()
        .ok_or_else(|| DecodeError::Header("empty header".into()))?;
    let mut fields = record_line.split_whitespace();

    let record_name = fields
        .next()
        .ok_or_else(|| DecodeError::Header("missing record name".into()))?;
    if record_name.contains('/') {
        return Err(DecodeError::Header(format!(
            "multi-segment record '{record_name}' is not supported"
        )));
    }

    let num_signals: usize = parse_field(fields.next(), "number of signals")?;

    // "fs[/counter_freq[(base_counter)]]"
    let sampling_frequency = match fields.next() {
        Some(f) => {
            let fs = f.split('/').next().unwrap_or(f);
            fs.parse::<f64>()
                .map_err(|_| DecodeError::Header(format!("bad sampling frequency '{f}'")))?
        }
        None => 250.0,
    };

    let num_samples = match fields.next() {
        Some(n) => Some(
            n.parse::<usize>()
                .map_err(|_| DecodeError::Header(format!("bad sample count '{n}'")))?,
        ),
        None => None,
    };

    let signals = lines
        .take(num_signals)
        .map(parse_signal)
        .collect::<Result<Vec<_>, _>>()?;

    if signals.len() != num_signals {
        return Err(DecodeError::Header(format!(
            "expected {num_signals} signal lines, found {}",
            signals.len()
        )));
    }

    Ok(Header {
        record_name: record_name.to_string(),
        sampling_frequency,
        num_samples,
        signals,
    })
}

fn parse_signal(line: &str) -> Result<SignalSpec, DecodeError> {
    let mut fields = line.split_whitespace();

    let file_name = fields
        .next()
        .ok_or_else(|| DecodeError::Header("missing signal file name".into()))?
        .to_string();

    let format_field = fields
        .next()
        .ok_or_else(|| DecodeError::Header(format!("missing format for '{file_name}'")))?;
    let (format, byte_offset) = parse_format(format_field)?;

    let (gain, baseline, units) = match fields.next() {
        Some(g) => parse_gain(g)?,
        None => (DEFAULT_GAIN, None, "mV".to_string()),
    };

    let adc_resolution: u32 = match fields.next() {
        Some(r) => parse_field(Some(r), "ADC resolution")?,
        None => 0,
    };
    let adc_zero: i32 = match fields.next() {
        Some(z) => parse_field(Some(z), "ADC zero")?,
        None => 0,
    };

    // initial value, checksum and block size are not needed for decoding
    let description = fields.skip(3).collect::<Vec<_>>().join(" ");

    Ok(SignalSpec {
        file_name,
        format,
        byte_offset,
        gain,
        baseline: baseline.unwrap_or(adc_zero),
        units,
        adc_resolution,
        adc_zero,
        description,
    })
}

/// "16", "212+24", "16:0" → (format, byte offset).
fn parse_format(field: &str) -> Result<(u16, u64), DecodeError> {
    let (head, offset) = match field.split_once('+') {
        Some((h, o)) => (
            h,
            o.parse::<u64>()
                .map_err(|_| DecodeError::Header(format!("bad byte offset in '{field}'")))?,
        ),
        None => (field, 0),
    };

    let (head, skew) = match head.split_once(':') {
        Some((h, s)) => (h, s),
        None => (head, "0"),
    };
    if skew != "0" {
        return Err(DecodeError::Header(format!("skewed signals are not supported: '{field}'")));
    }

    let (fmt, frames) = match head.split_once('x') {
        Some((f, n)) => (f, n),
        None => (head, "1"),
    };
    if frames != "1" {
        return Err(DecodeError::Header(format!(
            "multi-frequency signals are not supported: '{field}'"
        )));
    }

    let format = fmt
        .parse::<u16>()
        .map_err(|_| DecodeError::Header(format!("bad format '{field}'")))?;
    Ok((format, offset))
}

/// "1000.0(0)/mV" → (gain, baseline, units).
fn parse_gain(field: &str) -> Result<(f64, Option<i32>, String), DecodeError> {
    let (value, units) = match field.split_once('/') {
        Some((v, u)) => (v, u.to_string()),
        None => (field, "mV".to_string()),
    };

    let (gain_str, baseline) = match value.split_once('(') {
        Some((g, rest)) => {
            let b = rest
                .trim_end_matches(')')
                .parse::<i32>()
                .map_err(|_| DecodeError::Header(format!("bad baseline in '{field}'")))?;
            (g, Some(b))
        }
        None => (value, None),
    };

    let gain = gain_str
        .parse::<f64>()
        .map_err(|_| DecodeError::Header(format!("bad gain '{field}'")))?;
    let gain = if gain == 0.0 { DEFAULT_GAIN } else { gain };

    Ok((gain, baseline, units))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T, DecodeError> {
    let raw = field.ok_or_else(|| DecodeError::Header(format!("missing {what}")))?;
    raw.parse::<T>()
        .map_err(|_| DecodeError::Header(format!("bad {what} '{raw}'")))
}
