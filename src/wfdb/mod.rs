//! Reading of WFDB records, the storage format PTB-XL ships its waveforms in.
//!
//! The dataset only talks to the [`Decoder`] trait; [`WfdbDecoder`] is the
//! implementation used by default.

pub mod header;
pub mod signal;
pub mod writer;

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

pub use header::{Header, SignalSpec};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed header: {0}")]
    Header(String),

    #[error("unsupported storage format {0}")]
    UnsupportedFormat(u16),

    #[error("channel {channel} out of range, record has {num_signals} signals")]
    ChannelOutOfRange { channel: usize, num_signals: usize },

    #[error("signal data truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Turns a record on disk into a (samples × channels) array.
///
/// Implementations are shared between threads by the dataset, so they must be
/// reentrant for reads.
pub trait Decoder: Send + Sync {
    /// Decode the listed `channels` of the record at `record` (a path without
    /// extension). Column `j` of the result holds `channels[j]`.
    fn decode(&self, record: &Path, channels: &[usize]) -> Result<Array2<f64>, DecodeError>;
}

impl<F> Decoder for F
where
    F: Fn(&Path, &[usize]) -> Result<Array2<f64>, DecodeError> + Send + Sync,
{
    fn decode(&self, record: &Path, channels: &[usize]) -> Result<Array2<f64>, DecodeError> {
        self(record, channels)
    }
}

/// Decoder for local WFDB records (`.hea` header plus signal files).
///
/// Samples are converted to physical units; invalid samples become `NaN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WfdbDecoder;

impl WfdbDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse `<record>.hea`.
    pub fn read_header(&self, record: &Path) -> Result<Header, DecodeError> {
        let path = with_suffix(record, ".hea");
        let text = std::fs::read_to_string(&path).map_err(|source| DecodeError::Io {
            path: path.clone(),
            source,
        })?;
        header::parse(&text)
    }
}

impl Decoder for WfdbDecoder {
    fn decode(&self, record: &Path, channels: &[usize]) -> Result<Array2<f64>, DecodeError> {
        let header = self.read_header(record)?;
        let num_signals = header.signals.len();

        if let Some(&channel) = channels.iter().find(|&&c| c >= num_signals) {
            return Err(DecodeError::ChannelOutOfRange {
                channel,
                num_signals,
            });
        }

        let dir = record.parent().unwrap_or_else(|| Path::new(""));
        let groups = group_by_file(&header);

        // Decode every file that holds at least one requested channel.
        let mut decoded: HashMap<usize, Vec<Option<i32>>> = HashMap::new();
        let mut num_samples = header.num_samples;

        for group in &groups {
            if !group.members.iter().any(|m| channels.contains(m)) {
                continue;
            }
            let first = &header.signals[group.members[0]];
            let path = dir.join(&group.file_name);
            let bytes = std::fs::read(&path).map_err(|source| DecodeError::Io {
                path: path.clone(),
                source,
            })?;
            let offset = (first.byte_offset as usize).min(bytes.len());
            let data = &bytes[offset..];
            let width = group.members.len();

            let frames = match num_samples {
                Some(n) => n,
                None => {
                    let n = signal::samples_in(first.format, data.len()) / width;
                    num_samples = Some(n);
                    n
                }
            };

            let count = frames
                .checked_mul(width)
                .ok_or_else(|| DecodeError::Header("sample count too large".into()))?;
            let samples = signal::unpack(first.format, data, count)?;
            for (slot, &sig) in group.members.iter().enumerate() {
                if channels.contains(&sig) {
                    let column = samples.iter().skip(slot).step_by(width).copied().collect();
                    decoded.insert(sig, column);
                }
            }
        }

        let rows = num_samples.unwrap_or(0);
        if rows > isize::MAX as usize {
            return Err(DecodeError::Header("sample count too large".into()));
        }
        let mut out = Array2::<f64>::zeros((rows, channels.len()));
        for (j, &ch) in channels.iter().enumerate() {
            let spec = &header.signals[ch];
            if let Some(values) = decoded.get(&ch) {
                for (i, v) in values.iter().enumerate().take(rows) {
                    out[[i, j]] = match v {
                        Some(d) => spec.to_physical(*d),
                        None => f64::NAN,
                    };
                }
            }
        }

        log::trace!(
            "decoded {} ({} samples x {} channels)",
            record.display(),
            rows,
            channels.len()
        );
        Ok(out)
    }
}

/// Signals stored in the same file, in interleaving order.
struct FileGroup {
    file_name: String,
    members: Vec<usize>,
}

fn group_by_file(header: &Header) -> Vec<FileGroup> {
    let mut groups: Vec<FileGroup> = Vec::new();
    for (i, spec) in header.signals.iter().enumerate() {
        match groups.iter_mut().find(|g| g.file_name == spec.file_name) {
            Some(g) => g.members.push(i),
            None => groups.push(FileGroup {
                file_name: spec.file_name.clone(),
                members: vec![i],
            }),
        }
    }
    groups
}

/// Append `suffix` to a record path. `Path::with_extension` would clobber
/// anything after a dot in the record name.
pub(crate) fn with_suffix(record: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = record.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}
