use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, Result};
use crate::transform::Transform;
use crate::wfdb::{Decoder, WfdbDecoder};

use super::PtbXlDataset;

// ---------------------------------------------------------------------------
// SamplingFrequency
// ---------------------------------------------------------------------------

/// Which of the two PTB-XL waveform versions to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingFrequency {
    /// 100 Hz records, listed in `filename_lr`.
    #[default]
    Low,
    /// 500 Hz records, listed in `filename_hr`.
    High,
}

impl SamplingFrequency {
    pub fn hz(self) -> u32 {
        match self {
            SamplingFrequency::Low => 100,
            SamplingFrequency::High => 500,
        }
    }

    /// Metadata column holding the record paths for this frequency.
    pub fn file_column(self) -> &'static str {
        match self {
            SamplingFrequency::Low => "filename_lr",
            SamplingFrequency::High => "filename_hr",
        }
    }
}

/// 100 selects the low-rate records; any other value the high-rate ones.
impl From<u32> for SamplingFrequency {
    fn from(hz: u32) -> Self {
        if hz == 100 {
            SamplingFrequency::Low
        } else {
            SamplingFrequency::High
        }
    }
}

impl From<SamplingFrequency> for u32 {
    fn from(f: SamplingFrequency) -> Self {
        f.hz()
    }
}

impl fmt::Display for SamplingFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

// ---------------------------------------------------------------------------
// DatasetOptions – the serialisable part of the configuration
// ---------------------------------------------------------------------------

fn default_reference() -> String {
    "sex".to_string()
}

fn default_sampling_frequency() -> u32 {
    100
}

/// Plain options for opening a dataset, loadable from JSON.
///
/// ```json
/// { "path": "/data/ptbxl", "channels": ["i", "ii", "V1"], "reference": "age" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOptions {
    /// Dataset folder holding `ptbxl_database.csv`.
    pub path: PathBuf,
    /// Lead names to decode, in output column order.
    pub channels: Vec<String>,
    /// Metadata column returned as the label.
    #[serde(default = "default_reference")]
    pub reference: String,
    /// Requested rate in Hz, handed to transforms as given. 100 reads the
    /// low-rate records, anything else the high-rate ones.
    #[serde(default = "default_sampling_frequency")]
    pub sampling_frequency: u32,
}

impl DatasetOptions {
    pub fn new<P: Into<PathBuf>, S: AsRef<str>>(path: P, channels: &[S]) -> Self {
        Self {
            path: path.into(),
            channels: channels.iter().map(|c| c.as_ref().to_string()).collect(),
            reference: default_reference(),
            sampling_frequency: default_sampling_frequency(),
        }
    }

    /// Which record version the requested rate selects.
    pub fn record_version(&self) -> SamplingFrequency {
        SamplingFrequency::from(self.sampling_frequency)
    }

    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DatasetError::Config(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// PtbXlConfig – options plus the non-serialisable collaborators
// ---------------------------------------------------------------------------

/// Builder for [`PtbXlDataset`].
///
/// # Example
/// ```ignore
/// let ds = PtbXlConfig::new("/data/ptbxl", &["i", "ii", "V1"])
///     .reference("age")
///     .sampling_frequency(500)
///     .transform(Standardize)
///     .open()?;
/// ```
pub struct PtbXlConfig {
    pub options: DatasetOptions,
    pub(crate) transform: Option<Box<dyn Transform>>,
    pub(crate) decoder: Box<dyn Decoder>,
}

impl PtbXlConfig {
    pub fn new<P: Into<PathBuf>, S: AsRef<str>>(path: P, channels: &[S]) -> Self {
        Self::from_options(DatasetOptions::new(path, channels))
    }

    pub fn from_options(options: DatasetOptions) -> Self {
        Self {
            options,
            transform: None,
            decoder: Box::new(WfdbDecoder),
        }
    }

    pub fn reference(mut self, column: &str) -> Self {
        self.options.reference = column.to_string();
        self
    }

    /// Sampling frequency in Hz: 100 reads the low-rate records, anything
    /// else the high-rate ones.
    pub fn sampling_frequency(mut self, hz: u32) -> Self {
        self.options.sampling_frequency = hz;
        self
    }

    pub fn transform<T: Transform + 'static>(mut self, t: T) -> Self {
        self.transform = Some(Box::new(t));
        self
    }

    /// Replace the waveform decoder (defaults to [`WfdbDecoder`]).
    pub fn decoder<D: Decoder + 'static>(mut self, d: D) -> Self {
        self.decoder = Box::new(d);
        self
    }

    /// Load the metadata table and build the dataset.
    pub fn open(self) -> Result<PtbXlDataset> {
        PtbXlDataset::new(self)
    }
}

impl fmt::Debug for PtbXlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PtbXlConfig")
            .field("options", &self.options)
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}
