use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::Serialize;

use crate::channels::{resolve_channels, Lead};
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::loader::{load_database, string_column};
use crate::data::model::{MetadataTable, MetadataValue};
use crate::error::{DatasetError, Result};
use crate::label::Label;
use crate::transform::{Transform, TransformContext};
use crate::wfdb::Decoder;

use super::{Dataset, PtbXlConfig, SamplingFrequency, Subset};

/// Metadata column used to find a record's label row.
const LABEL_KEY_COLUMN: &str = "filename_lr";

/// One decoded record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcgSample {
    /// Signal in physical units, shape (samples × selected channels).
    #[serde(skip)]
    pub record: Array2<f64>,
    pub label: Label,
    /// Base directory joined with the record's file-list entry.
    pub path: PathBuf,
}

/// A PTB-XL folder exposed as an indexable dataset of [`EcgSample`]s.
///
/// The metadata table is loaded once at construction; waveforms are decoded on
/// every access and never cached.
pub struct PtbXlDataset {
    base: PathBuf,
    table: MetadataTable,
    /// Record paths relative to `base`, one per table row.
    files: Vec<String>,
    /// For each position, the table row holding its label.
    label_rows: Vec<usize>,
    channels: Vec<Lead>,
    channel_indices: Vec<usize>,
    reference: String,
    sampling_frequency: SamplingFrequency,
    /// Rate as configured, before it was mapped to a record version.
    sampling_hz: u32,
    transform: Option<Box<dyn Transform>>,
    decoder: Box<dyn Decoder>,
}

impl PtbXlDataset {
    /// Load `ptbxl_database.csv` from the configured folder and resolve the
    /// channel list.
    pub fn new(config: PtbXlConfig) -> Result<Self> {
        let PtbXlConfig {
            options,
            transform,
            decoder,
        } = config;

        let table = load_database(&options.path)?;
        let channels = resolve_channels(&options.channels)?;

        if !table.has_column(&options.reference) {
            return Err(DatasetError::UnknownColumn(options.reference));
        }

        let sampling_hz = options.sampling_frequency;
        let sampling_frequency = options.record_version();
        let files = string_column(&table, sampling_frequency.file_column())?;
        let label_keys = match sampling_frequency {
            SamplingFrequency::Low => files.clone(),
            SamplingFrequency::High => string_column(&table, LABEL_KEY_COLUMN)?,
        };
        let label_rows = first_occurrences(&label_keys);

        log::debug!(
            "opened {} records at {} from {} (channels {:?}, reference '{}')",
            files.len(),
            sampling_frequency,
            options.path.display(),
            options.channels,
            options.reference
        );

        Ok(Self {
            base: options.path,
            table,
            files,
            label_rows,
            channel_indices: channels.iter().map(|l| l.index()).collect(),
            channels,
            reference: options.reference,
            sampling_frequency,
            sampling_hz,
            transform,
            decoder,
        })
    }

    /// Dataset folder.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Record paths relative to the base folder, in index order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.table
    }

    pub fn channels(&self) -> &[Lead] {
        &self.channels
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Record version in use (low or high rate).
    pub fn sampling_frequency(&self) -> SamplingFrequency {
        self.sampling_frequency
    }

    /// Sampling frequency as configured, in Hz.
    pub fn sampling_hz(&self) -> u32 {
        self.sampling_hz
    }

    /// `ecg_id` of the record at `index`.
    pub fn ecg_id(&self, index: usize) -> Option<&MetadataValue> {
        self.table.rows.get(index).map(|r| &r.id)
    }

    /// Resolved path of the record at `index`.
    pub fn record_path(&self, index: usize) -> Result<PathBuf> {
        let file = self.files.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.files.len(),
        })?;
        Ok(self.base.join(file))
    }

    /// Raw label of the record at `index`, without decoding the waveform.
    pub fn raw_label(&self, index: usize) -> Result<Label> {
        let row = *self
            .label_rows
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.label_rows.len(),
            })?;
        let value = self
            .table
            .value(row, &self.reference)
            .cloned()
            .unwrap_or(MetadataValue::Null);
        Ok(Label::Value(value))
    }

    /// Restrict the dataset to records whose metadata passes `filters`.
    pub fn filter(self, filters: &FilterState) -> Subset<Self> {
        let indices = filtered_indices(&self.table, filters);
        Subset::new(self, indices)
    }
}

impl Dataset for PtbXlDataset {
    type Item = EcgSample;

    fn len(&self) -> usize {
        self.files.len()
    }

    fn get(&self, index: usize) -> Result<EcgSample> {
        let path = self.record_path(index)?;

        let record = self
            .decoder
            .decode(&path, &self.channel_indices)
            .map_err(|source| DatasetError::Decode {
                path: path.clone(),
                source,
            })?;

        let label = self.raw_label(index)?;
        let missing = label.is_missing();

        let (record, label) = match &self.transform {
            Some(transform) => {
                let ctx = TransformContext {
                    sampling_frequency: self.sampling_hz,
                    path: &path,
                };
                let (record, mut label) = transform.apply(record, label, &ctx)?;
                if missing && !label.restore_missing() {
                    log::warn!(
                        "no maskable label for {}: keeping transformed value '{label}'",
                        path.display()
                    );
                }
                (record, label)
            }
            None => (record, label),
        };

        log::debug!(
            "record {index}: {:?} samples x channels, label {label}, {}",
            record.dim(),
            path.display()
        );

        Ok(EcgSample {
            record,
            label,
            path,
        })
    }

    fn name(&self) -> &str {
        "ptbxl"
    }
}

impl std::fmt::Debug for PtbXlDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtbXlDataset")
            .field("base", &self.base)
            .field("len", &self.files.len())
            .field("channels", &self.channels)
            .field("reference", &self.reference)
            .field("sampling_frequency", &self.sampling_frequency)
            .field("transform", &self.transform.is_some())
            .finish_non_exhaustive()
    }
}

/// Map each position to the first position holding the same key.
fn first_occurrences(keys: &[String]) -> Vec<usize> {
    let mut first: HashMap<&str, usize> = HashMap::with_capacity(keys.len());
    keys.iter()
        .enumerate()
        .map(|(i, k)| *first.entry(k.as_str()).or_insert(i))
        .collect()
}
