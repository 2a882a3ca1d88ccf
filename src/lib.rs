//! # ptbxl-dataset
//!
//! Exposes a folder of PTB-XL electrocardiogram recordings as an indexable
//! dataset of `(signal, label, path)` samples.
//!
//! - [`PtbXlDataset`]: loads `ptbxl_database.csv`, decodes records on demand
//! - [`Dataset`]: the length + indexed-access interface loaders consume
//! - [`wfdb`]: reader for the WFDB records the waveforms are stored in
//! - [`transform`]: optional per-record preprocessing
//!
//! ```ignore
//! use ptbxl_dataset::{Dataset, PtbXlConfig};
//!
//! let ds = PtbXlConfig::new("/data/ptbxl/", &["i", "ii", "V1"]).open()?;
//! let sample = ds.get(0)?;
//! println!("{:?} {} {}", sample.record.dim(), sample.label, sample.path.display());
//! ```

pub mod channels;
pub mod data;
pub mod dataset;
pub mod error;
pub mod label;
pub mod transform;
pub mod wfdb;

pub use channels::Lead;
pub use data::model::{MetadataTable, MetadataValue};
pub use dataset::{
    Dataset, DatasetIter, DatasetOptions, EcgSample, PtbXlConfig, PtbXlDataset, SamplingFrequency,
    Subset,
};
pub use error::{DatasetError, Result};
pub use label::Label;
pub use transform::{Transform, TransformContext};
pub use wfdb::{Decoder, WfdbDecoder};
