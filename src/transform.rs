//! Per-record preprocessing applied after decoding.

use std::path::Path;

use ndarray::{Array1, Array2, Axis};

use crate::data::model::MetadataValue;
use crate::error::{DatasetError, Result};
use crate::label::Label;

/// What a transform is told about the record it is processing.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// Sampling frequency in Hz, as configured on the dataset.
    pub sampling_frequency: u32,
    /// Resolved record path (base directory joined with the file-list entry).
    pub path: &'a Path,
}

impl TransformContext<'_> {
    /// Build a transform error pointing at the current record.
    pub fn error(&self, message: impl Into<String>) -> DatasetError {
        DatasetError::Transform {
            path: self.path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// A transform applied to each decoded record and its label.
///
/// It may change the shape of either. If the raw label was the missing-label
/// marker the dataset restores it afterwards, so transforms need not care.
pub trait Transform: Send + Sync {
    fn apply(
        &self,
        record: Array2<f64>,
        label: Label,
        ctx: &TransformContext<'_>,
    ) -> Result<(Array2<f64>, Label)>;
}

impl<F> Transform for F
where
    F: Fn(Array2<f64>, Label, &TransformContext<'_>) -> Result<(Array2<f64>, Label)> + Send + Sync,
{
    fn apply(
        &self,
        record: Array2<f64>,
        label: Label,
        ctx: &TransformContext<'_>,
    ) -> Result<(Array2<f64>, Label)> {
        self(record, label, ctx)
    }
}

// Built-in transforms

/// Standardize every lead to zero mean and unit variance.
///
/// Leads with zero variance are only centred. `NaN` samples are ignored when
/// computing the statistics and stay `NaN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standardize;

impl Transform for Standardize {
    fn apply(
        &self,
        mut record: Array2<f64>,
        label: Label,
        _ctx: &TransformContext<'_>,
    ) -> Result<(Array2<f64>, Label)> {
        for mut lead in record.axis_iter_mut(Axis(1)) {
            let valid: Vec<f64> = lead.iter().copied().filter(|v| !v.is_nan()).collect();
            if valid.is_empty() {
                continue;
            }
            let n = valid.len() as f64;
            let mean = valid.iter().sum::<f64>() / n;
            let var = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            lead.mapv_inplace(|v| {
                if std > 0.0 {
                    (v - mean) / std
                } else {
                    v - mean
                }
            });
        }
        Ok((record, label))
    }
}

/// One-hot encode a numeric scalar label into `num_classes` entries.
///
/// Out-of-range classes (the missing marker included) encode as all zeros.
#[derive(Debug, Clone, Copy)]
pub struct OneHotEncode {
    pub num_classes: usize,
}

impl OneHotEncode {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes }
    }
}

impl Transform for OneHotEncode {
    fn apply(
        &self,
        record: Array2<f64>,
        label: Label,
        ctx: &TransformContext<'_>,
    ) -> Result<(Array2<f64>, Label)> {
        let class = label
            .as_f64()
            .ok_or_else(|| ctx.error(format!("cannot one-hot encode label '{label}'")))?;
        let mut one_hot = Array1::<f64>::zeros(self.num_classes);
        if class >= 0.0 && class.fract() == 0.0 && (class as usize) < self.num_classes {
            one_hot[class as usize] = 1.0;
        }
        Ok((record, Label::Array(one_hot.into_dyn())))
    }
}

/// Replace the label with a fixed value for every record whose label is null.
#[derive(Debug, Clone)]
pub struct FillNull {
    pub value: MetadataValue,
}

impl Transform for FillNull {
    fn apply(
        &self,
        record: Array2<f64>,
        label: Label,
        _ctx: &TransformContext<'_>,
    ) -> Result<(Array2<f64>, Label)> {
        let label = match label {
            Label::Value(MetadataValue::Null) => Label::Value(self.value.clone()),
            other => other,
        };
        Ok((record, label))
    }
}

/// Chain multiple transforms.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn apply(
        &self,
        mut record: Array2<f64>,
        mut label: Label,
        ctx: &TransformContext<'_>,
    ) -> Result<(Array2<f64>, Label)> {
        for t in &self.transforms {
            (record, label) = t.apply(record, label, ctx)?;
        }
        Ok((record, label))
    }
}
