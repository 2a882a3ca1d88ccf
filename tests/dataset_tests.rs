// Tests for the PTB-XL dataset against on-disk folders built in a tempdir

use std::path::Path;

use ndarray::{Array2, Axis};
use tempfile::TempDir;

use ptbxl_dataset::data::filter;
use ptbxl_dataset::transform::{Compose, OneHotEncode, Standardize};
use ptbxl_dataset::wfdb::writer::write_record;
use ptbxl_dataset::{
    Dataset, DatasetError, DatasetOptions, Decoder, Label, MetadataValue, PtbXlConfig,
    SamplingFrequency, TransformContext, WfdbDecoder,
};

const LEADS: [&str; 12] = [
    "I", "II", "III", "AVR", "AVL", "AVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

struct Row {
    ecg_id: u32,
    sex: i64,
    fold: u32,
}

/// Build a dataset folder with one 12-lead record per row at both rates.
/// Sample `t` of lead `c` is `(c + 1) * 0.001 * t + ecg_id` in mV.
fn build_folder(rows: &[Row], samples_lr: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from("ecg_id,age,sex,strat_fold,filename_lr,filename_hr\n");
    for row in rows {
        let lr = format!("records100/00000/{:05}_lr", row.ecg_id);
        let hr = format!("records500/00000/{:05}_hr", row.ecg_id);
        csv.push_str(&format!(
            "{},{}.0,{},{},{lr},{hr}\n",
            row.ecg_id,
            40 + row.ecg_id,
            row.sex,
            row.fold
        ));
        for (name, n, fs) in [(&lr, samples_lr, 100.0), (&hr, samples_lr * 5, 500.0)] {
            let data = Array2::from_shape_fn((n, 12), |(t, c)| {
                (c + 1) as f64 * 0.001 * t as f64 + row.ecg_id as f64
            });
            write_record(&dir.path().join(name), &data, fs, 1000.0, &LEADS).unwrap();
        }
    }
    std::fs::write(dir.path().join("ptbxl_database.csv"), csv).unwrap();
    dir
}

fn three_rows() -> Vec<Row> {
    vec![
        Row { ecg_id: 1, sex: 0, fold: 1 },
        Row { ecg_id: 2, sex: -1, fold: 9 },
        Row { ecg_id: 3, sex: 1, fold: 10 },
    ]
}

fn double_label(
    record: Array2<f64>,
    label: Label,
    _ctx: &TransformContext<'_>,
) -> ptbxl_dataset::Result<(Array2<f64>, Label)> {
    let label = match label {
        Label::Value(MetadataValue::Integer(v)) => Label::Value(MetadataValue::Integer(v * 2)),
        Label::Value(MetadataValue::Float(v)) => Label::Value(MetadataValue::Float(v * 2.0)),
        other => other,
    };
    Ok((record, label))
}

// Construction

#[test]
fn single_row_low_rate() {
    let dir = build_folder(&[Row { ecg_id: 1, sex: 0, fold: 1 }], 100);
    let ds = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap();

    assert_eq!(ds.len(), 1);
    let s = ds.get(0).unwrap();
    assert_eq!(s.record.dim(), (100, 1));
    assert_eq!(s.label, Label::Value(MetadataValue::Integer(0)));
    assert_eq!(s.path, dir.path().join("records100/00000/00001_lr"));
}

#[test]
fn length_matches_table_at_both_rates() {
    let dir = build_folder(&three_rows(), 50);
    let lr = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap();
    let hr = PtbXlConfig::new(dir.path(), &["i"])
        .sampling_frequency(500)
        .open()
        .unwrap();

    assert_eq!(lr.len(), 3);
    assert_eq!(hr.len(), lr.metadata().len());
    assert_eq!(lr.sampling_frequency(), SamplingFrequency::Low);
    assert!(hr.files().iter().all(|f| f.starts_with("records500/")));
    assert_eq!(hr.get(2).unwrap().record.dim(), (250, 1));
}

#[test]
fn unknown_channel_fails_at_construction() {
    let dir = build_folder(&three_rows(), 10);
    let err = PtbXlConfig::new(dir.path(), &["i", "V7"]).open().unwrap_err();
    assert!(matches!(err, DatasetError::UnknownChannel(ref c) if c == "V7"));
}

#[test]
fn missing_metadata_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}

#[test]
fn malformed_metadata_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ptbxl_database.csv"),
        "ecg_id,sex,filename_lr,filename_hr\n1,0,a\n",
    )
    .unwrap();
    let err = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap_err();
    assert!(matches!(err, DatasetError::Csv(_)));
}

// Access

#[test]
fn every_index_has_requested_channels_and_path() {
    let dir = build_folder(&three_rows(), 20);
    let channels = ["V1", "i", "avf"];
    let ds = PtbXlConfig::new(dir.path(), &channels).open().unwrap();

    for i in 0..ds.len() {
        let s = ds.get(i).unwrap();
        assert_eq!(s.record.len_of(Axis(1)), channels.len());
        assert_eq!(s.path, dir.path().join(&ds.files()[i]));
    }

    // column order follows the request: V1 is lead 6, slope 0.007 mV per sample
    let s = ds.get(0).unwrap();
    assert!((s.record[[10, 0]] - 1.07).abs() < 1e-9);
    assert!((s.record[[10, 1]] - 1.01).abs() < 1e-9);
    assert!((s.record[[10, 2]] - 1.06).abs() < 1e-9);
}

#[test]
fn without_transform_outputs_are_raw() {
    let dir = build_folder(&three_rows(), 30);
    let ds = PtbXlConfig::new(dir.path(), &["ii", "V6"]).open().unwrap();

    for i in 0..ds.len() {
        let s = ds.get(i).unwrap();
        let raw = WfdbDecoder.decode(&s.path, &[1, 11]).unwrap();
        assert_eq!(s.record, raw);
        assert_eq!(s.label, ds.raw_label(i).unwrap());
    }
    assert_eq!(ds.get(1).unwrap().label, Label::Value(MetadataValue::Integer(-1)));
}

#[test]
fn reference_column_selects_label() {
    let dir = build_folder(&three_rows(), 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"]).reference("age").open().unwrap();
    assert_eq!(ds.get(2).unwrap().label, Label::Value(MetadataValue::Float(43.0)));
}

#[test]
fn missing_record_file_is_a_decode_error() {
    let dir = build_folder(&three_rows(), 10);
    std::fs::remove_file(dir.path().join("records100/00000/00002_lr.dat")).unwrap();
    let ds = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap();

    assert!(ds.get(0).is_ok());
    let err = ds.get(1).unwrap_err();
    match err {
        DatasetError::Decode { path, .. } => {
            assert_eq!(path, dir.path().join("records100/00000/00002_lr"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupt_header_is_a_decode_error() {
    let dir = build_folder(&three_rows(), 10);
    std::fs::write(
        dir.path().join("records100/00000/00001_lr.hea"),
        "00001_lr 2 100 9223372036854775807\n00001_lr.dat 16\n00001_lr.dat 16\n",
    )
    .unwrap();
    let ds = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap();

    let err = ds.get(0).unwrap_err();
    assert!(matches!(err, DatasetError::Decode { .. }), "{err}");
    assert!(ds.get(1).is_ok());
}

// Transforms and the missing-label marker

#[test]
fn doubling_transform_keeps_missing_marker() {
    let dir = build_folder(&[Row { ecg_id: 1, sex: -1, fold: 1 }], 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"])
        .transform(double_label)
        .open()
        .unwrap();
    assert_eq!(ds.get(0).unwrap().label, Label::Value(MetadataValue::Integer(-1)));
}

#[test]
fn doubling_transform_changes_present_labels() {
    let dir = build_folder(&three_rows(), 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"])
        .transform(double_label)
        .open()
        .unwrap();
    assert_eq!(ds.get(2).unwrap().label, Label::Value(MetadataValue::Integer(2)));
}

#[test]
fn array_labels_are_masked_entirely() {
    let dir = build_folder(&three_rows(), 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"])
        .transform(OneHotEncode::new(2))
        .open()
        .unwrap();

    let present = ds.get(0).unwrap().label;
    assert_eq!(present, Label::Array(ndarray::arr1(&[1.0, 0.0]).into_dyn()));

    let missing = ds.get(1).unwrap().label;
    assert!(missing.is_missing());
    assert_eq!(missing.to_string(), "[-1, -1]");
}

#[test]
fn transform_sees_frequency_and_path() {
    fn check(
        record: Array2<f64>,
        label: Label,
        ctx: &TransformContext<'_>,
    ) -> ptbxl_dataset::Result<(Array2<f64>, Label)> {
        if ctx.sampling_frequency != 500 || !ctx.path.ends_with("00001_hr") {
            return Err(ctx.error("unexpected context"));
        }
        Ok((record, label))
    }
    let dir = build_folder(&[Row { ecg_id: 1, sex: 0, fold: 1 }], 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"])
        .sampling_frequency(500)
        .transform(check)
        .open()
        .unwrap();
    assert!(ds.get(0).is_ok());
}

#[test]
fn composed_transforms_standardize_signal() {
    let dir = build_folder(&three_rows(), 40);
    let ds = PtbXlConfig::new(dir.path(), &["i", "ii"])
        .transform(Compose::new(vec![
            Box::new(Standardize),
            Box::new(double_label),
        ]))
        .open()
        .unwrap();

    let s = ds.get(2).unwrap();
    assert_eq!(s.record.dim(), (40, 2));
    for lead in s.record.axis_iter(Axis(1)) {
        let mean = lead.sum() / lead.len() as f64;
        let var = lead.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / lead.len() as f64;
        assert!(mean.abs() < 1e-9);
        assert!((var - 1.0).abs() < 1e-9);
    }
    assert_eq!(s.label, Label::Value(MetadataValue::Integer(2)));
}

// Selection, iteration, concurrency

#[test]
fn filter_by_fold() {
    let dir = build_folder(&three_rows(), 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap();
    let test = ds.filter(&filter::accept(
        "strat_fold",
        [MetadataValue::Integer(9), MetadataValue::Integer(10)],
    ));

    assert_eq!(test.len(), 2);
    let paths: Vec<_> = test.iter().map(|s| s.unwrap().path).collect();
    assert!(paths[0].ends_with("00002_lr"));
    assert!(paths[1].ends_with("00003_lr"));
}

#[test]
fn options_file_opens_dataset() {
    let dir = build_folder(&three_rows(), 10);
    let options_path = dir.path().join("options.json");
    let json = serde_json::json!({
        "path": dir.path(),
        "channels": ["V2", "V3"],
        "reference": "sex",
        "sampling_frequency": 500
    });
    std::fs::write(&options_path, json.to_string()).unwrap();

    let options = DatasetOptions::from_json_file(&options_path).unwrap();
    let ds = PtbXlConfig::from_options(options).open().unwrap();
    assert_eq!(ds.sampling_frequency(), SamplingFrequency::High);
    assert_eq!(ds.get(0).unwrap().record.dim(), (50, 2));
}

#[test]
fn concurrent_reads_share_one_dataset() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let dir = build_folder(&three_rows(), 10);
    let ds = PtbXlConfig::new(dir.path(), &["i"]).open().unwrap();
    assert_send_sync(&ds);

    let labels: Vec<Label> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..ds.len())
            .map(|i| {
                let ds = &ds;
                scope.spawn(move || ds.get(i).unwrap().label)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(
        labels,
        vec![
            Label::Value(MetadataValue::Integer(0)),
            Label::Value(MetadataValue::Integer(-1)),
            Label::Value(MetadataValue::Integer(1)),
        ]
    );
}

#[test]
fn custom_decoder_replaces_wfdb() {
    fn constant(_: &Path, channels: &[usize]) -> Result<Array2<f64>, ptbxl_dataset::wfdb::DecodeError> {
        Ok(Array2::from_elem((7, channels.len()), 3.0))
    }
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ptbxl_database.csv"),
        "ecg_id,sex,filename_lr,filename_hr\n1,0,records100/00000/00001_lr,records500/00000/00001_hr\n",
    )
    .unwrap();
    let ds = PtbXlConfig::new(dir.path(), &["i", "ii"])
        .decoder(constant)
        .open()
        .unwrap();
    assert_eq!(ds.get(0).unwrap().record, Array2::from_elem((7, 2), 3.0));
}
