use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ptbxl_dataset::data::filter;
use ptbxl_dataset::transform::Standardize;
use ptbxl_dataset::{Dataset, DatasetOptions, MetadataValue, PtbXlConfig};

/// Walk a PTB-XL folder and print every record's shape, label and path.
#[derive(Parser, Debug)]
#[command(name = "ptbxl-dataset", version)]
struct Args {
    /// Dataset folder containing ptbxl_database.csv
    path: Option<PathBuf>,

    /// JSON options file (path, channels, reference, sampling_frequency)
    #[arg(long, conflicts_with = "path")]
    config: Option<PathBuf>,

    /// Comma-separated lead names
    #[arg(short, long, value_delimiter = ',', default_value = "i")]
    channels: Vec<String>,

    /// Metadata column to use as the label
    #[arg(short, long, default_value = "sex")]
    reference: String,

    /// 100 for the low-rate records, 500 for the high-rate ones
    #[arg(short, long, default_value_t = 100)]
    sampling_frequency: u32,

    /// Only records in these strat_fold values
    #[arg(long, value_delimiter = ',')]
    fold: Vec<i64>,

    /// Stop after this many records
    #[arg(long)]
    limit: Option<usize>,

    /// Standardize each lead before printing
    #[arg(long)]
    standardize: bool,

    /// Print label counts as JSON instead of per-record lines
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = match (&args.config, &args.path) {
        (Some(file), _) => DatasetOptions::from_json_file(file)
            .with_context(|| format!("reading options from {}", file.display()))?,
        (None, Some(path)) => DatasetOptions {
            path: path.clone(),
            channels: args.channels.clone(),
            reference: args.reference.clone(),
            sampling_frequency: args.sampling_frequency,
        },
        (None, None) => bail!("either a dataset path or --config is required"),
    };

    let mut config = PtbXlConfig::from_options(options);
    if args.standardize {
        config = config.transform(Standardize);
    }
    let dataset = config.open().context("opening dataset")?;

    let mut filters = filter::FilterState::new();
    if !args.fold.is_empty() {
        filters.insert(
            "strat_fold".to_string(),
            args.fold.iter().map(|f| MetadataValue::Integer(*f)).collect(),
        );
    }
    let dataset = dataset.filter(&filters);

    let limit = args.limit.unwrap_or(usize::MAX);
    log::info!(
        "{} of {} records selected",
        dataset.len(),
        dataset.inner().len()
    );

    if args.summary {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for &i in dataset.indices().iter().take(limit) {
            let label = dataset.inner().raw_label(i)?;
            *counts.entry(label.to_string()).or_default() += 1;
        }
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    for (i, sample) in dataset.iter().take(limit).enumerate() {
        let sample = sample.with_context(|| format!("loading record {i}"))?;
        println!(
            "{i}\t{:?}\t{}\t{}",
            sample.record.dim(),
            sample.label,
            sample.path.display()
        );
    }

    Ok(())
}
