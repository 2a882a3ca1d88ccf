use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::Array2;

use ptbxl_dataset::wfdb::writer::write_record;
use ptbxl_dataset::Lead;

/// Write a small synthetic PTB-XL folder (metadata CSV plus 100 Hz and 500 Hz
/// records) for trying the dataset out without the real database.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output folder
    #[arg(default_value = "sample_ptbxl")]
    out: PathBuf,

    /// Number of records
    #[arg(short, long, default_value_t = 20)]
    records: usize,

    /// Record length in seconds
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// P, Q, R, S and T waves as (offset in beat fraction, width, amplitude in mV).
const BEAT: [(f64, f64, f64); 5] = [
    (0.20, 0.025, 0.12),
    (0.36, 0.008, -0.10),
    (0.38, 0.010, 1.10),
    (0.40, 0.008, -0.25),
    (0.62, 0.040, 0.30),
];

/// Rough per-lead scaling of the beat template.
const LEAD_SCALE: [f64; 12] = [
    0.6, 1.0, 0.4, -0.8, 0.2, 0.7, -0.5, 0.3, 0.8, 1.2, 1.0, 0.8,
];

fn synthesize(
    fs: f64,
    seconds: f64,
    heart_rate: f64,
    noise: f64,
    rng: &mut SimpleRng,
) -> Array2<f64> {
    let n = (fs * seconds).round() as usize;
    let period = 60.0 / heart_rate;
    Array2::from_shape_fn((n, Lead::ALL.len()), |(i, lead)| {
        let phase = (i as f64 / fs % period) / period;
        let beat: f64 = BEAT
            .iter()
            .map(|&(mu, sigma, amp)| gaussian(phase, mu, sigma, amp))
            .sum();
        beat * LEAD_SCALE[lead] + rng.gauss(0.0, noise)
    })
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let csv_path = args.out.join("ptbxl_database.csv");
    let mut writer = csv::Writer::from_path(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    writer.write_record([
        "ecg_id",
        "patient_id",
        "age",
        "sex",
        "scp_codes",
        "strat_fold",
        "filename_lr",
        "filename_hr",
    ])?;

    let descriptions: Vec<&str> = Lead::ALL
        .iter()
        .map(|l| match l {
            Lead::I => "I",
            Lead::II => "II",
            Lead::III => "III",
            Lead::Avr => "AVR",
            Lead::Avl => "AVL",
            Lead::Avf => "AVF",
            other => other.name(),
        })
        .collect();

    for ecg_id in 1..=args.records {
        let folder = format!("{:05}", (ecg_id / 1000) * 1000);
        let lr = format!("records100/{folder}/{ecg_id:05}_lr");
        let hr = format!("records500/{folder}/{ecg_id:05}_hr");

        // every seventh record has no recorded sex
        let sex: i64 = if ecg_id % 7 == 0 { -1 } else { rng.below(2) as i64 };
        let age = 20 + rng.below(70);
        let heart_rate = 50.0 + rng.next_f64() * 50.0;
        let scp = if rng.below(3) == 0 {
            "{'IMI': 50.0, 'SR': 0.0}"
        } else {
            "{'NORM': 100.0, 'SR': 0.0}"
        };

        for (name, fs) in [(&lr, 100.0), (&hr, 500.0)] {
            let signal = synthesize(fs, args.seconds, heart_rate, 0.01, &mut rng);
            write_record(&args.out.join(name), &signal, fs, 1000.0, &descriptions)
                .with_context(|| format!("writing record {name}"))?;
        }

        writer.write_record([
            ecg_id.to_string(),
            format!("{:.1}", (10_000 + rng.below(10_000)) as f64),
            format!("{:.1}", age as f64),
            sex.to_string(),
            scp.to_string(),
            (1 + (ecg_id - 1) % 10).to_string(),
            lr,
            hr,
        ])?;
    }
    writer.flush()?;

    println!(
        "Wrote {} records ({} s at 100 Hz and 500 Hz) to {}",
        args.records,
        args.seconds,
        args.out.display()
    );
    Ok(())
}
