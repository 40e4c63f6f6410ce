//! Write a generated demo dataset to stdout as CSV, e.g. to try the upload
//! flow: `sample_csv ecommerce > ecommerce.csv && csvdash upload ecommerce.csv`.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use csvdash::process::Value;
use csvdash::sample::{generate, Profile};
use std::io;

/// Generated demo dataset as CSV on stdout
#[derive(Parser, Debug)]
struct Args {
    /// retail, ecommerce, marketing or sales
    #[arg(default_value_t = Profile::default())]
    profile: Profile,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let profile = args.profile;

    let rows = generate(profile, Utc::now().date_naive(), &mut rand::thread_rng());
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    if let Some(first) = rows.first() {
        wtr.write_record(first.headers())?;
    }
    for row in &rows {
        wtr.write_record(row.fields().iter().map(|(_, v)| match v {
            Value::Empty => String::new(),
            other => other.to_string(),
        }))?;
    }
    wtr.flush()?;

    eprintln!("→ wrote {} {} rows", rows.len(), profile);
    Ok(())
}
