use std::env::args;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use color_eyre::eyre::{Context, OptionExt, Result};
use rankseries::resample::outages;
use rankseries::{Config, RecordDecoder, Resampler};

fn main() -> Result<()> {
    color_eyre::install().unwrap();
    let (path, config) = parse_args()?;

    let buffer = std::fs::read(&path).wrap_err("Could not read stat file")?;
    let mut decoder = RecordDecoder::new(&buffer);
    let events = decoder.decode().wrap_err("Not a stat file")?;
    eprintln!(
        "{} records, {} violations{}",
        events.len(),
        decoder.violations().len(),
        if decoder.truncated() {
            ", last record incomplete"
        } else {
            ""
        }
    );

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .wrap_err("System clock before 1970")?
        .as_secs();
    let samples = Resampler::from_config(&config).resample(&events, now);
    if samples.is_empty() {
        eprintln!("No chartable data for this window");
        return Ok(());
    }

    let line: Vec<_> = samples.iter().map(|s| s.sentinel().to_string()).collect();
    println!("{}", line.join(","));
    for outage in outages(&samples) {
        eprintln!("{:?} for intervals {:?}", outage.kind, outage.range);
    }
    Ok(())
}

fn parse_args() -> Result<(PathBuf, Config)> {
    let mut args = args().skip(1);
    let path: PathBuf = args
        .next()
        .ok_or_eyre("needs at least one argument: the path to the stat file")?
        .into();
    let config = match args.next() {
        Some(ron) => Config::from_ron(&ron).wrap_err("Invalid config")?,
        None => Config::default(),
    };
    Ok((path, config))
}
