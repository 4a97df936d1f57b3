use std::collections::HashMap;
use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vtrack::plate::{PlateReader, PlateText};
use vtrack::{Config, Frame, Session, ViolationEvent};

/// Replays recorded detector output through the tracking pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON lines file, one recorded frame per line
    #[arg(short, long)]
    frames: PathBuf,

    /// JSON config file, defaults are used for missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON map of track id to plate text, standing in for the OCR engine
    #[arg(short, long)]
    plates: Option<PathBuf>,

    /// Where to write the violation report
    #[arg(short, long)]
    report: Option<PathBuf>,
}

/// Plate texts known ahead of time, keyed by track id.
struct RecordedPlates(HashMap<u32, String>);

impl PlateReader for RecordedPlates {
    fn read(&mut self, event: &ViolationEvent) -> PlateText {
        match self.0.get(&event.track_id) {
            Some(raw) => PlateText::from_engine(raw),
            None => PlateText::Unreadable,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    let mut plates = RecordedPlates(match &args.plates {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening plates {}", path.display()))?;
            serde_json::from_reader(std::io::BufReader::new(file))?
        }
        None => HashMap::new(),
    });

    let mut session = Session::new(config)?;

    let file = std::fs::File::open(&args.frames)
        .with_context(|| format!("opening frames {}", args.frames.display()))?;

    let mut processed = 0usize;
    for (line_no, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let frame: Frame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("line {}: skipping malformed frame: {}", line_no + 1, err);
                continue;
            }
        };

        let outcome = session
            .process_frame(&frame)
            .with_context(|| format!("line {}", line_no + 1))?;
        processed += 1;

        for event in &outcome.violations {
            let plate = plates.read(event);
            println!(
                "frame {} track {} speed {:.2} km/h{} plate {}",
                processed,
                event.track_id,
                event.speed,
                if event.over_limit { " OVER LIMIT" } else { "" },
                plate
            );

            session.record_violation(event, &plate, chrono::Local::now().time());
        }
    }

    log::info!(
        "{} frames processed, {} violations recorded",
        processed,
        session.violations().len()
    );

    if let Some(path) = &args.report {
        if session.violations().is_empty() {
            log::warn!("no violations recorded, report not written");
        } else {
            let report = session
                .violations()
                .render(chrono::Local::now().date_naive())?;
            std::fs::write(path, report)
                .with_context(|| format!("writing report {}", path.display()))?;
            log::info!("report written to {}", path.display());
        }
    }

    Ok(())
}
