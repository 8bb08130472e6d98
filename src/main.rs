//! Detector entrypoint: replays an event log through the per-user detector,
//! optionally writes records and a score trace, and evaluates against labels.

use clap::Parser;
use fingerprint_detector::{
    config::DetectorConfig,
    detector::Detector,
    eval::Evaluation,
    logging::{StructuredLogger, TraceWriter},
    model::WindowCapacity,
    risk::{ClassificationRecord, WeightingMode},
    source::{EventReader, GroundTruth},
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fingerprint-detector")]
#[command(version, about = "Daily behavioral fingerprint masquerade detection", long_about = None)]
struct Cli {
    /// JSON config file (default: $FINGERPRINT_CONFIG_PATH or config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dissimilarity threshold
    #[arg(short = 't', long = "thresh")]
    threshold: Option<f64>,

    /// Retrain length (days)
    #[arg(short, long)]
    retrain: Option<i64>,

    /// Weighting mode: none, idf or normalized
    #[arg(short, long)]
    mode: Option<WeightingMode>,

    /// Window capacity (-1 or "unlimited" for no bound)
    #[arg(short, long, allow_hyphen_values = true)]
    queue: Option<WindowCapacity>,

    /// Update the model also during detection
    #[arg(short, long)]
    update: bool,

    /// Write a per-user score trace to this file
    #[arg(short, long = "debug")]
    debug: Option<PathBuf>,

    /// NDJSON event log
    #[arg(long)]
    events: Option<PathBuf>,

    /// Ground truth `uid,epoch_seconds` file
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Write classification records as NDJSON
    #[arg(long)]
    records: Option<PathBuf>,

    /// Discard each user's trailing open day instead of classifying it
    #[arg(long)]
    no_flush: bool,

    /// Skip users that are not in the ground truth
    #[arg(long)]
    only_labeled: bool,

    /// Pop the oldest window entry whenever the window is full, before or instead of a push
    #[arg(long)]
    reference_eviction: bool,
}

impl Cli {
    fn apply(self, config: &mut DetectorConfig) {
        let detection = &mut config.detection;
        if let Some(t) = self.threshold {
            detection.threshold = t;
        }
        if let Some(r) = self.retrain {
            detection.retrain_length = r;
        }
        if let Some(m) = self.mode {
            detection.weighting = m;
        }
        if let Some(q) = self.queue {
            detection.window_capacity = q;
        }
        if self.update {
            detection.always_update = true;
        }
        if self.no_flush {
            detection.flush_open_days = false;
        }
        if self.reference_eviction {
            detection.reference_eviction = true;
        }
        if let Some(p) = self.events {
            config.input.events_path = p;
        }
        if self.labels.is_some() {
            config.input.labels_path = self.labels;
        }
        if self.only_labeled {
            config.input.only_labeled_users = true;
        }
        if self.records.is_some() {
            config.output.records_path = self.records;
        }
        if self.debug.is_some() {
            config.output.trace_path = self.debug;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("FINGERPRINT_CONFIG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let mut config = DetectorConfig::load(&config_path)?;
    cli.apply(&mut config);
    config.validate()?;

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(
        threshold = config.detection.threshold,
        retrain = config.detection.retrain_length,
        mode = %config.detection.weighting,
        capacity = %config.detection.window_capacity,
        update = config.detection.always_update,
        "detector starting"
    );

    let truth = match &config.input.labels_path {
        Some(path) => {
            let truth = GroundTruth::load(path)?;
            for (user_id, day) in truth.iter() {
                info!(user_id, %day, "ground truth switch");
            }
            Some(truth)
        }
        None => None,
    };

    let records = run(&config, truth.as_ref())?;

    if let Some(truth) = &truth {
        let eval = Evaluation::compute(&records, truth);
        println!("Results with threshold = {}:", config.detection.threshold);
        println!("{}", eval);
        println!("{}", Evaluation::csv_header());
        println!("{}", eval.csv_row(&config.detection));
    }
    Ok(())
}

fn run(
    config: &DetectorConfig,
    truth: Option<&GroundTruth>,
) -> Result<Vec<ClassificationRecord>, Box<dyn std::error::Error + Send + Sync>> {
    let file = File::open(&config.input.events_path)?;
    let mut reader = EventReader::new(BufReader::new(file));
    let mut detector = Detector::new(config.detection.clone()).with_trace(config.output.trace_path.is_some());
    let mut records = Vec::new();
    let mut out_of_order: u64 = 0;
    let mut skipped: u64 = 0;
    let progress_every = config.output.progress_every;

    while let Some(item) = reader.next() {
        let lines = reader.stats().lines;
        if progress_every > 0 && lines % progress_every == 0 {
            info!(lines, users = detector.user_count(), "progress");
        }
        let event = match item {
            Ok(ev) => ev,
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "skipping event");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if config.input.only_labeled_users && !truth.is_some_and(|t| t.contains(&event.user_id)) {
            skipped += 1;
            continue;
        }
        match detector.observe(&event) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => {
                out_of_order += 1;
                warn!(error = %e, "rejecting event");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let actions = detector.frequency().action_count();
    let finished = detector.finish()?;
    records.extend(finished.flushed);
    let stats = reader.stats();
    info!(
        lines = stats.lines,
        events = stats.events,
        malformed = stats.rejected,
        out_of_order,
        skipped,
        users = finished.users,
        actions,
        classified_days = records.len(),
        "stream complete"
    );

    if let Some(path) = &config.output.records_path {
        let mut w = BufWriter::new(File::create(path)?);
        for record in &records {
            StructuredLogger::emit_json(record, &mut w)?;
        }
        w.flush()?;
        info!(path = %path.display(), count = records.len(), "records written");
    }

    if let Some(path) = &config.output.trace_path {
        let mut w = BufWriter::new(File::create(path)?);
        let users = TraceWriter::new(config.output.trace_min_days, truth).write(&finished.traces, &mut w)?;
        w.flush()?;
        info!(path = %path.display(), users, "trace written");
    }

    Ok(records)
}
