//! Taiji Posture Demo
//!
//! Runs a practice session in the terminal:
//! - Synthetic skeleton (no camera) or a JSON-lines detector feed
//! - Live status line once per second of footage
//! - Session summary and goal progress at the end
//!
//! ```text
//! session-demo [--duration 30s] [--interval 100ms] [--locale en|ja]
//!              [--posture posture.json] [--feed frames.jsonl|-]
//!              [--seed N] [--json-logs]
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use taiji_core::Timestamp;
use taiji_pose::{Locale, Status};
use taiji_runtime::{
    init_tracing, Controller, FrameReport, LogFormat, ReferencePosture, RuntimeConfig,
    TelemetryConfig,
};
use taiji_session::{HistoryPolicy, SessionState};
use taiji_source::{FrameSource, JsonLinesSource, SyntheticConfig, SyntheticSource};
use tokio::sync::watch;
use tracing::info;

/// Frames buffered between the feed reader thread and the frame loop
const FEED_CAPACITY: usize = 64;

struct Options {
    duration: Duration,
    interval: Duration,
    locale: Locale,
    posture: Option<PathBuf>,
    feed: Option<String>,
    seed: u64,
    json_logs: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            duration: Duration::from_secs(30),
            interval: Duration::from_millis(100),
            locale: Locale::English,
            posture: None,
            feed: None,
            seed: 42,
            json_logs: false,
        }
    }
}

fn parse_args() -> Result<Options, Box<dyn std::error::Error>> {
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{arg} needs a value"));
        match arg.as_str() {
            "--duration" => options.duration = humantime::parse_duration(&value()?)?,
            "--interval" => options.interval = humantime::parse_duration(&value()?)?,
            "--locale" => {
                options.locale = match value()?.as_str() {
                    "en" => Locale::English,
                    "ja" => Locale::Japanese,
                    other => return Err(format!("unknown locale {other:?}").into()),
                }
            }
            "--posture" => options.posture = Some(PathBuf::from(value()?)),
            "--feed" => options.feed = Some(value()?),
            "--seed" => options.seed = value()?.parse()?,
            "--json-logs" => options.json_logs = true,
            other => return Err(format!("unknown argument {other:?}").into()),
        }
    }

    Ok(options)
}

fn open_source(options: &Options) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    let source: Box<dyn FrameSource> = match options.feed.as_deref() {
        Some("-") => Box::new(JsonLinesSource::new(BufReader::new(io::stdin())).spawn(FEED_CAPACITY)?),
        Some(path) => {
            Box::new(JsonLinesSource::new(BufReader::new(File::open(path)?)).spawn(FEED_CAPACITY)?)
        }
        None => Box::new(SyntheticSource::new(SyntheticConfig {
            frame_interval: options.interval,
            seed: options.seed,
            ..Default::default()
        })),
    };
    Ok(source)
}

/// Print a status line whenever another second of footage has been evaluated
async fn render(mut reports: watch::Receiver<Option<FrameReport>>, locale: Locale) {
    let mut next_line = Timestamp::ZERO;

    while reports.changed().await.is_ok() {
        let Some(report) = reports.borrow_and_update().clone() else {
            continue;
        };
        let evaluation = &report.evaluation;
        if evaluation.timestamp < next_line {
            continue;
        }
        next_line = evaluation.timestamp.saturating_add(Duration::from_secs(1));

        println!(
            "[{:>6}] {:<28} {:>5.1}%  frames {:>4}  mean {:>5.1}%",
            elapsed(&report.session),
            locale.status_headline(evaluation.status),
            evaluation.accuracy_percent,
            report.session.frame_count,
            report.session.running_mean_accuracy,
        );
        if evaluation.status != Status::Good {
            for verdict in evaluation.verdicts.iter().filter(|v| !v.in_range) {
                println!("         - {}", verdict.message);
            }
        }
    }
}

fn elapsed(state: &SessionState) -> String {
    let whole = Duration::from_secs(state.active_elapsed.as_secs());
    humantime::format_duration(whole).to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = parse_args()?;

    init_tracing(&TelemetryConfig {
        default_directive: "warn,taiji_runtime=info".to_string(),
        format: if options.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..Default::default()
    })?;

    let posture = match &options.posture {
        Some(path) => ReferencePosture::load(path)?,
        None => ReferencePosture::default(),
    };

    println!("Taiji Posture - practice session");
    println!("  posture : {}", posture.name);
    println!("  joints  : {} measured, {} scored", posture.joints.len(), posture.tolerances.len());
    println!("  duration: {}", humantime::format_duration(options.duration));
    println!();

    let config = RuntimeConfig::default()
        .with_frame_interval(options.interval)
        .with_locale(options.locale)
        .with_history(HistoryPolicy::Retain {
            capacity: Some(10 * 60 * 10),
        });

    let source = open_source(&options)?;
    let mut controller = Controller::new(source, posture, config);
    let renderer = tokio::spawn(render(controller.subscribe(), options.locale));

    controller.session().start();
    let stats = controller.run(tokio::time::sleep(options.duration)).await;
    controller.session().stop();

    let state = controller.session().state();
    let progress = controller.progress();
    let history_len = controller.session().with(|s| s.history().count());
    let goals = controller.config().goals;

    drop(controller);
    renderer.await?;

    info!(steps = stats.steps, out_of_order = stats.out_of_order, "demo finished");

    println!();
    println!("Session summary");
    println!("  frames evaluated : {}", stats.frames_evaluated);
    println!("  frames in session: {}", state.frame_count);
    println!("  frames recorded  : {}", history_len);
    println!("  mean accuracy    : {:.1}%", state.running_mean_accuracy);
    println!("  practice time    : {}", elapsed(&state));
    println!(
        "  goals            : {:.0}% of {}, {:.0}% of {:.0}% accuracy{}",
        progress.duration * 100.0,
        humantime::format_duration(goals.target_duration),
        progress.accuracy * 100.0,
        goals.target_accuracy,
        if progress.is_complete() { " - complete" } else { "" },
    );

    Ok(())
}
