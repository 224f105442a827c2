//! `info` command implementation.

use anyhow::{Context, Result};
use batcher::{
    batch_by_count, estimate_rate, number_of_batches, rate_to_hz, session_span, MotionSeries,
    SensorKind,
};
use contracts::WorkoutSession;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::input::load_session;

/// Recording info for JSON output
#[derive(Debug, Serialize)]
struct RecordingInfo {
    session_id: String,
    movement: String,
    accelerometer: StreamInfo,
    gyroscope: StreamInfo,
    start_time: Option<f64>,
    end_time: Option<f64>,
    duration_s: Option<f64>,
    target_entries_per_batch: usize,
    batches: BatchCounts,
}

#[derive(Debug, Serialize)]
struct StreamInfo {
    entries: usize,
    /// Rate stored in the recording
    rate: Option<u32>,
    /// Raw estimate from timestamps
    estimated_rate: Option<f64>,
    /// Estimate as a usable capture rate
    estimated_hz: Option<u32>,
}

/// Batch count per strategy, or why it could not be computed
#[derive(Debug, Serialize)]
struct BatchCounts {
    time_interval: Result<usize, String>,
    count: Result<usize, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(input = %args.input.display(), "Loading recording info");

    let session = load_session(&args.input)
        .with_context(|| format!("Failed to load recording {}", args.input.display()))?;
    let info = build_info(&session, args.target);

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize info")?;
        println!("{}", json);
    } else {
        print_info(&info);
    }

    Ok(())
}

fn stream_info(series: &MotionSeries, kind: SensorKind) -> StreamInfo {
    let estimated_rate = estimate_rate(&series.timestamps(kind));
    StreamInfo {
        entries: series.samples(kind).len(),
        rate: series.rate(kind),
        estimated_rate,
        estimated_hz: estimated_rate.and_then(rate_to_hz),
    }
}

fn build_info(session: &WorkoutSession, target: usize) -> RecordingInfo {
    let accelerometer = stream_info(&session.series, SensorKind::Accelerometer);
    let gyroscope = stream_info(&session.series, SensorKind::Gyroscope);

    // Batch counts use stored rates, falling back to the estimates
    let mut series = session.series.clone();
    for (kind, stream) in [
        (SensorKind::Accelerometer, &accelerometer),
        (SensorKind::Gyroscope, &gyroscope),
    ] {
        if series.rate(kind).is_none() {
            series.set_rate(kind, stream.estimated_hz);
        }
    }

    let span = session_span(&session.series);
    RecordingInfo {
        session_id: session.id.to_string(),
        movement: session.info.movement.clone(),
        accelerometer,
        gyroscope,
        start_time: span.start,
        end_time: span.end,
        duration_s: span.duration(),
        target_entries_per_batch: target,
        batches: BatchCounts {
            time_interval: number_of_batches(&series, target).map_err(|e| e.to_string()),
            count: batch_by_count(&series, target)
                .map(|batches| batches.len())
                .map_err(|e| e.to_string()),
        },
    }
}

fn opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_stream(name: &str, stream: &StreamInfo, last: bool) {
    let prefix = if last { "└─" } else { "├─" };
    println!(
        "   {} {}: {} entries, rate {} Hz, estimated {} ({} Hz)",
        prefix,
        name,
        stream.entries,
        opt(stream.rate),
        opt(stream.estimated_rate.map(|r| format!("{r:.3}"))),
        opt(stream.estimated_hz)
    );
}

fn print_info(info: &RecordingInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Motion Recording                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🏋 Session");
    println!("   ├─ Id: {}", info.session_id);
    println!("   └─ Movement: {}", info.movement);

    println!("\n📡 Streams");
    print_stream("Accelerometer", &info.accelerometer, false);
    print_stream("Gyroscope", &info.gyroscope, true);

    println!("\n⏱  Span");
    println!("   ├─ Start: {}", opt(info.start_time));
    println!("   ├─ End: {}", opt(info.end_time));
    println!("   └─ Duration: {}s", opt(info.duration_s.map(|d| format!("{d:.3}"))));

    println!(
        "\n📦 Batches (target {} entries)",
        info.target_entries_per_batch
    );
    for (name, count, last) in [
        ("time_interval", &info.batches.time_interval, false),
        ("count", &info.batches.count, true),
    ] {
        let prefix = if last { "└─" } else { "├─" };
        match count {
            Ok(n) => println!("   {} {}: {}", prefix, name, n),
            Err(e) => println!("   {} {}: n/a ({})", prefix, name, e),
        }
    }

    println!();
}
