//! Terminal rendering of session updates and reports.

use std::io::Write;

use colored::Colorize;
use pitchcoach_common::{PitchDirection, ProblemSection, SessionReport, SessionStatus, WindowPoint};
use pitchcoach_engine::SessionUpdate;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::OutputFormat;

/// Print updates until the session goes away.
pub async fn print_updates(
    mut updates: broadcast::Receiver<SessionUpdate>,
    format: OutputFormat,
    quiet: bool,
) {
    let mut last_sections: Vec<ProblemSection> = Vec::new();
    let mut meter_shown = false;

    loop {
        let update = match updates.recv().await {
            Ok(update) => update,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Renderer skipped {} updates", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if matches!(format, OutputFormat::Json) || quiet {
            continue;
        }

        match update {
            SessionUpdate::Frame { position, window } => {
                print!("\r{}", meter_line(position, &window));
                let _ = std::io::stdout().flush();
                meter_shown = true;
            }
            SessionUpdate::StatusChanged(status) => {
                end_meter(&mut meter_shown);
                println!("{}", status_line(&status));
            }
            SessionUpdate::SectionsChanged(sections) => {
                if sections != last_sections && !sections.is_empty() {
                    end_meter(&mut meter_shown);
                    print_sections(&sections);
                }
                last_sections = sections;
            }
            SessionUpdate::PerformanceComplete { message } => {
                end_meter(&mut meter_shown);
                if let Some(message) = message {
                    println!("{}", message.green());
                }
            }
        }
    }
    end_meter(&mut meter_shown);
}

fn end_meter(shown: &mut bool) {
    if std::mem::take(shown) {
        println!();
    }
}

fn meter_line(position: f64, window: &[WindowPoint]) -> String {
    let here = window
        .iter()
        .min_by(|a, b| (a.time - position).abs().total_cmp(&(b.time - position).abs()));
    let format_pitch = |pitch: Option<f64>| match pitch {
        Some(hz) => format!("{:>6.1} Hz", hz),
        None => format!("{:>9}", "-"),
    };
    let reference = here.and_then(|p| p.reference);
    let user = here.and_then(|p| p.user);
    format!(
        "{} {}  reference {}  you {}",
        "▶".cyan(),
        format_time(position).bold(),
        format_pitch(reference).dimmed(),
        format_pitch(user)
    )
}

fn status_line(status: &SessionStatus) -> String {
    match status {
        SessionStatus::Idle => "Idle".dimmed().to_string(),
        SessionStatus::Connecting => "Connecting to analyzer...".to_string(),
        SessionStatus::Performing => "Performing. Press Ctrl+C to finish.".green().to_string(),
        SessionStatus::Finishing => "Waiting for the analyzer to finish...".yellow().to_string(),
        SessionStatus::Completed => "Performance complete".green().bold().to_string(),
        SessionStatus::Disconnected { reason } => {
            format!("{}: {}", "Disconnected".red().bold(), reason)
        }
        SessionStatus::Aborted => "Performance aborted".yellow().to_string(),
    }
}

pub fn print_sections(sections: &[ProblemSection]) {
    println!(
        "{} problem {}:",
        sections.len().to_string().yellow().bold(),
        if sections.len() == 1 { "section" } else { "sections" }
    );
    for section in sections {
        let direction = match section.direction {
            PitchDirection::Above => "sharp".red(),
            PitchDirection::Below => "flat".blue(),
            PitchDirection::Unknown => "off".normal(),
        };
        println!(
            "  {} - {}  {:>5.1}% {}",
            format_time(section.start_time),
            format_time(section.end_time),
            section.avg_deviation,
            direction
        );
    }
}

pub fn print_report(report: &SessionReport, format: OutputFormat) -> anyhow::Result<()> {
    if matches!(format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("\n{}", "Summary".bold());
    println!("  Status: {}", report.status.label());
    if let Some(duration) = report.duration {
        println!("  Track length: {}", format_time(duration));
    }
    println!("  Pitch samples received: {}", report.user_samples);
    if report.dropped_audio_chunks > 0 {
        println!(
            "  Audio chunks dropped: {}",
            report.dropped_audio_chunks.to_string().yellow()
        );
    }
    if report.analyzed_sections.is_empty() {
        println!("  {}", "No problem sections".green());
    } else {
        print_sections(&report.analyzed_sections);
    }
    Ok(())
}

/// `m:ss.s`
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor();
    format!("{}:{:04.1}", minutes as u64, seconds - minutes * 60.0)
}
