use crate::infra::{open_tracker, Tracker};
use clap::Args;
use job_tracker::config::AppConfig;
use job_tracker::error::AppError;
use job_tracker::tracker::analytics::{requested_or_current, FallbackReason, ReportOutcome};
use job_tracker::tracker::export_filename;
use job_tracker::tracker::{MonthlyReport, VacancyMonthlySummary};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportKind {
    Summary,
    Export,
    Detailed,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Report year (defaults to the current month together with --month)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Report month, 1-12
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=12))]
    pub(crate) month: Option<i32>,
    /// Override the directory holding vacancies.csv and events.csv
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Print the raw JSON payload served by the HTTP API
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) report: ReportArgs,
    /// Write the CSV to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_report(
    kind: ReportKind,
    args: ReportArgs,
    output: Option<PathBuf>,
) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(data_dir) = args.data_dir.clone() {
        config.storage.data_dir = data_dir;
    }

    let tracker = open_tracker(config.storage)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&tracker, kind, &args, output, &mut out)
}

pub(crate) fn execute<W: Write>(
    tracker: &Tracker,
    kind: ReportKind,
    args: &ReportArgs,
    output: Option<PathBuf>,
    out: &mut W,
) -> Result<(), AppError> {
    let (year, month) = requested_or_current(args.year, args.month);

    match kind {
        ReportKind::Summary => {
            let outcome = tracker.analytics.monthly_report(year, month);
            note_fallback(&outcome);
            if args.json {
                write_json(out, outcome.value())?;
            } else {
                render_summary(out, outcome.value())?;
            }
        }
        ReportKind::Export => {
            let outcome = tracker.analytics.csv_export(year, month);
            note_fallback(&outcome);
            match output {
                Some(path) => {
                    fs::write(&path, outcome.value())?;
                    writeln!(
                        out,
                        "Wrote {} to {}",
                        export_filename(year, month),
                        path.display()
                    )?;
                }
                None => out.write_all(outcome.value().as_bytes())?,
            }
        }
        ReportKind::Detailed => {
            let outcome = tracker.analytics.detailed_summary(year, month);
            note_fallback(&outcome);
            if args.json {
                write_json(out, outcome.value())?;
            } else {
                render_detailed(out, year, month, outcome.value())?;
            }
        }
    }

    Ok(())
}

fn note_fallback<T>(outcome: &ReportOutcome<T>) {
    if let ReportOutcome::Fallback { reason, .. } = outcome {
        match reason {
            FallbackReason::InvalidPeriod => eprintln!("note: invalid period, showing defaults"),
            FallbackReason::Failed(cause) => {
                eprintln!("note: report generation failed ({cause}), showing defaults")
            }
        }
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn render_summary<W: Write>(out: &mut W, report: &MonthlyReport) -> io::Result<()> {
    let metrics = &report.metrics;
    writeln!(out, "Job search report for {}", report.period)?;
    writeln!(
        out,
        "- {} new vacancies | {} activities",
        metrics.new_vacancies_count, metrics.activities_count
    )?;
    writeln!(
        out,
        "- applied {} | interview {} | offer {} | rejected {} | closed {}",
        metrics.applications_sent,
        metrics.interviews,
        metrics.offers,
        metrics.rejected,
        metrics.closed
    )?;

    if report.recent_activity.is_empty() {
        writeln!(out, "No activity recorded.")?;
        return Ok(());
    }

    writeln!(out, "Recent activity:")?;
    for record in &report.recent_activity {
        let kind = record.kind.as_deref().unwrap_or("unknown");
        let target = record
            .stage_to
            .as_deref()
            .map(|stage| format!(" -> {stage}"))
            .unwrap_or_default();
        let comment = record
            .comment
            .as_deref()
            .map(|comment| format!(" ({comment})"))
            .unwrap_or_default();
        writeln!(
            out,
            "  - {} {}{}{}",
            record.timestamp, kind, target, comment
        )?;
    }
    Ok(())
}

pub(crate) fn render_detailed<W: Write>(
    out: &mut W,
    year: i32,
    month: i32,
    summary: &[VacancyMonthlySummary],
) -> io::Result<()> {
    writeln!(out, "Vacancy activity for {year}-{month:02}")?;
    if summary.is_empty() {
        writeln!(out, "No vacancies created or updated.")?;
        return Ok(());
    }

    for vacancy in summary {
        writeln!(
            out,
            "{} / {} [{}]",
            vacancy.company.as_deref().unwrap_or("Unknown"),
            vacancy.position.as_deref().unwrap_or("Unknown"),
            vacancy.current_stage.as_deref().unwrap_or("unknown")
        )?;
        for entry in &vacancy.history {
            let status = entry.status.as_deref().unwrap_or("-");
            match entry.comment.as_deref() {
                Some(comment) => writeln!(out, "  {} {}: {}", entry.date, status, comment)?,
                None => writeln!(out, "  {} {}", entry.date, status)?,
            }
        }
    }
    Ok(())
}
