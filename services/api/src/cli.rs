use crate::report::{run_report, ExportArgs, ReportArgs, ReportKind};
use crate::server;
use clap::{Args, Parser, Subcommand};
use job_tracker::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Job Search Tracker",
    about = "Track vacancies and stage changes, and report on monthly job-search activity",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a monthly analytics projection from the local data directory
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Scalar counts and the most recent activity of the month
    Summary(ReportArgs),
    /// Chronological activity log as CSV
    Export(ExportArgs),
    /// Per-vacancy history for the month
    Detailed(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the directory holding vacancies.csv and events.csv
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report { command } => match command {
            ReportCommand::Summary(args) => run_report(ReportKind::Summary, args, None),
            ReportCommand::Export(ExportArgs { report, output }) => {
                run_report(ReportKind::Export, report, output)
            }
            ReportCommand::Detailed(args) => run_report(ReportKind::Detailed, args, None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["job-tracker-api"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["job-tracker-api", "serve", "--port", "9100"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(9100)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn report_subcommands_accept_period_and_output() {
        let cli = Cli::try_parse_from([
            "job-tracker-api",
            "report",
            "export",
            "--year",
            "2024",
            "--month",
            "5",
            "--output",
            "may.csv",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Report {
                command: ReportCommand::Export(args),
            }) => {
                assert_eq!(args.report.year, Some(2024));
                assert_eq!(args.report.month, Some(5));
                assert_eq!(args.output, Some(PathBuf::from("may.csv")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn month_outside_calendar_is_rejected() {
        let result = Cli::try_parse_from(["job-tracker-api", "report", "summary", "--month", "13"]);
        assert!(result.is_err());
    }
}
