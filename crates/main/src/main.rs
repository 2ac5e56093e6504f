use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use hod_reports::config::DEPARTMENT_ENV;
use hod_reports::dates::{self, DateRange};
use hod_reports::emitter::DocumentEmitter;
use hod_reports::review;
use hod_reports::{
    BatchSelection, DailySummary, PdfEmitter, Planner, ReportConfig, ReportError, ReportPlan,
    Snapshot, TextEmitter,
};
use log::info;

/// Generates HOD leave and on-duty reports from a backend snapshot.
///
/// PDF output needs the Roboto fonts under `assets/fonts` (or the directory named by
/// `HOD_REPORTS_FONTS_DIR`); Liberation Sans is used when they are missing.
#[derive(Parser)]
#[command(author, version, about = "Daily leave and OD reports for the HOD dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the daily leave/OD report for one day.
    Daily {
        #[command(flatten)]
        input: InputArgs,

        /// Report day (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export the leave requests of one batch, optionally narrowed to a section and date range.
    #[command(name = "batch-leave", aliases = ["batch_leave"])]
    BatchLeave {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long)]
        batch: String,

        #[arg(long)]
        section: Option<String>,

        /// First day of the range (YYYY-MM-DD).
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Last day of the range, defaults to `--from`.
        #[arg(long, value_parser = parse_date, requires = "from")]
        to: Option<NaiveDate>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the department summary for one day.
    Summary {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// List requests waiting for the HOD decision.
    Pending {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List batches and their sections.
    Batches {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Snapshot JSON with `leaveRequests`, `odRequests`, `defaulters` and `batches`.
    #[arg(long, short)]
    input: PathBuf,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, env = DEPARTMENT_ENV, default_value = "Department")]
    department: String,

    #[arg(long)]
    institution: Option<String>,

    /// Image printed above the report header.
    #[arg(long)]
    logo: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Add PDF outline entries for the report sections.
    #[arg(long)]
    bookmarks: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pdf,
    Text,
}

impl OutputArgs {
    fn config(&self) -> ReportConfig {
        ReportConfig::new(self.department.as_str())
            .with_institution_name(self.institution.clone())
            .with_logo_path(self.logo.clone())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(value.to_string()).to_string())
}

fn load_snapshot(input: &InputArgs) -> Result<Snapshot, ReportError> {
    let json = fs::read_to_string(&input.input)?;
    let snapshot = Snapshot::from_json(&json)?;
    info!(
        "loaded {} leave, {} OD requests and {} defaulters from {}",
        snapshot.leave_requests.len(),
        snapshot.od_requests.len(),
        snapshot.defaulters.len(),
        input.input.display()
    );
    Ok(snapshot)
}

fn emit(config: &ReportConfig, output: &OutputArgs, plan: &ReportPlan) -> Result<(), ReportError> {
    let (filename, bytes) = match output.format {
        Format::Text => {
            let emitter = TextEmitter::new();
            (emitter.filename_for(plan), emitter.emit(plan)?)
        }
        Format::Pdf => {
            let emitter = PdfEmitter::new(config);
            let bytes = render_pdf(&emitter, plan, output.bookmarks)?;
            (emitter.filename_for(plan), bytes)
        }
    };

    write_output(&output.out_dir, &filename, &bytes)
}

#[cfg(feature = "bookmarks")]
fn render_pdf(
    emitter: &PdfEmitter,
    plan: &ReportPlan,
    bookmarks: bool,
) -> Result<Vec<u8>, ReportError> {
    if bookmarks {
        Ok(emitter.render_with_bookmarks(plan)?.bytes)
    } else {
        emitter.emit(plan)
    }
}

#[cfg(not(feature = "bookmarks"))]
fn render_pdf(
    emitter: &PdfEmitter,
    plan: &ReportPlan,
    bookmarks: bool,
) -> Result<Vec<u8>, ReportError> {
    if bookmarks {
        log::warn!("built without the `bookmarks` feature; rendering without outline entries");
    }
    emitter.emit(plan)
}

fn write_output(out_dir: &Path, filename: &str, bytes: &[u8]) -> Result<(), ReportError> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(filename);
    fs::write(&path, bytes)?;
    println!("Generated {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn run(command: Commands) -> Result<(), ReportError> {
    match command {
        Commands::Daily {
            input,
            date,
            output,
        } => {
            let snapshot = load_snapshot(&input)?;
            let config = output.config();
            let plan = Planner::new(&config).plan_daily_report(&snapshot, date);
            emit(&config, &output, &plan)
        }
        Commands::BatchLeave {
            input,
            batch,
            section,
            from,
            to,
            output,
        } => {
            let snapshot = load_snapshot(&input)?;
            let config = output.config();
            let range = match from {
                Some(from) => Some(DateRange::new(from, to).ok_or_else(|| {
                    ReportError::InvalidDate(format!(
                        "{} is before {}",
                        to.map(dates::iso_day).unwrap_or_default(),
                        dates::iso_day(from)
                    ))
                })?),
                None => None,
            };
            let selection = BatchSelection::new(batch)
                .with_section(section)
                .with_range(range);
            let plan = Planner::new(&config).plan_batch_leave_report(&snapshot, &selection);
            emit(&config, &output, &plan)
        }
        Commands::Summary { input, date } => {
            let snapshot = load_snapshot(&input)?;
            print!("{}", DailySummary::compute(&snapshot, date));
            Ok(())
        }
        Commands::Pending { input } => {
            let snapshot = load_snapshot(&input)?;
            let waiting = review::awaiting_hod(snapshot.all_requests());
            if waiting.is_empty() {
                println!("No requests awaiting HOD approval.");
            }
            for request in waiting {
                println!(
                    "{:<5} {:<24} {:<12} {} / {}  {} - {}",
                    request.kind.label(),
                    request.student_name,
                    request.roll_no,
                    request.batch_label(),
                    request.section_label(),
                    dates::display_day(request.from_date),
                    dates::display_day(request.to_date),
                );
            }
            Ok(())
        }
        Commands::Batches { input } => {
            let snapshot = load_snapshot(&input)?;
            for batch in review::batch_directory(&snapshot.batches) {
                let sections: Vec<&str> = batch.sections.iter().map(|s| s.name.as_str()).collect();
                println!("{}: {}", batch.name, sections.join(", "));
            }
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
