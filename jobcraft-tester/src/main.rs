mod logic;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use jobcraft_engine::{JobEngine, ReloadSummary, WorkCatalog};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{
    ConfigDirLoader, JobSimulationResult, OrderSimulator, SimulationPlan, TesterEngine,
    resolve_seed_inputs,
};
use util::{now_ms, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "jobcraft-tester", version = "0.1.0")]
#[command(about = "Seeded QA sweeps over Jobcraft special-order generation")]
struct Args {
    /// Config directory holding settings.json and jobs/<id>.json (bundled sample when omitted)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Jobs to sample (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    jobs: String,

    /// List loaded jobs and exit
    #[arg(long)]
    list_jobs: bool,

    /// Server seeds to run (comma-separated; `start..end` ranges allowed)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Orders generated per job and seed; each one lands on a new day
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Player job level used for reward pools
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Fixed start time in epoch milliseconds (defaults to now)
    #[arg(long)]
    start_ms: Option<i64>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let loader = args
        .config_dir
        .as_deref()
        .map_or_else(ConfigDirLoader::bundled, ConfigDirLoader::from_dir);
    let engine = JobEngine::new(loader, WorkCatalog::standard());
    let summary = engine.reload().context("failed to load job configs")?;

    if args.list_jobs {
        return list_jobs(&args, &engine, &summary);
    }

    if args.report == ReportFormat::Console {
        announce_banner();
    }
    if args.verbose {
        report_load_issues(&summary);
    }

    let start_time = Instant::now();
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let job_ids = expand_jobs(&args.jobs, &engine);
    let plan = SimulationPlan {
        level: args.level,
        iterations: args.iterations,
        start_ms: args.start_ms.unwrap_or_else(now_ms),
    };
    let results = OrderSimulator::new(&engine, args.verbose).run(&job_ids, &seeds, &plan);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
    Ok(())
}

fn list_jobs(args: &Args, engine: &TesterEngine, summary: &ReloadSummary) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available jobs:")?;
    for job in engine.registry().jobs() {
        writeln!(
            output_target.writer(),
            "  {:20} - {} ({} objectives, max level {})",
            job.id(),
            job.name(),
            job.objective_map().len(),
            job.leveling().max_level
        )?;
    }
    for job_id in &summary.disabled {
        writeln!(output_target.writer(), "  {job_id:20} - disabled")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner() {
    println!("{}", "⚒️  Jobcraft Order Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn report_load_issues(summary: &ReloadSummary) {
    for (job_id, report) in &summary.reports {
        for issue in &report.issues {
            eprintln!("⚠️  {}: {issue:?}", job_id.yellow());
        }
    }
}

fn expand_jobs(jobs_arg: &str, engine: &TesterEngine) -> Vec<String> {
    let mut jobs = split_csv(jobs_arg);
    if jobs.iter().any(|job| job.eq_ignore_ascii_case("all")) {
        jobs.retain(|job| !job.eq_ignore_ascii_case("all"));
        for id in engine.registry().ids() {
            if !jobs.contains(&id) {
                jobs.push(id);
            }
        }
    }
    jobs
}

fn write_reports(args: &Args, results: &[JobSimulationResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(output_target.writer(), results)?;
        }
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    output_target.writer(),
                    "# Jobcraft Special Order Results\n\n_No jobs sampled._"
                )?;
            } else {
                logic::reports::generate_markdown_report(output_target.writer(), results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(output_target.writer(), "No jobs sampled.")?;
            } else {
                logic::reports::generate_console_report(
                    output_target.writer(),
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(output_target.writer())?;
            writeln!(
                output_target.writer(),
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
