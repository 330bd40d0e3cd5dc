use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::JobSimulationResult;

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[JobSimulationResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Special Order Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "================================".cyan())?;

    let total_runs = results.len();
    let passed_runs = results.iter().filter(|r| r.passed).count();
    let failed_runs = total_runs - passed_runs;

    // Overall stats
    writeln!(out, "Total runs: {total_runs}")?;
    writeln!(out, "Passed: {}", passed_runs.to_string().green())?;
    writeln!(out, "Failed: {}", failed_runs.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(passed_runs, total_runs))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };

        writeln!(
            out,
            "{} {} (seed {}, level {})",
            status,
            result.job_name.bold(),
            result.seed,
            result.level
        )?;
        writeln!(
            out,
            "   Orders: {}/{} generated, {} unavailable",
            result.orders_generated, result.iterations_run, result.unavailable
        )?;
        writeln!(
            out,
            "   Objectives per order: {}",
            format_histogram(result.objective_histogram.iter())
        )?;
        writeln!(
            out,
            "   Rewards: {}",
            format_histogram(result.reward_histogram.iter())
        )?;
        writeln!(
            out,
            "   Average duration: {:.0}s",
            result.average_duration_secs
        )?;

        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    if let Some(slowest) = results.iter().max_by_key(|r| r.elapsed) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Slowest: {} seed {} ({:?})",
            slowest.job_name.yellow(),
            slowest.seed,
            slowest.elapsed
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[JobSimulationResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[JobSimulationResult]) -> Result<()> {
    writeln!(out, "# Jobcraft Special Order Results\n")?;

    let total_runs = results.len();
    let passed_runs = results.iter().filter(|r| r.passed).count();

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total_runs}")?;
    writeln!(out, "- **Passed**: {passed_runs}")?;
    writeln!(out, "- **Failed**: {}", total_runs - passed_runs)?;
    writeln!(
        out,
        "- **Success rate**: {:.1}%\n",
        success_rate(passed_runs, total_runs)
    )?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Job | Seed | Level | Orders | Unavailable | Avg duration (s) | Status |")?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {}/{} | {} | {:.0} | {status} |",
            result.job_name,
            result.seed,
            result.level,
            result.orders_generated,
            result.iterations_run,
            result.unavailable,
            result.average_duration_secs
        )?;
    }

    for result in results.iter().filter(|r| !r.failures.is_empty()) {
        writeln!(out, "\n### ❌ {} (seed {})\n", result.job_name, result.seed)?;
        for failure in &result.failures {
            writeln!(out, "- {failure}")?;
        }
    }
    Ok(())
}

fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / total as f64) * 100.0;
    rate
}

fn format_histogram<'a, K, I>(entries: I) -> String
where
    K: std::fmt::Display + 'a,
    I: Iterator<Item = (&'a K, &'a usize)>,
{
    let parts: Vec<String> = entries.map(|(key, count)| format!("{key}×{count}")).collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}
