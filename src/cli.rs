use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum, error::ErrorKind};
use tracing::info;

use crate::config::{DigestConfig, Workflow};
use crate::export::write_json;
use crate::metrics::platform_shares;
use crate::pipeline::Pipeline;
use crate::ranking::Digest;
use crate::timestamps::parse_timestamp;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WorkflowArg {
    Communities,
    Discussions,
}

impl From<WorkflowArg> for Workflow {
    fn from(value: WorkflowArg) -> Self {
        match value {
            WorkflowArg::Communities => Workflow::Communities,
            WorkflowArg::Discussions => Workflow::Discussions,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "community_digest",
    disable_help_subcommand = true,
    about = "Build a ranked digest of communities or discussions",
    long_about = "Load curated sources from a config file, normalize, score, deduplicate and rank their records, then print a summary and optionally export JSON.",
    after_help = "Set RUST_LOG=debug for per-source fetch details."
)]
struct DigestCli {
    #[arg(
        long,
        value_name = "PATH",
        help = "JSON config file describing sources and scoring"
    )]
    config: PathBuf,
    #[arg(long, value_name = "PATH", help = "Optional JSON export path")]
    output: Option<PathBuf>,
    #[arg(long, value_enum, help = "Override the configured workflow")]
    workflow: Option<WorkflowArg>,
    #[arg(long, default_value_t = 10, help = "Number of top-ranked items to print")]
    top: usize,
    #[arg(
        long,
        value_name = "TIMESTAMP",
        value_parser = parse_now_arg,
        help = "Fixed clock for scoring (RFC 3339); defaults to the current time"
    )]
    now: Option<DateTime<Utc>>,
}

/// Run the digest command with `args_iter` (program name excluded).
pub fn run_digest<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<DigestCli, _>(
        std::iter::once("community_digest".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = DigestConfig::load(&cli.config)?;
    if let Some(workflow) = cli.workflow {
        config.workflow = workflow.into();
    }
    let mut pipeline = Pipeline::new(config.pipeline_config())?;
    for source in config.build_sources() {
        pipeline.register_source(source);
    }
    if !pipeline.has_sources() {
        println!("No sources configured in {}.", cli.config.display());
    }

    let digest = pipeline.run_at(cli.now.unwrap_or_else(Utc::now));
    if let Some(skew) = platform_shares(&digest.items) {
        info!(
            platforms = skew.platforms,
            max_share = skew.max_share,
            min_share = skew.min_share,
            ratio = skew.ratio,
            "platform shares"
        );
    }
    print!("{}", format_summary(&digest, cli.top));

    if let Some(path) = cli.output {
        write_json(&digest, &path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Plain-text summary: totals, top items, categories and per-source stats.
pub fn format_summary(digest: &Digest, top: usize) -> String {
    let mut out = String::new();
    let totals = &digest.totals;
    let _ = writeln!(
        out,
        "{} items across {} platforms and {} categories (total metric {:.0})",
        totals.item_count,
        totals.platform_count,
        totals.category_count,
        totals.total_metric
    );
    if digest.is_empty() {
        return out;
    }

    let _ = writeln!(out, "\nTop {}:", top.min(digest.items.len()));
    for (rank, item) in digest.top(top).iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. [{}] {} ({}) metric={:.0} score={:.2}",
            rank + 1,
            item.category,
            item.title,
            item.platform,
            item.numeric_metric,
            item.engagement_score
        );
    }

    let _ = writeln!(out, "\nCategories:");
    for (label, group) in &digest.categories {
        let _ = writeln!(
            out,
            "  {label}: {} items, metric {:.0}",
            group.count, group.total_metric
        );
    }

    if !digest.sources.is_empty() {
        let _ = writeln!(out, "\nSources:");
        for report in &digest.sources {
            let stats = &report.stats;
            match &stats.last_error {
                Some(err) => {
                    let _ = writeln!(out, "  {}: failed ({err})", report.source_id);
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  {}: fetched {}, admitted {}, duplicates {}, skipped {} in {}ms",
                        report.source_id,
                        stats.fetched,
                        stats.admitted,
                        stats.duplicates,
                        stats.skipped,
                        stats.fetch_ms
                    );
                }
            }
        }
    }
    out
}

fn parse_now_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    match parse_timestamp(raw) {
        Some(now) => Ok(now),
        None => Err(format!("invalid --now timestamp '{raw}'")),
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
