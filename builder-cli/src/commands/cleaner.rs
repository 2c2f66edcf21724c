//! `builder cleaner`: orphaned repository directory reconciliation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use builder_cleaner::{cycle, CycleReport, FileNamespaceSource, NamespaceSource, RepoLock};
use builder_core::{config, CleanerConfig};
use builder_daemon::{init_tracing, start_blocking};

#[derive(Subcommand, Debug)]
pub enum CleanerCommand {
    /// Run the cleaner loop in the foreground until ctrl-c.
    Run(CleanerArgs),
    /// Run a single reconciliation cycle and print what happened.
    Once(OnceArgs),
    /// Show which repository directories are orphaned without removing them.
    Diff(DiffArgs),
}

/// Settings shared by every cleaner subcommand. Flags override the config
/// file, which is overridden by `GIT_HOME` / `CLEANER_POLL_SLEEP_DURATION_SEC`.
#[derive(Args, Debug, Default)]
pub struct CleanerArgs {
    /// Config file (default: ~/.builder/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the `<namespace>.git` repositories.
    #[arg(long)]
    pub git_home: Option<PathBuf>,

    /// YAML or JSON namespace list used as the live namespace set.
    #[arg(long)]
    pub namespaces_file: Option<PathBuf>,

    /// Seconds to sleep between cycles.
    #[arg(long)]
    pub poll_interval_secs: Option<u64>,
}

#[derive(Args, Debug)]
pub struct OnceArgs {
    #[command(flatten)]
    pub common: CleanerArgs,

    /// Report orphans without removing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the cycle report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub common: CleanerArgs,

    /// Print the orphan list as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(command: CleanerCommand) -> Result<()> {
    match command {
        CleanerCommand::Run(args) => {
            let (config, source) = args.resolve()?;
            start_blocking(config, source, RepoLock::new()).context("cleaner exited with error")?;
        }
        CleanerCommand::Once(args) => {
            init_tracing();
            let report = run_once(&args.common, args.dry_run)?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report)
                        .context("failed to render cycle report JSON")?
                );
            } else {
                print_report(&report);
            }
        }
        CleanerCommand::Diff(args) => {
            let report = run_once(&args.common, true)?;
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report.orphans)
                        .context("failed to render orphan list JSON")?
                );
            } else if report.is_clean() {
                println!("no orphaned repositories in {}", report.git_home.display());
            } else {
                for path in report.orphan_paths() {
                    println!("{}", path.display());
                }
            }
        }
    }
    Ok(())
}

impl CleanerArgs {
    fn resolve(&self) -> Result<(CleanerConfig, Arc<dyn NamespaceSource>)> {
        let mut config = match &self.config {
            Some(path) => config::load_at(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load_or_default().context("failed to load default config")?,
        };
        config
            .apply_env()
            .context("invalid cleaner environment override")?;

        if let Some(home) = &self.git_home {
            config.git_home = home.clone();
        }
        if let Some(file) = &self.namespaces_file {
            config.namespaces_file = Some(file.clone());
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval_secs = secs;
        }
        config.validate().context("invalid cleaner configuration")?;

        let file = config.namespaces_file.clone().context(
            "no namespace source configured; pass --namespaces-file or set namespaces_file",
        )?;
        let source: Arc<dyn NamespaceSource> = Arc::new(FileNamespaceSource::new(file));
        Ok((config, source))
    }
}

fn run_once(args: &CleanerArgs, dry_run: bool) -> Result<CycleReport> {
    let (config, source) = args.resolve()?;
    cycle::run(&config.git_home, source.as_ref(), &RepoLock::new(), dry_run)
        .context("cleaner cycle failed")
}

fn print_report(report: &CycleReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let home = report.git_home.display();

    if report.is_clean() {
        println!(
            "{prefix}✓ {home}: nothing to do ({} namespaces, {} repositories)",
            report.namespaces,
            report.scanned.len()
        );
        return;
    }

    println!(
        "{prefix}✓ {home} cleaned ({} orphaned, {} removed, {} failed)",
        report.orphans.len(),
        report.removed.len(),
        report.failed.len()
    );

    if report.dry_run {
        for path in report.orphan_paths() {
            println!("  ~  {}", path.display());
        }
        return;
    }
    for path in &report.removed {
        println!("  ✗  {}", path.display());
    }
    for path in &report.already_gone {
        println!("  ·  {} (already gone)", path.display());
    }
    for failure in &report.failed {
        println!("  !  {} ({})", failure.path.display(), failure.error);
    }
}
