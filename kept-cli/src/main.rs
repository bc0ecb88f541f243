use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use kept_core::backup::{plan, run_backup, RunReport};
use kept_core::config::{BackupOptions, CorruptManifestPolicy, RunContext};
use kept_core::filter::PathFilter;
use kept_core::history::history;
use kept_core::localize::FluentLoc;
use kept_core::path_safety::PathPolicy;
use kept_core::verify::verify_with_policy;

mod logging;

/// Exit status for a completed run that had per-file failures under `--strict`.
const EXIT_PARTIAL: u8 = 2;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CorruptMode { Abort, Skip }

impl From<CorruptMode> for CorruptManifestPolicy {
    fn from(m: CorruptMode) -> Self {
        match m {
            CorruptMode::Abort => CorruptManifestPolicy::Abort,
            CorruptMode::Skip => CorruptManifestPolicy::Skip,
        }
    }
}

#[derive(Parser)]
#[command(name = "kept", version, about = "Copy files not backed up before, with SHA-256 manifests")]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Cmd>,

    /// Destination tree for file copies
    #[arg(long, global = true, env = "KEPT_FILES_DIR", default_value = "files")]
    files_dir: PathBuf,
    /// Directory holding one checksum manifest per run
    #[arg(long, global = true, env = "KEPT_CHECKSUMS_DIR", default_value = "checksums")]
    checksums_dir: PathBuf,
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    /// Print the report as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[arg(long)] include: Vec<String>,
    #[arg(long)] exclude: Vec<String>,
    /// List new files without copying or writing a manifest
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Exit with status 2 when any file failed to copy
    #[arg(long, default_value_t = false)]
    strict: bool,
    #[arg(long, value_enum, default_value_t = CorruptMode::Abort)]
    on_corrupt_manifest: CorruptMode,

    /// Directory to back up
    sources: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Re-hash every backed-up file against the manifests
    Verify {
        #[arg(long, default_value_t = false)]
        follow_symlinks: bool,
    },
    /// List manifests and how many files each recorded
    History,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let loc = FluentLoc::builtin("en-GB");

    match &cli.cmd {
        Some(Cmd::Verify { follow_symlinks }) => verify(&cli, &loc, *follow_symlinks),
        Some(Cmd::History) => show_history(&cli, &loc),
        None if cli.sources.len() == 1 => backup(&cli, &loc, &cli.sources[0]),
        None => {
            print_usage(&loc)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_usage(loc: &FluentLoc) -> Result<()> {
    for code in
        ["usage-title", "usage-about", "usage-files", "usage-checksums", "usage-ignored", "usage-check"]
    {
        println!("{}", loc.msg(code, &[]));
    }
    println!();
    Cli::command().print_help().context("print usage")?;
    Ok(())
}

fn backup(cli: &Cli, loc: &FluentLoc, source: &Path) -> Result<ExitCode> {
    let ctx = RunContext::new(source)
        .with_destination(&cli.files_dir)
        .with_manifest_dir(&cli.checksums_dir);
    let opts = BackupOptions {
        filter: PathFilter::new(&cli.include, &cli.exclude).context("build include/exclude globs")?,
        corrupt_policy: cli.on_corrupt_manifest.into(),
        dry_run: cli.dry_run,
    };

    if opts.dry_run {
        let plan = plan(&ctx, &opts).with_context(|| format!("plan backup of {}", source.display()))?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan.relative_new_files())?);
        } else {
            for rel in plan.relative_new_files() {
                println!("{}", rel);
            }
            let n = plan.new_files.len().to_string();
            println!("{}", loc.msg("run-dry", &[("count", n.as_str())]));
        }
        return Ok(ExitCode::SUCCESS);
    }

    debug!(?ctx, "starting backup");
    ctx.ensure_layout().context("create files/checksums directories")?;
    let report =
        run_backup(&ctx, &opts).with_context(|| format!("back up {}", source.display()))?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(loc, &ctx, &report);
    }
    if cli.strict && report.failed > 0 {
        return Ok(ExitCode::from(EXIT_PARTIAL));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_report(loc: &FluentLoc, ctx: &RunContext, report: &RunReport) {
    let found = report.new_files.to_string();
    println!("{}", loc.msg("scan-found", &[("count", found.as_str())]));
    if report.nothing_to_do() {
        println!("{}", loc.msg("run-nothing", &[]));
        return;
    }
    let src = ctx.source.display().to_string();
    let dst = ctx.destination.display().to_string();
    println!("{}", loc.msg("run-copying", &[("src", src.as_str()), ("dst", dst.as_str())]));
    if report.failed != 0 {
        let failed = report.failed.to_string();
        println!("{}", loc.msg("run-warning", &[("count", failed.as_str())]));
    }
    let copied = report.copied.to_string();
    let total = report.attempted().to_string();
    println!("{}", loc.msg("run-done", &[("copied", copied.as_str()), ("total", total.as_str())]));
}

fn verify(cli: &Cli, loc: &FluentLoc, follow_symlinks: bool) -> Result<ExitCode> {
    let report =
        verify_with_policy(&cli.files_dir, &cli.checksums_dir, PathPolicy { follow_symlinks })
            .context("verify backups")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for p in &report.bad {
            eprintln!("BAD     {}", p);
        }
        for p in &report.missing {
            eprintln!("MISSING {}", p);
        }
        let ok = report.files_ok.to_string();
        let bad = report.bad.len().to_string();
        let missing = report.missing.len().to_string();
        let manifests = report.manifests.to_string();
        eprintln!(
            "{}",
            loc.msg(
                "verify-summary",
                &[
                    ("ok", ok.as_str()),
                    ("bad", bad.as_str()),
                    ("missing", missing.as_str()),
                    ("manifests", manifests.as_str()),
                ]
            )
        );
        let verdict = if report.all_ok() { "verify-ok" } else { "verify-bad" };
        println!("{}", loc.msg(verdict, &[]));
    }
    Ok(if report.all_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn show_history(cli: &Cli, loc: &FluentLoc) -> Result<ExitCode> {
    let report = history(&cli.checksums_dir).context("read manifest history")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::SUCCESS);
    }
    for e in &report.entries {
        let records = e.records.to_string();
        let line = match &e.error {
            None => loc.msg("history-entry", &[("name", e.name.as_str()), ("records", records.as_str())]),
            Some(err) => loc.msg("history-corrupt", &[("name", e.name.as_str()), ("error", err.as_str())]),
        };
        println!("{}", line);
    }
    let manifests = report.entries.len().to_string();
    let records = report.total_records.to_string();
    let paths = report.distinct_paths.to_string();
    let args = [("manifests", manifests.as_str()), ("records", records.as_str()), ("paths", paths.as_str())];
    println!("{}", loc.msg("history-total", &args));
    Ok(ExitCode::SUCCESS)
}
