//! javafmt command line interface

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use javafmt_core::{FormatConfig, Pipeline, persist};

#[derive(Parser)]
#[command(
    name = "javafmt",
    version,
    about = "Reformat Java source files and enforce naming conventions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Reformat files in place
    Fmt {
        /// Java source files to format
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Configuration file (JSON); defaults apply when omitted
        #[arg(short, long, env = "JAVAFMT_CONFIG")]
        config: Option<PathBuf>,

        /// Exit non-zero if any file would change, without writing
        #[arg(long)]
        check: bool,

        /// Print formatted output instead of rewriting the files
        #[arg(long)]
        stdout: bool,
    },
    /// Report naming convention violations without modifying anything
    Audit {
        /// Java source files to audit
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Configuration file (JSON); defaults apply when omitted
        #[arg(short, long, env = "JAVAFMT_CONFIG")]
        config: Option<PathBuf>,
    },
}

/// Explicit path if given, otherwise `java-format.json` in the working
/// directory when present.
fn discover_config(explicit: Option<&std::path::Path>) -> Option<PathBuf> {
    explicit.map(|p| p.to_path_buf()).or_else(|| {
        let default = PathBuf::from("java-format.json");
        default.exists().then_some(default)
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    javafmt_core::init_tracing(&format!("javafmt={level},javafmt_core={level}"));
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Fmt {
            files,
            config,
            check,
            stdout,
        } => run_fmt(&files, config.as_deref(), check, stdout),
        Command::Audit { files, config } => run_audit(&files, config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run_fmt(
    files: &[PathBuf],
    config: Option<&std::path::Path>,
    check: bool,
    stdout: bool,
) -> anyhow::Result<ExitCode> {
    let config = discover_config(config);
    let config =
        FormatConfig::load_or_default(config.as_deref()).context("loading configuration")?;
    let pipeline = Pipeline::new(config);

    let mut changed = 0usize;
    let mut failed = 0usize;
    for path in files {
        match format_one(&pipeline, path, check, stdout) {
            Ok(true) => changed += 1,
            Ok(false) => {}
            Err(err) => {
                error!(path = %path.display(), "{err:#}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Ok(ExitCode::from(2));
    }
    if check && changed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Format one file. Returns whether its contents would change.
fn format_one(
    pipeline: &Pipeline,
    path: &std::path::Path,
    check: bool,
    stdout: bool,
) -> anyhow::Result<bool> {
    let source = persist::read_source(path)?;
    let out = pipeline.format(&source)?;
    let changed = out.changed_from(&source);

    for (old, new) in &out.renames {
        info!(path = %path.display(), "renamed '{old}' to '{new}'");
    }

    if stdout {
        print!("{}", out.text);
        return Ok(changed);
    }
    if check {
        if changed {
            println!("would reformat {}", path.display());
        }
        return Ok(changed);
    }
    if changed {
        persist::write_atomic(path, &out.text)?;
        info!(path = %path.display(), "reformatted");
    }
    Ok(changed)
}

fn run_audit(files: &[PathBuf], config: Option<&std::path::Path>) -> anyhow::Result<ExitCode> {
    let config = discover_config(config);
    let config =
        FormatConfig::load_or_default(config.as_deref()).context("loading configuration")?;
    let pipeline = Pipeline::new(config);

    let mut violations = 0usize;
    let mut failed = 0usize;
    for path in files {
        let source = match persist::read_source(path) {
            Ok(source) => source,
            Err(err) => {
                error!(path = %path.display(), "{err}");
                failed += 1;
                continue;
            }
        };
        match pipeline.audit(&source) {
            Ok(findings) => {
                for finding in &findings {
                    println!("{}: {finding}", path.display());
                }
                violations += findings.len();
            }
            Err(err) => {
                error!(path = %path.display(), "{err}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        Ok(ExitCode::from(2))
    } else if violations > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
