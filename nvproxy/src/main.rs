// src/main.rs

//! `nvproxy-tables`: inspect the per-release ioctl tables.
//!
//! 1. Parse the command line and (optionally) the TOML config
//! 2. Set up structured logging
//! 3. Build, compare or validate tables from the built-in registry

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use fern::Dispatch;
use log::Level;
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    process, thread,
};

use nvproxy::config::{self, Config};
use nvproxy::nvproxy_log;
use nvproxy::table::{IoctlClass, IoctlTable};
use nvproxy::versioning::{
    build_ioctl_table, check_versioning_table, supported_versions, versioning_table,
};

#[derive(Parser)]
#[command(author, version, about = "Inspect nvproxy's per-release ioctl tables")]
struct Cli {
    /// TOML config; only `[logging]` and `[driver]` are used here
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every mediated key for a release.
    Show {
        /// Driver release, e.g. 535.43.02. Defaults to `driver.version`.
        #[arg(value_name = "VERSION")]
        release: Option<String>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Keys added, removed or rebound between two releases.
    Diff { from: String, to: String },
    /// Releases with a diff in the registry, oldest first.
    Versions,
    /// Validate the registry's ordering and overlays.
    Check,
}

#[derive(Serialize)]
struct EntryReport {
    key: String,
    handler: &'static str,
}

#[derive(Serialize)]
struct TableReport {
    version: String,
    fingerprint: String,
    classes: BTreeMap<IoctlClass, Vec<EntryReport>>,
}

/// Configure global logging as requested in `cfg.logging`. Logs go to
/// stderr so stdout stays clean for reports.
fn setup_logging(cfg: &Config) -> Result<(), fern::InitError> {
    let log_path = cfg
        .logging
        .enable
        .then(|| PathBuf::from(cfg.logging.file.as_deref().unwrap_or("nvproxy.log")));

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            // Lines from `nvproxy_log!` already carry the prefix.
            if msg.to_string().starts_with('[') {
                out.finish(format_args!("{}", msg))
            } else {
                out.finish(format_args!(
                    "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                    Local::now().to_rfc3339(),
                    record.level(),
                    record.target(),
                    process::id(),
                    thread::current().id(),
                    msg
                ))
            }
        })
        .level(cfg.logging.level_filter())
        .chain(std::io::stderr());

    if let Some(path) = log_path {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => config::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn build(version: &str) -> Result<IoctlTable> {
    build_ioctl_table(version).with_context(|| format!("building ioctl table for {version}"))
}

fn show(cfg: &Config, version: Option<String>, json: bool) -> Result<()> {
    let version = match (version, cfg.driver.version) {
        (Some(v), _) => v,
        (None, Some(v)) => v.to_string(),
        (None, None) => bail!("no version given and no driver.version in config"),
    };
    let table = build(&version)?;

    if json {
        let classes = IoctlClass::ALL
            .into_iter()
            .map(|class| {
                let entries = table
                    .describe(class)
                    .into_iter()
                    .map(|(key, handler)| EntryReport { key: format!("{key:#x}"), handler })
                    .collect();
                (class, entries)
            })
            .collect();
        let report = TableReport { version, fingerprint: table.fingerprint(), classes };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("driver {version} (fingerprint {})", table.fingerprint());
    for class in IoctlClass::ALL {
        println!("\n{class} ({} entries)", table.len(class));
        for (key, name) in table.describe(class) {
            println!("  {key:#010x}  {name}");
        }
    }
    Ok(())
}

fn diff(from: &str, to: &str) -> Result<()> {
    let a = build(from)?;
    let b = build(to)?;
    let mut changes = 0usize;
    for class in IoctlClass::ALL {
        let before: HashMap<u32, &str> = a.describe(class).into_iter().collect();
        for (key, name) in b.describe(class) {
            match before.get(&key) {
                None => println!("+ {class} {key:#x} {name}"),
                Some(old) if *old != name => println!("~ {class} {key:#x} {old} -> {name}"),
                Some(_) => continue,
            }
            changes += 1;
        }
        for (key, name) in a.describe(class) {
            if !b.contains(class, key) {
                println!("- {class} {key:#x} {name}");
                changes += 1;
            }
        }
    }
    nvproxy_log!(Level::Info, "cli", "{} change(s) from {} to {}", changes, from, to);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    setup_logging(&cfg).context("logging setup failed")?;

    match cli.command {
        Commands::Show { release, json } => show(&cfg, release, json),
        Commands::Diff { from, to } => diff(&from, &to),
        Commands::Versions => {
            for v in supported_versions() {
                println!("{v}");
            }
            Ok(())
        }
        Commands::Check => {
            let diffs = versioning_table();
            check_versioning_table(diffs).context("registry check failed")?;
            let Some(first) = diffs.first() else {
                bail!("registry is empty");
            };
            println!("ok: {} diffs, minimum {}", diffs.len(), first.version);
            Ok(())
        }
    }
}
