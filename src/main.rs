// SPDX-License-Identifier: MIT
//
// hexen: a modal terminal hex editor.
//
// This binary wires the two crates together:
//
//   hexen-core → key resolution, modes, the byte window, the control loop
//   hexen-term → raw terminal, ANSI output, stdin key parsing
//
// `tui::TerminalUi` is the front end the control loop drives. Each keypress
// flows through:
//
//   stdin → reader thread → key token → Editor → resolver[mode] → Window
//   Window::state → TerminalUi::redraw → hex dump + status line
//
// Logging goes to a file (`--log` or HEXEN_LOG), never to the terminal the
// editor is drawing on.

mod tui;

use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use hexen_core::editor::Editor;
use hexen_core::window::Window;
use hexen_term::terminal::is_tty;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::tui::TerminalUi;

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "hexen=debug,info";

// ─── Command Line ───────────────────────────────────────────────────────────

/// A modal terminal hex editor.
#[derive(Parser, Debug)]
#[command(name = "hexen", version, about)]
struct Cli {
    /// File to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Bytes per row
    #[arg(
        short,
        long,
        default_value_t = 16,
        value_parser = clap::value_parser!(u16).range(1..=256)
    )]
    width: u16,

    /// Write logs to this file (also read from HEXEN_LOG)
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    path: PathBuf,
    width: u64,
    log: Option<PathBuf>,
}

impl Config {
    /// Combine parsed arguments with the environment. `--log` wins over
    /// `HEXEN_LOG`.
    fn new(cli: Cli, env_log: Option<PathBuf>) -> Self {
        Self {
            path: cli.file,
            width: u64::from(cli.width),
            log: cli.log.or(env_log),
        }
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to `path`, if there is one. Without a path no
/// subscriber is installed and every event is dropped.
fn setup_tracing(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("cannot install the log subscriber")?;
    info!(path = %path.display(), "logging started");
    Ok(())
}

// ─── Entry Point ────────────────────────────────────────────────────────────

fn run(config: &Config) -> anyhow::Result<()> {
    if !is_tty() {
        bail!("stdin is not a terminal");
    }
    let window = Window::open(&config.path, config.width).context("cannot load the file")?;
    info!(path = %config.path.display(), width = config.width, "starting");

    Editor::new(window, TerminalUi::new())
        .run()
        .context("editor stopped")?;
    info!("exiting");
    Ok(())
}

fn main() {
    let config = Config::new(Cli::parse(), env::var_os("HEXEN_LOG").map(PathBuf::from));

    let result = setup_tracing(config.log.as_deref()).and_then(|()| run(&config));
    if let Err(err) = result {
        eprintln!("hexen: {err:#}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
