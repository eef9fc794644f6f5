//! hotkey-engine CLI
//!
//! ```bash
//! hotkey-engine presets --json
//! hotkey-engine parse "Ctrl+Shift+K"
//! hotkey-engine replay --config keymap.json keys.txt
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;

use hotkey_engine::config::{self, Config};
use hotkey_engine::hotkeys::{normalize_sequence, Combo, Preset};
use hotkey_engine::logging;
use hotkey_engine::replay;

#[derive(Parser)]
#[command(name = "hotkey-engine")]
#[command(about = "Inspect presets, parse combos and replay keystroke scripts", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  hotkey-engine presets --json\n  hotkey-engine parse 'cmd+shift+p'\n  hotkey-engine replay --config keymap.json keys.txt\n"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in preset catalog
    Presets {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show how a combo or key sequence is normalized
    Parse {
        /// Combo such as 'ctrl+s' or a sequence such as 'g g'
        combo: String,
    },

    /// Feed a keystroke script through a keymap and report what fired
    Replay {
        /// Keymap config file (defaults to ~/.hotkey-engine/config.json)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Script with one `<ms> <combo> [keyup|keypress]` or `scope <name>` per line
        script: PathBuf,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetRow {
    path: String,
    combo: &'static str,
    description: &'static str,
    sequence: bool,
}

fn main() -> anyhow::Result<()> {
    let _guard = logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Presets { json } => print_presets(json),
        Commands::Parse { combo } => {
            print_parse(&combo);
            Ok(())
        }
        Commands::Replay { config, script } => run_replay(config, script),
    }
}

fn print_presets(json: bool) -> anyhow::Result<()> {
    let rows: Vec<PresetRow> = Preset::all()
        .map(|preset| {
            let spec = preset.spec();
            PresetRow {
                path: preset.path(),
                combo: spec.combo,
                description: spec.description,
                sequence: spec.sequence,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let width = rows.iter().map(|r| r.path.len()).max().unwrap_or(0);
    for row in &rows {
        let kind = if row.sequence { "seq" } else { "" };
        println!(
            "{:<width$}  {:<14} {:<4} {}",
            row.path,
            row.combo,
            kind,
            row.description,
            width = width
        );
    }
    Ok(())
}

fn print_parse(input: &str) {
    if input.split_whitespace().count() > 1 {
        println!("sequence:  {}", normalize_sequence(input));
        return;
    }

    let combo = Combo::parse(input);
    if !combo.has_key() {
        println!("warning:   no key in {:?}; this combo never matches", input);
    }
    println!("canonical: {}", combo.to_canonical_string());
    println!("display:   {}", combo.display());
    println!("token:     {}", combo.chord_token());
}

fn run_replay(config_path: Option<PathBuf>, script_path: PathBuf) -> anyhow::Result<()> {
    let config: Config = match config_path {
        Some(path) => config::load_config_from(&path),
        None => config::load_config(),
    };
    let text = fs::read_to_string(&script_path)
        .with_context(|| format!("reading script {}", script_path.display()))?;
    let script = replay::parse_script(&text)?;

    let report = replay::replay(&config, &script)?;
    for failure in &report.failed_entries {
        logging::log_error("KEYMAP", failure, None);
    }
    for hit in &report.hits {
        let actions = if hit.actions.is_empty() {
            "(disabled)".to_string()
        } else {
            hit.actions.join(", ")
        };
        println!("{:>6}ms  {:<14} [{}] -> {}", hit.at_ms, hit.combo, hit.scope, actions);
    }
    println!("{}", serde_json::to_string_pretty(&report.stats)?);
    Ok(())
}
