use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codec::{count_ticks, edit, extract_buttons, CodecLimits, EditOptions, TickRange, WireLimits};
use demedit_tools::{format_buttons_pretty, inspect_demo, InspectReport};
use glob::Pattern;
use synth::{synth_demo, SynthConfig};

#[derive(Parser)]
#[command(
    name = "demedit",
    version,
    about = "Source engine demo editing and inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Unlock the camera, cut to a tick range, or strip commands.
    Edit {
        /// Path to the input demo.
        demo: PathBuf,
        /// Where to write the edited demo.
        #[arg(short, long)]
        output: PathBuf,
        /// Let playback move the camera freely.
        #[arg(long)]
        unlock_pov: bool,
        /// First tick to keep.
        #[arg(long)]
        from: Option<u32>,
        /// First tick to drop after the kept range.
        #[arg(long)]
        to: Option<u32>,
        /// Drop console and user command frames.
        #[arg(long)]
        strip_commands: bool,
        /// Edit options as JSON; flags given on the command line take precedence.
        #[arg(long)]
        options: Option<PathBuf>,
    },
    /// Print the tick count of a demo, or of every demo in a directory.
    Ticks {
        /// Demo file or directory.
        path: PathBuf,
        /// Optional glob filter when listing a directory.
        #[arg(long)]
        glob: Option<String>,
    },
    /// Print per-tick player input.
    Buttons {
        /// Path to the demo.
        demo: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Summarize header, frames and camera lock state.
    Inspect {
        /// Path to the demo.
        demo: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write a deterministic synthetic demo.
    Synth {
        /// Where to write the demo.
        out: PathBuf,
        /// Tick of the final frame.
        #[arg(long, default_value_t = 600)]
        ticks: u32,
        /// RNG seed for deterministic results.
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Demo protocol, 3 or 4.
        #[arg(long, default_value_t = 3)]
        protocol: i32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Edit {
            demo,
            output,
            unlock_pov,
            from,
            to,
            strip_commands,
            options,
        } => {
            let mut edit_options = match &options {
                Some(path) => load_options(path)?,
                None => EditOptions::default(),
            };
            edit_options.unlock_pov |= unlock_pov;
            edit_options.strip_commands |= strip_commands;
            if from.is_some() || to.is_some() {
                edit_options.cut = Some(TickRange::new(
                    from.unwrap_or(0),
                    to.unwrap_or(u32::MAX),
                ));
            }

            let bytes = read_demo(&demo)?;
            let edited = edit(&bytes, &edit_options)
                .with_context(|| format!("edit {}", demo.display()))?;
            fs::write(&output, &edited).with_context(|| format!("write {}", output.display()))?;
            tracing::info!(
                input = %demo.display(),
                output = %output.display(),
                bytes = edited.len(),
                "wrote edited demo"
            );
        }
        Command::Ticks { path, glob } => {
            if path.is_dir() {
                for entry in collect_demo_entries(&path, glob.as_deref())? {
                    let bytes = read_demo(&entry)?;
                    match count_ticks(&bytes) {
                        Ok(ticks) => println!("{}\t{ticks}", entry.display()),
                        Err(err) => {
                            tracing::warn!(path = %entry.display(), error = %err, "skipping demo");
                        }
                    }
                }
            } else {
                let bytes = read_demo(&path)?;
                let ticks =
                    count_ticks(&bytes).with_context(|| format!("count ticks {}", path.display()))?;
                println!("{ticks}");
            }
        }
        Command::Buttons { demo, format } => {
            let bytes = read_demo(&demo)?;
            let records = extract_buttons(&bytes)
                .with_context(|| format!("extract buttons {}", demo.display()))?;
            match format {
                OutputFormat::Text => print!("{}", format_buttons_pretty(&records)),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&records).context("serialize json")?;
                    println!("{json}");
                }
            }
        }
        Command::Inspect { demo, format } => {
            let bytes = read_demo(&demo)?;
            let report = inspect_demo(&bytes, &WireLimits::default(), &CodecLimits::default())
                .with_context(|| format!("inspect {}", demo.display()))?;
            match format {
                OutputFormat::Text => print_inspect_report(&report),
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
            }
        }
        Command::Synth {
            out,
            ticks,
            seed,
            protocol,
        } => {
            let bytes = synth_demo(&SynthConfig {
                protocol,
                ticks,
                seed,
                ..SynthConfig::default()
            })
            .context("synthesize demo")?;
            fs::write(&out, &bytes).with_context(|| format!("write {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = bytes.len(), "wrote synthetic demo");
        }
    }
    Ok(())
}

fn read_demo(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read demo {}", path.display()))
}

fn load_options(path: &Path) -> Result<EditOptions> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read options {}", path.display()))?;
    serde_json::from_str(&contents).context("parse options json")
}

fn collect_demo_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PathBuf>> {
    let pattern = match glob {
        Some(value) => Pattern::new(value).context("invalid glob pattern")?,
        None => Pattern::new("*.dem").context("invalid glob pattern")?,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches_path = pattern.matches_path(&path);
        let matches_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name));
        if matches_path || matches_name {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

fn print_inspect_report(report: &InspectReport) {
    println!(
        "protocol: {} network: {} map: {} server: {} client: {} game: {}",
        report.demo_protocol,
        report.network_protocol,
        report.map_name,
        report.server_name,
        report.client_name,
        report.game_directory
    );
    println!(
        "declared: {} ticks {} frames {:.2}s",
        report.declared_ticks, report.declared_frames, report.playback_time
    );
    println!(
        "stream: {} ticks {} frames stop: {} trailer: {} bytes",
        report.ticks, report.frames, report.has_stop, report.trailer_bytes
    );
    println!(
        "signon: {} bytes in {} frames",
        report.signon_bytes, report.signon_frames
    );
    println!("frames:");
    for kind in &report.kinds {
        println!(
            "  {}: {} ({} bytes, ticks {}..={})",
            kind.kind, kind.count, kind.bytes, kind.first_tick, kind.last_tick
        );
    }
    match &report.server_info {
        Some(info) => println!(
            "server info: protocol {} hltv: {} dedicated: {} classes: {} slot: {}",
            info.protocol, info.is_hltv, info.is_dedicated, info.max_classes, info.player_slot
        ),
        None => println!("server info: not found"),
    }
    println!("locked packets: {}", report.locked_packets);
}
