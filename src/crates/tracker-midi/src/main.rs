use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tracker_midi::loader::PATTERN_EXTENSION;
use tracker_midi::{
    load_pattern, load_project, sequence_pattern, sequence_song, timeline_to_midi, ExportOptions,
    ProjectLocation, Synthesizer, TextFormatter, Timeline,
};

#[derive(Parser, Debug)]
#[command(name = "tracker-midi")]
#[command(about = "Convert Polyend Tracker patterns and projects to MIDI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log every rendered pattern and track
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress informational messages (only warnings and errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Fail instead of skipping steps whose chord or arpeggio is unknown
    #[arg(long, global = true)]
    strict: bool,

    /// MIDI resolution in ticks per quarter note
    #[arg(
        long,
        global = true,
        default_value = "480",
        value_parser = clap::value_parser!(u16).range(1..=0x7FFF)
    )]
    ppq: u16,

    /// Seed for random arpeggios, for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export a single pattern file (.mtp) as MIDI
    Pattern {
        #[command(flatten)]
        io: InputOutput,

        /// Tempo to write, since pattern files carry none
        #[arg(long, default_value = "120")]
        bpm: f32,
    },
    /// Export a whole project (directory or project.mt) as MIDI
    Project {
        #[command(flatten)]
        io: InputOutput,
    },
    /// Print a pattern file as a text table
    Text {
        #[command(flatten)]
        io: InputOutput,

        /// Write JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Print to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },
}

#[derive(Args, Debug)]
struct InputOutput {
    /// Input path
    input: PathBuf,

    /// Output file path (default: next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut options = ExportOptions {
        ppq: cli.ppq,
        strict: cli.strict,
        seed: cli.seed,
        ..ExportOptions::default()
    };

    match cli.command {
        Command::Pattern { io, bpm } => {
            options.bpm = bpm;
            let pattern = load_pattern(&io.input)?;
            info!("pattern {}: {} steps", io.input.display(), pattern.length());

            let mut synth = synthesizer(&options);
            let timeline = sequence_pattern(&mut synth, &pattern, options.bpm)?;
            let output = output_path(&io.input, io.output, "mid")?;
            write_midi(&timeline, &options, &output)
        }
        Command::Project { io } => {
            let project = load_project(&io.input)?;
            info!(
                "project {}: {} BPM, chain {:?}",
                project.name,
                project.song.bpm(),
                project.song.pattern_chain()
            );

            let mut synth = synthesizer(&options);
            let timeline = sequence_song(&mut synth, &project.song)?;
            // a directory has no extension to swap, so name the file after the project
            let output = match io.output {
                Some(path) => output_path(&io.input, Some(path), "mid")?,
                None => ProjectLocation::resolve(&io.input)?
                    .root
                    .join(format!("{}.mid", project.name)),
            };
            write_midi(&timeline, &options, &output)
        }
        Command::Text { io, json, stdout } => {
            let pattern = load_pattern(&io.input)?;
            let formatter = TextFormatter::default();
            let text = if json {
                formatter.build_json(&pattern)?
            } else {
                formatter.build_table(&pattern)
            };

            if stdout {
                print!("{}", text);
                return Ok(());
            }
            let output = output_path(&io.input, io.output, if json { "json" } else { "txt" })?;
            write_output(&output, text.as_bytes())?;
            info!("Exported text table to {}", output.display());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over the command-line flags
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn synthesizer(options: &ExportOptions) -> Synthesizer {
    match options.seed {
        Some(seed) => Synthesizer::seeded(seed),
        None => Synthesizer::new(),
    }
}

/// Explicit output path, or the input with its extension swapped
fn output_path(input: &Path, explicit: Option<PathBuf>, extension: &str) -> Result<PathBuf> {
    let path = explicit.unwrap_or_else(|| input.with_extension(extension));
    if path.extension().and_then(|e| e.to_str()) == Some(PATTERN_EXTENSION) {
        anyhow::bail!(
            "Refusing to write {}: output would overwrite a pattern file",
            path.display()
        );
    }
    Ok(path)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if path.is_file() {
        warn!("{} already exists - will overwrite", path.display());
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_midi(timeline: &Timeline, options: &ExportOptions, path: &Path) -> Result<()> {
    let skipped = &timeline.rendered.skipped;
    if options.strict {
        if let Some(first) = skipped.first() {
            anyhow::bail!("{} steps could not be rendered, first at {}", skipped.len(), first);
        }
    } else if !skipped.is_empty() {
        warn!("{} steps skipped", skipped.len());
    }

    let bytes = timeline_to_midi(timeline, options)?.to_bytes()?;
    write_output(path, &bytes)?;
    info!(
        "Exported {} notes to {}",
        timeline.rendered.events.len(),
        path.display()
    );
    Ok(())
}
