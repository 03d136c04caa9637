//! # SoundByte - Pitch Toolkit Command Line
//!
//! Front end for `soundbyte-core`: synthesizes tones, chords and songs to
//! WAV, analyzes recordings, converts between pitch names and frequencies,
//! and (with the `capture` feature) tunes against a live microphone.
//!
//! ## Architecture
//! - **Settings**: optional JSON file given with `--config`, defaults otherwise
//! - **Pitch table**: built once from the configured reference A4
//! - **Files**: WAV encoding and decoding through `hound`
//! - **Logging**: `tracing` to stderr, filtered by `RUST_LOG` or `--verbose`

mod commands;
mod config;
mod wav;

#[cfg(feature = "capture")]
mod capture;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use soundbyte_core::PitchConverter;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,soundbyte_core=info,soundbyte_cli=info";

#[derive(Parser)]
#[command(name = "soundbyte")]
#[command(author, version, about = "Pitch conversion, tone synthesis and tuning analysis")]
struct Cli {
    /// JSON settings file (reference pitch, sample rate, capture options)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a sine tone to a WAV file
    Tone(commands::ToneArgs),

    /// Synthesize a chord of pitches to a WAV file
    Chord(commands::ChordArgs),

    /// Render a song text file to WAV
    Song(commands::SongArgs),

    /// Detect the dominant frequency of a WAV file and grade its tuning
    Analyze(commands::AnalyzeArgs),

    /// Convert a pitch name to Hz, or a frequency to its nearest note
    Note(commands::NoteArgs),

    /// Print the effective settings
    Settings(commands::SettingsArgs),

    /// List audio input devices
    #[cfg(feature = "capture")]
    Devices(commands::DevicesArgs),

    /// Show live tuner readings from the microphone
    #[cfg(feature = "capture")]
    Listen(commands::ListenArgs),

    /// Record the microphone to a WAV file
    #[cfg(feature = "capture")]
    Record(commands::RecordArgs),
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = config::load_settings(cli.config.as_deref())?;
    let table = settings.pitch_table()?;
    let converter = PitchConverter::new(&table);
    tracing::debug!(reference_a4 = table.a4(), c0 = table.c0(), "pitch table ready");

    match cli.command {
        Commands::Tone(args) => commands::tone(args, &settings, &converter),
        Commands::Chord(args) => commands::chord(args, &settings, &converter),
        Commands::Song(args) => commands::song(args, &settings, &converter),
        Commands::Analyze(args) => commands::analyze(args, &converter),
        Commands::Note(args) => commands::note(args, &converter),
        Commands::Settings(args) => commands::settings(args, &settings),
        #[cfg(feature = "capture")]
        Commands::Devices(args) => commands::devices(args),
        #[cfg(feature = "capture")]
        Commands::Listen(args) => commands::listen(args, &settings, &converter),
        #[cfg(feature = "capture")]
        Commands::Record(args) => commands::record(args, &settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["soundbyte", "note", "A4", "--config", "s.json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Commands::Note(_)));
    }

    #[test]
    fn chord_needs_at_least_one_note() {
        assert!(Cli::try_parse_from(["soundbyte", "chord", "out.wav"]).is_err());
    }
}
