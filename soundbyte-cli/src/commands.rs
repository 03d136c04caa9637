//! Subcommand arguments and handlers.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use soundbyte_core::audio::{AudioFileLoader, WaveformEncoder};
use soundbyte_core::{
    PitchConverter, SongSequencer, Spectrum, TunerSettings, TuningReading, dominant_frequency,
    full_spectrum, song::MAX_SONG_SECONDS, spectrum, synth,
};

use crate::config;
use crate::wav::WavFile;

#[derive(Args)]
pub struct ToneArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Pitch name (e.g. A4, Db3) or frequency in Hz
    #[arg(long, default_value = "A4")]
    note: String,

    /// Duration in seconds
    #[arg(long, default_value = "5.0")]
    duration: f64,

    /// Sample rate (defaults to the configured rate)
    #[arg(long)]
    sample_rate: Option<u32>,
}

#[derive(Args)]
pub struct ChordArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Chord members: pitch names or frequencies in Hz
    #[arg(value_name = "NOTE", required = true, num_args = 1..)]
    notes: Vec<String>,

    /// Duration in seconds
    #[arg(long, default_value = "5.0")]
    duration: f64,

    /// Sample rate (defaults to the configured rate)
    #[arg(long)]
    sample_rate: Option<u32>,
}

#[derive(Args)]
pub struct SongArgs {
    /// Song text file: BPM on the first line, then `<pitch>, <beats>` lines
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sample rate (defaults to the configured rate)
    #[arg(long)]
    sample_rate: Option<u32>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// WAV file to analyze
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Print the reading as JSON
    #[arg(long)]
    json: bool,

    /// Also write every spectrum bin as `frequency_hz,magnitude` CSV
    #[arg(long, value_name = "CSV")]
    spectrum_csv: Option<PathBuf>,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Pitch name to convert to Hz, or frequency in Hz to name and grade
    #[arg(value_name = "NOTE_OR_HZ", allow_hyphen_values = true)]
    value: String,

    /// Print the reading as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct SettingsArgs {
    /// Write the effective settings to this file
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

/// Resolves a pitch name or a bare frequency to Hz.
pub fn resolve_frequency(converter: &PitchConverter<'_>, token: &str) -> Result<f64> {
    match converter.pitch_to_frequency(token) {
        Ok(freq) => Ok(freq),
        Err(pitch_err) => match token.parse::<f64>() {
            Ok(freq) if freq.is_finite() && freq > 0.0 => Ok(freq),
            _ => Err(anyhow::Error::new(pitch_err)
                .context(format!("{token:?} is neither a pitch name nor a frequency"))),
        },
    }
}

fn check_duration(seconds: f64) -> Result<()> {
    anyhow::ensure!(
        seconds <= MAX_SONG_SECONDS,
        "duration {seconds} s is longer than {MAX_SONG_SECONDS} s"
    );
    Ok(())
}

fn format_reading(reading: &TuningReading) -> String {
    format!(
        "{:<5} {:>9.2} Hz  {:>+8.2} cents vs {} ({:?})  {}",
        reading.pitch_name,
        reading.frequency,
        reading.cents,
        reading.reference_name,
        reading.direction,
        reading.band.label()
    )
}

fn print_reading(reading: &TuningReading, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reading)?);
    } else {
        println!("{}", format_reading(reading));
    }
    Ok(())
}

pub fn tone(args: ToneArgs, settings: &TunerSettings, converter: &PitchConverter<'_>) -> Result<()> {
    let frequency = resolve_frequency(converter, &args.note)?;
    check_duration(args.duration)?;
    let sample_rate = args.sample_rate.unwrap_or(settings.sample_rate);
    let wave = synth::sine_wave(args.duration, sample_rate, frequency);
    WavFile::default().encode(&wave, &args.output)?;
    println!(
        "Wrote {:.2} s of {:.2} Hz to {}",
        wave.duration_secs(),
        frequency,
        args.output.display()
    );
    Ok(())
}

pub fn chord(args: ChordArgs, settings: &TunerSettings, converter: &PitchConverter<'_>) -> Result<()> {
    let frequencies = args
        .notes
        .iter()
        .map(|note| resolve_frequency(converter, note))
        .collect::<Result<Vec<_>>>()?;
    check_duration(args.duration)?;
    let sample_rate = args.sample_rate.unwrap_or(settings.sample_rate);
    let wave = synth::chord(args.duration, sample_rate, &frequencies);
    WavFile::default().encode(&wave, &args.output)?;
    println!(
        "Wrote {}-note chord ({:.2} s) to {}",
        frequencies.len(),
        wave.duration_secs(),
        args.output.display()
    );
    Ok(())
}

pub fn song(args: SongArgs, settings: &TunerSettings, converter: &PitchConverter<'_>) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading song {}", args.input.display()))?;
    let sample_rate = args.sample_rate.unwrap_or(settings.sample_rate);
    let sequencer = SongSequencer::new(*converter, sample_rate);
    let wave = sequencer
        .render_text(&text)
        .with_context(|| format!("rendering {}", args.input.display()))?;
    WavFile::default().encode(&wave, &args.output)?;
    println!(
        "Rendered {:.2} s to {}",
        wave.duration_secs(),
        args.output.display()
    );
    Ok(())
}

/// Writes every bin of a spectrum as CSV for external plotting.
pub fn write_spectrum_csv(spectrum: &Spectrum, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "frequency_hz,magnitude")?;
    for (freq, magnitude) in spectrum.frequencies.iter().zip(&spectrum.magnitudes) {
        writeln!(out, "{freq},{magnitude}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn analyze(args: AnalyzeArgs, converter: &PitchConverter<'_>) -> Result<()> {
    let reading = analyze_with(&WavFile::default(), &args, converter)?;
    print_reading(&reading, args.json)
}

/// Reads the file once and grades its dominant frequency, writing the
/// spectrum CSV from the same samples when one is requested.
fn analyze_with<L>(loader: &L, args: &AnalyzeArgs, converter: &PitchConverter<'_>) -> Result<TuningReading>
where
    L: AudioFileLoader + ?Sized,
{
    let frequency = match &args.spectrum_csv {
        None => spectrum::dominant_frequency_of_file(loader, &args.input)?,
        Some(csv) => {
            let wave = loader
                .load(&args.input)
                .with_context(|| format!("loading {}", args.input.display()))?;
            let frequency = dominant_frequency(wave.samples(), wave.sample_rate())
                .with_context(|| format!("analysing {}", args.input.display()))?;
            let spectrum = full_spectrum(wave.samples(), wave.sample_rate())?;
            write_spectrum_csv(&spectrum, csv)?;
            tracing::info!(path = %csv.display(), bins = spectrum.len(), "wrote spectrum");
            frequency
        }
    };
    Ok(converter.reading(frequency)?)
}

pub fn note(args: NoteArgs, converter: &PitchConverter<'_>) -> Result<()> {
    if let Ok(frequency) = converter.pitch_to_frequency(&args.value) {
        println!("{} = {:.2} Hz", args.value, frequency);
        return Ok(());
    }
    let frequency: f64 = args
        .value
        .parse()
        .with_context(|| format!("{:?} is neither a pitch name nor a frequency", args.value))?;
    let reading = converter.reading(frequency)?;
    print_reading(&reading, args.json)
}

pub fn settings(args: SettingsArgs, settings: &TunerSettings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    if let Some(path) = &args.save {
        config::save_settings(settings, path)?;
    }
    Ok(())
}

#[cfg(feature = "capture")]
pub use live::{DevicesArgs, ListenArgs, RecordArgs, devices, listen, record};

#[cfg(feature = "capture")]
mod live {
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use anyhow::Result;
    use clap::Args;
    use soundbyte_core::audio::{self, CaptureStream, MicrophoneCapture, WaveformEncoder};
    use soundbyte_core::{PitchConverter, TunerSettings, analyze_frame, dominant_frequency};

    use crate::capture::CpalCapture;
    use crate::wav::WavFile;

    /// Number of frames averaged for the displayed cents.
    const SMOOTHING_FACTOR: usize = 5;

    #[derive(Args)]
    pub struct DevicesArgs {}

    #[derive(Args)]
    pub struct ListenArgs {
        /// How long to listen, in seconds
        #[arg(long, default_value = "10.0")]
        seconds: f64,
    }

    #[derive(Args)]
    pub struct RecordArgs {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// How long to record, in seconds
        #[arg(long, default_value = "5.0")]
        seconds: f64,
    }

    fn chunk_count(seconds: f64, sample_rate: u32, chunk_size: usize) -> usize {
        let chunks = seconds * f64::from(sample_rate) / chunk_size as f64;
        if chunks.is_finite() && chunks > 0.0 {
            chunks.ceil() as usize
        } else {
            0
        }
    }

    pub fn devices(_args: DevicesArgs) -> Result<()> {
        let devices = CpalCapture.devices()?;
        if devices.is_empty() {
            println!("No input devices found.");
            return Ok(());
        }
        println!("Available microphones:");
        for device in devices {
            println!("  [{}] {}", device.index, device.name);
        }
        Ok(())
    }

    pub fn listen(args: ListenArgs, settings: &TunerSettings, converter: &PitchConverter<'_>) -> Result<()> {
        let mut stream = CpalCapture.open(settings.input_device, settings.sample_rate, settings.chunk_size)?;
        let sample_rate = stream.sample_rate();
        let frames = chunk_count(args.seconds, sample_rate, settings.chunk_size);
        let mut smoothing_buffer: VecDeque<f64> = VecDeque::with_capacity(SMOOTHING_FACTOR);

        for _ in 0..frames {
            let chunk = stream.read_chunk()?;
            let result = analyze_frame(&chunk, sample_rate, converter, settings.amplitude_threshold);

            match (result.note_name, result.detected_frequency, result.cents_deviation, result.band) {
                (Some(name), Some(freq), Some(cents), Some(band)) => {
                    smoothing_buffer.push_back(cents);
                    if smoothing_buffer.len() > SMOOTHING_FACTOR {
                        smoothing_buffer.pop_front();
                    }
                    let smoothed = smoothing_buffer.iter().sum::<f64>() / smoothing_buffer.len() as f64;
                    println!("{name:<5} {freq:>9.2} Hz  {smoothed:>+8.2} cents  {}", band.label());
                }
                _ => {
                    smoothing_buffer.clear();
                    println!("  --");
                }
            }
        }
        Ok(())
    }

    pub fn record(args: RecordArgs, settings: &TunerSettings) -> Result<()> {
        let wave = {
            let mut stream =
                CpalCapture.open(settings.input_device, settings.sample_rate, settings.chunk_size)?;
            let chunks = chunk_count(args.seconds, stream.sample_rate(), settings.chunk_size);
            println!("Recording...");
            audio::record(&mut stream, chunks)?
        };
        println!("Finished Recording");

        WavFile::default().encode(&wave, &args.output)?;
        match dominant_frequency(wave.samples(), wave.sample_rate()) {
            Ok(freq) => println!("Audio saved as {} (dominant {:.2} Hz)", args.output.display(), freq),
            Err(_) => println!("Audio saved as {}", args.output.display()),
        }
        Ok(())
    }

}
