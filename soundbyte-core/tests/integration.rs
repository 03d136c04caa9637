//! Integration tests for soundbyte-core.
//!
//! Exercise the public pipeline end to end: song text to waveform, waveform
//! to frequency, frequency back to tuner feedback.

use soundbyte_core::{
    Direction, PitchConverter, PitchTable, SongSequencer, TuningBand, dominant_frequency,
    full_spectrum, parse_song, synth,
};

// ---------------------------------------------------------------------------
// Pitch conversion
// ---------------------------------------------------------------------------

#[test]
fn reference_conversions() {
    let converter = PitchConverter::default();
    assert_eq!(converter.frequency_to_pitch_name(440.0).unwrap(), "A4");
    assert_eq!(converter.frequency_to_pitch_name(261.63).unwrap(), "C4");
    assert!((converter.pitch_to_frequency("A4").unwrap() - 440.0).abs() < 0.01);
    assert!((converter.pitch_to_frequency("C4").unwrap() - 261.63).abs() < 0.01);
}

#[test]
fn flat_spellings_come_back_sharp() {
    let converter = PitchConverter::default();
    for (flat, sharp) in [("Db3", "C#3"), ("Eb5", "D#5"), ("Gb0", "F#0"), ("Bb-1", "A#-1")] {
        let freq = converter.pitch_to_frequency(flat).unwrap();
        assert_eq!(converter.frequency_to_pitch_name(freq).unwrap(), sharp);
    }
}

// ---------------------------------------------------------------------------
// Synthesis -> analysis -> tuning feedback
// ---------------------------------------------------------------------------

#[test]
fn synthesized_pitch_is_detected_and_in_tune() {
    let converter = PitchConverter::default();
    let frequency = converter.pitch_to_frequency("A3").unwrap();
    let wave = synth::sine_wave(1.0, 44100, frequency);

    let detected = dominant_frequency(wave.samples(), wave.sample_rate()).unwrap();
    assert!((detected - frequency).abs() < 1.0);

    let reading = converter.reading(detected).unwrap();
    assert_eq!(reading.pitch_name, "A3");
    assert_eq!(reading.band, TuningBand::InTune);
}

#[test]
fn detuned_tone_is_classified() {
    let converter = PitchConverter::default();
    // 446 Hz analysed with 1 Hz bins.
    let wave = synth::sine_wave(1.0, 44100, 446.0);
    let detected = dominant_frequency(wave.samples(), 44100).unwrap();
    let reading = converter.reading(detected).unwrap();
    assert_eq!(reading.band, TuningBand::ReallyOut);
    assert_eq!(reading.direction, Direction::Flat);
}

#[test]
fn chord_spectrum_shows_every_member() {
    let frequencies = [440.0, 554.0, 659.0];
    let wave = synth::chord(1.0, 8000, &frequencies);
    let spectrum = full_spectrum(wave.samples(), 8000).unwrap();

    for f in frequencies {
        let bin = spectrum
            .frequencies
            .iter()
            .position(|&x| (x - f).abs() < 0.5)
            .unwrap();
        assert!(spectrum.magnitudes[bin] > 3000.0, "{f} Hz is missing");
    }
}

// ---------------------------------------------------------------------------
// Songs
// ---------------------------------------------------------------------------

#[test]
fn song_duration_follows_tempo() {
    let song = parse_song("120\nC4, 0.5\nC4, 0.5\nC4, 0.5\n").unwrap();
    let wave = SongSequencer::default().render_song(&song).unwrap();
    let expected = (3.0 / 120.0) * 60.0 * 0.5;
    assert!((wave.duration_secs() - expected).abs() < 0.1);
}

#[test]
fn song_respects_custom_reference_pitch() {
    let table = PitchTable::new(432.0).unwrap();
    let sequencer = SongSequencer::new(PitchConverter::new(&table), 8000);
    let wave = sequencer.render_text("60\nA4, 1\n").unwrap();
    let detected = dominant_frequency(wave.samples(), 8000).unwrap();
    assert!((detected - 432.0).abs() < 1.0);
}
