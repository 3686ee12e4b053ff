// Aria music generator — CLI entry point.
//
// Samples a rhythm, walks a melody over a chord progression, pairs it with a
// percussion groove, and writes the result to MIDI (and optionally JSON).
//
// Usage:
//   cargo run -p aria_music -- [output.mid] [--seed N] [--randomness R]
//     [--bars N] [--division N] [--progression "C Am F G"] [--key C]
//     [--minor] [--tempo BPM] [--json PATH]

use aria_music::drum::DrumPattern;
use aria_music::melody::{Melody, MelodySpec};
use aria_music::midi::write_midi;
use aria_music::presets::{self, Genre, Section};
use aria_music::rhythm::{OnsetPattern, RhythmSpec};
use aria_theory::{ChordProgression, DiatonicScale, pitch_class};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Output<'a> {
    melody: &'a Melody,
    drums: &'a DrumPattern,
    division_count: usize,
    bar_length: usize,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let output_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("output.mid");
    let seed: Option<u64> = parse_flag(&args, "--seed");
    let randomness: f64 = parse_flag(&args, "--randomness").unwrap_or(0.5);
    let bars: usize = parse_flag(&args, "--bars").unwrap_or(4);
    let division: usize = parse_flag(&args, "--division").unwrap_or(16);
    let tempo: u16 = parse_flag(&args, "--tempo").unwrap_or(90);
    let key: String = parse_flag(&args, "--key").unwrap_or_else(|| "C".to_string());
    let minor = args.iter().any(|a| a == "--minor");
    let progression_text: String =
        parse_flag(&args, "--progression").unwrap_or_else(|| "C Am F G".to_string());
    let json_path: Option<String> = parse_flag(&args, "--json");

    println!("=== Aria Music Generator ===");
    println!("Output: {output_path}");
    println!("Randomness: {randomness}");
    println!("Bars: {bars}, division: {division}");
    println!("Key: {key}{}", if minor { " minor" } else { " major" });
    println!("Progression: {progression_text}");
    if let Some(s) = seed {
        println!("Seed: {s}");
    }
    println!();

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let tonic = pitch_class(&key).ok_or_else(|| format!("unknown key '{key}'"))?;
    let scale = if minor {
        DiatonicScale::natural_minor(tonic)
    } else {
        DiatonicScale::major(tonic)
    };
    let progression = ChordProgression::parse(&progression_text, bars)?;

    println!("[1/4] Sampling rhythm...");
    let rhythm = RhythmSpec::new(randomness, bars, division, (4, 4))?;
    let pattern = OnsetPattern::sample(&rhythm, &mut rng)?;
    println!(
        "  {} onsets across {} steps.",
        pattern.onset_count(),
        pattern.len()
    );

    println!("[2/4] Walking melody...");
    let melody_spec = MelodySpec {
        randomness,
        ..MelodySpec::default()
    };
    let melody = Melody::generate(
        &melody_spec,
        &pattern,
        &scale,
        &progression,
        division,
        &mut rng,
    )?;
    println!("  {} notes.", melody.notes.len());

    println!("[3/4] Building percussion...");
    let grooves = presets::presets(Genre::Newage, Section::Verse)?;
    let groove = &grooves[0];
    let drums = if groove.division() < division {
        groove.multiply_division((division / groove.division()) as f64)?
    } else {
        groove.clone()
    };
    println!(
        "  '{}': {} frames at division {}.",
        drums.name(),
        drums.len(),
        drums.division()
    );

    println!("[4/4] Writing output...");
    write_midi(&melody, Some(&drums), division, tempo, Path::new(output_path))?;
    println!("  Wrote {output_path}");

    if let Some(json_path) = json_path {
        let output = Output {
            melody: &melody,
            drums: &drums,
            division_count: division,
            bar_length: bars,
        };
        std::fs::write(&json_path, serde_json::to_string_pretty(&output)?)?;
        println!("  Wrote {json_path}");
    }

    println!();
    println!("Play with: timidity {output_path} (or any MIDI player)");
    Ok(())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
