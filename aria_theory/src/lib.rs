// Aria harmonic vocabulary.
//
// Shared musical types consumed by the generator crate:
// - chord.rs: chord symbols (root pitch class + quality), component pitches,
//   and chord progressions with per-bar segmentation
// - scale.rs: the `Scale` capability interface (membership, chord support,
//   scale estimation) plus the built-in diatonic backend
//
// The generator never looks inside these types beyond the capability
// interface, so alternate harmonic-theory backends can be swapped in without
// touching the sampling code.

pub mod chord;
pub mod scale;

pub use chord::{Chord, ChordProgression, Quality, TheoryError};
pub use scale::{DiatonicScale, Scale, ScaleKind};

/// Semitones per octave.
pub const OCTAVE: u8 = 12;

/// Parse a note name ("C", "F#", "Bb") into a pitch class 0-11.
pub fn pitch_class(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    let letter = chars.next()?;
    let base: i16 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let mut pc = base;
    for accidental in chars {
        match accidental {
            '#' => pc += 1,
            'b' => pc -= 1,
            _ => return None,
        }
    }
    Some(pc.rem_euclid(12) as u8)
}

/// Name of a pitch class, sharps preferred.
pub fn pitch_class_name(pc: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    NAMES[(pc % 12) as usize]
}
