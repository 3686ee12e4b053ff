// Chord symbols and progressions.
//
// A `Chord` is a root pitch class plus a quality; its component pitches are
// what the melody walker lands on at harmonic boundaries. A
// `ChordProgression` is the ordered harmonic context for a whole piece,
// segmentable into equal per-bar slices.
//
// Chord symbols parse from the usual shorthand ("C", "Am", "G7", "FM7"),
// which is how progressions arrive from the style-mapping layer.

use crate::{OCTAVE, pitch_class, pitch_class_name};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TheoryError {
    #[error("unknown chord symbol '{0}'")]
    UnknownChord(String),
    #[error("progression of {chords} chords cannot be split into {bars} equal bars")]
    UnevenProgression { chords: usize, bars: usize },
    #[error("progression must contain at least one chord")]
    EmptyProgression,
}

/// Chord quality, defined by semitone intervals above the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Major7,
    Minor7,
}

impl Quality {
    /// Semitone offsets of the chord tones above the root.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Quality::Major => &[0, 4, 7],
            Quality::Minor => &[0, 3, 7],
            Quality::Diminished => &[0, 3, 6],
            Quality::Augmented => &[0, 4, 8],
            Quality::Dominant7 => &[0, 4, 7, 10],
            Quality::Major7 => &[0, 4, 7, 11],
            Quality::Minor7 => &[0, 3, 7, 10],
        }
    }

    /// Suffix used in chord symbols ("", "m", "7", ...).
    pub fn suffix(self) -> &'static str {
        match self {
            Quality::Major => "",
            Quality::Minor => "m",
            Quality::Diminished => "dim",
            Quality::Augmented => "aug",
            Quality::Dominant7 => "7",
            Quality::Major7 => "M7",
            Quality::Minor7 => "m7",
        }
    }
}

/// A chord: root pitch class plus quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    root_pc: u8,
    quality: Quality,
}

impl Chord {
    pub fn new(root_pc: u8, quality: Quality) -> Self {
        Chord {
            root_pc: root_pc % 12,
            quality,
        }
    }

    /// Parse a chord symbol like "C", "Am", "G7", "FM7", "Bdim".
    pub fn parse(symbol: &str) -> Result<Self, TheoryError> {
        let unknown = || TheoryError::UnknownChord(symbol.to_string());
        let mut root_end = 0;
        for (i, c) in symbol.char_indices() {
            if i == 0 || c == '#' || c == 'b' {
                root_end = i + c.len_utf8();
            } else {
                break;
            }
        }
        if root_end == 0 {
            return Err(unknown());
        }
        let root_pc = pitch_class(&symbol[..root_end]).ok_or_else(unknown)?;
        let quality = match &symbol[root_end..] {
            "" | "M" | "maj" => Quality::Major,
            "m" | "min" => Quality::Minor,
            "dim" => Quality::Diminished,
            "aug" => Quality::Augmented,
            "7" => Quality::Dominant7,
            "M7" | "maj7" => Quality::Major7,
            "m7" | "min7" => Quality::Minor7,
            _ => return Err(unknown()),
        };
        Ok(Chord::new(root_pc, quality))
    }

    pub fn root_pc(&self) -> u8 {
        self.root_pc
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Pitch classes of the chord tones (root first).
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.quality
            .intervals()
            .iter()
            .map(|&iv| (self.root_pc + iv) % 12)
            .collect()
    }

    /// Chord tones as MIDI pitches in the given octave (C4 = 60 convention,
    /// so octave 4 puts the root in 60..72).
    pub fn component_pitches(&self, octave: u8) -> Vec<u8> {
        let base = (octave + 1) * OCTAVE;
        self.pitch_classes().iter().map(|&pc| base + pc).collect()
    }

    /// Display symbol ("Am", "G7", ...).
    pub fn symbol(&self) -> String {
        format!("{}{}", pitch_class_name(self.root_pc), self.quality.suffix())
    }
}

/// An ordered chord progression spanning `bar_length` bars.
///
/// The chord count must divide evenly into bars; the melody walker relies on
/// every bar carrying the same number of chords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordProgression {
    chords: Vec<Chord>,
    bar_length: usize,
}

impl ChordProgression {
    pub fn new(chords: Vec<Chord>, bar_length: usize) -> Result<Self, TheoryError> {
        if chords.is_empty() || bar_length == 0 {
            return Err(TheoryError::EmptyProgression);
        }
        if chords.len() % bar_length != 0 {
            return Err(TheoryError::UnevenProgression {
                chords: chords.len(),
                bars: bar_length,
            });
        }
        Ok(ChordProgression { chords, bar_length })
    }

    /// Parse a whitespace-separated list of chord symbols.
    pub fn parse(symbols: &str, bar_length: usize) -> Result<Self, TheoryError> {
        let chords = symbols
            .split_whitespace()
            .map(Chord::parse)
            .collect::<Result<Vec<_>, _>>()?;
        ChordProgression::new(chords, bar_length)
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn bar_length(&self) -> usize {
        self.bar_length
    }

    /// Chords per bar.
    pub fn chords_per_bar(&self) -> usize {
        self.chords.len() / self.bar_length
    }

    /// Iterate over per-bar chord slices.
    pub fn bars(&self) -> impl Iterator<Item = &[Chord]> {
        self.chords.chunks(self.chords_per_bar())
    }
}
