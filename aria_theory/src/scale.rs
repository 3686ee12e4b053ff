// Scale backends and the capability interface the generator consumes.
//
// The melody walker only ever asks four questions of a scale: does it contain
// a pitch, does it support a chord, what are its pitches inside a window, and
// "give me a plausible scale for this chord" when the active one doesn't
// support it. `Scale` captures exactly that surface; `DiatonicScale` is the
// built-in backend.

use crate::chord::Chord;
use serde::{Deserialize, Serialize};

/// Capability interface over a harmonic-theory backend.
///
/// Implementations must not mutate during generation; the walker may call
/// these methods in any order and relies on them being pure.
pub trait Scale {
    /// Membership test for an absolute MIDI pitch.
    fn contains(&self, pitch: u8) -> bool;

    /// Whether every chord tone lies inside this scale.
    fn supports(&self, chord: &Chord) -> bool {
        chord
            .pitch_classes()
            .iter()
            .all(|&pc| self.contains(pc))
    }

    /// Derive a scale that supports the given chord, used as a temporary
    /// substitute when the active scale does not.
    fn estimate(chord: &Chord) -> Self
    where
        Self: Sized;

    /// All member pitches in `[low, high]` inclusive, ascending.
    fn pitches_in_range(&self, low: u8, high: u8) -> Vec<u8> {
        (low..=high).filter(|&p| self.contains(p)).collect()
    }
}

/// The two diatonic scale shapes the built-in backend knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleKind {
    Major,
    NaturalMinor,
}

impl ScaleKind {
    /// Semitone offsets of the scale degrees above the tonic.
    pub fn intervals(self) -> [u8; 7] {
        match self {
            ScaleKind::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleKind::NaturalMinor => [0, 2, 3, 5, 7, 8, 10],
        }
    }
}

/// A diatonic scale: tonic pitch class plus shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiatonicScale {
    tonic_pc: u8,
    kind: ScaleKind,
}

impl DiatonicScale {
    pub fn new(tonic_pc: u8, kind: ScaleKind) -> Self {
        DiatonicScale {
            tonic_pc: tonic_pc % 12,
            kind,
        }
    }

    pub fn major(tonic_pc: u8) -> Self {
        DiatonicScale::new(tonic_pc, ScaleKind::Major)
    }

    pub fn natural_minor(tonic_pc: u8) -> Self {
        DiatonicScale::new(tonic_pc, ScaleKind::NaturalMinor)
    }

    pub fn tonic_pc(&self) -> u8 {
        self.tonic_pc
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// The 12 pitch classes as a membership table indexed by pitch class.
    fn pitch_classes(&self) -> [bool; 12] {
        let mut pcs = [false; 12];
        for iv in self.kind.intervals() {
            pcs[((self.tonic_pc + iv) % 12) as usize] = true;
        }
        pcs
    }
}

impl Scale for DiatonicScale {
    fn contains(&self, pitch: u8) -> bool {
        self.pitch_classes()[(pitch % 12) as usize]
    }

    fn estimate(chord: &Chord) -> Self {
        use crate::chord::Quality;
        // Minor-flavored chords suggest the minor scale on their root;
        // everything else gets the major scale.
        let kind = match chord.quality() {
            Quality::Minor | Quality::Minor7 | Quality::Diminished => ScaleKind::NaturalMinor,
            _ => ScaleKind::Major,
        };
        DiatonicScale::new(chord.root_pc(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_membership() {
        let scale = DiatonicScale::major(0);
        // C4=60, D4=62, E4=64, F4=65, G4=67, A4=69, B4=71
        for p in [60, 62, 64, 65, 67, 69, 71] {
            assert!(scale.contains(p), "pitch {p} should be in C major");
        }
        assert!(!scale.contains(61)); // C#
        assert!(!scale.contains(66)); // F#
    }

    #[test]
    fn a_minor_membership() {
        let scale = DiatonicScale::natural_minor(9);
        // Same pitch classes as C major
        for p in [57, 59, 60, 62, 64, 65, 67] {
            assert!(scale.contains(p), "pitch {p} should be in A minor");
        }
        assert!(!scale.contains(58)); // Bb
    }

    #[test]
    fn supports_diatonic_chords() {
        let c_major = DiatonicScale::major(0);
        assert!(c_major.supports(&Chord::parse("C").unwrap()));
        assert!(c_major.supports(&Chord::parse("Am").unwrap()));
        assert!(c_major.supports(&Chord::parse("G7").unwrap()));
        assert!(!c_major.supports(&Chord::parse("E").unwrap())); // G# out
        assert!(!c_major.supports(&Chord::parse("Bb").unwrap()));
    }

    #[test]
    fn estimate_follows_chord_quality() {
        let from_minor = DiatonicScale::estimate(&Chord::parse("Dm").unwrap());
        assert_eq!(from_minor.kind(), ScaleKind::NaturalMinor);
        assert_eq!(from_minor.tonic_pc(), 2);
        assert!(from_minor.supports(&Chord::parse("Dm").unwrap()));

        let from_major = DiatonicScale::estimate(&Chord::parse("E").unwrap());
        assert_eq!(from_major.kind(), ScaleKind::Major);
        assert!(from_major.supports(&Chord::parse("E").unwrap()));
    }

    #[test]
    fn pitches_in_range_ascending() {
        let scale = DiatonicScale::major(0);
        let pitches = scale.pitches_in_range(60, 72);
        assert_eq!(pitches, vec![60, 62, 64, 65, 67, 69, 71, 72]);
    }
}
