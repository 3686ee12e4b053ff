// Built-in percussion pattern library.
//
// Hand-written grooves keyed by genre and song section. The generator picks
// from these and rescales them (drum::multiply_division) onto whatever grid
// the melody was sampled on. Onset rows are written out step by step so the
// groove is readable at a glance.

use crate::drum::{DrumError, DrumPattern, gm_keymap};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Genre {
    Newage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Intro,
    FillIn,
    Verse,
}

/// A one-step all-silent pattern, used where a section carries no percussion.
pub fn empty() -> Result<DrumPattern, DrumError> {
    DrumPattern::new(
        "empty",
        &[
            ("bass_drum", vec![0]),
            ("snare_drum", vec![0]),
            ("hihat_closed", vec![0]),
            ("hihat_opened", vec![0]),
            ("cymbal_crash", vec![0]),
        ],
        &gm_keymap(),
        Some(vec![0]),
        1,
        1,
    )
}

/// All presets for a genre/section pair. Sections without dedicated grooves
/// fall back to the empty pattern.
pub fn presets(genre: Genre, section: Section) -> Result<Vec<DrumPattern>, DrumError> {
    match (genre, section) {
        (Genre::Newage, Section::Intro) => Ok(vec![empty()?]),
        (Genre::Newage, Section::FillIn) => Ok(vec![newage_fill_in()?]),
        (Genre::Newage, Section::Verse) => {
            Ok(vec![verse_8beat()?, verse_16beat_slow()?])
        }
    }
}

fn newage_fill_in() -> Result<DrumPattern, DrumError> {
    DrumPattern::new(
        "newage_fill_in",
        &[
            ("bass_drum", vec![1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0]),
            ("snare_drum", vec![0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0]),
            ("hihat_closed", vec![0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            ("hihat_opened", vec![1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0]),
            ("cymbal_crash", vec![1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]),
        ],
        &gm_keymap(),
        // Descending tom run into the next section.
        Some(vec![0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 50, 48, 47, 45]),
        16,
        1,
    )
}

fn verse_8beat() -> Result<DrumPattern, DrumError> {
    let bars = 4;
    DrumPattern::new(
        "verse_8beat",
        &[
            ("bass_drum", vec![1, 0, 0, 0, 0, 1, 0, 0].repeat(bars)),
            ("snare_drum", vec![0, 0, 1, 0, 0, 0, 1, 0].repeat(bars)),
            ("hihat_closed", vec![1, 1, 1, 1, 1, 1, 1, 1].repeat(bars)),
            ("hihat_opened", vec![0; 8 * bars]),
            (
                "cymbal_crash",
                [vec![1, 0, 0, 0, 0, 0, 0, 0], vec![0; 8 * (bars - 1)]].concat(),
            ),
        ],
        &gm_keymap(),
        Some(vec![0; 8 * bars]),
        8,
        bars,
    )
}

fn verse_16beat_slow() -> Result<DrumPattern, DrumError> {
    let bars = 4;
    DrumPattern::new(
        "verse_16beat_slow",
        &[
            (
                "bass_drum",
                vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0].repeat(bars),
            ),
            (
                "snare_drum",
                vec![0, 0, 0, 0, 1, 0, 0, 1, 0, 1, 0, 0, 1, 0, 0, 1].repeat(bars),
            ),
            (
                "hihat_closed",
                vec![1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0].repeat(bars),
            ),
            ("hihat_opened", vec![0; 16 * bars]),
            (
                "cymbal_crash",
                [
                    vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
                    vec![0; 16 * (bars - 1)],
                ]
                .concat(),
            ),
        ],
        &gm_keymap(),
        Some(vec![0; 16 * bars]),
        16,
        bars,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_presets_construct() {
        for section in [Section::Intro, Section::FillIn, Section::Verse] {
            let patterns = presets(Genre::Newage, section).unwrap();
            assert!(!patterns.is_empty());
            for p in &patterns {
                assert_eq!(
                    p.len(),
                    p.division() * p.bar_length(),
                    "preset '{}' frame count disagrees with its geometry",
                    p.name()
                );
            }
        }
    }

    #[test]
    fn fill_in_keeps_the_tom_run() {
        let fill = newage_fill_in().unwrap();
        // Tom run sits in the aux slot (last) of the final four frames.
        let tail: Vec<u8> = fill.frames()[12..]
            .iter()
            .map(|frame| *frame.last().unwrap())
            .collect();
        assert_eq!(tail, vec![50, 48, 47, 45]);
    }

    #[test]
    fn verse_presets_span_four_bars() {
        for p in presets(Genre::Newage, Section::Verse).unwrap() {
            assert_eq!(p.bar_length(), 4);
        }
    }

    #[test]
    fn empty_preset_is_silent() {
        let p = empty().unwrap();
        assert_eq!(p.len(), 1);
        assert!(p.frames()[0].iter().all(|&v| v == 0));
    }
}
