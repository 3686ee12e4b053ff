// Multi-track percussion patterns.
//
// A `DrumPattern` merges several per-instrument binary onset arrays into one
// time-indexed sequence of frames. Each frame holds one pitch value per
// track: 0 for silence, the instrument's mapped percussion pitch otherwise.
// An optional raw-pitch auxiliary track (melodic percussion like toms)
// passes through unscaled.
//
// `multiply_division` rescales a pattern onto a finer grid by padding each
// frame with silent frames, preserving every onset's absolute time position.
// That lets a coarse 8th-note groove share a grid with a 16th-note melody.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DrumError {
    #[error("pattern length mismatch: track '{track}' has {found} steps, expected {expected}")]
    LengthMismatch {
        track: String,
        found: usize,
        expected: usize,
    },
    #[error("no percussion pitch mapped for instrument '{0}'")]
    UnknownInstrument(String),
    #[error("drum pattern needs at least one track")]
    NoTracks,
    #[error("subdivision ratio must be at least 1, got {0}")]
    BadRatio(f64),
}

/// General MIDI percussion pitches for the instruments the preset library
/// uses.
pub fn gm_keymap() -> BTreeMap<&'static str, u8> {
    BTreeMap::from([
        ("bass_drum", 36),
        ("snare_drum", 38),
        ("hihat_closed", 42),
        ("hihat_opened", 46),
        ("cymbal_crash", 49),
    ])
}

/// A merged multi-instrument percussion pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumPattern {
    name: String,
    /// One frame per subdivision; each frame has one entry per track (plus
    /// the auxiliary track, if present, last).
    frames: Vec<Vec<u8>>,
    division: usize,
    bar_length: usize,
}

impl DrumPattern {
    /// Merge instrument onset arrays into frames.
    ///
    /// Every onset array is scaled by its instrument's pitch from `keymap`
    /// (an onset of 1 becomes the pitch, 0 stays 0). All arrays, including
    /// `aux`, must share one length; any mismatch is fatal.
    pub fn new(
        name: &str,
        tracks: &[(&str, Vec<u8>)],
        keymap: &BTreeMap<&str, u8>,
        aux: Option<Vec<u8>>,
        division: usize,
        bar_length: usize,
    ) -> Result<Self, DrumError> {
        if tracks.is_empty() && aux.is_none() {
            return Err(DrumError::NoTracks);
        }

        let expected = tracks
            .first()
            .map(|(_, onsets)| onsets.len())
            .or_else(|| aux.as_ref().map(Vec::len))
            .unwrap_or(0);

        let mut rows: Vec<Vec<u8>> = Vec::with_capacity(tracks.len() + 1);
        for (instrument, onsets) in tracks {
            let pitch = *keymap
                .get(instrument)
                .ok_or_else(|| DrumError::UnknownInstrument(instrument.to_string()))?;
            if onsets.len() != expected {
                return Err(DrumError::LengthMismatch {
                    track: instrument.to_string(),
                    found: onsets.len(),
                    expected,
                });
            }
            rows.push(onsets.iter().map(|&step| step * pitch).collect());
        }
        if let Some(aux) = aux {
            if aux.len() != expected {
                return Err(DrumError::LengthMismatch {
                    track: "aux".to_string(),
                    found: aux.len(),
                    expected,
                });
            }
            rows.push(aux);
        }

        let frames = (0..expected)
            .map(|step| rows.iter().map(|row| row[step]).collect())
            .collect();

        Ok(DrumPattern {
            name: name.to_string(),
            frames,
            division,
            bar_length,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    pub fn division(&self) -> usize {
        self.division
    }

    pub fn bar_length(&self) -> usize {
        self.bar_length
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of values per frame.
    pub fn arity(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }

    /// Rescale onto a grid `ratio` times finer: each frame is followed by
    /// `ratio - 1` all-silent frames and the division count is multiplied.
    ///
    /// The ratio is truncated to an integer before use — a fractional ratio
    /// silently loses its fraction, which is the caller's responsibility —
    /// and ratios below 1 are rejected outright.
    pub fn multiply_division(&self, ratio: f64) -> Result<DrumPattern, DrumError> {
        if !ratio.is_finite() || ratio < 1.0 {
            return Err(DrumError::BadRatio(ratio));
        }
        let k = ratio.trunc() as usize;

        let arity = self.arity();
        let mut frames = Vec::with_capacity(self.frames.len() * k);
        for frame in &self.frames {
            frames.push(frame.clone());
            for _ in 1..k {
                frames.push(vec![0; arity]);
            }
        }

        Ok(DrumPattern {
            name: self.name.clone(),
            frames,
            division: self.division * k,
            bar_length: self.bar_length,
        })
    }
}
