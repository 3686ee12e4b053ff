// The melodic pitch walker.
//
// Walks an onset pattern one subdivision at a time, holding one "open" note.
// Silent steps extend the open note; onset steps close it and pick the next
// pitch. At harmonic boundaries (the first subdivision of each chord group)
// the pitch comes from the chord's own tones spread across the playable
// window; elsewhere it is a scale-constrained Gaussian step from the nearest
// usable pitch. Each bar restarts the walk, so the first chord-tone choice
// of a bar is uniform.
//
// The walker's accumulator produces one quirk worth naming: the note that is
// "closed" at a bar's first onset never had a pitch assigned, so it comes out
// as a pitch-0 placeholder covering the bar's leading silence (length 0 when
// the bar opens on an onset). `LeadingNote` makes the keep-or-drop decision
// explicit instead of silently fixing it.

use crate::rhythm::OnsetPattern;
use crate::sample::{find_nearest, gaussian_index};
use aria_theory::{Chord, ChordProgression, Scale};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multiplier from style randomness to Gaussian step width.
const RANDOM_WEIGHT: f64 = 3.0;

/// Floor on the Gaussian step width, so randomness 0 still moves.
const SIGMA_FLOOR: f64 = 0.1;

/// How far chord tones are spread from their home octave, in octaves below
/// and above (matching an 8-octave span centered on the playable window).
const OCTAVE_SPREAD_DOWN: i16 = 4;
const OCTAVE_SPREAD_UP: i16 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MelodyError {
    #[error("{chords} chords per bar do not evenly divide {division_count} subdivisions")]
    UnevenChordSplit {
        chords: usize,
        division_count: usize,
    },
    #[error("onset pattern has {pattern_len} steps, expected {expected} (bars x division_count)")]
    PatternLengthMismatch {
        pattern_len: usize,
        expected: usize,
    },
    #[error("scale and playable window share no pitches")]
    NoUsablePitches,
    #[error("chord '{chord}' has no tones inside the playable window")]
    NoChordCandidates { chord: String },
}

/// Policy for the degenerate pitch-0 entry closed at a bar's first onset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadingNote {
    /// Emit the placeholder as a pitch-0 entry covering the leading silence.
    Keep,
    /// Suppress it; the bar's output starts at its first real pitch.
    #[default]
    Drop,
}

/// Style parameters for melody generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodySpec {
    pub randomness: f64,
    /// Inclusive playable pitch window. Default E4..E6.
    pub window: (u8, u8),
    pub leading_note: LeadingNote,
}

impl Default for MelodySpec {
    fn default() -> Self {
        MelodySpec {
            randomness: 0.5,
            window: (64, 88),
            leading_note: LeadingNote::default(),
        }
    }
}

impl MelodySpec {
    fn sigma(&self) -> f64 {
        RANDOM_WEIGHT * self.randomness + SIGMA_FLOOR
    }
}

/// One melody note: absolute MIDI pitch plus duration in subdivisions.
/// Pitch 0 marks a rest placeholder, never a sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub duration: u32,
}

/// A generated melody line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    pub notes: Vec<Note>,
    /// Per-note velocities. Velocity shaping is deliberately unimplemented;
    /// this stays empty and the renderer applies a flat default.
    pub velocity: Vec<u8>,
}

impl Melody {
    /// Walk the onset pattern against the progression and scale.
    ///
    /// The pattern must span `progression.bar_length() * division_count`
    /// steps, and each bar's chord count must evenly divide
    /// `division_count`; either mismatch is a configuration error.
    pub fn generate<S: Scale>(
        spec: &MelodySpec,
        pattern: &OnsetPattern,
        scale: &S,
        progression: &ChordProgression,
        division_count: usize,
        rng: &mut impl Rng,
    ) -> Result<Melody, MelodyError> {
        let expected = progression.bar_length() * division_count;
        if pattern.len() != expected {
            return Err(MelodyError::PatternLengthMismatch {
                pattern_len: pattern.len(),
                expected,
            });
        }
        let chords_per_bar = progression.chords_per_bar();
        if chords_per_bar == 0 || division_count % chords_per_bar != 0 {
            return Err(MelodyError::UnevenChordSplit {
                chords: chords_per_bar,
                division_count,
            });
        }

        let mut notes = Vec::new();
        for (bar_idx, bar_chords) in progression.bars().enumerate() {
            let bar_steps =
                &pattern.steps()[bar_idx * division_count..(bar_idx + 1) * division_count];
            walk_bar(spec, bar_steps, bar_chords, scale, &mut notes, rng)?;
        }
        Ok(Melody {
            notes,
            velocity: Vec::new(),
        })
    }

    /// Produce a variant: each note keeps its pitch with probability
    /// `keep_probability`, otherwise it is re-picked by a Gaussian step
    /// within the scale's usable pitches from the nearest usable pitch.
    /// Durations and rest placeholders are untouched.
    pub fn differ<S: Scale>(
        &self,
        keep_probability: f64,
        spec: &MelodySpec,
        scale: &S,
        rng: &mut impl Rng,
    ) -> Result<Melody, MelodyError> {
        let usable = scale.pitches_in_range(spec.window.0, spec.window.1);
        if usable.is_empty() {
            return Err(MelodyError::NoUsablePitches);
        }

        let mut notes = Vec::with_capacity(self.notes.len());
        for &note in &self.notes {
            if note.pitch == 0 || rng.random_bool(keep_probability.clamp(0.0, 1.0)) {
                notes.push(note);
                continue;
            }
            let pivot = find_nearest(&usable, note.pitch).ok_or(MelodyError::NoUsablePitches)?;
            let idx = gaussian_index(rng, pivot, spec.sigma(), usable.len())
                .ok_or(MelodyError::NoUsablePitches)?;
            notes.push(Note {
                pitch: usable[idx],
                duration: note.duration,
            });
        }
        Ok(Melody {
            notes,
            velocity: Vec::new(),
        })
    }

    /// Total duration in subdivisions.
    pub fn total_duration(&self) -> u32 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

/// Walk one bar of the pattern. Appends the bar's notes to `out`.
fn walk_bar<S: Scale>(
    spec: &MelodySpec,
    bar_steps: &[bool],
    bar_chords: &[Chord],
    scale: &S,
    out: &mut Vec<Note>,
    rng: &mut impl Rng,
) -> Result<(), MelodyError> {
    let steps_per_chord = bar_steps.len() / bar_chords.len();
    let (low, high) = spec.window;

    let mut prev_pitch: Option<u8> = None;
    let mut open_len: u32 = 0;
    let mut usable: Vec<u8> = Vec::new();

    for (idx, &onset) in bar_steps.iter().enumerate() {
        let chord = &bar_chords[idx / steps_per_chord];
        let chord_boundary = idx % steps_per_chord == 0;

        if chord_boundary {
            // Refresh the usable-notes set for this chord group. If the
            // active scale can't support the chord, substitute one estimated
            // from the chord itself.
            usable = if scale.supports(chord) {
                scale.pitches_in_range(low, high)
            } else {
                S::estimate(chord).pitches_in_range(low, high)
            };
        }

        if !onset {
            open_len += 1;
            continue;
        }

        // Close the open note.
        match prev_pitch {
            Some(pitch) => out.push(Note {
                pitch,
                duration: open_len,
            }),
            None => {
                if spec.leading_note == LeadingNote::Keep {
                    out.push(Note {
                        pitch: 0,
                        duration: open_len,
                    });
                }
            }
        }
        open_len = 1;

        let next = if chord_boundary {
            choose_from_chord(spec, chord, prev_pitch, rng)?
        } else {
            step_in_scale(spec, &usable, prev_pitch, rng)?
        };
        prev_pitch = Some(next);
    }

    // Close the final open note; a fully-silent bar still yields one entry
    // spanning the whole bar.
    out.push(Note {
        pitch: prev_pitch.unwrap_or(0),
        duration: open_len,
    });
    Ok(())
}

/// Pick a chord tone: the chord's components spread across octaves, clipped
/// to the playable window. No previous pitch means a uniform choice;
/// otherwise a Gaussian step from the candidate nearest the previous pitch.
fn choose_from_chord(
    spec: &MelodySpec,
    chord: &Chord,
    prev_pitch: Option<u8>,
    rng: &mut impl Rng,
) -> Result<u8, MelodyError> {
    let (low, high) = spec.window;
    let home: Vec<i16> = chord
        .component_pitches(4)
        .into_iter()
        .map(i16::from)
        .collect();

    let mut candidates: Vec<u8> = Vec::new();
    for shift in -OCTAVE_SPREAD_DOWN..=OCTAVE_SPREAD_UP {
        for &pitch in &home {
            let shifted = pitch + shift * 12;
            if shifted >= low as i16 && shifted <= high as i16 {
                candidates.push(shifted as u8);
            }
        }
    }
    candidates.sort_unstable();
    candidates.dedup();

    if candidates.is_empty() {
        return Err(MelodyError::NoChordCandidates {
            chord: chord.symbol(),
        });
    }

    match prev_pitch {
        None => Ok(candidates[rng.random_range(0..candidates.len())]),
        Some(prev) => {
            let pivot = find_nearest(&candidates, prev).ok_or_else(|| {
                MelodyError::NoChordCandidates {
                    chord: chord.symbol(),
                }
            })?;
            let idx = gaussian_index(rng, pivot, spec.sigma(), candidates.len()).ok_or_else(
                || MelodyError::NoChordCandidates {
                    chord: chord.symbol(),
                },
            )?;
            Ok(candidates[idx])
        }
    }
}

/// Gaussian step within the usable-notes set, centered on the usable pitch
/// nearest the previous one.
fn step_in_scale(
    spec: &MelodySpec,
    usable: &[u8],
    prev_pitch: Option<u8>,
    rng: &mut impl Rng,
) -> Result<u8, MelodyError> {
    if usable.is_empty() {
        return Err(MelodyError::NoUsablePitches);
    }
    let pivot = match prev_pitch {
        Some(prev) => find_nearest(usable, prev).ok_or(MelodyError::NoUsablePitches)?,
        None => usable.len() / 2,
    };
    let idx =
        gaussian_index(rng, pivot, spec.sigma(), usable.len()).ok_or(MelodyError::NoUsablePitches)?;
    Ok(usable[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_theory::DiatonicScale;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn c_major() -> DiatonicScale {
        DiatonicScale::major(0)
    }

    fn progression(symbols: &str, bars: usize) -> ChordProgression {
        ChordProgression::parse(symbols, bars).unwrap()
    }

    #[test]
    fn silent_bar_yields_one_spanning_note() {
        let spec = MelodySpec::default();
        let pattern = OnsetPattern::from_steps(vec![false; 16]);
        let mut rng = StdRng::seed_from_u64(0);
        let melody = Melody::generate(
            &spec,
            &pattern,
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap();
        assert_eq!(
            melody.notes,
            vec![Note {
                pitch: 0,
                duration: 16
            }]
        );
    }

    #[test]
    fn uneven_chord_split_is_a_configuration_error() {
        let spec = MelodySpec::default();
        let pattern = OnsetPattern::from_steps(vec![true; 16]);
        let mut rng = StdRng::seed_from_u64(0);
        let err = Melody::generate(
            &spec,
            &pattern,
            &c_major(),
            &progression("C F G", 1),
            16,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MelodyError::UnevenChordSplit {
                chords: 3,
                division_count: 16
            }
        );
    }

    #[test]
    fn pattern_length_must_match_geometry() {
        let spec = MelodySpec::default();
        let pattern = OnsetPattern::from_steps(vec![true; 15]);
        let mut rng = StdRng::seed_from_u64(0);
        let err = Melody::generate(
            &spec,
            &pattern,
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MelodyError::PatternLengthMismatch {
                pattern_len: 15,
                expected: 16
            }
        );
    }

    #[test]
    fn pitches_stay_in_scale_and_window() {
        let spec = MelodySpec::default();
        let scale = c_major();
        let cp = progression("C Am F G", 4);
        let mut rng = StdRng::seed_from_u64(99);
        // Onset every other step across 4 bars.
        let steps: Vec<bool> = (0..64).map(|i| i % 2 == 0).collect();
        let melody = Melody::generate(
            &spec,
            &OnsetPattern::from_steps(steps),
            &scale,
            &cp,
            16,
            &mut rng,
        )
        .unwrap();

        use aria_theory::Scale as _;
        assert!(melody.notes.len() > 4);
        for note in &melody.notes {
            if note.pitch == 0 {
                continue; // rest placeholder
            }
            assert!(
                (64..=88).contains(&note.pitch),
                "pitch {} outside window",
                note.pitch
            );
            assert!(
                scale.contains(note.pitch),
                "pitch {} not in C major",
                note.pitch
            );
        }
    }

    #[test]
    fn durations_account_for_every_step_with_keep_policy() {
        let spec = MelodySpec {
            leading_note: LeadingNote::Keep,
            ..MelodySpec::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let steps: Vec<bool> = (0..32).map(|i| i % 3 == 0).collect();
        let melody = Melody::generate(
            &spec,
            &OnsetPattern::from_steps(steps),
            &c_major(),
            &progression("C G", 2),
            16,
            &mut rng,
        )
        .unwrap();
        // With the placeholder kept, every subdivision lands in some note.
        assert_eq!(melody.total_duration(), 32);
    }

    #[test]
    fn leading_placeholder_policy() {
        // First onset at step 2: two steps of leading silence.
        let mut steps = vec![false; 16];
        steps[2] = true;
        steps[7] = true;
        steps[11] = true;

        let mut rng = StdRng::seed_from_u64(8);
        let kept = Melody::generate(
            &MelodySpec {
                leading_note: LeadingNote::Keep,
                ..MelodySpec::default()
            },
            &OnsetPattern::from_steps(steps.clone()),
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap();
        assert_eq!(
            kept.notes[0],
            Note {
                pitch: 0,
                duration: 2
            }
        );

        let mut rng = StdRng::seed_from_u64(8);
        let dropped = Melody::generate(
            &MelodySpec::default(),
            &OnsetPattern::from_steps(steps),
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap();
        assert_ne!(dropped.notes[0].pitch, 0);
        assert_eq!(dropped.notes.len(), kept.notes.len() - 1);
    }

    #[test]
    fn zero_length_placeholder_when_bar_opens_on_onset() {
        let mut steps = vec![false; 16];
        steps[0] = true;
        steps[4] = true;
        steps[8] = true;
        let mut rng = StdRng::seed_from_u64(2);
        let melody = Melody::generate(
            &MelodySpec {
                leading_note: LeadingNote::Keep,
                ..MelodySpec::default()
            },
            &OnsetPattern::from_steps(steps),
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap();
        assert_eq!(
            melody.notes[0],
            Note {
                pitch: 0,
                duration: 0
            }
        );
    }

    #[test]
    fn window_with_no_chord_tones_errors() {
        let spec = MelodySpec {
            window: (61, 61), // C# only; C major triad can't reach it
            ..MelodySpec::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = Melody::generate(
            &spec,
            &OnsetPattern::from_steps(vec![true; 16]),
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MelodyError::NoChordCandidates {
                chord: "C".to_string()
            }
        );
    }

    #[test]
    fn differ_keeps_everything_at_probability_one() {
        let spec = MelodySpec::default();
        let mut rng = StdRng::seed_from_u64(21);
        let steps: Vec<bool> = (0..16).map(|i| i % 2 == 0).collect();
        let melody = Melody::generate(
            &spec,
            &OnsetPattern::from_steps(steps),
            &c_major(),
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap();
        let variant = melody.differ(1.0, &spec, &c_major(), &mut rng).unwrap();
        assert_eq!(variant.notes, melody.notes);
    }

    #[test]
    fn differ_replaces_pitches_within_usable_set() {
        use aria_theory::Scale as _;
        let spec = MelodySpec::default();
        let scale = c_major();
        let mut rng = StdRng::seed_from_u64(33);
        let steps: Vec<bool> = (0..16).map(|i| i % 2 == 0).collect();
        let melody = Melody::generate(
            &spec,
            &OnsetPattern::from_steps(steps),
            &scale,
            &progression("C", 1),
            16,
            &mut rng,
        )
        .unwrap();
        let variant = melody.differ(0.0, &spec, &scale, &mut rng).unwrap();
        assert_eq!(variant.notes.len(), melody.notes.len());
        for (orig, new) in melody.notes.iter().zip(&variant.notes) {
            assert_eq!(orig.duration, new.duration);
            if new.pitch != 0 {
                assert!(scale.contains(new.pitch));
                assert!((64..=88).contains(&new.pitch));
            }
        }
    }

    #[test]
    fn variation_with_empty_usable_set_errors() {
        let spec = MelodySpec {
            window: (61, 61),
            ..MelodySpec::default()
        };
        let melody = Melody {
            notes: vec![Note {
                pitch: 65,
                duration: 4,
            }],
            velocity: Vec::new(),
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            melody
                .differ(0.5, &spec, &c_major(), &mut rng)
                .unwrap_err(),
            MelodyError::NoUsablePitches
        );
    }
}
