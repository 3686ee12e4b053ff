// MIDI file output for generated material.
//
// Converts a melody line and an optional drum pattern into a Standard MIDI
// File (SMF Format 1). This is the boundary to the downstream audio
// renderer: tempo and absolute time exist only here — the generator itself
// deals purely in subdivisions.
//
// A bar is assumed to span four quarter notes when converting subdivisions
// to ticks, matching the 4/4 grids the presets and specs default to.

use crate::drum::DrumPattern;
use crate::melody::Melody;
use midly::{
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u32 = 480;

/// Ticks spanned by one bar (four quarters).
const TICKS_PER_BAR: u32 = TICKS_PER_QUARTER * 4;

/// Fixed note-on velocity; velocity shaping is out of scope.
const VELOCITY: u8 = 80;

/// MIDI channel reserved for percussion.
const DRUM_CHANNEL: u8 = 9;

/// Write melody and drums to a MIDI file.
pub fn write_midi(
    melody: &Melody,
    drums: Option<&DrumPattern>,
    division_count: usize,
    tempo_bpm: u16,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let smf = to_smf(melody, drums, division_count, tempo_bpm);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Assemble the in-memory SMF: tempo track, melody track, drum track.
fn to_smf(
    melody: &Melody,
    drums: Option<&DrumPattern>,
    division_count: usize,
    tempo_bpm: u16,
) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER as u16)),
    ));

    let mut tempo_track: Track<'static> = Vec::new();
    let tempo_microseconds = 60_000_000 / tempo_bpm.max(1) as u32;
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(tempo_microseconds))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    smf.tracks.push(melody_track(melody, division_count));
    if let Some(drums) = drums {
        smf.tracks.push(drum_track(drums));
    }

    smf
}

fn melody_track(melody: &Melody, division_count: usize) -> Track<'static> {
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::TrackName(b"Melody")),
    });

    let channel = u4::new(0);
    let ticks_per_step = TICKS_PER_BAR / division_count.max(1) as u32;
    let mut cursor: u32 = 0;
    let mut last_event_tick: u32 = 0;

    for note in &melody.notes {
        let length = note.duration * ticks_per_step;
        // Pitch 0 is a rest placeholder: advance time, emit nothing.
        if note.pitch == 0 || length == 0 {
            cursor += length;
            continue;
        }
        track.push(TrackEvent {
            delta: u28::new(cursor - last_event_tick),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key: u7::new(note.pitch),
                    vel: u7::new(VELOCITY),
                },
            },
        });
        cursor += length;
        track.push(TrackEvent {
            delta: u28::new(length),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key: u7::new(note.pitch),
                    vel: u7::new(0),
                },
            },
        });
        last_event_tick = cursor;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    track
}

fn drum_track(drums: &DrumPattern) -> Track<'static> {
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::TrackName(b"Drums")),
    });

    let channel = u4::new(DRUM_CHANNEL);
    let ticks_per_step = TICKS_PER_BAR / drums.division().max(1) as u32;
    let mut last_event_tick: u32 = 0;

    for (step, frame) in drums.frames().iter().enumerate() {
        let step_tick = step as u32 * ticks_per_step;
        for &pitch in frame {
            if pitch == 0 {
                continue;
            }
            track.push(TrackEvent {
                delta: u28::new(step_tick - last_event_tick),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: u7::new(pitch),
                        vel: u7::new(VELOCITY),
                    },
                },
            });
            last_event_tick = step_tick;
        }
        // Release everything just before the next step.
        let off_tick = step_tick + ticks_per_step;
        for &pitch in frame {
            if pitch == 0 {
                continue;
            }
            track.push(TrackEvent {
                delta: u28::new(off_tick - last_event_tick),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: u7::new(pitch),
                        vel: u7::new(0),
                    },
                },
            });
            last_event_tick = off_tick;
        }
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drum::gm_keymap;
    use crate::melody::Note;

    fn melody() -> Melody {
        Melody {
            notes: vec![
                Note {
                    pitch: 0,
                    duration: 2,
                },
                Note {
                    pitch: 67,
                    duration: 4,
                },
                Note {
                    pitch: 69,
                    duration: 2,
                },
            ],
            velocity: Vec::new(),
        }
    }

    #[test]
    fn smf_has_expected_tracks() {
        let drums = DrumPattern::new(
            "kick",
            &[("bass_drum", vec![1, 0, 0, 1])],
            &gm_keymap(),
            None,
            4,
            1,
        )
        .unwrap();
        let smf = to_smf(&melody(), Some(&drums), 16, 90);
        // tempo + melody + drums
        assert_eq!(smf.tracks.len(), 3);

        let smf = to_smf(&melody(), None, 16, 90);
        assert_eq!(smf.tracks.len(), 2);
    }

    #[test]
    fn rest_placeholder_delays_first_note() {
        let track = melody_track(&melody(), 16);
        // First note event after the track name: NoteOn at tick 2 * (1920/16).
        let first_note = track
            .iter()
            .find(|e| matches!(e.kind, TrackEventKind::Midi { .. }))
            .unwrap();
        assert_eq!(first_note.delta.as_int(), 2 * 120);
    }

    #[test]
    fn drum_track_releases_between_steps() {
        let drums = DrumPattern::new(
            "kick",
            &[("bass_drum", vec![1, 1])],
            &gm_keymap(),
            None,
            2,
            1,
        )
        .unwrap();
        let track = drum_track(&drums);
        let midi_events: Vec<_> = track
            .iter()
            .filter(|e| matches!(e.kind, TrackEventKind::Midi { .. }))
            .collect();
        // on/off per step
        assert_eq!(midi_events.len(), 4);
    }
}
