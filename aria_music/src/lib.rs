// Aria music generator.
//
// Procedurally generates melody lines and percussion patterns from
// high-level style parameters (randomness, meter, harmonic context).
//
// Architecture:
// - rhythm.rs: hierarchical onset-probability profiles and the binary onset
//   patterns sampled from them
// - melody.rs: the chord/scale-aware pitch walker and the differ variation
//   operator
// - drum.rs: multi-track percussion frame encoding + subdivision rescaling
// - presets.rs: built-in percussion grooves keyed by genre/section
// - sample.rs: shared helpers (nearest-value lookup, bounded Gaussian
//   index sampling)
// - midi.rs: Standard MIDI File output, the boundary to the audio renderer
//
// Harmonic vocabulary (chords, progressions, scales) comes from the
// `aria_theory` crate through its `Scale` capability interface.
//
// Every sampling call takes a caller-supplied `rand::Rng`, so generation is
// reproducible given a seeded generator. The library performs no I/O except
// in midi.rs.

pub mod drum;
pub mod melody;
pub mod midi;
pub mod presets;
pub mod rhythm;
pub mod sample;

pub use drum::{DrumError, DrumPattern};
pub use melody::{LeadingNote, Melody, MelodyError, MelodySpec, Note};
pub use rhythm::{OnsetPattern, RhythmError, RhythmSpec};
