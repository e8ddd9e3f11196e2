//! Video encoding: format negotiation, the encoder contract and its implementations.
//!
//! Encoders consume rendered frames in strictly increasing frame order and hand back the
//! finished container bytes.

/// `ffmpeg`-based encoders (system binary).
pub mod ffmpeg;
/// Encoder and runtime traits, formats and the in-memory encoder.
pub mod sink;
