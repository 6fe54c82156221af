//! Evolutionary melody generation over a fixed harmonic context.
//!
//! A melody is a fixed-length grid of ticks (pitch, rest or hold). A genetic
//! algorithm searches that space against a hand-written musical fitness
//! function that is constrained by a key, a chord progression and a vocal range.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;
pub mod ui;

pub use error::{MelodyError, Result};
