use super::types::{ImportedScore, NoteSpan};
use crate::engines::tonal::scale::Mode;
use crate::engines::tonal::pitch::{FLAT_NAMES, SHARP_NAMES};
use crate::error::{MelodyError, Result};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::HashMap;
use std::path::Path;

/// General MIDI percussion channel (channel 10, zero-based 9).
const DRUM_CHANNEL: u8 = 9;

/// Krumhansl-Kessler key profiles, tonic first.
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Everything the importer needs from a parsed file.
#[derive(Debug, Default)]
struct ScanResult {
    ticks_per_quarter: u64,
    tempo: Option<(u64, u32)>,
    time_signature: Option<(u64, (u8, u8))>,
    key_signature: Option<(u64, (i8, bool))>,
    notes: Vec<NoteSpan>,
}

pub struct MidiImporter;

impl MidiImporter {
    /// Read a Standard MIDI File and extract tempo, meter, key and one chord
    /// per measure for the first `expected_measures` measures.
    pub fn load<P: AsRef<Path>>(path: P, expected_measures: usize) -> Result<ImportedScore> {
        let bytes = std::fs::read(path.as_ref())?;
        log::info!("Importing MIDI file {}", path.as_ref().display());
        Self::from_bytes(&bytes, expected_measures)
    }

    pub fn from_bytes(bytes: &[u8], expected_measures: usize) -> Result<ImportedScore> {
        let smf = Smf::parse(bytes).map_err(|e| MelodyError::Midi(format!("Failed to parse MIDI: {}", e)))?;
        let scan = scan(&smf)?;

        let (numerator, denominator) = scan
            .time_signature
            .map(|(_, meter)| meter)
            .unwrap_or((4, 4));
        let measure_ticks =
            (scan.ticks_per_quarter * 4 * u64::from(numerator) / u64::from(denominator)).max(1);

        let last_end = scan.notes.iter().map(|n| n.end).max().unwrap_or(0);
        let measures_detected = last_end.div_ceil(measure_ticks) as usize;
        if measures_detected < expected_measures {
            return Err(MelodyError::ResourcePrecondition(format!(
                "MIDI has {} measures, at least {} required",
                measures_detected, expected_measures
            )));
        }

        let (tonic, mode) = match scan.key_signature {
            Some((_, (sharps, minor))) => {
                let (tonic, mode) = key_from_signature(sharps, minor);
                (Some(tonic), Some(mode))
            }
            None => match estimate_key(&pitch_class_histogram(&scan.notes, 0, last_end)) {
                Some((tonic, mode)) => (Some(tonic), Some(mode)),
                None => (None, None),
            },
        };

        let chords = (0..expected_measures as u64)
            .map(|m| {
                let histogram =
                    pitch_class_histogram(&scan.notes, m * measure_ticks, (m + 1) * measure_ticks);
                best_triad(&histogram)
            })
            .collect();

        let score = ImportedScore {
            bpm: scan
                .tempo
                .map(|(_, us)| (60_000_000.0 / f64::from(us.max(1))).round() as u32),
            time_signature: scan.time_signature.map(|(_, (n, d))| format!("{}/{}", n, d)),
            tonic: tonic.map(String::from),
            mode: mode.map(|m: Mode| m.config_name().to_string()),
            chords,
            measures_detected,
        };
        log::debug!("Imported score: {:?}", score);
        Ok(score)
    }
}

fn scan(smf: &Smf) -> Result<ScanResult> {
    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => u64::from(tpq.as_int()),
        Timing::Timecode(..) => {
            return Err(MelodyError::Midi("SMPTE timecode timing is not supported".to_string()))
        }
    };

    let mut result = ScanResult {
        ticks_per_quarter,
        ..ScanResult::default()
    };

    for track in &smf.tracks {
        let mut now: u64 = 0;
        let mut open: HashMap<(u8, u8), Vec<u64>> = HashMap::new();

        for event in track {
            now += u64::from(event.delta.as_int());
            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(us)) => {
                    keep_earliest(&mut result.tempo, now, us.as_int());
                }
                TrackEventKind::Meta(MetaMessage::TimeSignature(num, den_pow, _, _)) => {
                    let den = 1u8.checked_shl(u32::from(den_pow)).unwrap_or(4);
                    keep_earliest(&mut result.time_signature, now, (num, den));
                }
                TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor)) => {
                    keep_earliest(&mut result.key_signature, now, (sharps, minor));
                }
                TrackEventKind::Midi { channel, message } => {
                    let channel = channel.as_int();
                    if channel == DRUM_CHANNEL {
                        continue;
                    }
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            open.entry((channel, key.as_int())).or_default().push(now);
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            let key = key.as_int();
                            if let Some(start) = open.get_mut(&(channel, key)).and_then(Vec::pop) {
                                result.notes.push(NoteSpan { key, start, end: now });
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        // Notes never released end with their track
        for ((_, key), starts) in open {
            for start in starts {
                result.notes.push(NoteSpan { key, start, end: now });
            }
        }
    }

    Ok(result)
}

/// Tracks are scanned one after another, so "first" means lowest tick.
fn keep_earliest<T>(slot: &mut Option<(u64, T)>, tick: u64, value: T) {
    if slot.as_ref().map_or(true, |(current, _)| tick < *current) {
        *slot = Some((tick, value));
    }
}

/// Duration-weighted pitch-class histogram of the notes sounding in `[from, to)`.
fn pitch_class_histogram(notes: &[NoteSpan], from: u64, to: u64) -> [f64; 12] {
    let mut histogram = [0.0; 12];
    for note in notes {
        let overlap = note.overlap(from, to);
        if overlap > 0 {
            histogram[usize::from(note.key % 12)] += overlap as f64;
        }
    }
    histogram
}

/// Major or minor triad with the largest weight; "C" when nothing sounds.
fn best_triad(histogram: &[f64; 12]) -> String {
    let mut best: Option<(f64, String)> = None;
    for root in 0..12usize {
        for (third, suffix) in [(4usize, ""), (3usize, "m")] {
            let weight = histogram[root] + histogram[(root + third) % 12] + histogram[(root + 7) % 12];
            if weight > 0.0 && best.as_ref().map_or(true, |(w, _)| weight > *w) {
                best = Some((weight, format!("{}{}", SHARP_NAMES[root], suffix)));
            }
        }
    }
    best.map(|(_, symbol)| symbol).unwrap_or_else(|| "C".to_string())
}

fn key_from_signature(sharps: i8, minor: bool) -> (&'static str, Mode) {
    let major_tonic = (i32::from(sharps) * 7).rem_euclid(12) as usize;
    let names = if sharps < 0 { &FLAT_NAMES } else { &SHARP_NAMES };
    if minor {
        (names[(major_tonic + 9) % 12], Mode::NaturalMinor)
    } else {
        (names[major_tonic], Mode::Major)
    }
}

/// Krumhansl-Schmuckler key estimate from a pitch-class histogram.
///
/// Returns `None` for a silent histogram.
pub fn estimate_key(histogram: &[f64; 12]) -> Option<(&'static str, Mode)> {
    if histogram.iter().all(|w| *w <= 0.0) {
        return None;
    }

    let mut best: Option<(f64, usize, Mode)> = None;
    for tonic in 0..12 {
        for (profile, mode) in [(&MAJOR_PROFILE, Mode::Major), (&MINOR_PROFILE, Mode::NaturalMinor)] {
            let rotated: Vec<f64> = (0..12).map(|pc| profile[(pc + 12 - tonic) % 12]).collect();
            let r = correlation(histogram, &rotated);
            if best.map_or(true, |(b, _, _)| r > b) {
                best = Some((r, tonic, mode));
            }
        }
    }
    best.map(|(_, tonic, mode)| (SHARP_NAMES[tonic], mode))
}

fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a).powi(2);
        var_b += (y - mean_b).powi(2);
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28, u4, u7};
    use midly::{Format, Header, Track, TrackEvent};

    fn note(track: &mut Track<'static>, delta: u32, key: u8, length: u32) {
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(90) },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(length),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff { key: u7::new(key), vel: u7::new(0) },
            },
        });
    }

    /// One whole-note triad per measure at 480 ticks per quarter.
    fn encode(triads: &[[u8; 3]], key_signature: Option<(i8, bool)>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480))));
        let mut track: Track<'static> = Vec::new();
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000))),
        });
        if let Some((sharps, minor)) = key_signature {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::KeySignature(sharps, minor)),
            });
        }
        for triad in triads {
            for key in triad {
                track.push(TrackEvent {
                    delta: u28::new(0),
                    kind: TrackEventKind::Midi {
                        channel: u4::new(0),
                        message: MidiMessage::NoteOn { key: u7::new(*key), vel: u7::new(80) },
                    },
                });
            }
            for (i, key) in triad.iter().enumerate() {
                track.push(TrackEvent {
                    delta: u28::new(if i == 0 { 1920 } else { 0 }),
                    kind: TrackEventKind::Midi {
                        channel: u4::new(0),
                        message: MidiMessage::NoteOff { key: u7::new(*key), vel: u7::new(0) },
                    },
                });
            }
        }
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);

        let mut buf = Vec::new();
        smf.write(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_import_progression_and_tempo() {
        let bytes = encode(&[[60, 64, 67], [57, 60, 64], [65, 69, 72], [67, 71, 74]], Some((0, false)));
        let score = MidiImporter::from_bytes(&bytes, 4).unwrap();

        assert_eq!(score.bpm, Some(120));
        assert_eq!(score.time_signature, None);
        assert_eq!(score.tonic.as_deref(), Some("C"));
        assert_eq!(score.mode.as_deref(), Some("mayor"));
        assert_eq!(score.chords, vec!["C", "Am", "F", "G"]);
        assert_eq!(score.measures_detected, 4);
    }

    #[test]
    fn test_too_few_measures_is_precondition_error() {
        let bytes = encode(&[[60, 64, 67], [67, 71, 74]], None);
        let err = MidiImporter::from_bytes(&bytes, 8).unwrap_err();
        assert!(matches!(err, MelodyError::ResourcePrecondition(_)));
    }

    #[test]
    fn test_empty_measure_defaults_to_c() {
        let mut smf = Smf::new(Header::new(Format::SingleTrack, Timing::Metrical(u15::new(480))));
        let mut track: Track<'static> = Vec::new();
        // Silent first measure, then a D minor arpeggio
        note(&mut track, 1920, 62, 480);
        note(&mut track, 0, 65, 480);
        note(&mut track, 0, 69, 960);
        track.push(TrackEvent { delta: u28::new(0), kind: TrackEventKind::Meta(MetaMessage::EndOfTrack) });
        smf.tracks.push(track);
        let mut buf = Vec::new();
        smf.write(&mut buf).unwrap();

        let score = MidiImporter::from_bytes(&buf, 2).unwrap();
        assert_eq!(score.chords, vec!["C", "Dm"]);
        assert_eq!(score.bpm, None);
    }

    #[test]
    fn test_key_signature_mapping() {
        assert_eq!(key_from_signature(0, true), ("A", Mode::NaturalMinor));
        assert_eq!(key_from_signature(2, false), ("D", Mode::Major));
        assert_eq!(key_from_signature(-3, false), ("Eb", Mode::Major));
        assert_eq!(key_from_signature(-1, true), ("D", Mode::NaturalMinor));
    }

    #[test]
    fn test_estimate_key_from_scale() {
        let mut histogram = [0.0; 12];
        for pc in [0, 2, 4, 5, 7, 9, 11] {
            histogram[pc] = 1.0;
        }
        histogram[0] = 3.0;
        histogram[7] = 2.0;
        assert_eq!(estimate_key(&histogram), Some(("C", Mode::Major)));
        assert_eq!(estimate_key(&[0.0; 12]), None);
    }
}
