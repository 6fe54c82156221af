use crate::config::MusicConfig;
use crate::error::{MelodyError, Result};
use crate::types::{sounding_pitch, Tick};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::path::Path;

/// Ticks per quarter note in exported files.
pub const TICKS_PER_QUARTER: u16 = 480;

const CHANNEL: u8 = 0;
const VELOCITY: u8 = 80;
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

fn tempo_micros(bpm: u32) -> Result<u32> {
    let micros = 60_000_000 / bpm.max(1);
    if micros > MAX_TEMPO_MICROS {
        return Err(MelodyError::Midi(format!(
            "Tempo {} BPM is too slow for a MIDI tempo event",
            bpm
        )));
    }
    Ok(micros)
}

/// Render a melody to a file.
pub fn write_midi<P: AsRef<Path>>(ticks: &[Tick], music: &MusicConfig, path: P) -> Result<()> {
    let smf = melody_to_smf(ticks, music)?;
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| MelodyError::Midi(format!("Failed to encode MIDI: {}", e)))?;
    std::fs::write(path.as_ref(), &buf)?;
    log::info!("MIDI written to {}", path.as_ref().display());
    Ok(())
}

/// Single-track SMF where each tick lasts one grid subdivision.
///
/// A pitch starts a note, a hold extends whatever is sounding and a rest
/// ends it. A hold with nothing sounding stays silent.
pub fn melody_to_smf(ticks: &[Tick], music: &MusicConfig) -> Result<Smf<'static>> {
    let (numerator, denominator) = music.meter()?;
    let subdivisions = music.subdivisions.max(1) as u32;
    let measure_ticks = u32::from(TICKS_PER_QUARTER) * 4 * u32::from(numerator) / u32::from(denominator);
    let step = (measure_ticks / subdivisions).max(1);
    let micros = tempo_micros(music.tempo_bpm)?;

    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
            numerator,
            denominator.trailing_zeros() as u8,
            24,
            8,
        )),
    });

    let mut last_event_tick: u32 = 0;
    let mut current: Option<u8> = None;
    let mut push_note = |track: &mut Track<'static>, at: u32, key: u8, on: bool| {
        let message = if on {
            MidiMessage::NoteOn { key: u7::new(key), vel: u7::new(VELOCITY) }
        } else {
            MidiMessage::NoteOff { key: u7::new(key), vel: u7::new(0) }
        };
        track.push(TrackEvent {
            delta: u28::new(at - last_event_tick),
            kind: TrackEventKind::Midi { channel: u4::new(CHANNEL), message },
        });
        last_event_tick = at;
    };

    for (i, tick) in ticks.iter().enumerate() {
        let at = i as u32 * step;
        let heard = sounding_pitch(ticks, i);

        if let Some(pitch) = current {
            if tick.is_attack() || heard.is_none() {
                push_note(&mut track, at, pitch, false);
            }
        }
        if let Tick::Pitch(pitch) = tick {
            push_note(&mut track, at, *pitch, true);
        }
        current = heard;
    }

    if let Some(pitch) = current {
        push_note(&mut track, ticks.len() as u32 * step, pitch, false);
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(track);
    Ok(smf)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (key, on?, absolute tick) for every note event.
    fn note_events(smf: &Smf) -> Vec<(u8, bool, u32)> {
        let mut now = 0;
        let mut out = Vec::new();
        for event in &smf.tracks[0] {
            now += event.delta.as_int();
            if let TrackEventKind::Midi { message, .. } = event.kind {
                match message {
                    MidiMessage::NoteOn { key, .. } => out.push((key.as_int(), true, now)),
                    MidiMessage::NoteOff { key, .. } => out.push((key.as_int(), false, now)),
                    _ => {}
                }
            }
        }
        out
    }

    #[test]
    fn test_hold_extends_note() {
        let ticks = [Tick::Pitch(60), Tick::Hold, Tick::Hold, Tick::Pitch(62)];
        let smf = melody_to_smf(&ticks, &MusicConfig::default()).unwrap();
        assert_eq!(
            note_events(&smf),
            vec![(60, true, 0), (60, false, 720), (62, true, 720), (62, false, 960)]
        );
    }

    #[test]
    fn test_hold_after_rest_is_silent() {
        let ticks = [Tick::Hold, Tick::Pitch(64), Tick::Rest, Tick::Hold, Tick::Pitch(67)];
        let smf = melody_to_smf(&ticks, &MusicConfig::default()).unwrap();
        assert_eq!(
            note_events(&smf),
            vec![(64, true, 240), (64, false, 480), (67, true, 960), (67, false, 1200)]
        );
    }

    #[test]
    fn test_slowest_tempo_is_exact() {
        let music = MusicConfig {
            tempo_bpm: 4,
            ..MusicConfig::default()
        };
        let smf = melody_to_smf(&[Tick::Pitch(60)], &music).unwrap();
        let tempo = smf.tracks[0].iter().find_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        });
        assert_eq!(tempo, Some(15_000_000));
    }

    #[test]
    fn test_tempo_overflow_is_rejected() {
        let music = MusicConfig {
            tempo_bpm: 2,
            ..MusicConfig::default()
        };
        assert!(matches!(
            melody_to_smf(&[Tick::Pitch(60)], &music),
            Err(MelodyError::Midi(_))
        ));
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");
        write_midi(&[Tick::Pitch(60), Tick::Hold], &MusicConfig::default(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
        assert_eq!(note_events(&smf), vec![(60, true, 0), (60, false, 480)]);
    }
}
