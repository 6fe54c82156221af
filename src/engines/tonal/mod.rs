pub mod pitch;
pub mod scale;
pub mod chord;
pub mod context;

pub use pitch::{pitch_class_of, PitchClassSet};
pub use scale::{scale_pitch_classes, Mode};
pub use chord::{chord_pitch_classes, ChordQuality, ChordSymbol};
pub use context::TonalContext;
