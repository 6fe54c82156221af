mod prompt;

pub use prompt::SliderPrompt;
