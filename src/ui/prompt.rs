use crate::config::SliderSettings;
use crate::error::Result;
use std::io::{BufRead, Write};

/// Interactive 0-100 slider questionnaire over any line-based stream.
pub struct SliderPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> SliderPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask for all five sliders, starting from `defaults`.
    pub fn ask_all(&mut self, defaults: SliderSettings) -> Result<SliderSettings> {
        writeln!(self.output, "Tune the melody (0-100, Enter keeps the default)")?;
        Ok(SliderSettings {
            consonance: self.ask("Consonance (chord tones)", defaults.consonance)?,
            smoothness: self.ask("Smoothness (stepwise motion)", defaults.smoothness)?,
            syncopation: self.ask("Syncopation", defaults.syncopation)?,
            repetition: self.ask("Repetition (motifs)", defaults.repetition)?,
            space: self.ask("Space (rests)", defaults.space)?,
        })
    }

    /// Blank input or end of input keeps `default`; anything else must be an
    /// integer in 0..=100 or the question is repeated.
    pub fn ask(&mut self, label: &str, default: u8) -> Result<u8> {
        loop {
            write!(self.output, "{} [{}]: ", label, default)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(default);
            }

            let answer = line.trim();
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<u8>() {
                Ok(value) if value <= 100 => return Ok(value),
                _ => writeln!(self.output, "Please enter an integer between 0 and 100.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_blank_keeps_default() {
        let mut prompt = SliderPrompt::new(Cursor::new("\n"), Vec::new());
        assert_eq!(prompt.ask("Space", 45).unwrap(), 45);
    }

    #[test]
    fn test_invalid_input_reprompts() {
        let mut output = Vec::new();
        let value = SliderPrompt::new(Cursor::new("abc\n150\n-3\n70\n"), &mut output)
            .ask("Syncopation", 45)
            .unwrap();
        assert_eq!(value, 70);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Syncopation [45]: ").count(), 4);
        assert_eq!(text.matches("between 0 and 100").count(), 3);
    }

    #[test]
    fn test_ask_all_mixes_defaults_and_answers() {
        let mut prompt = SliderPrompt::new(Cursor::new("80\n\n10\n"), Vec::new());
        let sliders = prompt.ask_all(SliderSettings::default()).unwrap();
        assert_eq!(
            sliders,
            SliderSettings {
                consonance: 80,
                smoothness: 55,
                syncopation: 10,
                repetition: 55,
                space: 45,
            }
        );
    }
}
