//! Spinner for the remote loading indicator.

use std::time::Instant;

/// Braille spinner frames.
const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Animation speed in milliseconds per frame.
const FRAME_DURATION_MS: u128 = 100;

/// Spinner state for animated indicators.
#[derive(Debug, Clone)]
pub struct Spinner {
    /// When the spinner started.
    start_time: Instant,
    /// Label to display with the spinner.
    label: String,
}

impl Spinner {
    /// Creates a spinner shown while `label` is loading.
    pub fn loading(label: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            label: label.into(),
        }
    }

    /// Returns the current frame of the animation.
    pub fn frame(&self) -> &'static str {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        let frame_index = (elapsed_ms / FRAME_DURATION_MS) as usize;
        BRAILLE_FRAMES[frame_index % BRAILLE_FRAMES.len()]
    }

    /// Returns the display string for the spinner.
    pub fn display(&self) -> String {
        format!("{} {}", self.frame(), self.label)
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_loading() {
        let spinner = Spinner::loading("Cube.js");
        assert_eq!(spinner.label(), "Cube.js");
        assert!(BRAILLE_FRAMES.contains(&spinner.frame()));
        assert!(spinner.display().ends_with(" Cube.js"));
    }
}
