//! Terminal stand-ins for the speech seams: playback is printed and
//! "recognition" reads one typed line.

use std::io::{self, BufRead, Write};

use services::{CaptureError, CaptureSlot, PendingCapture, SpeechRecognizer, SpeechSynthesizer};

/// Read a trimmed line from stdin. `None` on end of input.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub struct ConsoleSynthesizer;

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&self, text: &str, language_tag: &str) {
        println!("  [{language_tag}] {text}");
    }
}

#[derive(Default)]
pub struct ConsoleRecognizer {
    slot: CaptureSlot,
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn start_listening(&self, language_tag: &str) -> Result<PendingCapture, CaptureError> {
        let pending = self.slot.begin()?;
        let result = match read_line(&format!("  speak ({language_tag}) > ")) {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Ok(String::new()),
            Err(err) => Err(CaptureError::Recognition(err.to_string())),
        };
        self.slot.complete(result);
        Ok(pending)
    }
}
