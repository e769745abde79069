use std::io::{self, BufRead, Write};

use client_core::Confirm;
use tracing::warn;

/// Confirmation on the controlling terminal; `--yes` skips the question.
pub struct ConsolePrompt {
    pub assume_yes: bool,
}

impl Confirm for ConsolePrompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let stdin = io::stdin();
        match ask(prompt, &mut stdin.lock(), &mut io::stderr()) {
            Ok(answer) => answer,
            Err(error) => {
                warn!(%error, "could not read confirmation; treating as no");
                false
            }
        }
    }
}

pub fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn only_explicit_yes_confirms() {
        for (input, expected) in [("y\n", true), ("YES\n", true), ("\n", false), ("nope\n", false), ("", false)] {
            let mut out = Vec::new();
            let answer = ask("Delete?", &mut Cursor::new(input), &mut out).expect("ask");
            assert_eq!(answer, expected, "input {input:?}");
            assert_eq!(String::from_utf8(out).expect("utf8"), "Delete? [y/N] ");
        }
    }

    #[test]
    fn assume_yes_skips_the_question() {
        assert!(ConsolePrompt { assume_yes: true }.confirm("Delete everything?"));
    }
}
