//! The operator console abstraction.
//!
//! Interactive workflows suspend only at a console prompt — a blocking wait
//! for one line of input. The trait keeps the input source pluggable: the CLI
//! wires stdin/stdout, tests supply a scripted console.

use std::collections::VecDeque;
use std::io;

/// Where prompts go and operator answers come from.
pub trait Console {
  /// Emit one line of operator-facing text.
  fn say(&mut self, line: &str);

  /// Show `msg` and block for a single line of input.
  fn prompt(&mut self, msg: &str) -> io::Result<String>;
}

/// One parsed operator answer at a disambiguation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
  /// Zero-based index into the displayed candidate list.
  Pick(usize),
  /// Leave this record unlinked and move on.
  Skip,
  /// Terminate the whole run, keeping everything committed so far.
  Done,
}

/// Parse one input line against a candidate list of length `candidates`.
///
/// Accepts a 1-based in-range index, `S`, or `D` (case-insensitive, judged by
/// the first character for the letters). Everything else — empty lines,
/// out-of-range numbers, stray text — yields `None`, and the caller
/// re-prompts without raising an error.
pub fn parse_choice(line: &str, candidates: usize) -> Option<Choice> {
  let line = line.trim();
  if line.is_empty() {
    return None;
  }

  if line.chars().all(|c| c.is_ascii_digit()) {
    let n: usize = line.parse().ok()?;
    if (1..=candidates).contains(&n) {
      return Some(Choice::Pick(n - 1));
    }
    return None;
  }

  match line.chars().next()?.to_ascii_uppercase() {
    'S' => Some(Choice::Skip),
    'D' => Some(Choice::Done),
    _ => None,
  }
}

/// A console fed from a pre-recorded script, for tests. Records everything
/// shown to the "operator" in `transcript`.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
  inputs:         VecDeque<String>,
  pub transcript: Vec<String>,
}

impl ScriptedConsole {
  pub fn new<I, T>(inputs: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    Self {
      inputs:     inputs.into_iter().map(Into::into).collect(),
      transcript: Vec::new(),
    }
  }

  /// True if some part of the transcript contains `needle`.
  pub fn saw(&self, needle: &str) -> bool {
    self.transcript.iter().any(|l| l.contains(needle))
  }
}

impl Console for ScriptedConsole {
  fn say(&mut self, line: &str) {
    self.transcript.push(line.to_string());
  }

  fn prompt(&mut self, msg: &str) -> io::Result<String> {
    self.transcript.push(msg.to_string());
    self.inputs.pop_front().ok_or_else(|| {
      io::Error::new(io::ErrorKind::UnexpectedEof, "console script exhausted")
    })
  }
}

#[cfg(test)]
mod choice_tests {
  use super::{Choice, parse_choice};

  #[test]
  fn digits_map_to_zero_based_picks() {
    assert_eq!(parse_choice("1", 3), Some(Choice::Pick(0)));
    assert_eq!(parse_choice(" 3 ", 3), Some(Choice::Pick(2)));
  }

  #[test]
  fn out_of_range_and_zero_are_ignored() {
    assert_eq!(parse_choice("0", 3), None);
    assert_eq!(parse_choice("4", 3), None);
  }

  #[test]
  fn letters_are_case_insensitive_first_char() {
    assert_eq!(parse_choice("s", 1), Some(Choice::Skip));
    assert_eq!(parse_choice("Skip", 1), Some(Choice::Skip));
    assert_eq!(parse_choice("d", 1), Some(Choice::Done));
    assert_eq!(parse_choice("DONE", 1), Some(Choice::Done));
  }

  #[test]
  fn garbage_and_empty_input_are_ignored() {
    assert_eq!(parse_choice("", 3), None);
    assert_eq!(parse_choice("  ", 3), None);
    assert_eq!(parse_choice("x", 3), None);
    assert_eq!(parse_choice("1x", 3), None);
  }
}
