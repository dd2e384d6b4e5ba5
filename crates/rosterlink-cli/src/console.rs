//! Stdin/stdout implementation of the engine's console.

use std::io::{self, BufRead, Write};

use rosterlink_engine::console::Console;

/// The real operator console. Prompt reads block on stdin; they run inside
/// [`tokio::task::block_in_place`] so the runtime's worker threads stay
/// responsive while the operator thinks.
pub struct StdConsole;

impl Console for StdConsole {
  fn say(&mut self, line: &str) {
    println!("{line}");
  }

  fn prompt(&mut self, msg: &str) -> io::Result<String> {
    tokio::task::block_in_place(|| {
      let mut stdout = io::stdout();
      write!(stdout, "{msg}")?;
      stdout.flush()?;

      let mut line = String::new();
      let n = io::stdin().lock().read_line(&mut line)?;
      if n == 0 {
        // stdin closed; treat like an operator walking away.
        return Err(io::Error::new(
          io::ErrorKind::UnexpectedEof,
          "stdin closed",
        ));
      }
      Ok(line.trim_end_matches(['\n', '\r']).to_string())
    })
  }
}

/// Ask a yes/no question, defaulting to no. Used before the irreversible
/// bulk-clear operations. Blocks on stdin, so it runs inside
/// [`tokio::task::block_in_place`] like the prompt reads above.
pub fn confirm(question: &str) -> io::Result<bool> {
  tokio::task::block_in_place(|| {
    let mut stdout = io::stdout();
    write!(stdout, "{question} [y/N] ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_yes(&line))
  })
}

/// Only an answer starting with `y`/`Y` counts as consent; everything else,
/// including an empty line or closed stdin, is a no.
fn is_yes(line: &str) -> bool {
  matches!(line.trim().chars().next(), Some('y') | Some('Y'))
}

#[cfg(test)]
mod tests {
  use super::is_yes;

  #[test]
  fn only_leading_y_is_consent() {
    assert!(is_yes("y"));
    assert!(is_yes("Yes\n"));
    assert!(is_yes("  yep"));
    assert!(!is_yes(""));
    assert!(!is_yes("\n"));
    assert!(!is_yes("n"));
    assert!(!is_yes("sure"));
  }
}
