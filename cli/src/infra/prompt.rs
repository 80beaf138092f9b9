//! Stdin-backed [`Confirmer`].

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::application::ports::Confirmer;

/// Asks on stderr and reads one line from stdin. Only `y`/`Y` confirms.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        eprint!("{prompt} [y/N]: ");
        std::io::stderr().flush()?;
        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        anyhow::ensure!(n > 0, "no input provided");
        Ok(is_yes(&line))
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
