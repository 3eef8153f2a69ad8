//! Confirmation gate shown before a directory batch is dispatched

use std::io::{self, BufRead, Write};

/// Asks whether a batch of `total` images should go ahead
pub trait Confirm {
    fn confirm(&mut self, total: usize) -> io::Result<bool>;
}

/// Always proceeds, for `--yes` and scripted runs
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _total: usize) -> io::Result<bool> {
        Ok(true)
    }
}

/// Interactive prompt reading a yes/no answer from `input`
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for Prompt<R, W> {
    fn confirm(&mut self, total: usize) -> io::Result<bool> {
        writeln!(self.output, "{}", count_message(total))?;
        write!(self.output, "Continue ? (Y/n) ")?;
        self.output.flush()?;

        let mut answer = String::new();
        // EOF leaves the answer empty, which cancels
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// "1 image to resize" / "12 images to resize"
pub fn count_message(total: usize) -> String {
    format!("{} image{} to resize", total, if total > 1 { "s" } else { "" })
}

/// `y` or `yes` in any case, surrounding whitespace ignored
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
