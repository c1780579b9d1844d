//! Interactive column selection.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub const INVALID_INPUT_MESSAGE: &str = "Something went wrong! Check your input";

/// What the user picked at the column prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSelection {
    All,
    Defaults,
    /// Indices in the order they were entered, without repeats
    Indices(Vec<usize>),
}

/// Line-oriented prompt over any reader/writer pair.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Lists `labels` and reads choices until `all`, `default`, `done` or end
    /// of input.
    pub fn choose_columns(&mut self, labels: &[String]) -> Result<PromptSelection> {
        writeln!(self.output)?;
        for (index, label) in labels.iter().enumerate() {
            writeln!(self.output, "{index}. {label}")?;
        }
        writeln!(self.output)?;
        writeln!(self.output, "(Type 'all' to include all columns)")?;
        writeln!(self.output, "(Type 'default' to include only DEFAULT columns)")?;
        writeln!(
            self.output,
            "(Type 'done' to stop after entering custom column indexes)"
        )?;
        writeln!(self.output)?;
        self.output.flush()?;

        let mut indices = Vec::new();
        while let Some(line) = self.read_line()? {
            match line.as_str() {
                "all" => return Ok(PromptSelection::All),
                "default" => return Ok(PromptSelection::Defaults),
                "done" => break,
                "" => continue,
                entry => match entry.parse::<usize>() {
                    Ok(index) if index < labels.len() => {
                        if !indices.contains(&index) {
                            indices.push(index);
                        }
                    }
                    _ => {
                        writeln!(self.output, "{INVALID_INPUT_MESSAGE}")?;
                        self.output.flush()?;
                    }
                },
            }
        }
        Ok(PromptSelection::Indices(indices))
    }

    pub fn ask_filename(&mut self) -> Result<PathBuf> {
        writeln!(self.output, "\nEnter the filename:")?;
        self.output.flush()?;
        match self.read_line()? {
            Some(name) if !name.is_empty() => Ok(PathBuf::from(name)),
            _ => bail!("no input file given"),
        }
    }

    /// Next trimmed line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
