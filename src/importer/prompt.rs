//! Line-based user interaction.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

/// Source of answers for interactive commands
pub trait Prompter {
    /// Ask a question and return the trimmed answer
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Show a line of output
    fn say(&mut self, message: &str);
}

/// Yes/no question. An empty answer picks `default`.
pub fn confirm(prompter: &mut dyn Prompter, question: &str, default: bool) -> Result<bool> {
    let hint = if default { "(Y/n)" } else { "(y/N)" };
    let answer = prompter.ask(&format!("{} {}: ", question, hint))?;

    Ok(match answer.to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Prompts on stdout, reads stdin
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", question)?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            anyhow::bail!("Input closed");
        }

        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Replays canned answers and records everything shown.
/// Running out of answers is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
    pub output: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    /// True when any shown line contains `needle`
    pub fn said(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.questions.push(question.to_string());
        match self.answers.pop_front() {
            Some(answer) => Ok(answer.trim().to_string()),
            None => anyhow::bail!("No scripted answer for: {}", question),
        }
    }

    fn say(&mut self, message: &str) {
        self.output.push(message.to_string());
    }
}
