//! Terminal UI helpers

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use manualqa_core::Result;
use manualqa_rag::AnswerSource;

const PROMPT: &str = "ask>";

/// Display the startup banner
pub fn display_banner(model: Option<&str>) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let border = "─".repeat(inner);
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", format!("┌{}┐", border).blue());
    println!("{}", empty_line.blue());

    let title = "ManualQA - answers from your equipment manuals";
    println!("│  {}{}│", title.blue().bold(), pad(title, inner - 2));

    println!("{}", empty_line.blue());

    let engine = match model {
        Some(model) => format!("Model: {}", model),
        None => "Model: none (extractive answers only)".to_string(),
    };
    for line in [engine.as_str(), "Type a question, 'help' or 'exit'"] {
        println!("{}", format!("│  {}{}│", line, pad(line, inner - 2)).blue());
    }

    println!("{}", empty_line.blue());
    println!("{}", format!("└{}┘", border).blue());
    println!();
}

fn pad(text: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(text.chars().count()))
}

/// Read one line, with ↑/↓ history navigation when attached to a terminal.
///
/// Returns `None` when the user interrupts with Ctrl+C or Ctrl+D, or when
/// piped input reaches end of file.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = read_line_raw(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if let Some(line) = &input {
        if !line.is_empty() {
            history.push(line.clone());
        }
    }
    Ok(input)
}

fn read_line_raw(history: &[String]) -> Result<Option<String>> {
    let mut editor = LineEditor::new(history);

    redraw(&editor.input, 0)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        let previous_len = editor.input.chars().count();
        match editor.handle_key(&key_event) {
            KeyAction::Submit(line) => return Ok(Some(line)),
            KeyAction::Interrupt => return Ok(None),
            KeyAction::Redraw => redraw(&editor.input, previous_len)?,
            KeyAction::Ignore => {}
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    Submit(String),
    Interrupt,
    Redraw,
    Ignore,
}

/// Line buffer and history cursor for the raw-mode prompt
struct LineEditor<'a> {
    history: &'a [String],
    input: String,
    history_index: Option<usize>,
}

impl<'a> LineEditor<'a> {
    fn new(history: &'a [String]) -> Self {
        Self {
            history,
            input: String::new(),
            history_index: None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            // raw mode swallows SIGINT, so Ctrl+C arrives as a key event
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => KeyAction::Interrupt,
                _ => KeyAction::Ignore,
            };
        }

        match key.code {
            KeyCode::Enter => return KeyAction::Submit(self.input.trim().to_string()),
            KeyCode::Esc => return KeyAction::Submit(String::new()),
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up if !self.history.is_empty() => {
                let index = match self.history_index {
                    None => self.history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                self.history_index = Some(index);
                self.input = self.history[index].clone();
            }
            KeyCode::Down => match self.history_index {
                Some(idx) if idx + 1 < self.history.len() => {
                    self.history_index = Some(idx + 1);
                    self.input = self.history[idx + 1].clone();
                }
                Some(_) => {
                    self.history_index = None;
                    self.input.clear();
                }
                None => return KeyAction::Ignore,
            },
            _ => return KeyAction::Ignore,
        }
        KeyAction::Redraw
    }
}

fn redraw(input: &str, previous_len: usize) -> Result<()> {
    let clear = " ".repeat(previous_len + 1);
    print!("\r{} {}\r{} {}", PROMPT.green().bold(), clear, PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

/// Print an answer with a note on where it came from
pub fn print_answer(answer: &str, source: AnswerSource) {
    println!();
    println!("{}", answer);
    println!();
    let note = match source {
        AnswerSource::Model => "generated from retrieved excerpts",
        AnswerSource::Cache => "cached answer",
        AnswerSource::Fallback => "model unavailable, showing retrieved excerpts",
    };
    println!("{}", format!("({})", note).dimmed());
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask anything covered by the indexed manuals", "<question>".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is the torque spec for bolt A3?");
    println!("  How do I reset the pump controller?");
}
