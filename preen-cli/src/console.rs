//! Console implementations of the preen collaborator traits

use std::io::{BufRead, Write};

use preen_core::{LogSink, Notifier, PickItem, Picker};

/// Timestamped append-only log on stderr
#[derive(Debug, Default)]
pub struct ConsoleLog;

impl ConsoleLog {
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for ConsoleLog {
    fn line(&self, line: &str) {
        eprintln!("[{}] {}", chrono::Local::now().format("%H:%M:%S"), line);
    }
}

/// Plain stdout/stderr notifications
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Numbered stdin prompts for single and multi selection
#[derive(Debug, Default)]
pub struct ConsolePicker;

impl ConsolePicker {
    pub fn new() -> Self {
        Self
    }
}

impl Picker for ConsolePicker {
    fn pick_one(&self, title: &str, items: &[PickItem]) -> Option<usize> {
        println!("{}", title);
        for (i, item) in items.iter().enumerate() {
            let default = if item.picked { " (default)" } else { "" };
            match &item.detail {
                Some(d) => println!("  {}. {}{} - {}", i + 1, item.label, default, d),
                None => println!("  {}. {}{}", i + 1, item.label, default),
            }
        }

        let input = prompt("Choice (empty accepts the default, q cancels): ")?;
        parse_single(&input, items)
    }

    fn pick_many(&self, title: &str, items: &[PickItem]) -> Option<Vec<usize>> {
        println!("{}", title);
        for (i, item) in items.iter().enumerate() {
            let mark = if item.picked { "x" } else { " " };
            println!("  {}. [{}] {}", i + 1, mark, item.label);
        }

        let input = prompt("Numbers (empty keeps the checked set, q cancels): ")?;
        parse_multi(&input, items)
    }
}

fn prompt(text: &str) -> Option<String> {
    print!("{}", text);
    std::io::stdout().flush().ok()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    Some(line.trim().to_string())
}

fn parse_single(input: &str, items: &[PickItem]) -> Option<usize> {
    if input.eq_ignore_ascii_case("q") {
        return None;
    }
    if input.is_empty() {
        return items.iter().position(|i| i.picked);
    }

    let n: usize = input.parse().ok()?;
    if (1..=items.len()).contains(&n) {
        Some(n - 1)
    } else {
        None
    }
}

fn parse_multi(input: &str, items: &[PickItem]) -> Option<Vec<usize>> {
    if input.eq_ignore_ascii_case("q") {
        return None;
    }
    if input.is_empty() {
        return Some(
            items
                .iter()
                .enumerate()
                .filter(|(_, i)| i.picked)
                .map(|(idx, _)| idx)
                .collect(),
        );
    }

    let mut picked = Vec::new();
    for token in input.split([',', ' ']).filter(|t| !t.is_empty()) {
        let n: usize = token.parse().ok()?;
        if !(1..=items.len()).contains(&n) {
            return None;
        }
        let idx = n - 1;
        if !picked.contains(&idx) {
            picked.push(idx);
        }
    }
    Some(picked)
}
