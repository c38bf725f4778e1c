// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Terminal color helpers shared by every command's status output.

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;

pub mod codes {
    pub const HEADER: u8 = 74;
    pub const LITERAL: u8 = 250;
    pub const SUCCESS: u8 = 114;
    pub const FAILURE: u8 = 203;
    pub const MUTED: u8 = 245;
}

/// `NO_COLOR=1` disables, `COLOR=1` forces, otherwise follows the TTY.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::HEADER)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::LITERAL)))))
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn muted(text: &str) -> String {
    paint(codes::MUTED, text)
}

/// Color an execution/step status string: green for success, red for
/// failure/cancellation, plain otherwise.
pub fn status(text: &str) -> String {
    match text {
        "succeeded" | "success" | "done" => paint(codes::SUCCESS, text),
        "failed" | "cancelled" | "timed_out" => paint(codes::FAILURE, text),
        _ => text.to_string(),
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
