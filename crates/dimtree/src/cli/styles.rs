//! Terminal styles for the dimtree CLI.
//!
//! Rendering code asks for styles by meaning (a node code, an inactive entry,
//! a warning) and never picks colors itself. Swapping the palette only touches
//! this file. `console` drops the escape codes when stdout is not a terminal.

use console::Style;

/// Semantic style roles used by `render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Code,
    Name,
    Muted,
    Faint,
    Inactive,
    Heading,
    Success,
    Info,
    Warning,
    Error,
}

pub fn style(role: Role) -> Style {
    match role {
        Role::Code => Style::new().cyan().bold(),
        Role::Name => Style::new(),
        Role::Muted => Style::new().color256(244),
        Role::Faint => Style::new().color256(248),
        Role::Inactive => Style::new().color256(244).strikethrough(),
        Role::Heading => Style::new().bold(),
        Role::Success => Style::new().green(),
        Role::Info => Style::new().color256(244),
        Role::Warning => Style::new().yellow().bold(),
        Role::Error => Style::new().red().bold(),
    }
}

pub fn paint(role: Role, text: impl std::fmt::Display) -> String {
    style(role).apply_to(text).to_string()
}
