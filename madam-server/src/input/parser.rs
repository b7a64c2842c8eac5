//! Turns visitor input into commands.
//!
//! Telnet lines are read against the current screen:
//!   "order" or "/order"     -> open the coffee modal
//!   "2" while choices show  -> second choice button
//!   "croissant" in entry    -> submit the entry field
//!   "/close" in entry       -> slash commands always stay commands
//!   "card 1" or "card wall" -> open a gallery card by position or id
//!
//! WebSocket clients send the page events as JSON instead.

use madam_core::{InputSurface, PageEvent, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Forwarded to the page as is
    Page(PageEvent),
    /// Gallery card by position (1 based) or id
    Card(String),
    Cards,
    Status,
    Help,
    Quit,
    /// Blank input, nothing to do
    Nothing,
    Unknown(String),
}

pub fn parse_line(raw: &str, screen: &Screen) -> Command {
    let line = raw.trim();
    if line.is_empty() {
        return Command::Nothing;
    }

    if let Some(rest) = line.strip_prefix('/') {
        return parse_keyword(rest);
    }

    if screen.modal_open() {
        match screen.input() {
            InputSurface::Entry => {
                return Command::Page(PageEvent::Submit { text: raw.to_string() });
            }
            InputSurface::Choices(count) => {
                if let Ok(n) = line.parse::<usize>() {
                    return if (1..=count).contains(&n) {
                        Command::Page(PageEvent::Choose { index: n - 1 })
                    } else {
                        Command::Unknown(line.to_string())
                    };
                }
            }
            InputSurface::None => {}
        }
    }

    parse_keyword(line)
}

fn parse_keyword(line: &str) -> Command {
    let mut parts = line.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next().map(str::trim).unwrap_or_default();

    match verb.as_str() {
        "order" | "coffee" | "open" => Command::Page(PageEvent::OpenModal),
        "close" | "leave" => Command::Page(PageEvent::CloseModal),
        "cards" | "gallery" => Command::Cards,
        "card" | "look" if !arg.is_empty() => Command::Card(arg.to_string()),
        "dismiss" => Command::Page(PageEvent::DismissCard),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => Command::Nothing,
        _ => Command::Unknown(line.to_string()),
    }
}

/// A WebSocket text message: a JSON page event, or a plain command line.
pub fn parse_message(text: &str) -> Command {
    let text = text.trim();
    if text.starts_with('{') {
        return match serde_json::from_str::<PageEvent>(text) {
            Ok(event) => Command::Page(event),
            Err(e) => {
                tracing::debug!(error = %e, "invalid page event");
                Command::Unknown(text.to_string())
            }
        };
    }

    match text.strip_prefix('/') {
        Some(rest) => parse_keyword(rest),
        None => parse_keyword(text),
    }
}
