use crate::kernel::event::{Activation, Event};

/// What one line of terminal input means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Event(ConsoleEvent),
    Quit,
    /// Malformed slash command; the string is a usage hint.
    Invalid(String),
}

/// Subset of `Event` the console can produce (kept `Eq` for matching).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Typed(String),
    Activate { index: usize, action: Activation },
    Toggle,
    Cancel,
}

impl From<ConsoleEvent> for Event {
    fn from(event: ConsoleEvent) -> Self {
        match event {
            ConsoleEvent::Typed(text) => Event::Typed(text),
            ConsoleEvent::Activate { index, action } => Event::ResultActivated { index, action },
            ConsoleEvent::Toggle => Event::ToggleCapture,
            ConsoleEvent::Cancel => Event::Cancel,
        }
    }
}

/// Plain lines are typed commands. Slash commands stand in for the
/// click/keyboard interactions of a graphical front end.
pub fn parse_line(line: &str) -> ConsoleInput {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ConsoleInput::Event(ConsoleEvent::Typed(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    match name.as_str() {
        "quit" | "exit" => ConsoleInput::Quit,
        "stop" => ConsoleInput::Event(ConsoleEvent::Cancel),
        "mic" => ConsoleInput::Event(ConsoleEvent::Toggle),
        "open" | "save" => {
            let action = if name == "open" { Activation::Open } else { Activation::Save };
            match arg.and_then(|a| a.parse::<usize>().ok()) {
                Some(index) => ConsoleInput::Event(ConsoleEvent::Activate { index, action }),
                None => ConsoleInput::Invalid(format!("usage: /{} <result number>", name)),
            }
        }
        _ => ConsoleInput::Invalid("commands: /open N, /save N, /stop, /mic, /quit".to_string()),
    }
}
