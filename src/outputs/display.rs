use std::io::Write;

use crate::kernel::scheduler::DisplayUpdate;
use crate::kernel::state::SearchResult;
use crate::kernel::voice::VoiceMode;

/// Pure sink for what the user sees. Result activations flow back as
/// `Event::ResultActivated` from whatever front end owns the sink.
pub trait DisplaySink: Send {
    fn feedback(&mut self, message: &str);
    fn render(&mut self, update: &DisplayUpdate);
}

/// Plain-text rendering of the results, collection and reader panes.
pub struct TerminalDisplay<W: Write + Send> {
    out: W,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: std::io::stdout() }
    }
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn list(&mut self, heading: &str, items: &[SearchResult], empty: &str) {
        let _ = writeln!(self.out, "== {} ==", heading);
        if items.is_empty() {
            let _ = writeln!(self.out, "  {}", empty);
            return;
        }
        for (i, item) in items.iter().enumerate() {
            let _ = writeln!(self.out, "  [{}] {}", i + 1, item.title);
            let _ = writeln!(self.out, "      {}", item.snippet);
        }
    }
}

impl<W: Write + Send> DisplaySink for TerminalDisplay<W> {
    fn feedback(&mut self, message: &str) {
        let _ = writeln!(self.out, "> {}", message);
        let _ = self.out.flush();
    }

    fn render(&mut self, update: &DisplayUpdate) {
        match update {
            DisplayUpdate::Results(results) => {
                self.list("Results", results, "No results found.");
            }
            DisplayUpdate::Saved(saved) => {
                self.list("Collection", saved, "No results selected yet.");
            }
            DisplayUpdate::Selected(index) => {
                let _ = writeln!(self.out, "  -> result {} selected", index);
            }
            DisplayUpdate::Content(content) => {
                let _ = writeln!(self.out, "== {} ==", content.title);
                if let Some(url) = &content.url {
                    let _ = writeln!(self.out, "  {}", url);
                }
                let _ = writeln!(self.out, "{}", content.content);
            }
            DisplayUpdate::Cleared => {
                let _ = writeln!(self.out, "== Results ==");
                let _ = writeln!(self.out, "  Enter a search query to get started...");
            }
            DisplayUpdate::VoiceMode(mode) => {
                let hint = match mode {
                    VoiceMode::Active => "Say \"search for ...\" or type a command. /mic toggles the microphone.",
                    VoiceMode::FallbackManual | VoiceMode::Unsupported => {
                        "Type a command, e.g. \"search for rust\" or \"select result 2\"."
                    }
                };
                let _ = writeln!(self.out, "({})", hint);
            }
        }
        let _ = self.out.flush();
    }
}
