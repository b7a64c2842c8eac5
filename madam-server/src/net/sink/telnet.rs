use crate::net::sink::ClientSink;
use async_trait::async_trait;
use madam_core::{SeqFrame, TextTarget, UiFrame};
use tokio::io::{AsyncWrite, AsyncWriteExt};

const PROMPT: &str = "> ";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Renders frames as ANSI text on a line based terminal.
///
/// A terminal has one cursor, so while a text surface is being revealed everything else
/// (buttons, notices, dialogs) is held back and written once the reveal finishes or is
/// preempted by the next one.
pub struct TelnetSink<W> {
    writer: W,
    revealing: Option<TextTarget>,
    deferred: Vec<UiFrame>,
}

impl<W> TelnetSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            revealing: None,
            deferred: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn render(&mut self, frame: UiFrame) -> String {
        let Some(active) = self.revealing else {
            return self.render_idle(frame);
        };

        match frame {
            UiFrame::ClearText { target } => {
                let mut out = self.finish_reveal();
                out.push_str(&self.start_reveal(target));
                out
            }
            UiFrame::AppendText { target, ch } if target == active => crlf(ch.encode_utf8(&mut [0; 4])),
            UiFrame::SetText { target, text } if target == active => crlf(&text),
            UiFrame::RevealFinished { target } if target == active => self.finish_reveal(),
            UiFrame::RevealFinished { .. } => String::new(),
            other => {
                self.deferred.push(other);
                String::new()
            }
        }
    }

    fn start_reveal(&mut self, target: TextTarget) -> String {
        self.revealing = Some(target);
        format!("\r\n{}", speaker(target))
    }

    fn finish_reveal(&mut self) -> String {
        self.revealing = None;

        let mut out = String::from("\r\n");
        for frame in std::mem::take(&mut self.deferred) {
            out.push_str(&self.render_idle(frame));
        }
        out
    }

    fn render_idle(&mut self, frame: UiFrame) -> String {
        match frame {
            UiFrame::ClearText { target } => self.start_reveal(target),
            UiFrame::SetText { target, text } => format!("\r\n{}{}\r\n", speaker(target), crlf(&text)),
            UiFrame::AppendText { ch, .. } => crlf(ch.encode_utf8(&mut [0; 4])),
            UiFrame::RevealFinished { .. } => String::new(),
            // Portraits do not translate to a terminal
            UiFrame::Sprite { .. } => String::new(),
            UiFrame::Choices { labels } => {
                let mut out = String::new();
                for (i, label) in labels.iter().enumerate() {
                    out.push_str(&format!("  {}) {}\r\n", i + 1, crlf(label)));
                }
                out.push_str(PROMPT);
                out
            }
            UiFrame::Entry { placeholder } => format!("  ({placeholder})\r\n{PROMPT}"),
            UiFrame::ClearEntry | UiFrame::HideInteractive => String::new(),
            UiFrame::Modal { open: true } => format!("{CLEAR_SCREEN}{BOLD}-- At the counter --{RESET}\r\n"),
            UiFrame::Modal { open: false } => format!("\r\n(you step away from the counter)\r\n{PROMPT}"),
            UiFrame::CardDialog { open: true, title } => {
                format!("  {BOLD}~ {} ~{RESET}\r\n{PROMPT}", title.as_deref().unwrap_or("untitled"))
            }
            UiFrame::CardDialog { open: false, .. } => format!("(you put the card back)\r\n{PROMPT}"),
            UiFrame::Notice { text } => format!("{YELLOW}{}{RESET}\r\n{PROMPT}", crlf(&text)),
        }
    }
}

fn speaker(target: TextTarget) -> &'static str {
    match target {
        TextTarget::Conversation => "\x1b[1mMadame:\x1b[0m ",
        TextTarget::Gallery => "\x1b[36m~\x1b[0m ",
    }
}

fn crlf(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\n', "\r\n")
}

#[async_trait]
impl<W> ClientSink for TelnetSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_frame(&mut self, frame: SeqFrame) -> anyhow::Result<()> {
        let out = self.render(frame.frame);
        if !out.is_empty() {
            self.writer.write_all(out.as_bytes()).await?;
            self.writer.flush().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONV: TextTarget = TextTarget::Conversation;

    async fn feed(frames: Vec<UiFrame>) -> String {
        let mut sink = TelnetSink::new(Vec::new());
        for (seq, frame) in frames.into_iter().enumerate() {
            sink.send_frame(SeqFrame { seq: seq as u64, frame }).await.unwrap();
        }
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn choices_wait_for_the_reveal() {
        let out = feed(vec![
            UiFrame::ClearText { target: CONV },
            UiFrame::AppendText { target: CONV, ch: 'H' },
            UiFrame::Choices {
                labels: vec!["Espresso".into(), "Latte".into()],
            },
            UiFrame::AppendText { target: CONV, ch: 'i' },
            UiFrame::RevealFinished { target: CONV },
        ])
        .await;

        let text = out.find("Hi").unwrap();
        let first = out.find("1) Espresso").unwrap();
        assert!(text < first, "{out:?}");
        assert!(out.ends_with("  2) Latte\r\n> "), "{out:?}");
    }

    #[tokio::test]
    async fn preempted_reveal_flushes_held_frames() {
        let out = feed(vec![
            UiFrame::ClearText { target: CONV },
            UiFrame::AppendText { target: CONV, ch: 'a' },
            UiFrame::Entry {
                placeholder: "Type here...".into(),
            },
            UiFrame::ClearText { target: CONV },
            UiFrame::SetText {
                target: CONV,
                text: "b\nc".into(),
            },
            UiFrame::RevealFinished { target: CONV },
        ])
        .await;

        let entry = out.find("(Type here...)").unwrap();
        let second = out.find("b\r\nc").unwrap();
        assert!(entry < second, "{out:?}");
        assert_eq!(out.matches("Madame:").count(), 2);
    }

    #[tokio::test]
    async fn notices_render_immediately_when_idle() {
        let out = feed(vec![UiFrame::Notice { text: "hello".into() }]).await;
        assert_eq!(out, "\x1b[33mhello\x1b[0m\r\n> ");

        let out = feed(vec![
            UiFrame::SetText {
                target: CONV,
                text: "Oops".into(),
            },
            UiFrame::Sprite { src: None, alt: None },
        ])
        .await;
        assert_eq!(out, "\r\n\x1b[1mMadame:\x1b[0m Oops\r\n");
    }
}
