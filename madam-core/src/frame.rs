use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Text surfaces on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextTarget {
    /// Speech bubble inside the coffee modal
    Conversation,
    /// Caption box of the art gallery
    Gallery,
}

/// Everything the engine asks the page to do.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiFrame {
    /// Empty the text surface
    ClearText { target: TextTarget },
    /// Append a single revealed character
    AppendText { target: TextTarget, ch: char },
    /// Replace the text surface in one go
    SetText { target: TextTarget, text: String },
    /// Typewriter reached the end of its text
    RevealFinished { target: TextTarget },
    /// Portrait image, `None` clears it
    Sprite { src: Option<String>, alt: Option<String> },
    /// Show one button per label, hide the entry field
    Choices { labels: Vec<String> },
    /// Show, clear and focus the entry field, hide the choices
    Entry { placeholder: String },
    /// Clear the entry field
    ClearEntry,
    /// Hide both choices and entry field
    HideInteractive,
    /// Coffee modal visibility
    Modal { open: bool },
    /// Gallery caption dialog visibility
    CardDialog { open: bool, title: Option<String> },
    /// Message from the host outside the page surfaces (help, status, errors)
    Notice { text: String },
}

/// Frame with its position in the page's output stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeqFrame {
    pub seq: u64,
    #[serde(flatten)]
    pub frame: UiFrame,
}

/// Frames a page may have queued before it counts as not keeping up
pub const FRAME_BACKLOG: usize = 1024;

/// Cheap, cloneable sender half of a page's frame stream.
///
/// The stream is bounded. Once a send finds it full the handle is marked overflowed and
/// every later send fails too, so a client never sees a stream with a hole in it. The
/// connection is expected to notice [`UiHandle::overflowed`] and hang up.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::Sender<SeqFrame>,
    next_seq: Arc<AtomicU64>,
    overflowed: Arc<AtomicBool>,
}

impl UiHandle {
    #[inline]
    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Queue a frame. Returns false once the page went away or fell behind.
    pub fn send(&self, frame: UiFrame) -> bool {
        if self.overflowed() {
            return false;
        }

        let seq = self.next_seq();
        match self.tx.try_send(SeqFrame { seq, frame }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                if !self.overflowed.swap(true, Ordering::Relaxed) {
                    tracing::warn!(seq, backlog = FRAME_BACKLOG, "frame queue full, dropping page output");
                }
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    pub fn notice(&self, text: impl Into<String>) -> bool {
        self.send(UiFrame::Notice { text: text.into() })
    }

    /// The client stopped reading and frames were lost
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Relaxed)
    }
}

/// Create the frame stream for one page
pub fn ui_channel() -> (UiHandle, mpsc::Receiver<SeqFrame>) {
    bounded(FRAME_BACKLOG)
}

fn bounded(capacity: usize) -> (UiHandle, mpsc::Receiver<SeqFrame>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = UiHandle {
        tx,
        next_seq: Arc::new(AtomicU64::new(1)),
        overflowed: Arc::new(AtomicBool::new(false)),
    };
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_serialize_as_tagged_json() {
        let f = SeqFrame {
            seq: 3,
            frame: UiFrame::AppendText {
                target: TextTarget::Conversation,
                ch: 'h',
            },
        };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "seq": 3, "type": "append_text", "target": "conversation", "ch": "h" })
        );
    }

    #[test]
    fn sequence_numbers_increase() {
        let (ui, mut rx) = ui_channel();
        assert!(ui.send(UiFrame::ClearEntry));
        assert!(ui.clone().send(UiFrame::HideInteractive));
        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert_eq!(rx.try_recv().unwrap().seq, 2);

        drop(rx);
        assert!(!ui.send(UiFrame::ClearEntry));
    }

    #[test]
    fn full_queue_marks_the_handle() {
        let (ui, mut rx) = bounded(2);
        assert!(ui.send(UiFrame::ClearEntry));
        assert!(ui.send(UiFrame::ClearEntry));
        assert!(!ui.overflowed());

        assert!(!ui.send(UiFrame::HideInteractive));
        assert!(ui.overflowed());
        assert!(ui.clone().overflowed());

        // Room again, but the stream already has a gap
        assert_eq!(rx.try_recv().unwrap().seq, 1);
        assert!(!ui.notice("late"));
        assert_eq!(rx.try_recv().unwrap().seq, 2);
        assert!(rx.try_recv().is_err());
    }
}
