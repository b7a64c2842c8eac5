//! Character-by-character text reveal.
//!
//! A page owns exactly one [`Typewriter`]. Starting a reveal aborts whatever reveal is
//! still running, on any target, so at most one text is ever trickling in.

use crate::frame::{TextTarget, UiFrame, UiHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(30);

pub struct Typewriter {
    ui: UiHandle,
    delay: Duration,
    /// Generation of the reveal allowed to emit frames
    current: Arc<Mutex<u64>>,
    inflight: Option<JoinHandle<()>>,
}

impl Typewriter {
    pub fn new(ui: UiHandle, delay: Duration) -> Self {
        Self {
            ui,
            delay,
            current: Arc::new(Mutex::new(0)),
            inflight: None,
        }
    }

    /// Clear `target` and reveal `text` into it, one character per tick.
    ///
    /// The first character shows up one delay after the call. A zero delay sets the whole
    /// text at once.
    pub fn reveal(&mut self, target: TextTarget, text: impl Into<String>) {
        let text = text.into();

        let generation = {
            // Bump under the lock so a preempted task can never emit after our clear.
            let mut current = self.current.lock();
            *current += 1;
            if let Some(handle) = self.inflight.take() {
                handle.abort();
            }
            self.ui.send(UiFrame::ClearText { target });
            *current
        };

        if self.delay.is_zero() {
            self.ui.send(UiFrame::SetText { target, text });
            self.ui.send(UiFrame::RevealFinished { target });
            return;
        }

        tracing::trace!(?target, chars = text.chars().count(), "starting reveal");

        let ui = self.ui.clone();
        let current = self.current.clone();
        let delay = self.delay;

        self.inflight = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + delay, delay);

            for ch in text.chars() {
                ticker.tick().await;
                let guard = current.lock();
                if *guard != generation || !ui.send(UiFrame::AppendText { target, ch }) {
                    return;
                }
            }

            let guard = current.lock();
            if *guard == generation {
                ui.send(UiFrame::RevealFinished { target });
            }
        }));
    }

    #[cfg(test)]
    fn is_revealing(&self) -> bool {
        self.inflight.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        if let Some(handle) = self.inflight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{SeqFrame, ui_channel};
    use tokio::sync::mpsc::Receiver;

    fn drain(rx: &mut Receiver<SeqFrame>) -> Vec<UiFrame> {
        let mut out = Vec::new();
        while let Ok(f) = rx.try_recv() {
            out.push(f.frame);
        }
        out
    }

    fn appended(frames: &[UiFrame]) -> String {
        frames
            .iter()
            .filter_map(|f| match f {
                UiFrame::AppendText { ch, .. } => Some(*ch),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn reveals_one_char_per_tick() {
        let (ui, mut rx) = ui_channel();
        let mut tw = Typewriter::new(ui, DEFAULT_REVEAL_DELAY);

        tw.reveal(TextTarget::Conversation, "héllo");
        assert_eq!(
            drain(&mut rx),
            vec![UiFrame::ClearText {
                target: TextTarget::Conversation
            }]
        );

        tokio::time::sleep(Duration::from_millis(65)).await;
        assert_eq!(appended(&drain(&mut rx)), "hé");
        assert!(tw.is_revealing());

        tokio::time::sleep(Duration::from_millis(200)).await;
        let rest = drain(&mut rx);
        assert_eq!(appended(&rest), "llo");
        assert_eq!(
            rest.last(),
            Some(&UiFrame::RevealFinished {
                target: TextTarget::Conversation
            })
        );
        assert!(!tw.is_revealing());
    }

    #[tokio::test(start_paused = true)]
    async fn new_reveal_preempts_other_target() {
        let (ui, mut rx) = ui_channel();
        let mut tw = Typewriter::new(ui, DEFAULT_REVEAL_DELAY);

        tw.reveal(TextTarget::Gallery, "a long caption");
        tokio::time::sleep(Duration::from_millis(95)).await;
        tw.reveal(TextTarget::Conversation, "hi");
        tokio::time::sleep(Duration::from_millis(500)).await;

        let frames = drain(&mut rx);
        let restart = frames
            .iter()
            .position(|f| {
                *f == UiFrame::ClearText {
                    target: TextTarget::Conversation,
                }
            })
            .unwrap();

        assert_eq!(appended(&frames[..restart]), "a l");
        assert_eq!(appended(&frames[restart..]), "hi");
        assert!(frames[restart..].iter().all(|f| !matches!(
            f,
            UiFrame::AppendText {
                target: TextTarget::Gallery,
                ..
            }
        )));
        assert!(!frames.contains(&UiFrame::RevealFinished {
            target: TextTarget::Gallery
        }));
    }

    #[tokio::test]
    async fn zero_delay_sets_text_at_once() {
        let (ui, mut rx) = ui_channel();
        let mut tw = Typewriter::new(ui, Duration::ZERO);

        tw.reveal(TextTarget::Conversation, "instant");
        assert_eq!(
            drain(&mut rx),
            vec![
                UiFrame::ClearText {
                    target: TextTarget::Conversation
                },
                UiFrame::SetText {
                    target: TextTarget::Conversation,
                    text: "instant".to_string()
                },
                UiFrame::RevealFinished {
                    target: TextTarget::Conversation
                },
            ]
        );
        assert!(!tw.is_revealing());
    }
}
