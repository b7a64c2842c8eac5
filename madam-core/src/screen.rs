use crate::frame::{TextTarget, UiFrame, UiHandle};
use crate::typewriter::Typewriter;
use std::time::Duration;

/// What the coffee modal currently offers for input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSurface {
    #[default]
    None,
    /// Number of choice buttons shown
    Choices(usize),
    Entry,
}

/// The page as seen by the engine.
///
/// Every call turns into one or more [`UiFrame`]s. The screen also remembers what is
/// visible so transports can interpret raw input without asking the engine.
pub struct Screen {
    ui: UiHandle,
    typewriter: Typewriter,
    modal_open: bool,
    card_open: bool,
    input: InputSurface,
}

impl Screen {
    pub fn new(ui: UiHandle, reveal_delay: Duration) -> Self {
        Self {
            typewriter: Typewriter::new(ui.clone(), reveal_delay),
            ui,
            modal_open: false,
            card_open: false,
            input: InputSurface::None,
        }
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn card_open(&self) -> bool {
        self.card_open
    }

    pub fn input(&self) -> InputSurface {
        self.input
    }

    pub fn reveal(&mut self, target: TextTarget, text: impl Into<String>) {
        self.typewriter.reveal(target, text);
    }

    /// Set text without the typewriter. Leaves a running reveal alone.
    pub fn set_text(&self, target: TextTarget, text: impl Into<String>) {
        self.ui.send(UiFrame::SetText {
            target,
            text: text.into(),
        });
    }

    pub fn sprite(&self, src: Option<&str>, alt: Option<&str>) {
        self.ui.send(UiFrame::Sprite {
            src: src.map(str::to_string),
            alt: alt.map(str::to_string),
        });
    }

    pub fn show_choices(&mut self, labels: Vec<String>) {
        self.input = InputSurface::Choices(labels.len());
        self.ui.send(UiFrame::Choices { labels });
    }

    pub fn show_entry(&mut self, placeholder: &str) {
        self.input = InputSurface::Entry;
        self.ui.send(UiFrame::Entry {
            placeholder: placeholder.to_string(),
        });
    }

    pub fn clear_entry(&self) {
        self.ui.send(UiFrame::ClearEntry);
    }

    pub fn hide_interactive(&mut self) {
        self.input = InputSurface::None;
        self.ui.send(UiFrame::HideInteractive);
    }

    pub fn open_modal(&mut self) {
        self.modal_open = true;
        self.ui.send(UiFrame::Modal { open: true });
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
        self.ui.send(UiFrame::Modal { open: false });
    }

    pub fn open_card(&mut self, title: Option<&str>) {
        self.card_open = true;
        self.ui.send(UiFrame::CardDialog {
            open: true,
            title: title.map(str::to_string),
        });
    }

    pub fn close_card(&mut self) {
        self.card_open = false;
        self.ui.send(UiFrame::CardDialog { open: false, title: None });
    }
}
