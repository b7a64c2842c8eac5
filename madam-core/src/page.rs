use crate::engine::{Conversation, ConversationOptions, Presented};
use crate::error::EngineResult;
use crate::frame::UiHandle;
use crate::gallery::Gallery;
use crate::screen::Screen;
use crate::store::GraphState;
use crate::typewriter::DEFAULT_REVEAL_DELAY;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub reveal_delay: Duration,
    pub conversation: ConversationOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            reveal_delay: DEFAULT_REVEAL_DELAY,
            conversation: ConversationOptions::default(),
        }
    }
}

/// User interaction coming back from the page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// "Order coffee" button
    OpenModal,
    /// Close button or click on the overlay
    CloseModal,
    /// Zero based choice button index
    Choose { index: usize },
    Submit { text: String },
    ClickCard { id: String },
    DismissCard,
}

/// One visitor's page: the coffee modal, the gallery and the output stream they share.
pub struct Page {
    screen: Screen,
    conversation: Conversation,
    gallery: Gallery,
}

impl Page {
    pub fn new(ui: UiHandle, gallery: Gallery, options: PageOptions) -> Self {
        Self {
            screen: Screen::new(ui, options.reveal_delay),
            conversation: Conversation::new(options.conversation),
            gallery,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn attach(&mut self, graph: GraphState) {
        self.conversation.attach(graph, &mut self.screen);
    }

    pub fn handle(&mut self, event: PageEvent) -> EngineResult<()> {
        tracing::debug!(?event, "page event");

        match event {
            PageEvent::OpenModal => {
                self.open_modal()?;
            }
            PageEvent::CloseModal => self.screen.close_modal(),
            PageEvent::Choose { index } => self.conversation.choose(index, &mut self.screen)?,
            PageEvent::Submit { text } => self.conversation.submit_entry(&text, &mut self.screen)?,
            PageEvent::ClickCard { id } => {
                self.gallery.click(&id, &mut self.screen)?;
            }
            PageEvent::DismissCard => self.gallery.dismiss(&mut self.screen),
        }
        Ok(())
    }

    /// Show the coffee modal and start at the `start` node.
    pub fn open_modal(&mut self) -> EngineResult<Presented> {
        self.screen.open_modal();
        self.conversation.start(&mut self.screen)
    }

    /// Direct presentation, bypassing the resolver
    pub fn present(&mut self, node_id: &str) -> Presented {
        self.conversation.present(node_id, &mut self.screen)
    }
}
