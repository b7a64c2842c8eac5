use crate::error::{EngineError, EngineResult};
use crate::frame::TextTarget;
use crate::screen::Screen;
use serde::Deserialize;

pub const MISSING_CAPTION: &str = "Default message if attribute is missing.";

/// An illustrated card on the page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtCard {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: Option<String>,
}

impl ArtCard {
    pub fn caption(&self) -> &str {
        match self.caption.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => MISSING_CAPTION,
        }
    }
}

/// Caption dialog for the art cards. Shares nothing with the conversation except the
/// page's typewriter.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    cards: Vec<ArtCard>,
}

impl Gallery {
    pub fn new(cards: Vec<ArtCard>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[ArtCard] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&ArtCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn click(&self, id: &str, screen: &mut Screen) -> EngineResult<&ArtCard> {
        let Some(card) = self.card(id) else {
            tracing::error!(card = id, "card not found");
            return Err(EngineError::UnknownCard(id.to_string()));
        };

        screen.reveal(TextTarget::Gallery, card.caption());
        screen.open_card(Some(&card.title));
        Ok(card)
    }

    pub fn dismiss(&self, screen: &mut Screen) {
        screen.close_card();
    }
}
