use madam_core::{ArtCard, ConversationStore, InlineSource};
use madam_server::Registry;
use madam_server::config::Config;
use std::sync::Arc;

pub const CAFE: &str = include_str!("../../../assets/conversation.json");

/// Registry over the shipped asset, revealing text in one go
pub fn registry() -> Arc<Registry> {
    let cfg = Config {
        reveal_delay_ms: 0,
        cards: vec![
            ArtCard {
                id: "sunflowers".into(),
                title: "Sunflowers".into(),
                caption: Some("Painted in a hurry.".into()),
            },
            ArtCard {
                id: "blank".into(),
                title: "Blank".into(),
                caption: None,
            },
        ],
        ..Config::default()
    };

    let store = ConversationStore::new(InlineSource(CAFE.to_string()));
    Arc::new(Registry::with_store(Arc::new(cfg), store))
}
