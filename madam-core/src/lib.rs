pub mod edit;
pub mod engine;
pub mod error;
pub mod frame;
pub mod gallery;
pub mod graph;
pub mod page;
pub mod screen;
pub mod session;
pub mod store;
pub mod typewriter;
pub mod validate;

// Convenient re-exports (so call sites can do `madam_core::Page`, etc.)
pub use engine::{Conversation, ConversationOptions, Presented};
pub use error::{EngineError, EngineResult};
pub use frame::{FRAME_BACKLOG, SeqFrame, TextTarget, UiFrame, UiHandle, ui_channel};
pub use gallery::{ArtCard, Gallery};
pub use graph::{Action, Choice, ConversationGraph, Drink, EntryMode, Node, Secret};
pub use page::{Page, PageEvent, PageOptions};
pub use screen::{InputSurface, Screen};
pub use session::SessionState;
pub use store::{AssetSource, ConversationStore, FileSource, GraphState, InlineSource};
