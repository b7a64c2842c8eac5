//! Node presenter and choice/entry resolver.
//!
//! States are node ids plus "no conversation". Only [`Conversation::resolve_choice`]
//! (and its index based wrapper [`Conversation::choose`]) and
//! [`Conversation::submit_entry`] move between them. Once the session is killed every
//! presentation lands on the `killed` node.

use crate::error::{EngineError, EngineResult};
use crate::frame::TextTarget;
use crate::graph::{Action, Choice, ConversationGraph, GIVE_NODE, Interaction, KILL_NODE, KILLED_NODE, START_NODE};
use crate::screen::Screen;
use crate::session::SessionState;
use crate::store::GraphState;

pub const LOST_TRAIN_OF_THOUGHT: &str = "Hmm, I seem to have lost my train of thought...";
pub const CANT_REMEMBER_LINES: &str = "Oops! I can't seem to remember my lines right now. Please try again later.";
pub const TRY_AGAIN_SUFFIX: &str = "\n(Hmm, that's not it. Try again?)";
pub const DEFAULT_ENTRY_PLACEHOLDER: &str = "Type here...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationOptions {
    /// Fixed portrait shown for every living node
    pub portrait_src: String,
    pub portrait_alt: String,
    /// `increase_spare` branches to `give` once the counter exceeds this
    pub spare_threshold: u32,
}

impl Default for ConversationOptions {
    fn default() -> Self {
        Self {
            portrait_src: "images/madam.png".to_string(),
            portrait_alt: "madame".to_string(),
            spare_threshold: 10,
        }
    }
}

/// Result of a presentation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presented {
    /// Node was rendered; carries the resolved id
    Node(String),
    /// Node does not exist, fallback text rendered
    Missing(String),
}

pub struct Conversation {
    graph: GraphState,
    state: SessionState,
    options: ConversationOptions,
}

impl Conversation {
    pub fn new(options: ConversationOptions) -> Self {
        Self {
            graph: GraphState::Pending,
            state: SessionState::new(),
            options,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    pub fn options(&self) -> &ConversationOptions {
        &self.options
    }

    /// Hand the outcome of the store load to this page.
    ///
    /// A failed load shows the "can't remember" text once; later attaches are ignored.
    pub fn attach(&mut self, graph: GraphState, screen: &mut Screen) {
        if !matches!(self.graph, GraphState::Pending) {
            return;
        }
        if graph.is_failed() {
            screen.set_text(TextTarget::Conversation, CANT_REMEMBER_LINES);
        }
        self.graph = graph;
    }

    /// Present the `start` node if the graph is usable.
    pub fn start(&mut self, screen: &mut Screen) -> EngineResult<Presented> {
        if self.graph.graph().is_none() {
            tracing::error!("cannot start conversation: data not loaded");
            return Err(EngineError::NotLoaded);
        }
        Ok(self.present(START_NODE, screen))
    }

    pub fn present(&mut self, node_id: &str, screen: &mut Screen) -> Presented {
        let node_id = if self.state.is_killed() { KILLED_NODE } else { node_id };

        let Some(node) = self.graph.graph().and_then(|g| g.get(node_id)).cloned() else {
            tracing::error!(node = node_id, "node not found in conversation data");
            screen.reveal(TextTarget::Conversation, LOST_TRAIN_OF_THOUGHT);
            return Presented::Missing(node_id.to_string());
        };

        tracing::debug!(node = node_id, "presenting node");
        self.state.enter(node_id);

        if self.state.is_killed() {
            screen.sprite(None, None);
        } else {
            screen.sprite(Some(&self.options.portrait_src), Some(&self.options.portrait_alt));
        }

        if !node.sprite_text.is_empty() {
            screen.reveal(TextTarget::Conversation, node.text_for(self.state.current_item()));
        }

        match node.interaction() {
            Interaction::Entry(entry) => {
                screen.show_entry(entry.prompt_text.as_deref().unwrap_or(DEFAULT_ENTRY_PLACEHOLDER));
            }
            Interaction::Choices(choices) => {
                screen.show_choices(choices.iter().map(|c| c.text.clone()).collect());
            }
            Interaction::DeadEnd => {
                tracing::debug!(node = node_id, "node has no interactive elements");
                screen.hide_interactive();
            }
        }

        Presented::Node(node_id.to_string())
    }

    /// Click on the `index`-th button of the current node.
    pub fn choose(&mut self, index: usize, screen: &mut Screen) -> EngineResult<()> {
        let node_id = self.state.current_node_id().ok_or(EngineError::NoActiveNode)?.to_string();
        let node = self.current_graph()?.get(&node_id).ok_or_else(|| EngineError::NodeNotFound(node_id.clone()))?;

        let choice = match node.interaction() {
            Interaction::Choices(choices) => choices
                .get(index)
                .cloned()
                .ok_or(EngineError::ChoiceOutOfRange { node: node_id, index })?,
            _ => return Err(EngineError::NoChoices(node_id)),
        };

        self.resolve_choice(&choice, screen);
        Ok(())
    }

    pub fn resolve_choice(&mut self, choice: &Choice, screen: &mut Screen) {
        if let Some(item) = &choice.item {
            self.state.pick_up(item);
        }

        if let Some(action) = choice.action {
            tracing::debug!(%action, "resolving action");
            self.apply(action, screen);
        } else if let Some(next) = &choice.next_node_id {
            self.present(next, screen);
        } else {
            tracing::warn!(label = %choice.text, "choice has neither action nor target");
        }
    }

    fn apply(&mut self, action: Action, screen: &mut Screen) {
        match action {
            Action::EndConversation => {
                screen.close_modal();
                self.state.leave();
            }
            Action::Save(drink) => self.state.stash(drink),
            Action::IncreaseSpare => {
                let spares = self.state.spare();
                if spares > self.options.spare_threshold {
                    self.present(GIVE_NODE, screen);
                }
            }
            Action::Kill => {
                self.state.kill();
                screen.close_modal();
            }
            Action::Check(drink) => {
                let next = if self.state.has(drink) { GIVE_NODE } else { KILL_NODE };
                self.present(next, screen);
            }
        }
    }

    /// Submit free text to the current entry node.
    pub fn submit_entry(&mut self, raw: &str, screen: &mut Screen) -> EngineResult<()> {
        let Some(node_id) = self.state.current_node_id().map(str::to_string) else {
            tracing::error!("cannot handle entry: no active node");
            return Err(EngineError::NoActiveNode);
        };
        let node = self.current_graph()?.get(&node_id).cloned().ok_or_else(|| EngineError::NodeNotFound(node_id.clone()))?;
        let Some(entry) = &node.entry_mode else {
            tracing::error!(node = %node_id, "cannot handle entry: not an entry node");
            return Err(EngineError::NotAnEntryNode(node_id));
        };

        let input = raw.trim().to_lowercase();
        if input.is_empty() {
            return Ok(());
        }

        if let Some(secret) = entry.match_secret(&input) {
            tracing::debug!(node = %node_id, next = %secret.next_node_id, "secret matched");
            self.present(&secret.next_node_id, screen);
        } else if let Some(next) = &entry.default_next_node_id {
            self.present(next, screen);
        } else {
            screen.reveal(TextTarget::Conversation, format!("{}{}", node.sprite_text, TRY_AGAIN_SUFFIX));
            screen.clear_entry();
        }

        Ok(())
    }

    fn current_graph(&self) -> EngineResult<&ConversationGraph> {
        self.graph.graph().ok_or(EngineError::NotLoaded)
    }
}
