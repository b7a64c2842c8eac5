//! Conversation graph as stored in the JSON asset.
//!
//! The asset is a single object mapping node ids to nodes:
//!
//! ```json
//! {
//!   "start": {
//!     "sprite_text": "Welcome! What can I get you?",
//!     "choices": [
//!       { "text": "An espresso", "item": "espresso", "action": "save_espresso" },
//!       { "text": "Nothing", "next_node_id": "bye" }
//!     ]
//!   },
//!   "ask": {
//!     "sprite_text": "Say the magic word.",
//!     "entry_mode": {
//!       "prompt_text": "...",
//!       "secrets": [{ "input": "please", "next_node_id": "give" }],
//!       "default_next_node_id": "kill"
//!     }
//!   }
//! }
//! ```
//!
//! Nodes may also carry an `editor_pos` pair from the graphical editor, which survives
//! a load and save unchanged.
//!
//! Empty strings in optional fields count as absent. Action tags are parsed into
//! [`Action`] while loading, an unknown tag fails the whole load.

use crate::error::{EngineError, EngineResult};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Node presented when a conversation starts
pub const START_NODE: &str = "start";
/// Absorbing node once the session has been killed
pub const KILLED_NODE: &str = "killed";
/// Target of a successful `check_*` action or enough spares
pub const GIVE_NODE: &str = "give";
/// Target of a failed `check_*` action
pub const KILL_NODE: &str = "kill";

/// Placeholder in `sprite_text` replaced by the current item
pub const ITEM_TOKEN: &str = "%ITEM%";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drink {
    Espresso,
    Cappuccino,
    Latte,
}

impl Drink {
    pub const ALL: [Drink; 3] = [Drink::Espresso, Drink::Cappuccino, Drink::Latte];

    pub fn as_str(&self) -> &'static str {
        match self {
            Drink::Espresso => "espresso",
            Drink::Cappuccino => "cappuccino",
            Drink::Latte => "latte",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == s)
    }
}

impl fmt::Display for Drink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State mutation or branch triggered by a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Close the modal and forget the current node
    EndConversation,
    /// Put a drink in the inventory
    Save(Drink),
    /// Count one more spare
    IncreaseSpare,
    /// Kill the session for good
    Kill,
    /// Branch to `give` or `kill` depending on the inventory
    Check(Drink),
}

impl FromStr for Action {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || EngineError::UnknownAction(s.to_string());

        match s {
            "end_conversation" => Ok(Action::EndConversation),
            "increase_spare" => Ok(Action::IncreaseSpare),
            "kill" => Ok(Action::Kill),
            _ => {
                if let Some(drink) = s.strip_prefix("save_") {
                    return Drink::parse(drink).map(Action::Save).ok_or_else(unknown);
                }
                if let Some(drink) = s.strip_prefix("check_") {
                    return Drink::parse(drink).map(Action::Check).ok_or_else(unknown);
                }
                Err(unknown())
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::EndConversation => f.write_str("end_conversation"),
            Action::Save(d) => write!(f, "save_{d}"),
            Action::IncreaseSpare => f.write_str("increase_spare"),
            Action::Kill => f.write_str("kill"),
            Action::Check(d) => write!(f, "check_{d}"),
        }
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Button label
    pub text: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub next_node_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub input: String,
    pub next_node_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMode {
    /// Placeholder for the input field
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<Secret>>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub default_next_node_id: Option<String>,
}

impl EntryMode {
    /// First secret matching the already normalized input.
    pub fn match_secret(&self, normalized: &str) -> Option<&Secret> {
        self.secrets
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|s| s.input.to_lowercase() == normalized)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Per-node art. Kept for the asset format, the presenter shows a fixed portrait.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sprite_image: Option<String>,
    #[serde(default)]
    pub sprite_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_mode: Option<EntryMode>,
    /// Canvas position written by the graphical editor, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_pos: Option<[f64; 2]>,
}

/// Interactive surface a node renders. Entry mode wins over choices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction<'a> {
    Entry(&'a EntryMode),
    Choices(&'a [Choice]),
    DeadEnd,
}

impl Node {
    pub fn interaction(&self) -> Interaction<'_> {
        if let Some(entry) = &self.entry_mode {
            return Interaction::Entry(entry);
        }
        if let Some(choices) = &self.choices {
            return Interaction::Choices(choices);
        }
        Interaction::DeadEnd
    }

    /// Text with the first `%ITEM%` replaced by `item`, if any.
    pub fn text_for(&self, item: Option<&str>) -> String {
        match item {
            Some(item) if self.sprite_text.contains(ITEM_TOKEN) => self.sprite_text.replacen(ITEM_TOKEN, item, 1),
            _ => self.sprite_text.clone(),
        }
    }

    /// All outgoing edges, in rendering order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out = Vec::new();

        if let Some(choices) = &self.choices {
            for (index, choice) in choices.iter().enumerate() {
                if let Some(action) = choice.action {
                    for target in action_targets(action) {
                        out.push(Edge {
                            kind: EdgeKind::Action { index, action },
                            target: target.to_string(),
                        });
                    }
                } else if let Some(target) = &choice.next_node_id {
                    out.push(Edge {
                        kind: EdgeKind::Choice { index },
                        target: target.clone(),
                    });
                }
            }
        }

        if let Some(entry) = &self.entry_mode {
            for secret in entry.secrets.as_deref().unwrap_or_default() {
                out.push(Edge {
                    kind: EdgeKind::Secret { input: secret.input.clone() },
                    target: secret.next_node_id.clone(),
                });
            }
            if let Some(target) = &entry.default_next_node_id {
                out.push(Edge {
                    kind: EdgeKind::Default,
                    target: target.clone(),
                });
            }
        }

        out
    }
}

fn action_targets(action: Action) -> &'static [&'static str] {
    match action {
        Action::Check(_) => &[GIVE_NODE, KILL_NODE],
        Action::IncreaseSpare => &[GIVE_NODE],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    /// Plain `next_node_id` of the n-th choice
    Choice { index: usize },
    /// Node an action of the n-th choice can branch to
    Action { index: usize, action: Action },
    Secret { input: String },
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub kind: EdgeKind,
    pub target: String,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EdgeKind::Choice { index } => write!(f, "choice #{} -> {}", index + 1, self.target),
            EdgeKind::Action { index, action } => write!(f, "choice #{} [{action}] -> {}", index + 1, self.target),
            EdgeKind::Secret { input } => write!(f, "secret {input:?} -> {}", self.target),
            EdgeKind::Default => write!(f, "default -> {}", self.target),
        }
    }
}

/// Mapping of node id to node. Immutable once handed to a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationGraph {
    pub(crate) nodes: BTreeMap<String, Node>,
}

impl ConversationGraph {
    pub fn from_json(raw: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }
}

impl FromIterator<(String, Node)> for ConversationGraph {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Deserialize an optional field, treating `""` as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.is_empty() => s.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}
