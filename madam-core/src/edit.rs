//! Structural edits on a conversation graph, used by the asset tooling.
//!
//! References are rewritten along with the nodes they point at: renaming a node updates
//! every choice, secret and default target, removing one clears them.

use crate::error::{EngineError, EngineResult};
use crate::graph::{Choice, ConversationGraph, EntryMode, Node, Secret};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Text only, a dead end until choices or an entry are added
    Plain,
    Choices,
    Entry,
}

impl NodeKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plain" => Some(NodeKind::Plain),
            "choices" => Some(NodeKind::Choices),
            "entry" | "entry_mode" => Some(NodeKind::Entry),
            _ => None,
        }
    }
}

/// Text properties of a node that can be edited in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeField {
    SpriteText,
    SpriteImage,
    /// `entry_mode.prompt_text`
    PromptText,
    /// `entry_mode.default_next_node_id`
    DefaultNext,
}

impl NodeField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sprite_text" | "text" => Some(NodeField::SpriteText),
            "sprite_image" | "image" => Some(NodeField::SpriteImage),
            "prompt_text" | "prompt" => Some(NodeField::PromptText),
            "default_next_node_id" | "default" => Some(NodeField::DefaultNext),
            _ => None,
        }
    }
}

/// `""` means absent, the same as when loading an asset.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn new_choice() -> Choice {
    Choice {
        text: "New Choice".to_string(),
        ..Default::default()
    }
}

fn new_entry() -> EntryMode {
    EntryMode {
        prompt_text: Some("Enter...".to_string()),
        secrets: Some(vec![Secret {
            input: "secret".to_string(),
            next_node_id: String::new(),
        }]),
        default_next_node_id: None,
    }
}

impl ConversationGraph {
    fn node_mut(&mut self, id: &str) -> EngineResult<&mut Node> {
        self.nodes.get_mut(id).ok_or_else(|| EngineError::NodeNotFound(id.to_string()))
    }

    pub fn add_node(&mut self, id: &str, kind: NodeKind) -> EngineResult<()> {
        if self.nodes.contains_key(id) {
            return Err(EngineError::NodeExists(id.to_string()));
        }
        self.nodes.insert(
            id.to_string(),
            Node {
                sprite_text: format!("Text for {id}"),
                ..Default::default()
            },
        );
        self.convert_node(id, kind)
    }

    /// Switch the interactive surface of a node, dropping the old one.
    pub fn convert_node(&mut self, id: &str, kind: NodeKind) -> EngineResult<()> {
        let node = self.node_mut(id)?;
        match kind {
            NodeKind::Plain => {}
            NodeKind::Choices => {
                node.entry_mode = None;
                node.choices = Some(vec![new_choice()]);
            }
            NodeKind::Entry => {
                node.choices = None;
                node.entry_mode = Some(new_entry());
            }
        }
        Ok(())
    }

    /// Append a choice, turning the node into a choice node if needed.
    pub fn add_choice(&mut self, id: &str, mut choice: Choice) -> EngineResult<()> {
        choice.item = non_blank(choice.item);
        choice.next_node_id = non_blank(choice.next_node_id);

        let node = self.node_mut(id)?;
        node.entry_mode = None;
        node.choices.get_or_insert_with(Vec::new).push(choice);
        Ok(())
    }

    /// Append a secret, turning the node into an entry node if needed.
    pub fn add_secret(&mut self, id: &str, secret: Secret) -> EngineResult<()> {
        let node = self.node_mut(id)?;
        node.choices = None;
        let entry = node.entry_mode.get_or_insert_with(EntryMode::default);
        entry.secrets.get_or_insert_with(Vec::new).push(secret);
        Ok(())
    }

    /// Remove the choice at `index`. The list goes away with its last choice.
    pub fn remove_choice(&mut self, id: &str, index: usize) -> EngineResult<Choice> {
        let node = self.node_mut(id)?;
        let choices = node.choices.as_mut().ok_or_else(|| EngineError::NoChoices(id.to_string()))?;
        if index >= choices.len() {
            return Err(EngineError::ChoiceOutOfRange {
                node: id.to_string(),
                index,
            });
        }

        let removed = choices.remove(index);
        if choices.is_empty() {
            node.choices = None;
        }
        Ok(removed)
    }

    /// Remove the secret at `index`. The entry mode stays, the list goes away with its
    /// last secret.
    pub fn remove_secret(&mut self, id: &str, index: usize) -> EngineResult<Secret> {
        let node = self.node_mut(id)?;
        let entry = node
            .entry_mode
            .as_mut()
            .ok_or_else(|| EngineError::NotAnEntryNode(id.to_string()))?;
        let out_of_range = || EngineError::SecretOutOfRange {
            node: id.to_string(),
            index,
        };
        let secrets = entry.secrets.as_mut().ok_or_else(out_of_range)?;
        if index >= secrets.len() {
            return Err(out_of_range());
        }

        let removed = secrets.remove(index);
        if secrets.is_empty() {
            entry.secrets = None;
        }
        Ok(removed)
    }

    /// Overwrite a text property. An empty value clears the optional ones.
    pub fn set_field(&mut self, id: &str, field: NodeField, value: &str) -> EngineResult<()> {
        let node = self.node_mut(id)?;
        let optional = non_blank(Some(value.to_string()));

        match field {
            NodeField::SpriteText => node.sprite_text = value.to_string(),
            NodeField::SpriteImage => node.sprite_image = optional,
            NodeField::PromptText | NodeField::DefaultNext => {
                let entry = node
                    .entry_mode
                    .as_mut()
                    .ok_or_else(|| EngineError::NotAnEntryNode(id.to_string()))?;
                if field == NodeField::PromptText {
                    entry.prompt_text = optional;
                } else {
                    entry.default_next_node_id = optional;
                }
            }
        }
        Ok(())
    }

    /// Rename a node and every reference to it. Returns the number of rewritten references.
    pub fn rename_node(&mut self, old: &str, new: &str) -> EngineResult<usize> {
        if old == new {
            return Ok(0);
        }
        if self.nodes.contains_key(new) {
            return Err(EngineError::NodeExists(new.to_string()));
        }
        let node = self.nodes.remove(old).ok_or_else(|| EngineError::NodeNotFound(old.to_string()))?;
        self.nodes.insert(new.to_string(), node);

        Ok(self.rewrite_targets(old, Some(new)))
    }

    /// Remove a node and clear references to it. Returns the number of cleared references.
    pub fn remove_node(&mut self, id: &str) -> EngineResult<usize> {
        self.nodes.remove(id).ok_or_else(|| EngineError::NodeNotFound(id.to_string()))?;
        Ok(self.rewrite_targets(id, None))
    }

    fn rewrite_targets(&mut self, from: &str, to: Option<&str>) -> usize {
        let mut count = 0;

        for node in self.nodes.values_mut() {
            for choice in node.choices.iter_mut().flatten() {
                if choice.next_node_id.as_deref() == Some(from) {
                    choice.next_node_id = to.map(str::to_string);
                    count += 1;
                }
            }

            let Some(entry) = node.entry_mode.as_mut() else {
                continue;
            };
            if entry.default_next_node_id.as_deref() == Some(from) {
                entry.default_next_node_id = to.map(str::to_string);
                count += 1;
            }
            for secret in entry.secrets.iter_mut().flatten() {
                if secret.next_node_id == from {
                    secret.next_node_id = to.unwrap_or_default().to_string();
                    count += 1;
                }
            }
        }

        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Interaction;

    fn sample() -> ConversationGraph {
        ConversationGraph::from_json(
            r#"{
                "start": { "sprite_text": "hi", "choices": [
                    { "text": "ask", "next_node_id": "ask" },
                    { "text": "bye", "next_node_id": "bye" }
                ] },
                "ask": { "sprite_text": "?", "entry_mode": {
                    "secrets": [{ "input": "please", "next_node_id": "bye" }],
                    "default_next_node_id": "bye"
                } },
                "bye": { "sprite_text": "bye" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn rename_rewrites_references() {
        let mut g = sample();
        assert_eq!(g.rename_node("bye", "farewell").unwrap(), 3);
        assert!(!g.contains("bye"));
        assert!(g.contains("farewell"));

        let ask = g.get("ask").unwrap().entry_mode.as_ref().unwrap();
        assert_eq!(ask.default_next_node_id.as_deref(), Some("farewell"));
        assert_eq!(ask.secrets.as_ref().unwrap()[0].next_node_id, "farewell");
    }

    #[test]
    fn rename_refuses_existing_id() {
        let mut g = sample();
        assert!(matches!(g.rename_node("bye", "ask"), Err(EngineError::NodeExists(_))));
        assert!(matches!(g.rename_node("nope", "x"), Err(EngineError::NodeNotFound(_))));
    }

    #[test]
    fn remove_clears_references() {
        let mut g = sample();
        assert_eq!(g.remove_node("bye").unwrap(), 3);

        let start = g.get("start").unwrap().choices.as_ref().unwrap();
        assert_eq!(start[1].next_node_id, None);
        let ask = g.get("ask").unwrap().entry_mode.as_ref().unwrap();
        assert_eq!(ask.default_next_node_id, None);
        assert_eq!(ask.secrets.as_ref().unwrap()[0].next_node_id, "");
    }

    #[test]
    fn add_and_convert() {
        let mut g = sample();
        g.add_node("menu", NodeKind::Choices).unwrap();
        assert_eq!(g.get("menu").unwrap().sprite_text, "Text for menu");
        assert!(matches!(g.get("menu").unwrap().interaction(), Interaction::Choices(c) if c[0].text == "New Choice"));
        assert!(g.add_node("menu", NodeKind::Plain).is_err());

        g.convert_node("menu", NodeKind::Entry).unwrap();
        let node = g.get("menu").unwrap();
        assert!(node.choices.is_none());
        assert_eq!(node.entry_mode.as_ref().unwrap().prompt_text.as_deref(), Some("Enter..."));

        g.add_choice("menu", Choice { text: "again".into(), ..Default::default() }).unwrap();
        assert!(g.get("menu").unwrap().entry_mode.is_none());
    }

    #[test]
    fn blank_choice_fields_are_dropped() {
        let mut g = sample();
        g.add_choice(
            "start",
            Choice {
                text: "wait".into(),
                item: Some(String::new()),
                next_node_id: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();

        let choice = &g.get("start").unwrap().choices.as_ref().unwrap()[2];
        assert_eq!(choice.item, None);
        assert_eq!(choice.next_node_id, None);
        assert!(!g.to_json_pretty().unwrap().contains(r#""next_node_id": """#));
    }

    #[test]
    fn remove_choice_drops_empty_list() {
        let mut g = sample();
        assert_eq!(g.remove_choice("start", 0).unwrap().text, "ask");
        assert!(matches!(
            g.remove_choice("start", 1),
            Err(EngineError::ChoiceOutOfRange { index: 1, .. })
        ));

        g.remove_choice("start", 0).unwrap();
        assert!(g.get("start").unwrap().choices.is_none());
        assert!(matches!(g.remove_choice("start", 0), Err(EngineError::NoChoices(_))));
    }

    #[test]
    fn remove_secret_keeps_entry_mode() {
        let mut g = sample();
        assert!(matches!(g.remove_secret("start", 0), Err(EngineError::NotAnEntryNode(_))));
        assert_eq!(g.remove_secret("ask", 0).unwrap().input, "please");

        let entry = g.get("ask").unwrap().entry_mode.as_ref().unwrap();
        assert!(entry.secrets.is_none());
        assert_eq!(entry.default_next_node_id.as_deref(), Some("bye"));
        assert!(matches!(
            g.remove_secret("ask", 0),
            Err(EngineError::SecretOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn set_fields() {
        let mut g = sample();
        g.set_field("bye", NodeField::SpriteText, "Au revoir").unwrap();
        g.set_field("bye", NodeField::SpriteImage, "images/wave.png").unwrap();
        assert_eq!(g.get("bye").unwrap().sprite_text, "Au revoir");
        assert_eq!(g.get("bye").unwrap().sprite_image.as_deref(), Some("images/wave.png"));

        g.set_field("bye", NodeField::SpriteImage, "").unwrap();
        assert_eq!(g.get("bye").unwrap().sprite_image, None);

        g.set_field("ask", NodeField::PromptText, "The magic word?").unwrap();
        g.set_field("ask", NodeField::DefaultNext, "").unwrap();
        let entry = g.get("ask").unwrap().entry_mode.as_ref().unwrap();
        assert_eq!(entry.prompt_text.as_deref(), Some("The magic word?"));
        assert_eq!(entry.default_next_node_id, None);

        assert!(matches!(
            g.set_field("bye", NodeField::PromptText, "x"),
            Err(EngineError::NotAnEntryNode(_))
        ));
        assert_eq!(NodeField::parse("default"), Some(NodeField::DefaultNext));
        assert_eq!(NodeField::parse("colour"), None);
    }

    #[test]
    fn editor_positions_survive_a_rewrite() {
        let mut g = ConversationGraph::from_json(
            r#"{
                "a": { "sprite_text": "hi", "editor_pos": [120.0, 80.0],
                       "choices": [{ "text": "go", "next_node_id": "b" }] },
                "b": { "sprite_text": "bye", "editor_pos": [300, 80.5] }
            }"#,
        )
        .unwrap();

        g.rename_node("b", "bye").unwrap();
        let json = g.to_json_pretty().unwrap();
        let back = ConversationGraph::from_json(&json).unwrap();

        assert_eq!(back.get("a").unwrap().editor_pos, Some([120.0, 80.0]));
        assert_eq!(back.get("bye").unwrap().editor_pos, Some([300.0, 80.5]));
        assert_eq!(back, g);
    }

    #[test]
    fn saved_graph_loads_back() {
        let mut g = sample();
        g.remove_node("bye").unwrap();
        let json = g.to_json_pretty().unwrap();
        assert!(!json.contains("next_node_id\": null"));
        assert_eq!(ConversationGraph::from_json(&json).unwrap(), g);
    }
}
