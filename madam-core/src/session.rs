use crate::graph::Drink;

/// Mutable per-page conversation state.
///
/// Only the resolver and presenter mutate it, everything else reads through the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Active node, `None` when no conversation is in progress
    current_node_id: Option<String>,
    /// Last picked up item. Never cleared.
    current_item: Option<String>,
    /// Collected item tags, append only
    inventory: Vec<String>,
    sparing_numbers: u32,
    /// One way: once set it stays set
    killed: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_node_id(&self) -> Option<&str> {
        self.current_node_id.as_deref()
    }

    pub fn current_item(&self) -> Option<&str> {
        self.current_item.as_deref()
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn has(&self, drink: Drink) -> bool {
        self.inventory.iter().any(|i| i == drink.as_str())
    }

    pub fn sparing_numbers(&self) -> u32 {
        self.sparing_numbers
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub(crate) fn enter(&mut self, node_id: &str) {
        self.current_node_id = Some(node_id.to_string());
    }

    pub(crate) fn leave(&mut self) {
        self.current_node_id = None;
    }

    pub(crate) fn pick_up(&mut self, item: &str) {
        self.current_item = Some(item.to_string());
    }

    pub(crate) fn stash(&mut self, drink: Drink) {
        self.inventory.push(drink.as_str().to_string());
    }

    /// Returns the new spare count
    pub(crate) fn spare(&mut self) -> u32 {
        self.sparing_numbers = self.sparing_numbers.saturating_add(1);
        self.sparing_numbers
    }

    pub(crate) fn kill(&mut self) {
        self.killed = true;
        self.current_node_id = None;
    }
}
