use madam_core::{Page, UiHandle};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Telnet,
    WebSocket,
}

/// One connected visitor. Owned by the connection task, never shared.
pub struct Session {
    // When is the session started/created
    pub session_started: Instant,
    /// Peer label used in logs and the online list
    pub peer: String,
    /// Protocol used by the client
    protocol: Protocol,
    /// Page state: coffee modal, gallery, typewriter
    pub page: Page,
    ui: UiHandle,
}

impl Session {
    pub fn new(protocol: Protocol, peer: impl Into<String>, page: Page, ui: UiHandle) -> Self {
        Self {
            session_started: Instant::now(),
            peer: peer.into(),
            protocol,
            page,
            ui,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Host message outside the page surfaces
    pub fn notice(&self, text: impl Into<String>) {
        self.ui.notice(text);
    }

    /// The client stopped reading its frames, the connection should be dropped
    pub fn overflowed(&self) -> bool {
        self.ui.overflowed()
    }

    /// One line summary of the conversation state
    pub fn status_line(&self) -> String {
        let state = self.page.conversation().state();
        let inventory = if state.inventory().is_empty() {
            "nothing".to_string()
        } else {
            state.inventory().join(", ")
        };

        format!(
            "node: {} | holding: {} | stashed: {} | spares: {} | killed: {} | connected: {}s",
            state.current_node_id().unwrap_or("-"),
            state.current_item().unwrap_or("-"),
            inventory,
            state.sparing_numbers(),
            if state.is_killed() { "yes" } else { "no" },
            self.session_started.elapsed().as_secs(),
        )
    }
}
