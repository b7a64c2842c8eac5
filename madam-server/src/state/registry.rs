use crate::config::Config;
use crate::state::session::{Protocol, Session};
use madam_core::{ConversationStore, FileSource, Gallery, GraphState, Page, PageOptions, SeqFrame, ui_channel};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;

/// Everything the connections share
pub struct Registry {
    pub config: Arc<Config>,
    pub store: ConversationStore,
    pub gallery: Gallery,
    pub page_options: PageOptions,
    pub online: RwLock<BTreeSet<String>>,
}

impl Registry {
    pub fn new(config: Arc<Config>) -> Self {
        let store = ConversationStore::new(FileSource::new(config.conversation_path.clone()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: Arc<Config>, store: ConversationStore) -> Self {
        Self {
            gallery: config.gallery(),
            page_options: config.page_options(),
            config,
            store,
            online: RwLock::new(BTreeSet::new()),
        }
    }

    /// Fresh page and session for a connection, plus the frame stream to forward to it.
    pub fn new_session(&self, protocol: Protocol, peer: impl Into<String>) -> (Session, Receiver<SeqFrame>) {
        let (ui, rx) = ui_channel();
        let page = Page::new(ui.clone(), self.gallery.clone(), self.page_options.clone());
        (Session::new(protocol, peer, page, ui), rx)
    }

    /// Wait for the shared asset and hand it to the session's page.
    pub async fn attach(&self, sess: &mut Session) -> GraphState {
        let state = self.store.load().await;
        sess.page.attach(state.clone());
        state
    }

    pub fn set_online(&self, peer: &str, online: bool) {
        let mut g = self.online.write();
        if online {
            g.insert(peer.to_string());
        } else {
            g.remove(peer);
        }
    }

    pub fn online_count(&self) -> usize {
        self.online.read().len()
    }
}
