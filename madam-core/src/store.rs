//! Loading the conversation asset.
//!
//! One [`ConversationStore`] is shared by every page. The asset is fetched at most once,
//! concurrent callers wait for the same fetch and all of them see the cached outcome,
//! failures included. There is no retry.

use crate::error::{EngineError, EngineResult};
use crate::graph::{ConversationGraph, Node};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;

/// Where the raw asset text comes from
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Human readable origin, used in logs and errors
    fn name(&self) -> String;

    async fn fetch(&self) -> EngineResult<String>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AssetSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> EngineResult<String> {
        tokio::fs::read_to_string(&self.path).await.map_err(|source| EngineError::Fetch {
            source_name: self.name(),
            source,
        })
    }
}

/// Asset text already in memory
pub struct InlineSource(pub String);

#[async_trait]
impl AssetSource for InlineSource {
    fn name(&self) -> String {
        "<inline>".to_string()
    }

    async fn fetch(&self) -> EngineResult<String> {
        Ok(self.0.clone())
    }
}

/// Outcome of the load as seen by a page
#[derive(Debug, Clone, Default)]
pub enum GraphState {
    /// Load not finished (or never requested)
    #[default]
    Pending,
    Ready(Arc<ConversationGraph>),
    /// Load failed, the message is only meant for logs
    Failed(Arc<str>),
}

impl GraphState {
    pub fn graph(&self) -> Option<&ConversationGraph> {
        match self {
            GraphState::Ready(g) => Some(g),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, GraphState::Failed(_))
    }
}

pub struct ConversationStore {
    source: Box<dyn AssetSource>,
    cell: OnceCell<GraphState>,
    fetches: AtomicUsize,
}

impl ConversationStore {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cell: OnceCell::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Load the graph, or return the outcome of the load that already happened.
    pub async fn load(&self) -> GraphState {
        self.cell.get_or_init(|| self.fetch_and_parse()).await.clone()
    }

    /// Current outcome without triggering a load
    pub fn state(&self) -> GraphState {
        self.cell.get().cloned().unwrap_or_default()
    }

    pub fn get(&self, node_id: &str) -> Option<&Node> {
        match self.cell.get()? {
            GraphState::Ready(g) => g.get(node_id),
            _ => None,
        }
    }

    /// Number of fetches issued so far. Never more than one.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    async fn fetch_and_parse(&self) -> GraphState {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let name = self.source.name();

        let parsed = match self.source.fetch().await {
            Ok(raw) => ConversationGraph::from_json(&raw),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(graph) => {
                tracing::info!(source = %name, nodes = graph.len(), "conversation loaded");
                GraphState::Ready(Arc::new(graph))
            }
            Err(e) => {
                tracing::error!(source = %name, error = %e, "could not load conversation data");
                GraphState::Failed(e.to_string().into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    #[async_trait]
    impl AssetSource for Broken {
        fn name(&self) -> String {
            "broken".to_string()
        }

        async fn fetch(&self) -> EngineResult<String> {
            Err(EngineError::Fetch {
                source_name: self.name(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
        }
    }

    #[tokio::test]
    async fn loads_once() {
        let store = ConversationStore::new(InlineSource(r#"{ "start": { "sprite_text": "hi" } }"#.into()));
        assert!(matches!(store.state(), GraphState::Pending));
        assert!(store.get("start").is_none());

        let (a, b) = tokio::join!(store.load(), store.load());
        assert!(a.graph().is_some() && b.graph().is_some());
        store.load().await;

        assert_eq!(store.fetch_count(), 1);
        assert_eq!(store.get("start").unwrap().sprite_text, "hi");
        assert!(store.get("nope").is_none());
    }

    #[tokio::test]
    async fn failure_is_cached() {
        let store = ConversationStore::new(Broken);
        assert!(store.load().await.is_failed());
        assert!(store.load().await.is_failed());
        assert_eq!(store.fetch_count(), 1);
    }

    #[tokio::test]
    async fn parse_error_is_a_failure() {
        let store = ConversationStore::new(InlineSource("{ not json".into()));
        assert!(store.load().await.is_failed());
    }

    #[tokio::test]
    async fn missing_file() {
        let store = ConversationStore::new(FileSource::new("/definitely/not/here.json"));
        let GraphState::Failed(msg) = store.load().await else {
            panic!("expected failure");
        };
        assert!(msg.contains("/definitely/not/here.json"));
    }
}
