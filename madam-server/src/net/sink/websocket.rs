use crate::net::sink::ClientSink;
use async_trait::async_trait;
use futures::SinkExt;
use madam_core::SeqFrame;

/// Sends every frame as one JSON text message: `{"seq": 4, "type": "append_text", ...}`
pub struct WebSocketSink<S, M> {
    ws: S,
    _phantom: std::marker::PhantomData<M>,
}

impl<S, M> WebSocketSink<S, M> {
    pub fn new(ws: S) -> Self {
        Self {
            ws,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<S, M> ClientSink for WebSocketSink<S, M>
where
    S: SinkExt<M> + Unpin + Send,
    S::Error: std::error::Error + Send + Sync + 'static,
    M: From<String> + Send,
{
    async fn send_frame(&mut self, frame: SeqFrame) -> anyhow::Result<()> {
        let json = serde_json::to_string(&frame)?;

        self.ws
            .send(json.into())
            .await
            .map_err(|e| anyhow::Error::msg(format!("websocket send failed: {e}")))?;

        Ok(())
    }
}
