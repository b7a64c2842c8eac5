pub mod telnet;
pub mod websocket;

use async_trait::async_trait;
use madam_core::SeqFrame;

#[async_trait]
pub trait ClientSink: Send {
    async fn send_frame(&mut self, frame: SeqFrame) -> anyhow::Result<()>;
}
