use crate::net::sink::ClientSink;
use madam_core::SeqFrame;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;

/// Forwards one page's frames to its client, in order.
pub struct SessionOut {
    rx: Receiver<SeqFrame>,
}

impl SessionOut {
    pub fn new(rx: Receiver<SeqFrame>) -> Self {
        Self { rx }
    }

    /// Runs until every sender of the page is gone or the client fails.
    pub async fn run<C>(mut self, mut client: C) -> anyhow::Result<()>
    where
        C: ClientSink,
    {
        while let Some(frame) = self.rx.recv().await {
            client.send_frame(frame).await?;
        }

        Ok(())
    }
}

pub fn spawn_session_out<C>(rx: Receiver<SeqFrame>, sink: C) -> JoinHandle<()>
where
    C: ClientSink + 'static,
{
    let session_out = SessionOut::new(rx);
    tokio::spawn(async move {
        if let Err(e) = session_out.run(sink).await {
            tracing::debug!(error = %e, "session output stopped");
        }
    })
}
