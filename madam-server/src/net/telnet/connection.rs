use crate::banner::{BANNER, ENTRY};
use crate::commands::{Flow, process_command};
use crate::error::AppResult;
use crate::input::parser::parse_line;
use crate::net::output::spawn_session_out;
use crate::net::sink::telnet::TelnetSink;
use crate::state::session::{Protocol, Session};
use crate::util::telnet::TelnetLines;
use crate::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;

pub async fn handle_connection(stream: TcpStream, peer: SocketAddr, registry: Arc<Registry>) -> AppResult<()> {
    let (read_half, write_half) = stream.into_split();

    let (mut sess, frames) = registry.new_session(Protocol::Telnet, peer.to_string());
    let output = spawn_session_out(frames, TelnetSink::new(write_half));

    sess.notice(BANNER);
    sess.notice(ENTRY);
    registry.set_online(&sess.peer, true);
    registry.attach(&mut sess).await;

    let result = read_loop(read_half, &mut sess, &registry).await;

    registry.set_online(&sess.peer, false);
    let stalled = sess.overflowed();
    // Dropping the session closes the frame stream, the output task drains and exits.
    drop(sess);
    if stalled {
        output.abort();
    } else {
        let _ = output.await;
    }

    result
}

async fn read_loop(read_half: OwnedReadHalf, sess: &mut Session, registry: &Registry) -> AppResult<()> {
    let mut reader = BufReader::new(read_half);
    let mut telnet = TelnetLines::new();
    let mut buf = [0u8; 512];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break; // disconnect
        }

        for line in buf[..n].iter().filter_map(|b| telnet.push(*b)) {
            let cmd = parse_line(&line, sess.page.screen());
            tracing::debug!(peer = %sess.peer, ?cmd, "telnet input");

            match process_command(cmd, sess, registry) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => return Ok(()),
                Err(e) => sess.notice(format!("error: {e}")),
            }

            if sess.overflowed() {
                tracing::warn!(peer = %sess.peer, "client is not reading, disconnecting");
                return Ok(());
            }
        }
    }

    Ok(())
}
