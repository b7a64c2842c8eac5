mod common;

use madam_server::net::telnet::serve_listener;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct Client {
    stream: TcpStream,
    seen: String,
}

impl Client {
    async fn connect() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_listener(listener, common::registry()));

        let stream = TcpStream::connect(addr).await.unwrap();
        Client {
            stream,
            seen: String::new(),
        }
    }

    async fn send(&mut self, line: &str) {
        self.stream.write_all(format!("{line}\r\n").as_bytes()).await.unwrap();
    }

    /// Read until `needle` shows up, returns everything read so far and forgets it.
    async fn expect(&mut self, needle: &str) -> String {
        let mut buf = [0u8; 1024];
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.seen.contains(needle) {
                let n = self.stream.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed while waiting for {needle:?}, got {:?}", self.seen);
                self.seen.push_str(&String::from_utf8_lossy(&buf[..n]));
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {needle:?}, got {:?}", self.seen));

        let end = self.seen.find(needle).unwrap() + needle.len();
        let out = self.seen[..end].to_string();
        self.seen.drain(..end);
        out
    }
}

#[tokio::test]
async fn order_browse_and_come_back() {
    let mut c = Client::connect().await;
    c.expect("`quit` to leave").await;

    c.send("order").await;
    let out = c.expect("5) Leave").await;
    assert!(out.contains("-- At the counter --"));
    assert!(out.contains("Bonjour, mon ami!"));
    assert!(out.contains("1) An espresso, please"));

    c.send("4").await;
    let out = c.expect("2) Back to the menu").await;
    assert!(out.contains("Take your time."));

    c.send("/status").await;
    let out = c.expect("online: 1").await;
    assert!(out.contains("node: browse"), "{out:?}");

    c.send("9").await;
    c.expect("unknown command: 9").await;

    c.send("quit").await;
    c.expect("Au revoir!").await;
}

#[tokio::test]
async fn password_entry_over_telnet() {
    let mut c = Client::connect().await;
    c.expect("`quit` to leave").await;

    c.send("order").await;
    c.expect("5) Leave").await;
    c.send("4").await;
    c.expect("2) Back to the menu").await;
    c.send("1").await;
    c.expect("5) Whisper the password").await;
    c.send("5").await;
    c.expect("(Whisper it...)").await;

    c.send("  CROISSANT ").await;
    let out = c.expect("2) Order something else").await;
    assert!(out.contains("Minou purrs."));
}

#[tokio::test]
async fn gallery_cards() {
    let mut c = Client::connect().await;
    c.expect("`quit` to leave").await;

    c.send("cards").await;
    let out = c.expect("2) Blank [blank]").await;
    assert!(out.contains("1) Sunflowers [sunflowers]"));

    c.send("card 1").await;
    let out = c.expect("~ Sunflowers ~").await;
    assert!(out.contains("Painted in a hurry."));

    c.send("card blank").await;
    c.expect("Default message if attribute is missing.").await;

    c.send("card 3").await;
    c.expect("no card `3` on the walls").await;

    c.send("dismiss").await;
    c.expect("(you put the card back)").await;
}
