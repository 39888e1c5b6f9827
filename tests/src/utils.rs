use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How long a mock waits for the client to hang up before giving up.
const HANGUP_WAIT: Duration = Duration::from_secs(5);

/// What a mock instrument saw during its single connection.
#[derive(Debug)]
pub struct Transcript {
    pub request: String,
    pub saw_hangup: bool,
}

/// A one-shot instrument listening on loopback.
///
/// It accepts one client, reads one command line, optionally answers after
/// `delay`, then waits for the client to close its end.
pub struct MockInstrument {
    pub port: u16,
    handle: JoinHandle<Transcript>,
}

impl MockInstrument {
    pub async fn replying(reply: impl Into<Vec<u8>>, delay: Duration) -> Self {
        Self::spawn(Some(reply.into()), delay).await
    }

    pub async fn silent() -> Self {
        Self::spawn(None, Duration::ZERO).await
    }

    async fn spawn(reply: Option<Vec<u8>>, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);

            let mut request = String::new();
            reader.read_line(&mut request).await.unwrap();

            if let Some(reply) = reply {
                tokio::time::sleep(delay).await;
                // The client may already have given up on us.
                let _ = reader.get_mut().write_all(&reply).await;
            }

            let mut rest = Vec::new();
            let saw_hangup = tokio::time::timeout(HANGUP_WAIT, reader.read_to_end(&mut rest))
                .await
                .is_ok();

            Transcript { request, saw_hangup }
        });

        Self { port, handle }
    }

    pub fn resource(&self) -> String {
        format!("TCPIP::127.0.0.1::{}::SOCKET", self.port)
    }

    pub async fn transcript(self) -> Transcript {
        self.handle.await.unwrap()
    }
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Wraps `payload` the way an instrument answers a screen capture request.
pub fn png_block(payload: &[u8]) -> Vec<u8> {
    let mut reply = scopr_protocols::block::encode(payload);
    reply.push(b'\n');
    reply
}

/// An instrument that answers every connection, for callers that connect
/// more than once (a sweep handshake followed by a probe).
pub async fn always_on_instrument(reply: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let mut request = String::new();
                if matches!(reader.read_line(&mut request).await, Ok(n) if n > 0) {
                    let _ = reader.get_mut().write_all(reply.as_bytes()).await;
                }
            });
        }
    });

    port
}
