//! In-process WebSocket document server
//!
//! Accepts connections on an ephemeral port, sends an `init` envelope to each
//! client, records every text frame it receives and can push frames to every
//! connected client.

use collabpad::shared::message::{Document, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// How the server treats incoming connections
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub document: Document,
    /// Close this many connections right after the handshake
    pub drop_first: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            document: Document {
                id: "doc-1".to_string(),
                name: "Notes".to_string(),
                content: "hello".to_string(),
                version: 3,
            },
            drop_first: 0,
        }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    /// Text frames received from any client
    pub frames: UnboundedReceiver<String>,
    connections: Arc<AtomicUsize>,
    request_uris: Arc<Mutex<Vec<String>>>,
    pushes: broadcast::Sender<String>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(options: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (frames_tx, frames) = mpsc::unbounded_channel();
        let (pushes, _) = broadcast::channel(64);
        let connections = Arc::new(AtomicUsize::new(0));
        let request_uris = Arc::new(Mutex::new(Vec::new()));

        let task = tokio::spawn(accept_loop(
            listener,
            options,
            frames_tx,
            pushes.clone(),
            connections.clone(),
            request_uris.clone(),
        ));

        Self {
            addr,
            frames,
            connections,
            request_uris,
            pushes,
            task,
        }
    }

    /// HTTP base URL, as configured in `SyncConfig::server_url`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws?docId=doc-1&clientId=test-client", self.addr)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn request_uris(&self) -> Vec<String> {
        self.request_uris.lock().unwrap().clone()
    }

    /// Send `message` to every connected client
    pub fn push(&self, message: &ServerMessage) {
        let frame = serde_json::to_string(message).unwrap();
        let _ = self.pushes.send(frame);
    }

    pub fn push_raw(&self, frame: &str) {
        let _ = self.pushes.send(frame.to_string());
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Address with nothing listening on it
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn accept_loop(
    listener: TcpListener,
    options: ServerOptions,
    frames_tx: UnboundedSender<String>,
    pushes: broadcast::Sender<String>,
    connections: Arc<AtomicUsize>,
    request_uris: Arc<Mutex<Vec<String>>>,
) {
    while let Ok((stream, _)) = listener.accept().await {
        let count = connections.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::spawn(serve(
            stream,
            count <= options.drop_first,
            options.document.clone(),
            frames_tx.clone(),
            pushes.subscribe(),
            request_uris.clone(),
        ));
    }
}

async fn serve(
    stream: TcpStream,
    drop_immediately: bool,
    document: Document,
    frames_tx: UnboundedSender<String>,
    mut pushes: broadcast::Receiver<String>,
    request_uris: Arc<Mutex<Vec<String>>>,
) {
    let record_uri = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        request_uris.lock().unwrap().push(request.uri().to_string());
        Ok(response)
    };
    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, record_uri).await else {
        return;
    };

    if drop_immediately {
        let _ = ws.close(None).await;
        return;
    }

    let init = ServerMessage::Init {
        document,
        clients: Vec::new(),
    };
    let frame = serde_json::to_string(&init).unwrap();
    if ws.send(Message::Text(frame.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            incoming = ws.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = frames_tx.send(text.as_str().to_owned());
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            pushed = pushes.recv() => match pushed {
                Ok(frame) => {
                    if ws.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
