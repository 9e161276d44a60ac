//! Per-connection handler: admit, pump frames both ways, always leave.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use huddle_common::{AdmissionError, PeerId};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::manager::SignalingManager;
use crate::outbound::{self, Mailbox};
use crate::protocol::{self, LeaveReason, ServerMessage};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// Upper bound on a single socket write.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Close code sent to a peer the reaper evicted.
const CLOSE_EVICTED: u16 = 4008;

/// Per-endpoint knobs.
#[derive(Debug, Clone)]
pub struct EndpointSettings {
    pub idle_ping: Duration,
    pub send_queue_capacity: usize,
}

/// Where a client asked to go, as parsed from the handshake request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room_id: String,
    pub display_name: String,
}

/// Why the receive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Closed,
    Evicted,
    WriteFailed,
}

/// Handle a single upgraded connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    request: JoinRequest,
    manager: SignalingManager,
    settings: EndpointSettings,
) {
    let (mut sink, mut stream) = ws.split();
    let (link, mut mailbox) = outbound::channel(settings.send_queue_capacity);

    // 1. Admission. Rejections close with a reason-specific code.
    let admission = match manager
        .join_room(&request.room_id, link, &request.display_name)
        .await
    {
        Ok(admission) => admission,
        Err(e) => {
            tracing::warn!(peer = %addr, room = %request.room_id, error = %e, "Join rejected");
            reject(&mut sink, &e).await;
            return;
        }
    };

    tracing::info!(
        peer = %addr,
        peer_id = %admission.peer_id,
        room = %admission.room_id,
        "Client connected"
    );

    // 2. Pump until the client goes away or the manager evicts it. The guard
    // still runs the leave if this task is cancelled or panics mid-loop.
    let guard = LeaveGuard::new(manager.clone(), admission.peer_id.clone());
    let exit = pump(
        &mut sink,
        &mut stream,
        &mut mailbox,
        &manager,
        &admission.peer_id,
        &settings,
    )
    .await;

    // 3. Cleanup.
    if exit == Exit::Evicted {
        let _ = close(&mut sink, CLOSE_EVICTED, "timeout").await;
    }
    guard.leave(LeaveReason::Disconnected).await;

    tracing::info!(
        peer = %addr,
        peer_id = %admission.peer_id,
        room = %admission.room_id,
        exit = ?exit,
        "Client disconnected"
    );
}

async fn pump(
    sink: &mut WsSink,
    stream: &mut WsStream,
    mailbox: &mut Mailbox,
    manager: &SignalingManager,
    peer_id: &PeerId,
    settings: &EndpointSettings,
) -> Exit {
    let shutdown = mailbox.shutdown();
    let idle = tokio::time::sleep(settings.idle_ping);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => return Exit::Evicted,

            // Frames the manager queued for this peer → socket.
            Some(frame) = mailbox.recv() => {
                if send(sink, Message::Text(frame.into())).await.is_err() {
                    return Exit::WriteFailed;
                }
            }

            // Nothing heard for a while: nudge the client. The nudge does not
            // extend the peer's lease with the reaper.
            () = &mut idle => {
                if send(sink, Message::Ping(Default::default())).await.is_err() {
                    return Exit::WriteFailed;
                }
                idle.as_mut().reset(Instant::now() + settings.idle_ping);
            }

            // Socket → manager.
            frame = stream.next() => {
                idle.as_mut().reset(Instant::now() + settings.idle_ping);
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if handle_text(sink, manager, peer_id, text.as_str()).await.is_err() {
                            return Exit::WriteFailed;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        manager.touch(peer_id).await;
                        let reply = ServerMessage::Error {
                            message: "binary frames are not supported".into(),
                        };
                        if send(sink, Message::Text(reply.to_json().into())).await.is_err() {
                            return Exit::WriteFailed;
                        }
                    }
                    // Control frames are answered by the client's stack on
                    // its own, so they never count as liveness.
                    Some(Ok(Message::Ping(data))) => {
                        if send(sink, Message::Pong(data)).await.is_err() {
                            return Exit::WriteFailed;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => return Exit::Closed,
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        tracing::debug!(peer_id = %peer_id, error = %e, "WS error");
                        return Exit::Closed;
                    }
                }
            }
        }
    }
}

/// Decode one text frame and hand it to the manager. Decode failures are
/// answered directly; relay failures were already answered by the manager.
async fn handle_text(
    sink: &mut WsSink,
    manager: &SignalingManager,
    peer_id: &PeerId,
    text: &str,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    match protocol::decode(text) {
        Ok(message) => {
            if let Err(e) = manager.relay(peer_id, message).await {
                tracing::debug!(peer_id = %peer_id, error = %e, "Relay rejected message");
            }
            Ok(())
        }
        Err(e) => {
            manager.touch(peer_id).await;
            tracing::debug!(peer_id = %peer_id, error = %e, "Undecodable message");
            let reply = ServerMessage::error(&e);
            send(sink, Message::Text(reply.to_json().into())).await
        }
    }
}

/// Send one frame, giving up after [`WRITE_TIMEOUT`].
async fn send(sink: &mut WsSink, message: Message) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    match tokio::time::timeout(WRITE_TIMEOUT, sink.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(tokio_tungstenite::tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "write timed out",
        ))),
    }
}

async fn close(
    sink: &mut WsSink,
    code: u16,
    reason: &str,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let frame = CloseFrame {
        code: CloseCode::from(code),
        reason: reason.to_string().into(),
    };
    send(sink, Message::Close(Some(frame))).await
}

async fn reject(sink: &mut WsSink, err: &AdmissionError) {
    if let Err(e) = close(sink, err.close_code(), err.close_reason()).await {
        tracing::debug!(error = %e, "Failed to send rejection close frame");
    }
}

/// Runs `leave_room` exactly once: explicitly via [`LeaveGuard::leave`] on
/// the normal path, or from `Drop` if the handler is cancelled or panics.
struct LeaveGuard {
    manager: SignalingManager,
    peer_id: Option<PeerId>,
}

impl LeaveGuard {
    fn new(manager: SignalingManager, peer_id: PeerId) -> Self {
        Self {
            manager,
            peer_id: Some(peer_id),
        }
    }

    async fn leave(mut self, reason: LeaveReason) {
        if let Some(peer_id) = self.peer_id.take() {
            self.manager.leave_room(&peer_id, reason).await;
        }
    }
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let Some(peer_id) = self.peer_id.take() else {
            return;
        };
        let manager = self.manager.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    manager.leave_room(&peer_id, LeaveReason::Disconnected).await;
                });
            }
            Err(_) => {
                tracing::error!(peer_id = %peer_id, "No runtime to run leave for dropped connection");
            }
        }
    }
}
