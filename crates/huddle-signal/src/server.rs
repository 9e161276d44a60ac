//! Accept loop and handshake routing.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::{StatusCode, Uri};

use crate::connection::{handle_connection, EndpointSettings, JoinRequest};
use crate::manager::SignalingManager;


const ANONYMOUS: &str = "Anonymous";

/// How handshake requests are mapped onto rooms.
#[derive(Debug, Clone)]
pub struct RouteSettings {
    /// e.g. `/ws/voice`; the room id is everything after `{prefix}/`.
    pub path_prefix: String,
    pub display_name_max_len: usize,
}

/// Parse `{prefix}/{room_id}?display_name=...`.
///
/// Returns `None` when the path is not under the prefix at all. The room id
/// is returned verbatim; validating it is the manager's job so that bad ids
/// get a proper close code instead of an HTTP error.
pub fn parse_route(uri: &Uri, route: &RouteSettings) -> Option<JoinRequest> {
    let room_id = uri
        .path()
        .strip_prefix(route.path_prefix.as_str())?
        .strip_prefix('/')?;

    let display_name = uri
        .query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "display_name")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default();

    Some(JoinRequest {
        room_id: room_id.to_string(),
        display_name: clean_display_name(&display_name, route.display_name_max_len),
    })
}

/// Trim, bound to `max_len` characters, and fall back to "Anonymous".
fn clean_display_name(raw: &str, max_len: usize) -> String {
    let trimmed: String = raw.trim().chars().take(max_len).collect();
    let trimmed = trimmed.trim_end();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.to_string()
    }
}

fn not_found() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some("not found".into()));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}

/// Accept connections until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    manager: SignalingManager,
    route: RouteSettings,
    endpoint: EndpointSettings,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("Accept loop stopping");
                return;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        let manager = manager.clone();
                        let route = route.clone();
                        let endpoint = endpoint.clone();
                        tokio::spawn(async move {
                            upgrade(stream, addr, manager, route, endpoint).await;
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "TCP accept error");
                    }
                }
            }
        }
    }
}

async fn upgrade(
    stream: TcpStream,
    addr: SocketAddr,
    manager: SignalingManager,
    route: RouteSettings,
    endpoint: EndpointSettings,
) {
    let mut request: Option<JoinRequest> = None;
    let callback = |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        match parse_route(req.uri(), &route) {
            Some(parsed) => {
                request = Some(parsed);
                Ok(response)
            }
            None => Err(not_found()),
        }
    };

    let upgraded = accept_hdr_async(stream, callback).await;
    match upgraded {
        Ok(ws) => match request {
            Some(request) => handle_connection(ws, addr, request, manager, endpoint).await,
            None => tracing::warn!(peer = %addr, "Upgraded without a route"),
        },
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
        }
    }
}
