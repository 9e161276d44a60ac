//! huddle-signal: WebSocket signaling server for peer-to-peer voice rooms.
//!
//! Clients connect to `/ws/voice/{room_id}?display_name=...`, receive the
//! room roster and ICE servers, then exchange offers, answers and ICE
//! candidates through the server. Audio flows directly between peers.

use std::path::PathBuf;

use clap::Parser;
use huddle_config::HuddleConfig;
use huddle_signal::connection::EndpointSettings;
use huddle_signal::reaper::spawn_reaper;
use huddle_signal::server::{serve, RouteSettings};
use huddle_signal::{ManagerConfig, SignalingManager};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "huddle-signal", about = "WebSocket signaling relay for P2P voice rooms")]
struct Args {
    /// Path to a TOML config file. Defaults to the platform config dir.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind, overriding the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on, overriding the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

fn init_logging(config: &HuddleConfig) {
    let default_filter = format!("huddle_signal={}", config.logging.level.as_str());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> huddle_common::Result<()> {
    let args = Args::parse();

    let mut config = huddle_config::load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port.into();
    }

    init_logging(&config);

    let manager = SignalingManager::new(ManagerConfig::from(&config));

    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        path = %config.server.path_prefix,
        ice_servers = config.ice_servers.len(),
        "huddle-signal listening"
    );

    let reaper = spawn_reaper(manager.clone(), config.limits.reap_interval());

    let route = RouteSettings {
        path_prefix: config.server.path_prefix.clone(),
        display_name_max_len: config.limits.display_name_max_len as usize,
    };
    let endpoint = EndpointSettings {
        idle_ping: config.limits.idle_ping(),
        send_queue_capacity: config.limits.send_queue_capacity as usize,
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    serve(listener, manager.clone(), route, endpoint, shutdown).await;

    reaper.abort();
    let status = manager.status().await;
    tracing::info!(
        rooms = status.room_count,
        peers = status.peer_count,
        status = %status.to_json(),
        "huddle-signal stopped"
    );
    Ok(())
}
