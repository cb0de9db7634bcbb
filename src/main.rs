use crate::config::Config;
use crate::session::SessionManager;
use crate::ws::accept_connection;
use anyhow::Context;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;
use tokio::net::TcpListener;

mod api;
mod archive;
mod client;
mod config;
mod error;
mod game;
mod session;
mod store;
mod ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::try_init().ok();

    let config = Config::from_env().map_err(|err| {
        log::error!("{}", err);
        err
    })?;

    let db = sled::open(&config.database_path)
        .with_context(|| format!("could not open database at {:?}", config.database_path))?;
    let manager = SessionManager::new(&db).context("could not load sessions")?;
    let manager: &'static SessionManager = Box::leak(Box::new(manager));
    log::info!("Loaded {} sessions", manager.num_games());

    if let Some(port) = config.api_port {
        tokio::spawn(api::serve(manager, port));
    }

    let ttl = config.session_ttl;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            manager.purge_games(ttl);
        }
    });

    let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to address: {:?}", addr))?;
    log::info!("Listening on: {:?}", addr);

    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(accept_connection(stream, manager));
    }

    Ok(())
}
