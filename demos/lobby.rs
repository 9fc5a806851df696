use challenge_wave_realtime::{
    ChannelConfig, ChannelConnector, ChannelOptions, ConnectionStatus, GameApi, GameEventRouter,
    GameStore,
};
use std::time::Duration;

/// Watch the lobby channel of a running Challenge Wave backend
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "challenge_wave_realtime=debug".into()),
        )
        .init();

    let origin =
        std::env::var("CHALLENGE_WAVE_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());
    let base_host = std::env::var("CHALLENGE_WAVE_WS_HOST").ok();

    let config = ChannelConfig::new(
        &origin,
        "/lobby",
        ChannelOptions {
            base_host,
            keepalive_interval_ms: Some(25_000),
            ..Default::default()
        },
    )?;
    println!("Connecting to: {}\n", config.url());

    let api = GameApi::from_channel(&config)?;
    match api.list_rooms().await {
        Ok(rooms) => println!("{} open rooms", rooms.len()),
        Err(e) => println!("Could not list rooms: {}", e),
    }

    let store = GameStore::new();
    let router = GameEventRouter::new(store.clone())
        .with_listener(|event| println!("event: {:?}", event));
    let channel = ChannelConnector::connect(config, router);

    let mut status = channel.watch_status();
    tokio::time::timeout(
        Duration::from_secs(10),
        status.wait_for(|s| *s == ConnectionStatus::Open),
    )
    .await??;
    println!("Channel open\n");

    // Interrupt the network or restart the backend to watch reconnects
    for i in 1..=30 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let stale = store.read(|state| state.rooms_stale);
        println!(
            "Second {}/30 - status: {:?}, rooms stale: {}",
            i,
            channel.status(),
            stale
        );
        if stale {
            if let Ok(rooms) = api.list_rooms().await {
                println!("{} open rooms", rooms.len());
            }
            store.update(|state| state.rooms_stale = false);
        }
    }

    channel.close();
    status
        .wait_for(|s| *s == ConnectionStatus::Closed)
        .await?;
    println!("Closed cleanly");

    Ok(())
}
