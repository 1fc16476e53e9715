use std::sync::Arc;
use std::time::Duration;

use kds_app::source::{build_source, BoardSource};
use kds_board::application::board::{run_sync_loop, BoardService, SyncTrigger};
use kds_board::config::Config;
use kds_board::inbound::tui::BoardTui;
use kds_client::events::{ChannelStatus, EventChannel};
use kds_types::domain::event::KitchenEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for KDS_API_URL / KDS_API_TOKEN when present.
    let _ = dotenvy::dotenv();
    // Logs go to stderr; the board owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let source = build_source(&config)?;
    #[cfg(feature = "sim")]
    let sim = match &source {
        BoardSource::Sim(kitchen) => Some(kitchen.clone()),
        BoardSource::Http(_) => None,
    };

    let service = Arc::new(BoardService::new(source, config.page_limit));
    let (trigger_tx, trigger_rx) = mpsc::channel(16);

    let mut tasks: Vec<JoinHandle<()>> = Vec::new();
    tasks.push(tokio::spawn(run_sync_loop(
        Arc::clone(&service),
        trigger_rx,
        Duration::from_millis(config.debounce_ms),
    )));

    if config.demo {
        #[cfg(feature = "sim")]
        if let Some(kitchen) = sim {
            service.set_online(true).await;
            tasks.push(kitchen.spawn_service(Duration::from_secs(5)));
            tasks.push(spawn_sim_bridge(kitchen, trigger_tx.clone()));
        }
    } else {
        let channel = EventChannel::new(config.events_url.clone());
        let (event_rx, status_rx, listener) = channel.start();
        tasks.push(listener);
        tasks.push(spawn_push_bridge(
            event_rx,
            status_rx,
            Arc::clone(&service),
            trigger_tx.clone(),
        ));
    }

    // First paint before the screen takes over.
    let _ = service.resync(SyncTrigger::Startup).await;

    let tui = BoardTui::new(Arc::clone(&service), trigger_tx.clone(), config.sound);
    drop(trigger_tx);
    let result = tui.run().await;

    // Teardown: detach the listener, bridges and sync loop.
    for task in &tasks {
        task.abort();
    }
    result
}

/// Forward push events into resync triggers and mirror the channel state
/// onto the board's online flag. Reconnecting also triggers a catch-up
/// fetch, since anything could have changed while the channel was down.
fn spawn_push_bridge(
    mut events: mpsc::Receiver<KitchenEvent>,
    mut statuses: mpsc::Receiver<ChannelStatus>,
    service: Arc<BoardService<BoardSource>>,
    triggers: mpsc::Sender<SyncTrigger>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        tracing::debug!(?event, "push event");
                        if triggers.send(SyncTrigger::Push).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                status = statuses.recv() => match status {
                    Some(ChannelStatus::Online) => {
                        service.set_online(true).await;
                        if triggers.send(SyncTrigger::Push).await.is_err() {
                            break;
                        }
                    }
                    Some(ChannelStatus::Offline) => service.set_online(false).await,
                    None => break,
                },
            }
        }
    })
}

/// Demo-mode stand-in for the push bridge: the simulated kitchen broadcasts
/// the same events in process.
#[cfg(feature = "sim")]
fn spawn_sim_bridge(
    kitchen: kds_sim::SimKitchen,
    triggers: mpsc::Sender<SyncTrigger>,
) -> JoinHandle<()> {
    use tokio::sync::broadcast::error::RecvError;

    let mut events = kitchen.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(_) => {
                    if triggers.send(SyncTrigger::Push).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}
