mod coordinator;
mod host;
mod listener;
mod logging;
mod sender;
mod settings;
mod state;
mod status_store;
mod watchdog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
