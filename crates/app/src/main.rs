use std::future::Future;
use std::sync::Arc;

use bot::{Dispatcher, InboundMessage, ReplySink};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use settings::Database;
use tokio::io::{AsyncBufReadExt, BufReader};

mod settings;

/// Local line transport: stdin messages in, stdout replies out. The real
/// chat-network client is an external collaborator; this keeps the whole
/// pipeline drivable without it.
struct StdoutSink;

impl ReplySink for StdoutSink {
    fn reply(&self, text: String) -> impl Future<Output = ()> + Send {
        async move { println!("{text}") }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "caderneta={level},bot={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    // Storage must be up and migrated before the first event is dispatched.
    let db = parse_database(&settings.database).await?;
    let ledger = Arc::new(engine::Ledger::builder().database(db).build().await?);
    let dispatcher = Dispatcher::builder().ledger(ledger.clone()).build()?;

    tracing::info!("Ledger ready, reading messages from stdin...");

    let sink = StdoutSink;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(body) => {
                    dispatcher
                        .dispatch(
                            InboundMessage {
                                external_id: "local".to_string(),
                                body,
                                occurred_at: Utc::now(),
                            },
                            &sink,
                        )
                        .await;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Shutting down...");
    drop(dispatcher);
    if let Ok(ledger) = Arc::try_unwrap(ledger) {
        ledger.close().await?;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
