use engine::{EngineError, MessageEnvelope};
use migration::{Migrator, MigratorTrait};
use tokio::io::{AsyncBufReadExt, BufReader};

mod settings;

/// Shown whenever the ledger could not tell whether a mutation happened.
const GENERIC_FAILURE: &str = "Sorry, something went wrong. Please try again.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (settings, one_shot) = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "khata={level},engine={level}",
            level = settings.level
        ))
        .init();

    let database = sea_orm::Database::connect(&settings.database).await?;
    Migrator::up(&database, None).await?;

    let engine = engine::Engine::builder().database(database).build().await?;

    if let Some(text) = one_shot {
        let reply = respond(&engine, &settings.sender, &text).await;
        println!("{reply}");
        return Ok(());
    }

    tracing::info!("reading messages from stdin, one per line");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let reply = respond(&engine, &settings.sender, text).await;
        println!("{reply}");
    }

    Ok(())
}

async fn respond(engine: &engine::Engine, sender: &str, text: &str) -> String {
    let envelope = MessageEnvelope {
        sender_id: sender.to_string(),
        text: text.to_string(),
        message_id: None,
    };
    match engine.process_message(&envelope).await {
        Ok(reply) => reply.text,
        Err(EngineError::Database(err)) => {
            tracing::error!(error = %err, "message processing failed");
            GENERIC_FAILURE.to_string()
        }
        Err(err) => err.to_string(),
    }
}
