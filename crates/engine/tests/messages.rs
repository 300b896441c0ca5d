use engine::{Engine, MessageEnvelope, Reply, ReplyKind};
use migration::MigratorTrait;
use sea_orm::Database;

const SENDER: &str = "+919876543210";

async fn test_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn send(engine: &Engine, text: &str, message_id: Option<&str>) -> Reply {
    engine
        .process_message(&MessageEnvelope {
            sender_id: SENDER.to_string(),
            text: text.to_string(),
            message_id: message_id.map(str::to_string),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn same_message_id_is_processed_exactly_once() {
    let engine = test_engine().await;

    let reply = send(&engine, "spent 100 on groceries from sbi account", Some("SM1")).await;
    assert_eq!(reply.kind, ReplyKind::Processed);

    let reply = send(&engine, "spent 100 on groceries from sbi account", Some("SM1")).await;
    assert_eq!(reply.kind, ReplyKind::Duplicate);
    assert_eq!(reply.text, "Duplicate message ignored.");

    let reply = send(&engine, "balance of sbi account", None).await;
    assert_eq!(reply.text, "Balance for sbi account: -100.00 INR");
}

#[tokio::test]
async fn fallback_key_deduplicates_identical_deliveries() {
    let engine = test_engine().await;

    let reply = send(&engine, "add loan home amount 100", None).await;
    assert_eq!(reply.kind, ReplyKind::Processed);

    let reply = send(&engine, "add loan home amount 100", None).await;
    assert_eq!(reply.kind, ReplyKind::Duplicate);
}

#[tokio::test]
async fn unsupported_text_is_rejected() {
    let engine = test_engine().await;

    let reply = send(&engine, "good morning", None).await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Unsupported message format.");
}

#[tokio::test]
async fn normalizer_maps_synonyms_and_currency_symbols() {
    let engine = test_engine().await;

    let reply = send(&engine, "  Paid 100 ON Groceries   from SBI account ", None).await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert!(reply.text.starts_with("Added expense 100.00 INR for groceries on "));
}

#[tokio::test]
async fn help_returns_general_and_topical_sections() {
    let engine = test_engine().await;

    let reply = send(&engine, "help", None).await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert!(reply.text.starts_with("Supported commands"));

    let reply = send(&engine, "help loans", None).await;
    assert!(reply.text.starts_with("Loans help:"));

    let reply = send(&engine, "help expenses", None).await;
    assert!(reply.text.starts_with("Transactions help:"));
}

#[tokio::test]
async fn currency_setting_changes_future_defaults() {
    let engine = test_engine().await;

    let reply = send(&engine, "set currency usd", None).await;
    assert_eq!(reply.text, "Default currency set to USD.");

    let reply = send(&engine, "update currency usd", None).await;
    assert_eq!(reply.text, "Default currency is already USD.");

    let reply = send(&engine, "spent 100 on groceries from sbi account", None).await;
    assert!(reply.text.starts_with("Added expense 100.00 USD for groceries on "));
    assert!(reply.text.ends_with("Balance for sbi account: -100.00 USD"));
}
