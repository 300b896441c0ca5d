use engine::{Engine, MessageEnvelope, Reply, ReplyKind};
use migration::MigratorTrait;
use sea_orm::Database;

const SENDER: &str = "+919876543210";

async fn test_engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

async fn send(engine: &Engine, text: &str) -> Reply {
    engine
        .process_message(&MessageEnvelope {
            sender_id: SENDER.to_string(),
            text: text.to_string(),
            message_id: None,
        })
        .await
        .unwrap()
}

async fn send_with_id(engine: &Engine, text: &str, message_id: &str) -> Reply {
    engine
        .process_message(&MessageEnvelope {
            sender_id: SENDER.to_string(),
            text: text.to_string(),
            message_id: Some(message_id.to_string()),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn create_and_delete_round_trip_restores_balance() {
    let engine = test_engine().await;

    let reply = send(&engine, "spent 100 on groceries from sbi account").await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert!(reply.text.starts_with("Added expense 100.00 INR for groceries on "));
    assert!(reply.text.ends_with("Balance for sbi account: -100.00 INR"));

    let reply = send(&engine, "balance of sbi account").await;
    assert_eq!(reply.text, "Balance for sbi account: -100.00 INR");

    let reply = send(&engine, "delete expense 1").await;
    assert_eq!(
        reply.text,
        "Deleted expense 1.\nBalance for sbi account: 0.00 INR"
    );
}

#[tokio::test]
async fn category_only_update_leaves_balance_untouched() {
    let engine = test_engine().await;

    send(&engine, "spent 250 on rent from sbi account").await;
    let reply = send(&engine, "update expense 1 amount 250 category housing").await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert_eq!(
        reply.text,
        "Updated expense 1.\nBalance for sbi account: -250.00 INR"
    );
}

#[tokio::test]
async fn amount_change_reconciles_same_account() {
    let engine = test_engine().await;

    send(&engine, "spent 100 on fuel from sbi account").await;
    let reply = send(&engine, "update expense 1 amount 40").await;
    assert_eq!(
        reply.text,
        "Updated expense 1.\nBalance for sbi account: -40.00 INR"
    );
}

#[tokio::test]
async fn moving_an_expense_credits_the_prior_account() {
    let engine = test_engine().await;

    send(&engine, "spent 100 on fuel from sbi account").await;
    let reply = send(&engine, "update expense 1 amount 100 source icici account").await;
    assert_eq!(
        reply.text,
        "Updated expense 1.\nBalance for icici account: -100.00 INR"
    );

    let reply = send(&engine, "balance of sbi account").await;
    assert_eq!(reply.text, "Balance for sbi account: 0.00 INR");
}

#[tokio::test]
async fn card_spend_does_not_touch_account_balances() {
    let engine = test_engine().await;

    let reply = send(&engine, "spent 1200 on groceries from hdfc card").await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert!(!reply.text.contains("Balance for"));

    let reply = send(&engine, "list accounts").await;
    assert_eq!(reply.text, "No accounts found.");
}

#[tokio::test]
async fn repeated_spend_trips_the_duplicate_guard() {
    let engine = test_engine().await;

    let reply = send_with_id(&engine, "spent 100 on groceries from hdfc card", "SM1").await;
    assert_eq!(reply.kind, ReplyKind::Processed);

    let reply = send_with_id(&engine, "spent 100 on groceries from hdfc card", "SM2").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Potential duplicate detected. Please confirm.");
}

#[tokio::test]
async fn missing_expense_is_rejected_without_mutation() {
    let engine = test_engine().await;

    let reply = send(&engine, "delete expense 99").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Expense not found.");

    let reply = send(&engine, "update expense 99 amount 10").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Expense not found.");
}

#[tokio::test]
async fn transaction_list_shows_most_recent_first() {
    let engine = test_engine().await;

    send(&engine, "spent 100 on food from sbi account on 2024-09-10").await;
    send(&engine, "spent 50 on fuel from hdfc card on 2024-09-20").await;

    let reply = send(&engine, "list transactions").await;
    assert_eq!(
        reply.text,
        "Recent transactions:\n\
         - 50.00 INR on fuel from hdfc card on 2024-09-20\n\
         - 100.00 INR on food from sbi account on 2024-09-10"
    );
}

#[tokio::test]
async fn zero_amount_is_rejected_by_validation() {
    let engine = test_engine().await;

    let reply = send(&engine, "spent 0 on food from sbi account").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Amount must be greater than zero.");

    let reply = send(&engine, "list transactions").await;
    assert_eq!(reply.text, "No transactions found.");
}
