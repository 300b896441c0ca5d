use chrono::NaiveDate;
use engine::{Engine, MessageEnvelope, Money, Reply, ReplyKind};
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

fn money(text: &str) -> Money {
    text.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn account_upsert_replies_with_balance_snapshot() {
    let engine = test_engine().await;

    let reply = send(&engine, "add account sbi account balance 12000").await;
    assert_eq!(
        reply.text,
        "Added sbi account.\nBalance for sbi account: 12000.00 INR"
    );

    let reply = send(&engine, "update account sbi account balance 15000").await;
    assert_eq!(
        reply.text,
        "Updated sbi account.\nBalance for sbi account: 15000.00 INR"
    );

    let reply = send(&engine, "add account wallet cash balance 500").await;
    assert_eq!(
        reply.text,
        "Added wallet cash.\nBalance for wallet cash: 500.00 INR"
    );
}

#[tokio::test]
async fn balance_query_miss_is_an_ordinary_reply() {
    let engine = test_engine().await;

    let reply = send(&engine, "balance of icici account").await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert_eq!(reply.text, "No account account named icici found.");

    let reply = send(&engine, "balance of wallet cash").await;
    assert_eq!(reply.text, "No cash account named wallet found.");
}

#[tokio::test]
async fn malformed_amount_never_reaches_the_ledger() {
    let engine = test_engine().await;

    let reply = send(&engine, "add account sbi account balance -100").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Unsupported message format.");
}

#[tokio::test]
async fn credit_metrics_follow_the_statement_window() {
    let engine = test_engine().await;
    let user = engine.user_by_sender(SENDER).await.unwrap();

    engine
        .upsert_card(&user, "hdfc", money("50000"), Some(5), Some("1234"))
        .await
        .unwrap();
    send(&engine, "spent 1200 on groceries from hdfc card last4 1234 on 2024-08-10").await;
    send(&engine, "spent 300 on fuel from hdfc card last4 1234 on 2024-09-10").await;

    // 2024-08-20 falls in the [2024-08-05, 2024-09-04] statement window.
    let snapshot = engine
        .credit_snapshot(&user, "hdfc", None, date(2024, 8, 20))
        .await
        .unwrap();
    assert_eq!(snapshot.outstanding, money("1200"));
    assert_eq!(snapshot.available, money("48800"));

    // One cycle later only the September spend counts.
    let snapshot = engine
        .credit_snapshot(&user, "hdfc", None, date(2024, 9, 20))
        .await
        .unwrap();
    assert_eq!(snapshot.outstanding, money("300"));
    assert_eq!(snapshot.available, money("49700"));
}

#[tokio::test]
async fn issuer_with_two_cards_requires_last4() {
    let engine = test_engine().await;

    send(&engine, "add card hdfc limit 50000 last4 1111").await;
    send(&engine, "add card hdfc limit 30000 cycle 5 last4 2222").await;

    let reply = send(&engine, "outstanding for hdfc card").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "Multiple cards found for hdfc. Specify last4.");

    let reply = send(&engine, "outstanding for hdfc card last4 2222").await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert_eq!(reply.text, "Outstanding for hdfc: 0.00 INR");
}

#[tokio::test]
async fn unknown_card_query_is_rejected() {
    let engine = test_engine().await;

    let reply = send(&engine, "available credit for axis card").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "No card named axis found.");
}

#[tokio::test]
async fn monthly_summary_sums_only_the_window() {
    let engine = test_engine().await;

    send(&engine, "spent 100 on food from sbi account on 2024-09-10").await;
    send(&engine, "spent 50 on fuel from sbi account on 2024-09-20").await;
    send(&engine, "spent 25 on snacks from sbi account on 2024-10-01").await;

    let reply = send(&engine, "show expenses for september 2024").await;
    assert_eq!(reply.text, "Total expenses for september 2024: 150.00 INR");

    let reply = send(&engine, "summary expenses for october 2024").await;
    assert_eq!(reply.text, "Total expenses for october 2024: 25.00 INR");
}

#[tokio::test]
async fn category_list_aggregates_totals() {
    let engine = test_engine().await;

    send(&engine, "spent 100 on food from sbi account").await;
    send(&engine, "spent 60 on food from hdfc card").await;
    send(&engine, "spent 40 on fuel from sbi account").await;

    let reply = send(&engine, "list categories").await;
    assert_eq!(
        reply.text,
        "Categories:\n- food: 160.00 INR\n- fuel: 40.00 INR"
    );
}

#[tokio::test]
async fn card_list_shows_issuer_and_last4() {
    let engine = test_engine().await;

    send(&engine, "add card hdfc limit 50000 cycle 5 last4 1234").await;
    send(&engine, "add card axis limit 20000").await;

    let reply = send(&engine, "show cards").await;
    assert_eq!(reply.text, "Cards:\n- axis\n- hdfc 1234");
}

#[tokio::test]
async fn account_list_orders_by_kind_then_name() {
    let engine = test_engine().await;

    send(&engine, "add account sbi account balance 1000").await;
    send(&engine, "add account wallet cash balance 200").await;
    send(&engine, "add account icici account balance 500").await;

    let reply = send(&engine, "list accounts").await;
    assert_eq!(
        reply.text,
        "Accounts:\n\
         - icici (account): 500.00 INR\n\
         - sbi (account): 1000.00 INR\n\
         - wallet (cash): 200.00 INR"
    );
}
