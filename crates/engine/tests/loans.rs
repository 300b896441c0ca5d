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

#[tokio::test]
async fn overpayment_is_clamped_and_flips_status() {
    let engine = test_engine().await;

    let reply = send(&engine, "add loan home amount 100").await;
    assert_eq!(reply.text, "Added loan home. Outstanding: 100.00 INR.");

    let reply = send(&engine, "pay loan home amount 150").await;
    assert_eq!(
        reply.text,
        "Paid 100.00 INR towards home. Loan fully repaid. Outstanding: 0.00 INR."
    );

    let reply = send(&engine, "pay loan home amount 10").await;
    assert_eq!(reply.kind, ReplyKind::Processed);
    assert_eq!(reply.text, "Loan home is already fully paid.");
}

#[tokio::test]
async fn principal_raise_reopens_a_paid_loan() {
    let engine = test_engine().await;

    send(&engine, "add loan home amount 100").await;
    send(&engine, "pay loan home amount 100").await;

    let reply = send(&engine, "set loan home amount 250").await;
    assert_eq!(
        reply.text,
        "Updated loan home. Outstanding: 150.00 INR. Loan reopened."
    );
}

#[tokio::test]
async fn principal_cut_clamps_outstanding() {
    let engine = test_engine().await;

    send(&engine, "add loan car amount 500").await;
    let reply = send(&engine, "set loan car amount 200").await;
    assert_eq!(reply.text, "Updated loan car. Outstanding: 200.00 INR.");
}

#[tokio::test]
async fn partial_payment_keeps_the_loan_active() {
    let engine = test_engine().await;

    send(&engine, "add loan home amount 500 description home renovation").await;
    let reply = send(&engine, "pay loan home amount 120 on 2024-01-15").await;
    assert_eq!(
        reply.text,
        "Paid 120.00 INR towards home. Partial payment recorded. Outstanding: 380.00 INR."
    );

    let reply = send(&engine, "list loans").await;
    assert_eq!(
        reply.text,
        "Loans:\n- home: outstanding 380.00 / 500.00 INR (active)\n  desc: home renovation"
    );
}

#[tokio::test]
async fn paying_an_unknown_loan_is_rejected() {
    let engine = test_engine().await;

    let reply = send(&engine, "pay loan boat amount 10").await;
    assert_eq!(reply.kind, ReplyKind::Rejected);
    assert_eq!(reply.text, "No loan named boat found.");
}
