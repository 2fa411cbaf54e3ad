use std::sync::Arc;

use chrono::Utc;
use sea_orm::Database;

use engine::{Ledger, LedgerError, TransactionKind};
use migration::MigratorTrait;

async fn ledger_with_db() -> Ledger {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Ledger::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn get_or_create_user_is_idempotent() {
    let ledger = ledger_with_db().await;

    let first = ledger.get_or_create_user("5511999990000@c.us").await.unwrap();
    assert_eq!(first.balance, 0);

    ledger
        .deposit(first.id, 100, Utc::now())
        .await
        .unwrap();

    let second = ledger.get_or_create_user("5511999990000@c.us").await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.balance, 100);
}

#[tokio::test]
async fn users_are_isolated() {
    let ledger = ledger_with_db().await;

    let alice = ledger.get_or_create_user("alice@c.us").await.unwrap();
    let bob = ledger.get_or_create_user("bob@c.us").await.unwrap();
    assert_ne!(alice.id, bob.id);

    ledger.deposit(alice.id, 300, Utc::now()).await.unwrap();
    ledger.deposit(bob.id, 5, Utc::now()).await.unwrap();

    assert_eq!(ledger.balance_of(alice.id).await.unwrap(), 300);
    assert_eq!(ledger.balance_of(bob.id).await.unwrap(), 5);
}

#[tokio::test]
async fn deposit_then_withdraw_balances_log() {
    let ledger = ledger_with_db().await;
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();

    assert_eq!(ledger.deposit(user.id, 100, Utc::now()).await.unwrap(), 100);
    assert_eq!(ledger.withdraw(user.id, 100, Utc::now()).await.unwrap(), 0);

    let (balance, transactions) = ledger.ledger_of(user.id).await.unwrap();
    assert_eq!(balance, 0);
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].kind, TransactionKind::Income);
    assert_eq!(transactions[0].value, 100);
    assert_eq!(transactions[1].kind, TransactionKind::Expense);
    assert_eq!(transactions[1].value, 100);
    assert!(transactions[0].id < transactions[1].id);
}

#[tokio::test]
async fn balance_always_matches_transaction_log() {
    let ledger = ledger_with_db().await;
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();

    for (kind, amount) in [
        (TransactionKind::Income, 70),
        (TransactionKind::Income, 30),
        (TransactionKind::Expense, 45),
        (TransactionKind::Income, 1),
        (TransactionKind::Expense, 56),
    ] {
        match kind {
            TransactionKind::Income => ledger.deposit(user.id, amount, Utc::now()).await.unwrap(),
            TransactionKind::Expense => ledger.withdraw(user.id, amount, Utc::now()).await.unwrap(),
        };

        let (balance, transactions) = ledger.ledger_of(user.id).await.unwrap();
        let implied: i64 = transactions
            .iter()
            .map(|tx| match tx.kind {
                TransactionKind::Income => tx.value,
                TransactionKind::Expense => -tx.value,
            })
            .sum();
        assert_eq!(balance, implied);
    }
}

#[tokio::test]
async fn overdraft_is_rejected_whole() {
    let ledger = ledger_with_db().await;
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();
    ledger.deposit(user.id, 50, Utc::now()).await.unwrap();

    let err = ledger.withdraw(user.id, 60, Utc::now()).await.unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds(_)));

    let (balance, transactions) = ledger.ledger_of(user.id).await.unwrap();
    assert_eq!(balance, 50);
    assert_eq!(transactions.len(), 1);
}

#[tokio::test]
async fn withdrawing_the_whole_balance_is_allowed() {
    let ledger = ledger_with_db().await;
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();
    ledger.deposit(user.id, 50, Utc::now()).await.unwrap();

    assert_eq!(ledger.withdraw(user.id, 50, Utc::now()).await.unwrap(), 0);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let ledger = ledger_with_db().await;
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();

    for amount in [0, -5] {
        let err = ledger.deposit(user.id, amount, Utc::now()).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        let err = ledger.withdraw(user.id, amount, Utc::now()).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    let (balance, transactions) = ledger.ledger_of(user.id).await.unwrap();
    assert_eq!(balance, 0);
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn unknown_user_is_reported() {
    let ledger = ledger_with_db().await;

    let err = ledger
        .deposit(uuid::Uuid::new_v4(), 10, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound(_)));

    let err = ledger.balance_of(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, LedgerError::UserNotFound(_)));
}

#[tokio::test]
async fn statement_keeps_commit_order() {
    let ledger = ledger_with_db().await;
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();

    // Same timestamp on purpose: ordering must come from commit order, not
    // from the transport's clock.
    let at = Utc::now();
    for amount in [1, 2, 3] {
        ledger.deposit(user.id, amount, at).await.unwrap();
    }

    let transactions = ledger.statement_of(user.id).await.unwrap();
    let values: Vec<i64> = transactions.iter().map(|tx| tx.value).collect();
    assert_eq!(values, vec![1, 2, 3]);
    assert!(transactions.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn concurrent_withdrawals_settle_sequentially() {
    let ledger = Arc::new(ledger_with_db().await);
    let user = ledger.get_or_create_user("alice@c.us").await.unwrap();
    ledger.deposit(user.id, 100, Utc::now()).await.unwrap();

    let a = tokio::spawn({
        let ledger = ledger.clone();
        async move { ledger.withdraw(user.id, 60, Utc::now()).await }
    });
    let b = tokio::spawn({
        let ledger = ledger.clone();
        async move { ledger.withdraw(user.id, 60, Utc::now()).await }
    });

    let results = [a.await.unwrap(), b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(LedgerError::InsufficientFunds(_))
    )));

    let (balance, transactions) = ledger.ledger_of(user.id).await.unwrap();
    assert_eq!(balance, 40);
    assert_eq!(transactions.len(), 2);
}

#[tokio::test]
async fn builder_rejects_unmigrated_database() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let built = Ledger::builder().database(db).build().await;
    assert!(built.is_err());
}

#[tokio::test]
async fn close_is_clean() {
    let ledger = ledger_with_db().await;
    ledger.close().await.unwrap();
}
