//! Ledger engine: per-user balances backed by an append-only transaction
//! log.
//!
//! The engine holds no ledger state of its own; every operation reads,
//! validates and writes through the database. The two invariants it
//! protects:
//!
//! - a user's balance always equals income minus expenses over their
//!   committed transaction log;
//! - a balance never goes negative: a withdrawal that exceeds it is
//!   rejected whole.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
pub use error::LedgerError;
use sea_orm::{DatabaseConnection, QuerySelect, TransactionTrait, prelude::*};
use tokio::sync::Mutex;
pub use transactions::{Transaction, TransactionKind};
pub use users::User;
use uuid::Uuid;

mod error;
pub mod store;
mod transactions;
mod users;

type ResultLedger<T> = Result<T, LedgerError>;

#[derive(Debug)]
pub struct Ledger {
    database: DatabaseConnection,
    user_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Ledger {
    /// Return a builder for `Ledger`. Help to build the struct.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    /// Clone of the user's mutation lock, created on first use.
    ///
    /// Mutations for one user are serialized through this lock: a deposit
    /// or withdrawal reads the balance and writes it back, and two of those
    /// interleaving would lose an update.
    async fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.entry(user_id).or_default().clone()
    }

    /// Return the user owning `external_id`, creating an empty ledger on
    /// first contact. Idempotent.
    pub async fn get_or_create_user(&self, external_id: &str) -> ResultLedger<User> {
        if let Some(user) = store::find_by_external_id(&self.database, external_id).await? {
            return Ok(user);
        }

        let user = User::new(external_id.to_string());
        match store::create(&self.database, &user).await {
            Ok(()) => Ok(user),
            // Lost a create race: the unique index on external_id refused
            // our row, so the winner's row is there to fetch.
            Err(err) => match store::find_by_external_id(&self.database, external_id).await? {
                Some(existing) => Ok(existing),
                None => Err(err),
            },
        }
    }

    /// Record an income and return the new balance.
    pub async fn deposit(
        &self,
        user_id: Uuid,
        amount: i64,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<i64> {
        self.apply_operation(user_id, amount, TransactionKind::Income, occurred_at)
            .await
    }

    /// Record an expense and return the new balance.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] when `amount` exceeds
    /// the current balance; in that case neither the balance nor the log is
    /// touched.
    pub async fn withdraw(
        &self,
        user_id: Uuid,
        amount: i64,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<i64> {
        self.apply_operation(user_id, amount, TransactionKind::Expense, occurred_at)
            .await
    }

    async fn apply_operation(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
    ) -> ResultLedger<i64> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        // Balance update and log append commit as one unit; dropping the
        // transaction on any error path rolls both back.
        let db_tx = self.database.begin().await?;
        let user = store::find_by_id(&db_tx, user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;

        let new_balance = match kind {
            TransactionKind::Income => user.balance + amount,
            TransactionKind::Expense => {
                if amount > user.balance {
                    return Err(LedgerError::InsufficientFunds(format!(
                        "balance is {}, tried to spend {amount}",
                        user.balance
                    )));
                }
                user.balance - amount
            }
        };

        store::update_balance(&db_tx, user_id, new_balance).await?;
        store::append_transaction(&db_tx, user_id, amount, kind, occurred_at).await?;
        db_tx.commit().await?;

        Ok(new_balance)
    }

    /// Current balance (read-only).
    pub async fn balance_of(&self, user_id: Uuid) -> ResultLedger<i64> {
        let user = store::find_by_id(&self.database, user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        Ok(user.balance)
    }

    /// Balance plus full transaction history in commit order, read in one
    /// database transaction so the pair is never torn by a concurrent
    /// mutation.
    pub async fn ledger_of(&self, user_id: Uuid) -> ResultLedger<(i64, Vec<Transaction>)> {
        let db_tx = self.database.begin().await?;
        let user = store::find_by_id(&db_tx, user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id.to_string()))?;
        let transactions = store::list_transactions(&db_tx, user_id).await?;
        db_tx.commit().await?;
        Ok((user.balance, transactions))
    }

    /// Transaction history in commit order (read-only).
    pub async fn statement_of(&self, user_id: Uuid) -> ResultLedger<Vec<Transaction>> {
        let (_, transactions) = self.ledger_of(user_id).await?;
        Ok(transactions)
    }

    /// Explicit teardown: close the underlying connection.
    pub async fn close(self) -> ResultLedger<()> {
        self.database.close().await?;
        Ok(())
    }
}

/// The builder for `Ledger`
#[derive(Default)]
pub struct LedgerBuilder {
    database: DatabaseConnection,
}

impl LedgerBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> LedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `Ledger`, verifying both tables are reachable so no event
    /// is ever dispatched against an uninitialized store.
    pub async fn build(self) -> ResultLedger<Ledger> {
        users::Entity::find().limit(1).all(&self.database).await?;
        transactions::Entity::find().limit(1).all(&self.database).await?;

        Ok(Ledger {
            database: self.database,
            user_locks: Mutex::new(HashMap::new()),
        })
    }
}
