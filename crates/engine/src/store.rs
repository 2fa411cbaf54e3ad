//! Storage contract for users and their transaction logs.
//!
//! Every function is generic over [`ConnectionTrait`], so the same
//! operation runs against the live connection and inside an open database
//! transaction. The ledger pairs `update_balance` with `append_transaction`
//! inside one transaction; nothing here commits on its own.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{ResultLedger, Transaction, TransactionKind, User, transactions, users};

pub async fn find_by_external_id<C>(db: &C, external_id: &str) -> ResultLedger<Option<User>>
where
    C: ConnectionTrait,
{
    let model = users::Entity::find()
        .filter(users::Column::ExternalId.eq(external_id))
        .one(db)
        .await?;
    model.map(User::try_from).transpose()
}

pub async fn find_by_id<C>(db: &C, user_id: Uuid) -> ResultLedger<Option<User>>
where
    C: ConnectionTrait,
{
    let model = users::Entity::find_by_id(user_id.to_string()).one(db).await?;
    model.map(User::try_from).transpose()
}

pub async fn create<C>(db: &C, user: &User) -> ResultLedger<()>
where
    C: ConnectionTrait,
{
    users::ActiveModel::from(user).insert(db).await?;
    Ok(())
}

pub async fn update_balance<C>(db: &C, user_id: Uuid, new_balance: i64) -> ResultLedger<()>
where
    C: ConnectionTrait,
{
    let model = users::ActiveModel {
        id: ActiveValue::Set(user_id.to_string()),
        balance: ActiveValue::Set(new_balance),
        ..Default::default()
    };
    model.update(db).await?;
    Ok(())
}

/// Appends one ledger entry and returns it with its storage-assigned id.
pub async fn append_transaction<C>(
    db: &C,
    user_id: Uuid,
    value: i64,
    kind: TransactionKind,
    occurred_at: DateTime<Utc>,
) -> ResultLedger<Transaction>
where
    C: ConnectionTrait,
{
    let model = transactions::ActiveModel {
        id: ActiveValue::NotSet,
        user_id: ActiveValue::Set(user_id.to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        value: ActiveValue::Set(value),
        occurred_at: ActiveValue::Set(occurred_at),
    };
    let inserted = model.insert(db).await?;
    Transaction::try_from(inserted)
}

/// Lists a user's entries in commit order (ascending id).
pub async fn list_transactions<C>(db: &C, user_id: Uuid) -> ResultLedger<Vec<Transaction>>
where
    C: ConnectionTrait,
{
    let models = transactions::Entity::find()
        .filter(transactions::Column::UserId.eq(user_id.to_string()))
        .order_by_asc(transactions::Column::Id)
        .all(db)
        .await?;
    models.into_iter().map(Transaction::try_from).collect()
}
