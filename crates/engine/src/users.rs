//! Users table and the `User` identity record.
//!
//! A user is created lazily on the first message seen from an unknown chat
//! identity and is never deleted. `external_id` is the identity the chat
//! network hands us; `id` is ours and stays stable.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::LedgerError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub balance: i64,
}

impl User {
    /// A fresh user with an empty ledger.
    pub fn new(external_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id,
            balance: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub external_id: String,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id.to_string()),
            external_id: ActiveValue::Set(user.external_id.clone()),
            balance: ActiveValue::Set(user.balance),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::UserNotFound(model.external_id.clone()))?,
            external_id: model.external_id,
            balance: model.balance,
        })
    }
}
