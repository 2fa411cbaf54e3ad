//! Per-event handling: classify the text, run the ledger call, build the
//! reply.

use engine::{Ledger, LedgerError};

use crate::{
    InboundMessage, ReplySink,
    parsing::{self, Operation, ParseError},
    ui,
};

pub(crate) async fn handle_message<S>(ledger: &Ledger, msg: &InboundMessage, sink: &S)
where
    S: ReplySink,
{
    if let Some(reply) = build_reply(ledger, msg).await {
        sink.reply(reply).await;
    }
}

/// Returns the reply for one inbound message, or `None` when the message
/// is ignored. Every parse and ledger failure is converted here; nothing
/// escapes to the caller's dispatch loop.
async fn build_reply(ledger: &Ledger, msg: &InboundMessage) -> Option<String> {
    let operation = match parsing::parse(&msg.body) {
        Ok(operation) => operation,
        Err(ParseError::InvalidAmount) => return Some(ui::invalid_amount_text().to_string()),
    };

    let reply = match operation {
        // Fixed replies: no storage access, no user row created.
        Operation::Help => ui::help_text().to_string(),
        Operation::Ping => ui::ping_text().to_string(),
        Operation::Unrecognized(_) => return None,

        operation => {
            let user = match ledger.get_or_create_user(&msg.external_id).await {
                Ok(user) => user,
                Err(err) => return Some(storage_failure_reply(&msg.external_id, &err)),
            };

            let outcome = match operation {
                Operation::Deposit(value) => ledger
                    .deposit(user.id, value, msg.occurred_at)
                    .await
                    .map(|new_balance| ui::render_deposit_saved(value, new_balance)),
                Operation::Withdraw(value) => ledger
                    .withdraw(user.id, value, msg.occurred_at)
                    .await
                    .map(|new_balance| ui::render_withdraw_saved(value, new_balance)),
                Operation::Balance => ledger.balance_of(user.id).await.map(ui::render_balance),
                Operation::Statement => ledger
                    .ledger_of(user.id)
                    .await
                    .map(|(balance, transactions)| ui::render_statement(balance, &transactions)),
                Operation::Help | Operation::Ping | Operation::Unrecognized(_) => return None,
            };

            match outcome {
                Ok(text) => text,
                Err(LedgerError::InsufficientFunds(_)) => {
                    ui::insufficient_funds_text().to_string()
                }
                Err(LedgerError::InvalidAmount(_)) => ui::invalid_amount_text().to_string(),
                Err(err) => storage_failure_reply(&msg.external_id, &err),
            }
        }
    };

    Some(reply)
}

fn storage_failure_reply(external_id: &str, err: &LedgerError) -> String {
    tracing::error!("ledger operation failed for {external_id}: {err}");
    ui::storage_failure_text().to_string()
}
