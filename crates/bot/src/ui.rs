//! Reply rendering.
//!
//! Pure functions from ledger values to the bot's Brazilian-Portuguese
//! chat surface. No storage access happens here.

use chrono::{DateTime, Utc};
use engine::{Transaction, TransactionKind};

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Receita",
        TransactionKind::Expense => "Despesa",
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

/// Renders the full statement: header, current balance, then one numbered
/// line per transaction in commit order.
pub fn render_statement(balance: i64, transactions: &[Transaction]) -> String {
    let mut message = String::from("Extrato Atual:\n\n");
    message.push_str(&format!("Saldo atual: R${balance}\n\n"));
    message.push_str("Histórico de transações:\n");
    for (index, tx) in transactions.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} R${} - {}\n",
            index + 1,
            kind_label(tx.kind),
            tx.value,
            format_timestamp(tx.occurred_at),
        ));
    }
    message
}

pub(crate) fn render_balance(balance: i64) -> String {
    format!("Seu saldo atual é de R${balance}")
}

pub(crate) fn render_deposit_saved(value: i64, new_balance: i64) -> String {
    format!("Receita de R${value} adicionada com sucesso!\nNovo saldo: R${new_balance}")
}

pub(crate) fn render_withdraw_saved(value: i64, new_balance: i64) -> String {
    format!("Despesa de R${value} registrada com sucesso!\nNovo saldo: R${new_balance}")
}

pub(crate) fn insufficient_funds_text() -> &'static str {
    "Valor da despesa maior que o saldo disponível!"
}

pub(crate) fn invalid_amount_text() -> &'static str {
    "Valor inválido! Use: ganhei <valor> ou gastei <valor>."
}

pub(crate) fn help_text() -> &'static str {
    "Comandos disponíveis:\n\n\
     ganhei <valor> - Adicionar receita\n\
     gastei <valor> - Registrar despesa\n\
     !total - Ver saldo atual\n\
     !extrato - Ver histórico completo\n\
     !ajuda - Ver esta lista de comandos\n\
     !teste - Testar o bot"
}

pub(crate) fn ping_text() -> &'static str {
    "testado"
}

pub(crate) fn storage_failure_text() -> &'static str {
    "Erro ao processar a mensagem. Tente novamente mais tarde!"
}
