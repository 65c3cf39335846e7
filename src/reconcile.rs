//! Reconciliation of extracted transactions into movements
//!
//! Each transaction becomes exactly one [`Movement`]. Lookups never drop a
//! row: an unknown holder gets [`ClientCode::Unmatched`] and an unknown fund
//! gets the directory's default ID, so the reviewer sees every row of every
//! batch in the output, in input order.

use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

use crate::cotistas::{ClientCode, CotistaRegistry};
use crate::extractor::RawTransaction;
use crate::funds::FundDirectory;

/// Movement direction as written to the PRN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Aplicação (deposit)
    Apply,
    /// Resgate (withdrawal)
    Redeem,
}

impl Direction {
    pub fn as_char(&self) -> char {
        match self {
            Direction::Apply => 'A',
            Direction::Redeem => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Split the APLICAR/RESGATAR pair into a direction and one amount.
///
/// An apply amount decides the direction; when both cells are filled it
/// still wins. With neither, the movement is a zero-valued redeem.
pub fn split_amount(apply: Option<Decimal>, redeem: Option<Decimal>) -> (Direction, Decimal) {
    match (apply, redeem) {
        (Some(amount), _) => (Direction::Apply, amount),
        (None, Some(amount)) => (Direction::Redeem, amount),
        (None, None) => (Direction::Redeem, Decimal::ZERO),
    }
}

/// A reconciled, encodable movement
#[derive(Debug, Clone, PartialEq)]
pub struct Movement {
    pub fund_id: i32,
    pub client_code: ClientCode,
    pub direction: Direction,
    pub date: String,
    pub amount: Decimal,
    /// Holder matching key, kept for review of unmatched rows
    pub holder_key: String,
    /// Fund matching key, kept for review of defaulted funds
    pub fund_key: String,
}

impl Movement {
    pub fn is_unmatched(&self) -> bool {
        !self.client_code.is_matched()
    }
}

/// Read-only lookup context shared by every batch of a run
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
    cotistas: &'a CotistaRegistry,
    funds: &'a FundDirectory,
}

impl<'a> Reconciler<'a> {
    pub fn new(cotistas: &'a CotistaRegistry, funds: &'a FundDirectory) -> Self {
        Self { cotistas, funds }
    }

    pub fn reconcile_one(&self, tx: RawTransaction) -> Movement {
        let client_code = self.cotistas.client_code_or_unmatched(&tx.holder_key);
        if !client_code.is_matched() {
            debug!("No cotista for holder '{}'", tx.holder_label);
        }

        let fund_id = self.funds.fund_id_or_default(&tx.fund_key);
        let (direction, amount) = split_amount(tx.apply_amount, tx.redeem_amount);

        Movement {
            fund_id,
            client_code,
            direction,
            date: tx.date,
            amount,
            holder_key: tx.holder_key,
            fund_key: tx.fund_key,
        }
    }

    /// Map transactions to movements, preserving order
    pub fn reconcile<I>(&self, transactions: I) -> impl Iterator<Item = Movement> + 'a
    where
        I: IntoIterator<Item = RawTransaction> + 'a,
        I::IntoIter: 'a,
    {
        let this = *self;
        transactions
            .into_iter()
            .map(move |tx| this.reconcile_one(tx))
    }
}

/// Reconcile a sequence of transactions against the registry and directory
pub fn reconcile<I>(
    transactions: I,
    cotistas: &CotistaRegistry,
    funds: &FundDirectory,
) -> Vec<Movement>
where
    I: IntoIterator<Item = RawTransaction>,
{
    let reconciler = Reconciler::new(cotistas, funds);
    transactions
        .into_iter()
        .map(|tx| reconciler.reconcile_one(tx))
        .collect()
}
