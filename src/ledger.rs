//! # Asset Ledger
//!
//! The trustee's seam to the fungible-token ledger. The engine never owns
//! token balances itself — it holds a custody account on an external ledger
//! and asks that ledger to move funds: inbound provisioning via
//! [`AssetLedger::deposit`], outbound payouts via [`AssetLedger::withdraw`].
//!
//! [`TokenLedger`] is the in-memory reference implementation, used by tests
//! and single-process deployments. Production deployments plug in whatever
//! ledger actually holds the asset.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The debited account does not hold enough to cover the transfer.
    #[error("insufficient funds: account {account} holds {balance}, requested {requested}")]
    InsufficientFunds {
        /// The account being debited.
        account: String,
        /// Its current balance.
        balance: u64,
        /// The amount the caller tried to move.
        requested: u64,
    },

    /// An arithmetic overflow would occur crediting the recipient.
    #[error("amount overflow: operation would exceed allowed limits")]
    AmountOverflow,
}

// ---------------------------------------------------------------------------
// The ledger seam
// ---------------------------------------------------------------------------

/// The fungible-asset ledger as seen from the trustee's custody account.
///
/// `deposit` and `withdraw` are scoped to custody: deposits move funds from
/// an outside account *into* custody, withdrawals move funds *out of*
/// custody to a recipient. The trustee only ever issues withdrawals; custody
/// is endowed by a separate provisioning step before grants are created.
pub trait AssetLedger {
    /// Returns the balance of an arbitrary account.
    fn balance_of(&self, who: &str) -> u64;

    /// Returns the balance of the trustee's custody account.
    fn custody_balance(&self) -> u64;

    /// Moves `amount` from `from` into the custody account.
    fn deposit(&mut self, from: &str, amount: u64) -> Result<(), LedgerError>;

    /// Moves `amount` out of the custody account to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] if custody cannot cover
    /// the transfer. The trustee's reserve accounting makes this unreachable
    /// for its own withdrawals; see [`crate::trustee::VestingError::Ledger`].
    fn withdraw(&mut self, to: &str, amount: u64) -> Result<(), LedgerError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// A minimal in-memory token ledger.
///
/// Balances are kept per address. One address is designated the custody
/// account at construction; [`AssetLedger`] operations are scoped to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    /// The trustee's custody account address.
    custody: String,
    /// Per-address balances in the smallest denomination.
    balances: HashMap<String, u64>,
}

impl TokenLedger {
    /// Creates an empty ledger with `custody` as the trustee's account.
    pub fn new(custody: impl Into<String>) -> Self {
        Self {
            custody: custody.into(),
            balances: HashMap::new(),
        }
    }

    /// Returns the custody account address.
    pub fn custody_account(&self) -> &str {
        &self.custody
    }

    /// Credits `amount` newly issued tokens to `to`.
    ///
    /// Provisioning entry point for tests and genesis setup — there is no
    /// supply cap here, issuance policy lives with the token, not the
    /// trustee.
    pub fn mint(&mut self, to: &str, amount: u64) -> Result<(), LedgerError> {
        let balance = self.balances.entry(to.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;
        Ok(())
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// All-or-nothing: a rejected transfer leaves both balances untouched.
    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), LedgerError> {
        let debit = self.balances.get(from).copied().unwrap_or(0);
        if debit < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.to_string(),
                balance: debit,
                requested: amount,
            });
        }

        // A self-transfer nets out; the balance check above still applies.
        if from == to {
            return Ok(());
        }

        // Validate the credit side before writing either balance.
        let credited = self
            .balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(LedgerError::AmountOverflow)?;

        self.balances.insert(from.to_string(), debit - amount);
        self.balances.insert(to.to_string(), credited);
        Ok(())
    }
}

impl AssetLedger for TokenLedger {
    fn balance_of(&self, who: &str) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    fn custody_balance(&self) -> u64 {
        self.balance_of(&self.custody)
    }

    fn deposit(&mut self, from: &str, amount: u64) -> Result<(), LedgerError> {
        let custody = self.custody.clone();
        self.transfer(from, &custody, amount)
    }

    fn withdraw(&mut self, to: &str, amount: u64) -> Result<(), LedgerError> {
        let custody = self.custody.clone();
        self.transfer(&custody, to, amount)
    }
}
