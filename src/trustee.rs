//! # Vesting Trustee Contract
//!
//! The grant lifecycle controller. Owns the grant store (one record per
//! beneficiary address) and the reserve accounting that bounds grant
//! creation by the custody balance.
//!
//! ## Reserve Model
//!
//! `total_vesting` is the sum of `value - transferred` over all live grants
//! — the trustee's total outstanding obligation. Every grant mutation
//! adjusts it in the same atomic step, so creation can reject
//! over-commitment (`total_vesting + value > custody`) without scanning
//! grants, and custody can always cover every promise.
//!
//! ## Authorization Model
//!
//! Every lifecycle operation takes the authenticated caller explicitly.
//! Only the issuer creates and revokes; only the beneficiary claims (the
//! caller address *is* the grant key). There are no other roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use crate::grant::Grant;
use crate::ledger::{AssetLedger, LedgerError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during trustee operations.
#[derive(Debug, Error)]
pub enum VestingError {
    /// The caller is not the issuer.
    #[error("unauthorized: {caller} is not the issuer")]
    Unauthorized {
        /// The address that attempted the operation.
        caller: String,
    },

    /// The beneficiary address is empty.
    #[error("invalid beneficiary: address must be non-empty")]
    InvalidBeneficiary,

    /// A grant must allot a positive quantity.
    #[error("invalid grant value: must be greater than zero")]
    ZeroValue,

    /// The schedule violates `start <= cliff <= end` or has `end <= start`.
    #[error("malformed schedule: require start <= cliff <= end with end > start (start {start}, cliff {cliff}, end {end})")]
    InvalidSchedule {
        /// Proposed accrual start.
        start: DateTime<Utc>,
        /// Proposed cliff.
        cliff: DateTime<Utc>,
        /// Proposed accrual end.
        end: DateTime<Utc>,
    },

    /// The beneficiary already holds a live grant.
    #[error("duplicate grant: {beneficiary} already holds a live grant")]
    GrantExists {
        /// The beneficiary that was targeted.
        beneficiary: String,
    },

    /// Custody cannot cover every outstanding promise plus the new grant.
    #[error("insufficient custody: committing {required} but custody holds {available}")]
    InsufficientCustody {
        /// `total_vesting` plus the proposed grant value.
        required: u64,
        /// Current custody balance.
        available: u64,
    },

    /// No live grant exists for this beneficiary.
    #[error("no grant found for {beneficiary}")]
    GrantNotFound {
        /// The beneficiary that was targeted.
        beneficiary: String,
    },

    /// Nothing has vested beyond what was already paid out.
    #[error("nothing claimable for {beneficiary} at this time")]
    NothingClaimable {
        /// The claiming beneficiary.
        beneficiary: String,
    },

    /// The targeted grant was created non-revokable.
    #[error("grant for {beneficiary} is not revokable")]
    NotRevokable {
        /// The beneficiary whose grant was targeted.
        beneficiary: String,
    },

    /// An arithmetic overflow would occur updating grant or reserve state.
    #[error("amount overflow: operation would exceed allowed limits")]
    AmountOverflow,

    /// The ledger refused a withdrawal the reserve accounting said must
    /// succeed. This is an internal-invariant breach, not a caller error —
    /// it cannot occur unless trustee state and custody have diverged.
    #[error("ledger rejected transfer: {0}")]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// The trustee
// ---------------------------------------------------------------------------

/// The vesting trustee — grant store, reserve accountant, and lifecycle
/// controller in one.
///
/// Holds no token balances itself; payouts go through the [`AssetLedger`]
/// handle passed into each lifecycle call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VestingTrustee {
    /// Address of the privileged issuer (grant creator and revocation
    /// refund recipient).
    issuer: String,
    /// Live grants keyed by beneficiary address. At most one per address;
    /// revocation removes the entry, freeing the slot for a new grant.
    grants: HashMap<String, Grant>,
    /// Sum of `value - transferred` across all live grants.
    total_vesting: u64,
}

impl VestingTrustee {
    /// Creates a trustee with no grants and a zero reserve.
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            grants: HashMap::new(),
            total_vesting: 0,
        }
    }

    /// Records a new grant for `beneficiary`.
    ///
    /// No tokens move at creation — custody must already hold enough to
    /// cover every outstanding promise plus this one, endowed by a prior
    /// provisioning deposit.
    ///
    /// # Errors
    ///
    /// Each precondition fails independently, with no state change:
    ///
    /// - [`VestingError::Unauthorized`] if `caller` is not the issuer.
    /// - [`VestingError::InvalidBeneficiary`] for an empty address.
    /// - [`VestingError::ZeroValue`] for a zero allotment.
    /// - [`VestingError::InvalidSchedule`] unless `start <= cliff <= end`
    ///   and `end > start`.
    /// - [`VestingError::GrantExists`] if the beneficiary already holds a
    ///   live grant.
    /// - [`VestingError::InsufficientCustody`] if
    ///   `total_vesting + value > custody balance`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_grant(
        &mut self,
        ledger: &impl AssetLedger,
        caller: &str,
        beneficiary: &str,
        value: u64,
        start: DateTime<Utc>,
        cliff: DateTime<Utc>,
        end: DateTime<Utc>,
        revokable: bool,
    ) -> Result<(), VestingError> {
        if caller != self.issuer {
            return Err(VestingError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        if beneficiary.is_empty() {
            return Err(VestingError::InvalidBeneficiary);
        }
        if value == 0 {
            return Err(VestingError::ZeroValue);
        }
        if start > cliff || cliff > end || start == end {
            return Err(VestingError::InvalidSchedule { start, cliff, end });
        }
        if self.grants.contains_key(beneficiary) {
            return Err(VestingError::GrantExists {
                beneficiary: beneficiary.to_string(),
            });
        }

        let committed = self
            .total_vesting
            .checked_add(value)
            .ok_or(VestingError::AmountOverflow)?;
        let available = ledger.custody_balance();
        if committed > available {
            return Err(VestingError::InsufficientCustody {
                required: committed,
                available,
            });
        }

        self.grants.insert(
            beneficiary.to_string(),
            Grant {
                value,
                start,
                cliff,
                end,
                transferred: 0,
                revokable,
            },
        );
        self.total_vesting = committed;

        info!(beneficiary, value, revokable, "grant created");
        Ok(())
    }

    /// Pays out everything vested-but-unpaid to the calling beneficiary.
    ///
    /// Returns the amount paid. A claim that would pay zero — before the
    /// cliff, or repeated at the same instant — is rejected rather than
    /// silently succeeding.
    ///
    /// # Errors
    ///
    /// Returns [`VestingError::GrantNotFound`] if the caller holds no live
    /// grant, and [`VestingError::NothingClaimable`] if nothing has vested
    /// beyond what was already paid.
    pub fn claim(
        &mut self,
        ledger: &mut impl AssetLedger,
        caller: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, VestingError> {
        let grant = self
            .grants
            .get_mut(caller)
            .ok_or_else(|| VestingError::GrantNotFound {
                beneficiary: caller.to_string(),
            })?;

        let amount = grant.claimable(now);
        if amount == 0 {
            return Err(VestingError::NothingClaimable {
                beneficiary: caller.to_string(),
            });
        }

        // Effects before the outbound transfer: a reentrant ledger must
        // only ever observe the settled grant and reserve state.
        grant.transferred = grant
            .transferred
            .checked_add(amount)
            .ok_or(VestingError::AmountOverflow)?;
        self.total_vesting = self
            .total_vesting
            .checked_sub(amount)
            .ok_or(VestingError::AmountOverflow)?;

        ledger.withdraw(caller, amount)?;

        info!(beneficiary = caller, amount, "tokens claimed");
        Ok(amount)
    }

    /// Terminates a revokable grant, sweeping its unpaid remainder back to
    /// the issuer. Returns the refunded amount.
    ///
    /// The refund is `value - transferred` in full: anything vested since
    /// the beneficiary's last claim but never withdrawn goes to the issuer,
    /// not the beneficiary. Beneficiaries of revokable grants protect
    /// themselves by claiming promptly.
    ///
    /// Removes the grant record, so the same address may receive a brand
    /// new grant afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`VestingError::Unauthorized`] if `caller` is not the
    /// issuer, [`VestingError::GrantNotFound`] if no live grant exists, and
    /// [`VestingError::NotRevokable`] if the grant was created permanent.
    pub fn revoke_grant(
        &mut self,
        ledger: &mut impl AssetLedger,
        caller: &str,
        beneficiary: &str,
    ) -> Result<u64, VestingError> {
        if caller != self.issuer {
            return Err(VestingError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        let grant = self
            .grants
            .get(beneficiary)
            .ok_or_else(|| VestingError::GrantNotFound {
                beneficiary: beneficiary.to_string(),
            })?;
        if !grant.revokable {
            return Err(VestingError::NotRevokable {
                beneficiary: beneficiary.to_string(),
            });
        }

        let refund = grant.remaining();

        // Effects before the outbound transfer, as in `claim`.
        self.grants.remove(beneficiary);
        self.total_vesting = self
            .total_vesting
            .checked_sub(refund)
            .ok_or(VestingError::AmountOverflow)?;

        ledger.withdraw(&self.issuer, refund)?;

        info!(beneficiary, refund, "grant revoked");
        Ok(refund)
    }

    /// Quantity `beneficiary` could claim at `now`. Public read — returns 0
    /// for addresses without a grant rather than erroring.
    pub fn claimable_tokens(&self, beneficiary: &str, now: DateTime<Utc>) -> u64 {
        self.grants
            .get(beneficiary)
            .map(|grant| grant.claimable(now))
            .unwrap_or(0)
    }

    /// Returns the live grant for `beneficiary`, if any.
    pub fn grant(&self, beneficiary: &str) -> Option<&Grant> {
        self.grants.get(beneficiary)
    }

    /// Total outstanding obligation across all live grants.
    pub fn total_vesting(&self) -> u64 {
        self.total_vesting
    }

    /// The issuer's address.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Number of live grants.
    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }
}
