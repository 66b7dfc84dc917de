//! # Vesting Trustee
//!
//! The accounting engine behind a time-released token distribution program.
//! An issuer endows the trustee's custody account with a pool of fungible
//! tokens, then creates per-beneficiary **grants** that entitle each
//! beneficiary to withdraw their allotment gradually along a linear
//! schedule:
//!
//! - **Create** — the issuer records a grant (value, start, cliff, end,
//!   revokable flag), bounded by the custody balance net of all outstanding
//!   promises.
//! - **Claim** — the beneficiary withdraws whatever has vested since their
//!   last claim. Nothing is claimable before the cliff; everything remaining
//!   is claimable after the end.
//! - **Revoke** — for revokable grants only, the issuer terminates the
//!   grant early and sweeps the unpaid remainder back to themself.
//!
//! ## Design Principles
//!
//! 1. All monetary operations check for overflow — we use `checked_add` and
//!    `checked_sub` everywhere, because wrapping arithmetic and money do not
//!    mix.
//! 2. Vesting math is integer-only with floor division. It never rounds up,
//!    so the aggregate reserve bound (`total_vesting <= custody balance`)
//!    survives any sequence of small claims.
//! 3. Every privileged operation takes an explicit authenticated caller,
//!    checked against the issuer or the grant's beneficiary.
//! 4. State updates land before the outbound ledger transfer
//!    (checks-effects-interactions), so a reentrant ledger can never observe
//!    stale grant or reserve state.
//! 5. Every public type is serializable (serde) for wire transport and
//!    persistent storage.

pub mod grant;
pub mod ledger;
pub mod trustee;

pub use grant::Grant;
pub use ledger::{AssetLedger, LedgerError, TokenLedger};
pub use trustee::{VestingError, VestingTrustee};
