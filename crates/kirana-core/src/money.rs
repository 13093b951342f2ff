//! # Money Module
//!
//! Integer-paisa money for GST billing.
//!
//! ## One Rounding Site
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every amount in the system is a whole number of paisa (i64).           │
//! │                                                                         │
//! │  mrp × qty            exact integer multiply                            │
//! │  base − discount      exact integer subtract                            │
//! │  taxable + gst        exact integer add                                 │
//! │  Σ line totals        exact integer sum                                 │
//! │                                                                         │
//! │  discount = base × d%  ──┐                                              │
//! │  gst = taxable × g%    ──┴──► Money::percentage  ← the ONLY place a     │
//! │                                                    fraction can appear, │
//! │                                                    rounded half-up once │
//! │                                                                         │
//! │  A bill header therefore always equals the sum of its already-rounded   │
//! │  lines; totals never drift by re-rounding.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rates ride alongside as basis points (`GstRate`, discount bps): 1800 bps
//! is 18.00%, and `amount × bps / 10_000` stays in integer land.
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::Money;
//!
//! let mrp = Money::from_paisa(10_000);       // ₹100.00
//! let discount = mrp.percentage(1_000);      // 10% → ₹10.00
//! let taxable = mrp - discount;              // ₹90.00
//! assert_eq!(taxable.paisa(), 9_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::GstRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in whole paisa.
///
/// Signed on purpose: margins (`unit_profit`) and compensating ledger
/// entries can legitimately go below zero. Construction from floats does
/// not exist; amounts enter the system already in paisa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Wraps an amount given in paisa.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let mrp = Money::from_paisa(10_999);
    /// assert_eq!(mrp.paisa(), 10_999); // ₹109.99
    /// ```
    #[inline]
    pub const fn from_paisa(paisa: i64) -> Self {
        Money(paisa)
    }

    /// Builds an amount from rupees and paisa parts.
    ///
    /// For negative amounts pass the sign on the rupee part only:
    /// `from_rupees_paisa(-5, 50)` is −₹5.50.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees_paisa(109, 99).paisa(), 10_999);
    /// assert_eq!(Money::from_rupees_paisa(-5, 50).paisa(), -550);
    /// ```
    #[inline]
    pub const fn from_rupees_paisa(rupees: i64, paisa: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paisa)
        } else {
            Money(rupees * 100 + paisa)
        }
    }

    /// The raw amount in paisa. This is what gets persisted.
    #[inline]
    pub const fn paisa(&self) -> i64 {
        self.0
    }

    /// Whole-rupee part (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Paisa part, 0–99 regardless of sign.
    #[inline]
    pub const fn paisa_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Takes a percentage of this amount, given in basis points.
    ///
    /// This is the ONE place in the crate where rounding happens
    /// (half-up to whole paisa). Both discount amounts and GST amounts
    /// are computed through here, so every call site rounds identically.
    ///
    /// ## Implementation
    /// `(amount × bps + 5_000) / 10_000` in i128: the +5_000 is the
    /// half-up bias, i128 keeps huge amounts from overflowing mid-multiply.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    ///
    /// let taxable = Money::from_paisa(18_000); // ₹180.00
    /// let gst = taxable.percentage(1800);      // 18%
    /// assert_eq!(gst.paisa(), 3_240);          // ₹32.40
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5_000) / 10_000;
        Money::from_paisa(part as i64)
    }

    /// GST on this (taxable) amount at the given rate.
    ///
    /// ## Example
    /// ```rust
    /// use kirana_core::money::Money;
    /// use kirana_core::types::GstRate;
    ///
    /// let taxable = Money::from_paisa(10_000);
    /// assert_eq!(taxable.gst_amount(GstRate::from_bps(1800)).paisa(), 1_800);
    /// ```
    #[inline]
    pub fn gst_amount(&self, rate: GstRate) -> Money {
        self.percentage(rate.bps())
    }

    /// Unit amount × quantity. Exact; no rounding involved.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `₹x.yy` with a leading minus for negative amounts. Meant for logs and
/// test output; presentation collaborators do their own locale formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paisa_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
