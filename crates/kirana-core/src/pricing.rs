//! # Pricing Engine
//!
//! Pure, stateless GST pricing shared by every call site.
//!
//! ## One Engine, Three Surfaces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Why a single pricing module?                            │
//! │                                                                         │
//! │  Inventory view ──┐                                                     │
//! │  Catalog view  ───┼──► pricing::* ──► identical numbers everywhere      │
//! │  Billing       ───┘                                                     │
//! │                                                                         │
//! │  The predecessor system computed "selling price" differently at each   │
//! │  surface. Here every surface calls the same functions, so an item can  │
//! │  never show one price in the catalog and charge another on the bill.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Math
//! ```text
//! base     = mrp × quantity
//! discount = base × discount%
//! taxable  = base − discount
//! gst      = taxable × gst%
//! total    = taxable + gst
//! ```
//!
//! All amounts are integer paisa. Rounding happens only inside
//! [`Money::percentage`]; sums of rounded line values are exact.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::GstRate;

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// An item's pricing data frozen at the moment of use.
///
/// Built from the item master (mrp, gst) and the stock ledger
/// (weighted-average purchase cost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub mrp: Money,
    pub gst_rate: GstRate,
    pub unit_cost: Money,
}

/// The fully computed amounts for one bill line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePricing {
    /// mrp × quantity, before any discount.
    pub base: Money,
    /// Discount amount carved out of `base`.
    pub discount: Money,
    /// base − discount.
    pub taxable: Money,
    /// GST on the taxable amount.
    pub gst: Money,
    /// taxable + gst.
    pub total: Money,
}

/// Accumulated header totals for a bill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    pub subtotal: Money,
    pub discount_total: Money,
    pub gst_total: Money,
    pub grand_total: Money,
}

impl BillTotals {
    /// Folds one priced line into the running totals.
    pub fn add(&mut self, line: &LinePricing) {
        self.subtotal += line.base;
        self.discount_total += line.discount;
        self.gst_total += line.gst;
        self.grand_total += line.total;
    }
}

// =============================================================================
// Line Pricing
// =============================================================================

/// Prices one line of a bill.
///
/// ## Arguments
/// * `snapshot` - item pricing frozen at billing time
/// * `quantity` - units sold (validated positive by the caller)
/// * `discount_bps` - line discount in basis points (1000 = 10%)
///
/// ## Example
/// ```rust
/// use kirana_core::money::Money;
/// use kirana_core::pricing::{price_line, PriceSnapshot};
/// use kirana_core::types::GstRate;
///
/// let snapshot = PriceSnapshot {
///     mrp: Money::from_paisa(10_000),      // ₹100.00
///     gst_rate: GstRate::from_bps(1800),   // 18%
///     unit_cost: Money::from_paisa(6_000), // ₹60.00
/// };
///
/// let line = price_line(&snapshot, 2, 1000); // qty 2, 10% off
/// assert_eq!(line.base.paisa(), 20_000);     // ₹200.00
/// assert_eq!(line.discount.paisa(), 2_000);  // ₹20.00
/// assert_eq!(line.taxable.paisa(), 18_000);  // ₹180.00
/// assert_eq!(line.gst.paisa(), 3_240);       // ₹32.40
/// assert_eq!(line.total.paisa(), 21_240);    // ₹212.40
/// ```
pub fn price_line(snapshot: &PriceSnapshot, quantity: i64, discount_bps: u32) -> LinePricing {
    let base = snapshot.mrp.multiply_quantity(quantity);
    let discount = base.percentage(discount_bps);
    let taxable = base - discount;
    let gst = taxable.gst_amount(snapshot.gst_rate);

    LinePricing {
        base,
        discount,
        taxable,
        gst,
        total: taxable + gst,
    }
}

// =============================================================================
// Selling Price
// =============================================================================

/// Canonical GST-inclusive selling price: purchase cost plus GST on top.
///
/// This is THE selling-price formula; inventory, catalog and billing
/// display surfaces all use it.
///
/// ## Example
/// ```rust
/// use kirana_core::money::Money;
/// use kirana_core::pricing::cost_plus_gst_price;
/// use kirana_core::types::GstRate;
///
/// let cost = Money::from_paisa(6_000);   // ₹60.00
/// let rate = GstRate::from_bps(1800);    // 18%
/// assert_eq!(cost_plus_gst_price(cost, rate).paisa(), 7_080); // ₹70.80
/// ```
pub fn cost_plus_gst_price(unit_cost: Money, gst_rate: GstRate) -> Money {
    unit_cost + unit_cost.gst_amount(gst_rate)
}

/// Alternate formula: the taxable base of a GST-inclusive MRP.
///
/// The predecessor system used this at some call sites, treating MRP as
/// already containing GST and reverse-computing the pre-tax base:
/// `mrp / (1 + gst%)`. It is preserved under its own name because the
/// two formulas genuinely answer different questions; it is NOT wired to
/// any display surface (see DESIGN.md).
///
/// ## Example
/// ```rust
/// use kirana_core::money::Money;
/// use kirana_core::pricing::taxable_base_of_inclusive_mrp;
/// use kirana_core::types::GstRate;
///
/// let mrp = Money::from_paisa(11_800);  // ₹118.00 inclusive
/// let rate = GstRate::from_bps(1800);
/// assert_eq!(taxable_base_of_inclusive_mrp(mrp, rate).paisa(), 10_000);
/// ```
pub fn taxable_base_of_inclusive_mrp(mrp: Money, gst_rate: GstRate) -> Money {
    let denom = 10_000 + gst_rate.bps() as i128;
    // Round half-up, same convention as Money::percentage.
    let base = (mrp.paisa() as i128 * 10_000 + denom / 2) / denom;
    Money::from_paisa(base as i64)
}

/// Margin per unit: MRP minus the canonical GST-inclusive selling price.
/// Negative when the item is priced below cost-plus-GST.
pub fn unit_profit(mrp: Money, unit_cost: Money, gst_rate: GstRate) -> Money {
    mrp - cost_plus_gst_price(unit_cost, gst_rate)
}

/// Margin for a whole line: unit profit × quantity.
pub fn line_profit(mrp: Money, unit_cost: Money, gst_rate: GstRate, quantity: i64) -> Money {
    unit_profit(mrp, unit_cost, gst_rate).multiply_quantity(quantity)
}

// =============================================================================
// Cost Averaging
// =============================================================================

/// Weighted-average purchase cost from receipt-batch aggregates.
///
/// ## Arguments
/// * `receipt_cost_paisa` - Σ(qty × unit cost) over positive batches
/// * `receipt_qty` - Σ(qty) over positive batches
///
/// Negative (consumption) batches are excluded from both sums by the
/// caller: consuming stock never changes the historical average cost.
/// Returns zero when nothing has been received (no division by zero).
///
/// ## Example
/// ```rust
/// use kirana_core::pricing::weighted_average_cost;
///
/// // +10 @ ₹5.00 and +10 @ ₹7.00 → ₹6.00
/// let avg = weighted_average_cost(10 * 500 + 10 * 700, 20);
/// assert_eq!(avg.paisa(), 600);
/// ```
pub fn weighted_average_cost(receipt_cost_paisa: i64, receipt_qty: i64) -> Money {
    if receipt_qty <= 0 {
        return Money::zero();
    }
    // Round half-up to whole paisa.
    let avg = (receipt_cost_paisa as i128 + receipt_qty as i128 / 2) / receipt_qty as i128;
    Money::from_paisa(avg as i64)
}

// =============================================================================
// GST Split
// =============================================================================

/// Splits a GST total into equal CGST and SGST halves.
///
/// The halves always sum back to the input exactly; when the total is an
/// odd number of paisa, the extra paisa lands on the SGST side.
pub fn split_gst(gst_total: Money) -> (Money, Money) {
    let cgst = Money::from_paisa(gst_total.paisa() / 2);
    let sgst = gst_total - cgst;
    (cgst, sgst)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mrp: i64, gst_bps: u32, cost: i64) -> PriceSnapshot {
        PriceSnapshot {
            mrp: Money::from_paisa(mrp),
            gst_rate: GstRate::from_bps(gst_bps),
            unit_cost: Money::from_paisa(cost),
        }
    }

    /// The reference example: mrp ₹100, gst 18%, cost ₹60, qty 2, 10% off.
    #[test]
    fn test_price_line_reference_case() {
        let line = price_line(&snapshot(10_000, 1800, 6_000), 2, 1000);

        assert_eq!(line.base.paisa(), 20_000);
        assert_eq!(line.discount.paisa(), 2_000);
        assert_eq!(line.taxable.paisa(), 18_000);
        assert_eq!(line.gst.paisa(), 3_240);
        assert_eq!(line.total.paisa(), 21_240);
    }

    #[test]
    fn test_price_line_no_discount_no_gst() {
        let line = price_line(&snapshot(500, 0, 300), 4, 0);

        assert_eq!(line.base.paisa(), 2_000);
        assert_eq!(line.discount.paisa(), 0);
        assert_eq!(line.taxable.paisa(), 2_000);
        assert_eq!(line.gst.paisa(), 0);
        assert_eq!(line.total.paisa(), 2_000);
    }

    #[test]
    fn test_price_line_full_discount() {
        let line = price_line(&snapshot(10_000, 1800, 6_000), 1, 10_000);

        assert_eq!(line.discount.paisa(), 10_000);
        assert_eq!(line.taxable.paisa(), 0);
        assert_eq!(line.total.paisa(), 0);
    }

    #[test]
    fn test_bill_totals_accumulate() {
        let mut totals = BillTotals::default();
        let a = price_line(&snapshot(10_000, 1800, 6_000), 2, 1000);
        let b = price_line(&snapshot(500, 500, 300), 3, 0);

        totals.add(&a);
        totals.add(&b);

        assert_eq!(totals.subtotal, a.base + b.base);
        assert_eq!(totals.discount_total, a.discount + b.discount);
        assert_eq!(totals.gst_total, a.gst + b.gst);
        assert_eq!(totals.grand_total, a.total + b.total);
        // Grand total is consistent with its parts.
        assert_eq!(
            totals.grand_total,
            totals.subtotal - totals.discount_total + totals.gst_total
        );
    }

    #[test]
    fn test_cost_plus_gst_price() {
        let price = cost_plus_gst_price(Money::from_paisa(6_000), GstRate::from_bps(1800));
        assert_eq!(price.paisa(), 7_080);

        // Zero-rated goods sell at cost.
        let exempt = cost_plus_gst_price(Money::from_paisa(6_000), GstRate::zero());
        assert_eq!(exempt.paisa(), 6_000);
    }

    #[test]
    fn test_taxable_base_of_inclusive_mrp() {
        let base =
            taxable_base_of_inclusive_mrp(Money::from_paisa(11_800), GstRate::from_bps(1800));
        assert_eq!(base.paisa(), 10_000);

        // Rounds half-up: ₹100.00 at 18% inclusive → 8474.57.. → 8475
        let uneven =
            taxable_base_of_inclusive_mrp(Money::from_paisa(10_000), GstRate::from_bps(1800));
        assert_eq!(uneven.paisa(), 8_475);
    }

    #[test]
    fn test_unit_profit_can_be_negative() {
        // MRP ₹65, cost-plus-GST ₹70.80 → margin is negative
        let margin = unit_profit(
            Money::from_paisa(6_500),
            Money::from_paisa(6_000),
            GstRate::from_bps(1800),
        );
        assert_eq!(margin.paisa(), -580);
        assert_eq!(
            line_profit(
                Money::from_paisa(6_500),
                Money::from_paisa(6_000),
                GstRate::from_bps(1800),
                3
            )
            .paisa(),
            -1_740
        );
    }

    /// Average cost ignores consumption: the batch set
    /// [+10 @ ₹5.00, +10 @ ₹7.00, -5 @ ₹9.99] averages to ₹6.00 because
    /// only receipt batches feed the aggregates.
    #[test]
    fn test_weighted_average_cost_receipts_only() {
        let receipt_cost = 10 * 500 + 10 * 700; // the -5 @ 999 never enters
        let receipt_qty = 20;
        assert_eq!(weighted_average_cost(receipt_cost, receipt_qty).paisa(), 600);
    }

    #[test]
    fn test_weighted_average_cost_empty_ledger() {
        assert!(weighted_average_cost(0, 0).is_zero());
    }

    #[test]
    fn test_weighted_average_cost_rounds() {
        // 3 units costing 1000 paisa total → 333.33 → 333
        assert_eq!(weighted_average_cost(1_000, 3).paisa(), 333);
        // 2 units costing 1001 → 500.5 → 501 (half-up)
        assert_eq!(weighted_average_cost(1_001, 2).paisa(), 501);
    }

    #[test]
    fn test_split_gst() {
        let (cgst, sgst) = split_gst(Money::from_paisa(3_240));
        assert_eq!(cgst.paisa(), 1_620);
        assert_eq!(sgst.paisa(), 1_620);

        // Odd paisa: halves still sum exactly
        let (cgst, sgst) = split_gst(Money::from_paisa(3_241));
        assert_eq!(cgst.paisa(), 1_620);
        assert_eq!(sgst.paisa(), 1_621);
        assert_eq!((cgst + sgst).paisa(), 3_241);
    }
}
