//! # Billing Service
//!
//! The bill transaction manager: the only write path for bills.
//!
//! ## One Commit, One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     BillingService::commit(draft)                       │
//! │                                                                         │
//! │  validate draft (pure, before any I/O)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ──────────────────────────────────────────────────────┐          │
//! │  │ edit? reverse old consumption (+qty batches), drop lines  │          │
//! │  │ for each line:                                            │          │
//! │  │   re-read item ── re-check stock ── snapshot price        │          │
//! │  │ mint invoice number (create only)                         │          │
//! │  │ write header, lines, consumption batches (−qty)           │          │
//! │  COMMIT ─────────────────────────────────────────────────────┘          │
//! │       │                                                                 │
//! │       ├── ok ────► CommittedBill { id, invoice_no, grand_total }        │
//! │       └── busy ──► roll back, retry the WHOLE transaction (≤3)          │
//! │                                                                         │
//! │  Any failure rolls back everything: no header without lines, no        │
//! │  consumed stock without a bill, no leaked invoice number.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Edit Is Reverse-Then-Reapply
//! A full-replace edit first writes compensating positive batches for every
//! old line (at the line's frozen cost), then bills the new cart from
//! scratch. Editing a bill without changing it leaves net stock unchanged;
//! the ledger keeps both movements as an audit trail.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kirana_core::error::CoreError;
use kirana_core::pricing::{self, BillTotals, PriceSnapshot};
use kirana_core::types::{BillDraft, CommittedBill};
use kirana_core::validation;

use crate::error::{DbError, DbResult};
use crate::repository::{bill, item, sequence, stock};

/// Maximum whole-transaction attempts under lock contention.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

// =============================================================================
// Errors
// =============================================================================

/// Outcome errors of the billing transaction.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Domain rejection: validation, unknown item/bill, insufficient stock.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Lock contention persisted through every retry.
    #[error("Billing commit still contended after {attempts} attempts")]
    Contention { attempts: u32 },
}

// =============================================================================
// Delete Policy
// =============================================================================

/// What deleting a bill does to the stock ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Write compensating positive batches: the sold goods return to stock
    /// (voided sale, goods physically back on the shelf).
    Restock,
    /// Keep the consumption batches: the goods are gone even though the
    /// bill record is removed (damaged stock, record-keeping cleanup).
    KeepConsumption,
}

// =============================================================================
// Billing Service
// =============================================================================

/// The bill transaction manager.
///
/// ## Usage
/// ```rust,ignore
/// let committed = db.billing().commit(owner_id, &draft).await?;
/// println!("invoice {}", committed.invoice_no);
/// ```
#[derive(Debug, Clone)]
pub struct BillingService {
    pool: SqlitePool,
}

/// One draft line resolved and priced inside the transaction.
struct PricedLine {
    item_id: String,
    quantity: i64,
    unit_mrp_paisa: i64,
    gst_rate_bps: u32,
    unit_cost_paisa: i64,
    discount_bps: u32,
}

impl BillingService {
    /// Creates a new billing service over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        BillingService { pool }
    }

    /// Commits a draft cart as a bill.
    ///
    /// `draft.bill_id = None` creates a bill and mints a fresh invoice
    /// number; `Some(id)` is a full-replace edit that keeps the number.
    ///
    /// ## Errors
    /// * `BillingError::Core(Validation)` - rejected before any I/O
    /// * `BillingError::Core(ItemNotFound | BillNotFound)` - unknown or
    ///   cross-owner reference (indistinguishable on purpose)
    /// * `BillingError::Core(InsufficientStock)` - checked inside the tx
    /// * `BillingError::Contention` - lock contention exhausted the retries
    pub async fn commit(
        &self,
        owner_id: &str,
        draft: &BillDraft,
    ) -> Result<CommittedBill, BillingError> {
        // All validation happens before the transaction opens.
        validation::validate_bill_draft(draft).map_err(CoreError::from)?;

        let mut attempt = 1;
        loop {
            match self.try_commit(owner_id, draft).await {
                Err(BillingError::Db(e)) if e.is_busy() => {
                    if attempt >= MAX_COMMIT_ATTEMPTS {
                        warn!(attempt, "Billing commit contended, giving up");
                        return Err(BillingError::Contention { attempts: attempt });
                    }
                    warn!(attempt, "Billing commit contended, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// One full attempt: a single transaction from BEGIN to COMMIT.
    async fn try_commit(
        &self,
        owner_id: &str,
        draft: &BillDraft,
    ) -> Result<CommittedBill, BillingError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let now = Utc::now();

        // Edit mode: load the existing bill, reverse its consumption at the
        // frozen line costs, and clear the old lines. From here on the edit
        // looks exactly like a create against the restored stock level.
        let existing = match &draft.bill_id {
            Some(bill_id) => {
                let header = bill::get_for_owner_on(&mut tx, owner_id, bill_id)
                    .await?
                    .ok_or_else(|| CoreError::BillNotFound(bill_id.clone()))?;

                let old_lines = bill::lines_for_bill_on(&mut tx, &header.id).await?;
                for line in &old_lines {
                    stock::record_batch_on(
                        &mut tx,
                        &line.item_id,
                        line.quantity,
                        line.unit_cost_paisa,
                        now,
                    )
                    .await?;
                }
                bill::delete_lines_on(&mut tx, &header.id).await?;

                debug!(invoice_no = %header.invoice_no, reversed = old_lines.len(),
                       "Edit: old consumption reversed");
                Some(header)
            }
            None => None,
        };

        // Resolve, stock-check and price every line before writing anything.
        // `requested` accumulates per item so a cart with the same item on
        // two lines is checked against their combined quantity.
        let mut requested: HashMap<String, i64> = HashMap::new();
        let mut priced = Vec::with_capacity(draft.lines.len());
        let mut totals = BillTotals::default();

        for draft_line in &draft.lines {
            let item = item::get_active_on(&mut tx, owner_id, &draft_line.item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(draft_line.item_id.clone()))?;

            let total_requested = requested
                .entry(item.id.clone())
                .and_modify(|q| *q += draft_line.quantity)
                .or_insert(draft_line.quantity);

            let available = stock::current_quantity_on(&mut tx, &item.id).await?;
            if available < *total_requested {
                return Err(CoreError::InsufficientStock {
                    sku: item.sku,
                    available,
                    requested: *total_requested,
                }
                .into());
            }

            let (receipt_cost, receipt_qty) =
                stock::receipt_aggregates_on(&mut tx, &item.id).await?;
            let unit_cost = pricing::weighted_average_cost(receipt_cost, receipt_qty);

            let snapshot = PriceSnapshot {
                mrp: item.mrp(),
                gst_rate: item.gst_rate(),
                unit_cost,
            };
            let line_pricing =
                pricing::price_line(&snapshot, draft_line.quantity, draft_line.discount_bps);
            totals.add(&line_pricing);

            priced.push(PricedLine {
                item_id: item.id,
                quantity: draft_line.quantity,
                unit_mrp_paisa: item.mrp_paisa,
                gst_rate_bps: item.gst_rate_bps,
                unit_cost_paisa: unit_cost.paisa(),
                discount_bps: draft_line.discount_bps,
            });
        }

        // Header: create mints a number inside the tx; edit keeps its own.
        let (bill_id, invoice_no) = match &existing {
            Some(header) => {
                bill::update_header_on(&mut tx, &header.id, &draft.customer, &totals, now).await?;
                (header.id.clone(), header.invoice_no.clone())
            }
            None => {
                let bill_id = Uuid::new_v4().to_string();
                let invoice_no = sequence::next_invoice_number_on(&mut tx, now.year()).await?;
                bill::insert_header_on(
                    &mut tx,
                    &bill_id,
                    owner_id,
                    &invoice_no,
                    &draft.customer,
                    &totals,
                    now,
                )
                .await?;
                (bill_id, invoice_no)
            }
        };

        // Lines and their consumption entries, at the snapshotted cost.
        for line in &priced {
            bill::insert_line_on(
                &mut tx,
                &bill_id,
                &line.item_id,
                line.quantity,
                line.unit_mrp_paisa,
                line.gst_rate_bps,
                line.unit_cost_paisa,
                line.discount_bps,
                now,
            )
            .await?;

            stock::record_batch_on(
                &mut tx,
                &line.item_id,
                -line.quantity,
                line.unit_cost_paisa,
                now,
            )
            .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            %invoice_no,
            lines = priced.len(),
            total_paisa = totals.grand_total.paisa(),
            edit = existing.is_some(),
            "Bill committed"
        );

        Ok(CommittedBill {
            bill_id,
            invoice_no,
            grand_total_paisa: totals.grand_total.paisa(),
        })
    }

    /// Deletes a bill under an explicit stock policy.
    ///
    /// With [`DeletePolicy::Restock`] every line's quantity returns to stock
    /// as a compensating positive batch at the line's frozen cost. With
    /// [`DeletePolicy::KeepConsumption`] the ledger is left alone.
    pub async fn delete(
        &self,
        owner_id: &str,
        bill_id: &str,
        policy: DeletePolicy,
    ) -> Result<(), BillingError> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        let now = Utc::now();

        let header = bill::get_for_owner_on(&mut tx, owner_id, bill_id)
            .await?
            .ok_or_else(|| CoreError::BillNotFound(bill_id.to_string()))?;

        if policy == DeletePolicy::Restock {
            let lines = bill::lines_for_bill_on(&mut tx, &header.id).await?;
            for line in &lines {
                stock::record_batch_on(
                    &mut tx,
                    &line.item_id,
                    line.quantity,
                    line.unit_cost_paisa,
                    now,
                )
                .await?;
            }
        }

        // Lines cascade with the header.
        bill::delete_bill_on(&mut tx, &header.id).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(invoice_no = %header.invoice_no, ?policy, "Bill deleted");
        Ok(())
    }

    /// Full bill detail on the pool (read-only convenience passthrough).
    pub async fn detail(
        &self,
        owner_id: &str,
        bill_id: &str,
    ) -> DbResult<Option<kirana_core::types::BillDetail>> {
        bill::BillRepository::new(self.pool.clone())
            .detail(owner_id, bill_id)
            .await
    }
}
