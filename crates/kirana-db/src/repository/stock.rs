//! # Stock Ledger
//!
//! Append-only signed ledger of stock movements.
//!
//! ## Ledger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      stock_batches (append-only)                        │
//! │                                                                         │
//! │   item      delta   unit_cost      meaning                              │
//! │   ────      ─────   ─────────      ───────                              │
//! │   rice-5kg   +10      ₹5.00        purchase receipt                     │
//! │   rice-5kg   +10      ₹7.00        purchase receipt                     │
//! │   rice-5kg    -5      ₹6.00        consumed by a bill (cost frozen)     │
//! │   rice-5kg    +5      ₹6.00        compensating restock (edit/delete)   │
//! │                                                                         │
//! │   on-hand            = SUM(delta)             (all rows)                │
//! │   avg purchase cost  = Σ(qty×cost) / Σ(qty)   (delta > 0 rows ONLY)     │
//! │                                                                         │
//! │   Rows are never updated or deleted. Corrections are new entries, so    │
//! │   the ledger stays a complete audit trail and consumption can never     │
//! │   distort the historical purchase cost.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use kirana_core::pricing;
use kirana_core::types::StockBatch;
use kirana_core::Money;

use crate::error::DbResult;

// =============================================================================
// Stock Ledger
// =============================================================================

/// Repository over the append-only stock ledger.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new stock ledger over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Appends one signed entry to the ledger.
    ///
    /// ## Arguments
    /// * `item_id` - The item the movement belongs to
    /// * `quantity_delta` - Positive for receipts, negative for consumption
    /// * `unit_cost_paisa` - Purchase cost per unit (receipts) or the
    ///   frozen bill-line cost (consumption)
    pub async fn record_batch(
        &self,
        item_id: &str,
        quantity_delta: i64,
        unit_cost_paisa: i64,
    ) -> DbResult<StockBatch> {
        let mut conn = self.pool.acquire().await?;
        record_batch_on(&mut conn, item_id, quantity_delta, unit_cost_paisa, Utc::now()).await
    }

    /// On-hand quantity: the sum of every delta for the item.
    /// Zero for an item with no ledger entries.
    pub async fn current_quantity(&self, item_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        current_quantity_on(&mut conn, item_id).await
    }

    /// Weighted-average purchase cost over receipt batches only.
    /// Zero when the item has never been received.
    pub async fn average_purchase_cost(&self, item_id: &str) -> DbResult<Money> {
        let mut conn = self.pool.acquire().await?;
        let (cost, qty) = receipt_aggregates_on(&mut conn, item_id).await?;
        Ok(pricing::weighted_average_cost(cost, qty))
    }

    /// Full movement history for an item, oldest first.
    pub async fn batches_for_item(&self, item_id: &str) -> DbResult<Vec<StockBatch>> {
        let batches = sqlx::query_as::<_, StockBatch>(
            r#"
            SELECT id, item_id, quantity_delta, unit_cost_paisa, created_at
            FROM stock_batches
            WHERE item_id = ?1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================
// These borrow the caller's connection so the billing transaction can mix
// ledger writes with bill writes atomically.

/// Appends one ledger entry on an existing connection/transaction.
pub(crate) async fn record_batch_on(
    conn: &mut SqliteConnection,
    item_id: &str,
    quantity_delta: i64,
    unit_cost_paisa: i64,
    now: DateTime<Utc>,
) -> DbResult<StockBatch> {
    let batch = StockBatch {
        id: Uuid::new_v4().to_string(),
        item_id: item_id.to_string(),
        quantity_delta,
        unit_cost_paisa,
        created_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO stock_batches (id, item_id, quantity_delta, unit_cost_paisa, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&batch.id)
    .bind(&batch.item_id)
    .bind(batch.quantity_delta)
    .bind(batch.unit_cost_paisa)
    .bind(batch.created_at)
    .execute(&mut *conn)
    .await?;

    debug!(
        item_id = %batch.item_id,
        delta = batch.quantity_delta,
        "Stock batch recorded"
    );

    Ok(batch)
}

/// On-hand quantity on an existing connection/transaction.
pub(crate) async fn current_quantity_on(
    conn: &mut SqliteConnection,
    item_id: &str,
) -> DbResult<i64> {
    let quantity: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(quantity_delta), 0) FROM stock_batches WHERE item_id = ?1",
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(quantity)
}

/// Receipt aggregates `(Σ qty×cost, Σ qty)` over positive batches only.
/// Feeds [`kirana_core::pricing::weighted_average_cost`].
pub(crate) async fn receipt_aggregates_on(
    conn: &mut SqliteConnection,
    item_id: &str,
) -> DbResult<(i64, i64)> {
    let row: (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN quantity_delta > 0
                              THEN quantity_delta * unit_cost_paisa
                              ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN quantity_delta > 0
                              THEN quantity_delta
                              ELSE 0 END), 0)
        FROM stock_batches
        WHERE item_id = ?1
        "#,
    )
    .bind(item_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row)
}
