//! # Item Repository
//!
//! Data access for the item master.
//!
//! ## Derived Stock, Never Cached
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items                         stock_batches                            │
//! │  ┌──────────────┐              ┌──────────────────┐                     │
//! │  │ id, sku, mrp │◄─────────────│ item_id, delta   │                     │
//! │  │ gst, flags   │   LEFT JOIN  │ unit_cost_paisa  │                     │
//! │  └──────────────┘              └──────────────────┘                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ItemWithStock { item, on_hand, receipt_qty, receipt_cost_paisa }       │
//! │                                                                         │
//! │  There is no quantity column on items. Every read derives on-hand and   │
//! │  the average-cost aggregates from the ledger, so the figures cannot     │
//! │  drift from the movement history.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every query is scoped by `owner_id`. An item belonging to another owner
//! behaves exactly like a missing item (`Ok(None)` / `NotFound`), never a
//! permission error that would confirm its existence.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use kirana_core::types::{Item, ItemUpdate, ItemWithStock, NewItem, StockBatch};
use kirana_core::{validation, ValidationError};

use crate::error::{DbError, DbResult};
use crate::repository::stock;

/// Item columns with ledger aggregates, reused by every with-stock query.
const ITEM_WITH_STOCK_COLUMNS: &str = r#"
    i.id, i.owner_id, i.sku, i.name, i.category, i.mrp_paisa, i.gst_rate_bps,
    i.image_ref, i.visible_in_catalog, i.is_active, i.created_at, i.updated_at,
    COALESCE(SUM(sb.quantity_delta), 0) AS on_hand,
    COALESCE(SUM(CASE WHEN sb.quantity_delta > 0
                      THEN sb.quantity_delta ELSE 0 END), 0) AS receipt_qty,
    COALESCE(SUM(CASE WHEN sb.quantity_delta > 0
                      THEN sb.quantity_delta * sb.unit_cost_paisa ELSE 0 END), 0)
        AS receipt_cost_paisa
"#;

// =============================================================================
// Item Repository
// =============================================================================

/// Repository for item persistence operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new item repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    // ===== Create =====

    /// Registers a new item with no opening stock.
    ///
    /// ## Errors
    /// * `DbError::Validation` - bad SKU/name, negative MRP, rate over 100%
    /// * `DbError::UniqueViolation` - SKU already exists for this owner
    pub async fn create(&self, owner_id: &str, new_item: &NewItem) -> DbResult<Item> {
        validation::validate_new_item(new_item)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            sku: new_item.sku.clone(),
            name: new_item.name.clone(),
            category: new_item.category.clone(),
            mrp_paisa: new_item.mrp_paisa,
            gst_rate_bps: new_item.gst_rate_bps,
            image_ref: None,
            visible_in_catalog: new_item.visible_in_catalog,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO items
                (id, owner_id, sku, name, category, mrp_paisa, gst_rate_bps,
                 image_ref, visible_in_catalog, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.mrp_paisa)
        .bind(item.gst_rate_bps)
        .bind(&item.image_ref)
        .bind(item.visible_in_catalog)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        info!(sku = %item.sku, "Item registered");
        Ok(item)
    }

    /// Registers a new item and its opening stock receipt in one transaction.
    ///
    /// Either both rows land or neither does; there is no window where the
    /// item exists with a phantom zero-cost ledger.
    pub async fn create_with_initial_stock(
        &self,
        owner_id: &str,
        new_item: &NewItem,
        initial_qty: i64,
        unit_cost_paisa: i64,
    ) -> DbResult<(Item, StockBatch)> {
        validation::validate_new_item(new_item)?;
        if initial_qty <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "opening quantity".to_string(),
            }
            .into());
        }
        validation::validate_amount_paisa(unit_cost_paisa)?;

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let item = Item {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            sku: new_item.sku.clone(),
            name: new_item.name.clone(),
            category: new_item.category.clone(),
            mrp_paisa: new_item.mrp_paisa,
            gst_rate_bps: new_item.gst_rate_bps,
            image_ref: None,
            visible_in_catalog: new_item.visible_in_catalog,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO items
                (id, owner_id, sku, name, category, mrp_paisa, gst_rate_bps,
                 image_ref, visible_in_catalog, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.mrp_paisa)
        .bind(item.gst_rate_bps)
        .bind(&item.image_ref)
        .bind(item.visible_in_catalog)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        let batch =
            stock::record_batch_on(&mut *tx, &item.id, initial_qty, unit_cost_paisa, now).await?;

        tx.commit().await?;

        info!(sku = %item.sku, qty = initial_qty, "Item registered with opening stock");
        Ok((item, batch))
    }

    // ===== Read =====

    /// Fetches an item by its UUID, scoped to the owner.
    pub async fn get_by_id(&self, owner_id: &str, id: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Fetches an active item by exact SKU, scoped to the owner.
    pub async fn get_by_sku(&self, owner_id: &str, sku: &str) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE sku = ?1 AND owner_id = ?2 AND is_active = 1",
        )
        .bind(sku)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Looks up one active item by name or SKU, case-insensitive exact match,
    /// with its ledger aggregates. Barcode-scanner and quick-add flows use
    /// this; substring matching would make scans ambiguous.
    pub async fn lookup(&self, owner_id: &str, query: &str) -> DbResult<Option<ItemWithStock>> {
        let sql = format!(
            r#"
            SELECT {ITEM_WITH_STOCK_COLUMNS}
            FROM items i
            LEFT JOIN stock_batches sb ON sb.item_id = i.id
            WHERE i.owner_id = ?1
              AND i.is_active = 1
              AND (LOWER(i.name) = LOWER(?2) OR LOWER(i.sku) = LOWER(?2))
            GROUP BY i.id
            LIMIT 1
            "#
        );

        let found = sqlx::query_as::<_, ItemWithStock>(&sql)
            .bind(owner_id)
            .bind(query.trim())
            .fetch_optional(&self.pool)
            .await?;

        debug!(%query, found = found.is_some(), "Item lookup");
        Ok(found)
    }

    /// All active items for the owner with derived stock, newest first.
    pub async fn list_with_stock(&self, owner_id: &str) -> DbResult<Vec<ItemWithStock>> {
        let sql = format!(
            r#"
            SELECT {ITEM_WITH_STOCK_COLUMNS}
            FROM items i
            LEFT JOIN stock_batches sb ON sb.item_id = i.id
            WHERE i.owner_id = ?1 AND i.is_active = 1
            GROUP BY i.id
            ORDER BY i.created_at DESC, i.id DESC
            "#
        );

        let items = sqlx::query_as::<_, ItemWithStock>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Catalog view: active items flagged visible, with derived stock so the
    /// catalog can mark out-of-stock entries.
    pub async fn list_catalog(&self, owner_id: &str) -> DbResult<Vec<ItemWithStock>> {
        let sql = format!(
            r#"
            SELECT {ITEM_WITH_STOCK_COLUMNS}
            FROM items i
            LEFT JOIN stock_batches sb ON sb.item_id = i.id
            WHERE i.owner_id = ?1 AND i.is_active = 1 AND i.visible_in_catalog = 1
            GROUP BY i.id
            ORDER BY i.name ASC
            "#
        );

        let items = sqlx::query_as::<_, ItemWithStock>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Number of active items for the owner.
    pub async fn count(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE owner_id = ?1 AND is_active = 1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // ===== Update =====

    /// Edits item master data. Committed bills are unaffected: their lines
    /// carry frozen price snapshots.
    pub async fn update_info(
        &self,
        owner_id: &str,
        id: &str,
        update: &ItemUpdate,
    ) -> DbResult<Item> {
        validation::validate_item_update(update)?;

        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET sku = ?1, name = ?2, category = ?3, mrp_paisa = ?4,
                gst_rate_bps = ?5, updated_at = ?6
            WHERE id = ?7 AND owner_id = ?8
            RETURNING *
            "#,
        )
        .bind(&update.sku)
        .bind(&update.name)
        .bind(&update.category)
        .bind(update.mrp_paisa)
        .bind(update.gst_rate_bps)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Item", id))?;

        info!(sku = %item.sku, "Item updated");
        Ok(item)
    }

    /// Flips catalog visibility and returns the new state.
    pub async fn toggle_catalog_visibility(&self, owner_id: &str, id: &str) -> DbResult<bool> {
        let visible: bool = sqlx::query_scalar(
            r#"
            UPDATE items
            SET visible_in_catalog = NOT visible_in_catalog, updated_at = ?1
            WHERE id = ?2 AND owner_id = ?3
            RETURNING visible_in_catalog
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Item", id))?;

        debug!(item_id = %id, visible, "Catalog visibility toggled");
        Ok(visible)
    }

    /// Attaches an image reference (opaque handle issued by the media
    /// collaborator). Replaces any previous reference.
    pub async fn set_image_ref(&self, owner_id: &str, id: &str, image_ref: &str) -> DbResult<()> {
        self.set_image_column(owner_id, id, Some(image_ref)).await
    }

    /// Clears the image reference.
    pub async fn clear_image_ref(&self, owner_id: &str, id: &str) -> DbResult<()> {
        self.set_image_column(owner_id, id, None).await
    }

    async fn set_image_column(
        &self,
        owner_id: &str,
        id: &str,
        image_ref: Option<&str>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE items SET image_ref = ?1, updated_at = ?2
            WHERE id = ?3 AND owner_id = ?4
            "#,
        )
        .bind(image_ref)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }
        Ok(())
    }

    // ===== Delete (soft) =====

    /// Deactivates an item. The row and its ledger stay: committed bills
    /// reference them. Deactivated items drop out of inventory, catalog and
    /// lookup, and cannot be billed.
    pub async fn deactivate(&self, owner_id: &str, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE items SET is_active = 0, updated_at = ?1
            WHERE id = ?2 AND owner_id = ?3
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        info!(item_id = %id, "Item deactivated");
        Ok(())
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Fetches an active, owner-scoped item on the caller's transaction.
/// The billing transaction re-reads items here so a concurrent deactivation
/// cannot slip a dead item into a bill.
pub(crate) async fn get_active_on(
    conn: &mut SqliteConnection,
    owner_id: &str,
    id: &str,
) -> DbResult<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        "SELECT * FROM items WHERE id = ?1 AND owner_id = ?2 AND is_active = 1",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(item)
}
