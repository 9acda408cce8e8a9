// src/db/item_repo.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    db::search_repo::{resolve_employees, ITEM_DETAIL_SELECT},
    models::inventory::{
        CheckInEvent, CheckOutEvent, Item, ItemCondition, ItemDetail, ItemDetailRow, Location,
        StateGuard,
    },
};

#[derive(Debug, Clone)]
pub struct NewItem {
    pub barcode: i64,
    pub product_id: Uuid,
    pub serial_number: i64,
    pub registered_at: DateTime<Utc>,
    pub registered_condition: ItemCondition,
    pub location: Location,
}

#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---
    pub async fn find_by_id(&self, id: Uuid) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found.".to_string()))
    }

    pub async fn find_detail(&self, id: Uuid) -> Result<ItemDetail, AppError> {
        let sql = format!("{ITEM_DETAIL_SELECT} WHERE i.id = $1");
        let row = sqlx::query_as::<_, ItemDetailRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found.".to_string()))?;
        let mut details = resolve_employees(&self.pool, vec![row]).await?;
        details
            .pop()
            .ok_or_else(|| AppError::NotFound("Item not found.".to_string()))
    }

    /// Itens crus dos produtos informados (para contagens, sem resolver referências).
    pub async fn find_by_products(&self, product_ids: &[Uuid]) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE product_id = ANY($1)")
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Itens fora da prateleira cuja última saída foi para o funcionário.
    pub async fn held_by(&self, employee: Uuid) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT * FROM items
            WHERE is_checked_out = true
              AND checked_out -> 0 ->> 'employee' = $1
            ORDER BY barcode ASC
            "#,
        )
            .bind(employee.to_string())
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn distinct_warehouses(&self) -> Result<Vec<String>, AppError> {
        let warehouses = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT warehouse FROM items ORDER BY warehouse ASC",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(warehouses)
    }

    pub async fn sample_barcodes(&self, checked_out: bool, limit: i64) -> Result<Vec<i64>, AppError> {
        let barcodes = sqlx::query_scalar::<_, i64>(
            "SELECT barcode FROM items WHERE is_checked_out = $1 ORDER BY barcode ASC LIMIT $2",
        )
            .bind(checked_out)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(barcodes)
    }

    // ---
    // Escrita
    // ---
    pub async fn create_item(&self, item: &NewItem) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items
                (barcode, product_id, serial_number, registered_at, registered_condition,
                 warehouse, aisle, shelf, bin)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(item.barcode)
            .bind(item.product_id)
            .bind(item.serial_number)
            .bind(item.registered_at)
            .bind(item.registered_condition)
            .bind(&item.location.warehouse)
            .bind(&item.location.aisle)
            .bind(item.location.shelf)
            .bind(item.location.bin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("Barcode {} is already in use.", item.barcode)),
                    || AppError::NotFound("Product not found.".to_string()),
                )
            })
    }

    pub async fn update_location(&self, id: Uuid, location: &Location) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET warehouse = $2, aisle = $3, shelf = $4, bin = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&location.warehouse)
            .bind(&location.aisle)
            .bind(location.shelf)
            .bind(location.bin)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found.".to_string()))
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found.".to_string()));
        }
        Ok(())
    }

    // ---
    // Saída / entrada: um único UPDATE condicional guardado pelo estado lido.
    // ---
    pub async fn prepend_check_out(
        &self,
        id: Uuid,
        event: &CheckOutEvent,
        guard: StateGuard,
    ) -> Result<Item, AppError> {
        self.prepend_event(EventColumn::CheckedOut, id, event, guard).await
    }

    pub async fn prepend_check_in(
        &self,
        id: Uuid,
        event: &CheckInEvent,
        guard: StateGuard,
    ) -> Result<Item, AppError> {
        self.prepend_event(EventColumn::CheckedIn, id, event, guard).await
    }

    async fn prepend_event<E>(
        &self,
        column: EventColumn,
        id: Uuid,
        event: &E,
        guard: StateGuard,
    ) -> Result<Item, AppError>
    where
        E: Serialize + Sync,
    {
        let sql = prepend_event_sql(column);
        let updated = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .bind(Json(vec![event]))
            .bind(guard.next)
            .bind(guard.expected)
            .fetch_optional(&self.pool)
            .await?;
        settle_guard(updated)
    }
}

#[derive(Debug, Clone, Copy)]
enum EventColumn {
    CheckedOut,
    CheckedIn,
}

impl EventColumn {
    fn name(self) -> &'static str {
        match self {
            EventColumn::CheckedOut => "checked_out",
            EventColumn::CheckedIn => "checked_in",
        }
    }
}

// $1 = id, $2 = evento, $3 = StateGuard::next, $4 = StateGuard::expected
fn prepend_event_sql(column: EventColumn) -> String {
    let column = column.name();
    format!(
        r#"
        UPDATE items SET
            {column} = $2::jsonb || {column},
            is_checked_out = $3,
            updated_at = now()
        WHERE id = $1 AND is_checked_out = $4
        RETURNING *
        "#
    )
}

// Nenhuma linha = outro pedido mudou o estado antes (guarda perdida)
fn settle_guard(updated: Option<Item>) -> Result<Item, AppError> {
    updated.ok_or_else(|| {
        AppError::Conflict("The item was changed by another request. Try again.".to_string())
    })
}
