// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::catalog::{MinimumRequired, Product, ProductDetail, ProductDetailRow},
};

// Tabelas de "lookup" por nome que têm a mesma forma (id, name, added_by)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    Categories,
    Manufacturers,
}

impl LookupTable {
    fn table(self) -> &'static str {
        match self {
            LookupTable::Categories => "categories",
            LookupTable::Manufacturers => "manufacturers",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LookupTable::Categories => "Category",
            LookupTable::Manufacturers => "Manufacturer",
        }
    }
}

pub const PRODUCT_DETAIL_SELECT: &str = r#"
    SELECT p.id, p.name, p.model, p.consummable, p.minimum_quantity, p.minimum_units,
           c.id AS category_id, c.name AS category_name,
           m.id AS manufacturer_id, m.name AS manufacturer_name
    FROM products p
    JOIN categories c ON c.id = p.category_id
    JOIN manufacturers m ON m.id = p.manufacturer_id
"#;

// Campos de produto já validados, prontos para gravar
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub model: Option<String>,
    pub manufacturer_id: Uuid,
    pub category_id: Uuid,
    pub consummable: bool,
    pub minimum_required: MinimumRequired,
}

#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub model: Option<String>,
    pub manufacturer_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub consummable: Option<bool>,
    pub minimum_quantity: Option<Decimal>,
    pub minimum_units: Option<String>,
}

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Categorias e fabricantes
    // ---
    pub async fn list_lookup<T>(&self, table: LookupTable) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} ORDER BY name ASC", table.table());
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find_lookup<T>(&self, table: LookupTable, id: Uuid) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("SELECT * FROM {} WHERE id = $1", table.table());
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found.", table.label())))
    }

    pub async fn create_lookup<T>(
        &self,
        table: LookupTable,
        name: &str,
        added_by: Uuid,
    ) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "INSERT INTO {} (name, added_by) VALUES ($1, $2) RETURNING *",
            table.table()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(name)
            .bind(added_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("{} '{name}' already exists.", table.label())),
                    || AppError::BadRequest("Invalid reference.".to_string()),
                )
            })
    }

    pub async fn rename_lookup<T>(
        &self,
        table: LookupTable,
        id: Uuid,
        name: &str,
        added_by: Uuid,
    ) -> Result<T, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "UPDATE {} SET name = $2, added_by = $3, updated_at = now() WHERE id = $1 RETURNING *",
            table.table()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(name)
            .bind(added_by)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::AlreadyExists(format!("{} '{name}' already exists.", table.label())),
                    || AppError::BadRequest("Invalid reference.".to_string()),
                )
            })?
            .ok_or_else(|| AppError::NotFound(format!("{} not found.", table.label())))
    }

    // RESTRICT: não apaga enquanto algum produto usar
    pub async fn delete_lookup(&self, table: LookupTable, id: Uuid) -> Result<(), AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(
                    e,
                    || AppError::BadRequest("Invalid reference.".to_string()),
                    || AppError::StillReferenced(format!(
                        "{} is still used by one or more products.",
                        table.label()
                    )),
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} not found.", table.label())));
        }
        Ok(())
    }

    // ---
    // Produtos
    // ---
    pub async fn list_products(&self) -> Result<Vec<ProductDetail>, AppError> {
        let sql = format!("{PRODUCT_DETAIL_SELECT} ORDER BY p.name ASC, p.id ASC");
        let rows = sqlx::query_as::<_, ProductDetailRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ProductDetail::from).collect())
    }

    pub async fn find_product_detail(&self, id: Uuid) -> Result<ProductDetail, AppError> {
        let sql = format!("{PRODUCT_DETAIL_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProductDetailRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ProductDetail::from)
            .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))
    }

    pub async fn list_raw_products(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Consumíveis com mínimo configurado (> 0): candidatos ao relatório de estoque baixo.
    pub async fn products_with_minimum(&self) -> Result<Vec<ProductDetail>, AppError> {
        let sql = format!(
            "{PRODUCT_DETAIL_SELECT} WHERE p.consummable = true AND p.minimum_quantity > 0 ORDER BY p.name ASC"
        );
        let rows = sqlx::query_as::<_, ProductDetailRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ProductDetail::from).collect())
    }

    pub async fn distinct_units(&self) -> Result<Vec<String>, AppError> {
        let units = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT minimum_units FROM products
            WHERE minimum_quantity > 0 AND minimum_units IS NOT NULL
            ORDER BY minimum_units ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(units)
    }

    fn product_constraint_error(e: sqlx::Error, name: &str) -> AppError {
        map_constraint_error(
            e,
            || AppError::AlreadyExists(format!("Product '{name}' already exists.")),
            || AppError::NotFound("Category or manufacturer not found.".to_string()),
        )
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (name, model, manufacturer_id, category_id, consummable, minimum_quantity, minimum_units)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(&product.name)
            .bind(&product.model)
            .bind(product.manufacturer_id)
            .bind(product.category_id)
            .bind(product.consummable)
            .bind(product.minimum_required.quantity)
            .bind(&product.minimum_required.units)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::product_constraint_error(e, &product.name))
    }

    pub async fn update_product(&self, id: Uuid, changes: &ProductChanges) -> Result<Product, AppError> {
        let name = changes.name.clone().unwrap_or_default();
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name             = COALESCE($2, name),
                model            = COALESCE($3, model),
                manufacturer_id  = COALESCE($4, manufacturer_id),
                category_id      = COALESCE($5, category_id),
                consummable      = COALESCE($6, consummable),
                minimum_quantity = COALESCE($7, minimum_quantity),
                minimum_units    = COALESCE($8, minimum_units),
                updated_at       = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.model)
            .bind(changes.manufacturer_id)
            .bind(changes.category_id)
            .bind(changes.consummable)
            .bind(changes.minimum_quantity)
            .bind(&changes.minimum_units)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::product_constraint_error(e, &name))?
            .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))
    }

    // CASCADE: os itens do produto vão junto
    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found.".to_string()));
        }
        Ok(())
    }
}
