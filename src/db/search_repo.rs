// src/db/search_repo.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::contains_pattern, error::AppError},
    models::{
        inventory::{ItemDetail, ItemDetailRow},
        search::{ItemFilter, ProductFilter, QuickSearchTerm},
        staff::Employee,
    },
};

/// O que o planejador de busca precisa do banco. Cada método é uma ida ao store;
/// todos os predicados de um filtro são combinados com AND.
#[async_trait]
pub trait SearchStore: Send + Sync {
    async fn category_ids_by_name(&self, name: &str) -> Result<Vec<Uuid>, AppError>;
    async fn manufacturer_ids_by_name(&self, name: &str) -> Result<Vec<Uuid>, AppError>;
    async fn product_ids(&self, filter: &ProductFilter) -> Result<Vec<Uuid>, AppError>;
    /// Itens totalmente resolvidos, ordenados por código de barras.
    async fn items(&self, filter: &ItemFilter) -> Result<Vec<ItemDetail>, AppError>;
}

pub const ITEM_DETAIL_SELECT: &str = r#"
    SELECT i.id, i.barcode, i.serial_number, i.registered_at, i.registered_condition,
           i.checked_out, i.checked_in, i.warehouse, i.aisle, i.shelf, i.bin,
           p.id AS product_id, p.name AS product_name, p.model AS product_model,
           p.consummable, p.minimum_quantity, p.minimum_units,
           c.id AS category_id, c.name AS category_name,
           m.id AS manufacturer_id, m.name AS manufacturer_name
    FROM items i
    JOIN products p ON p.id = i.product_id
    JOIN categories c ON c.id = p.category_id
    JOIN manufacturers m ON m.id = p.manufacturer_id
"#;

#[derive(Clone)]
pub struct SearchRepository {
    pool: PgPool,
}

impl SearchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ids_by_name(&self, table: &str, name: &str) -> Result<Vec<Uuid>, AppError> {
        let sql = format!("SELECT id FROM {table} WHERE name ILIKE $1 ESCAPE '\\'");
        let ids = sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(contains_pattern(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn quick_search(&self, term: &QuickSearchTerm) -> Result<Vec<ItemDetail>, AppError> {
        let mut builder = quick_search_query(term);
        let rows = builder
            .build_query_as::<ItemDetailRow>()
            .fetch_all(&self.pool)
            .await?;
        resolve_employees(&self.pool, rows).await
    }
}

/// Resolve os funcionários citados nos eventos com uma única consulta `= ANY`.
pub async fn resolve_employees(
    pool: &PgPool,
    rows: Vec<ItemDetailRow>,
) -> Result<Vec<ItemDetail>, AppError> {
    let ids: Vec<Uuid> = rows
        .iter()
        .flat_map(|row| row.employee_ids())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let employees: HashMap<Uuid, Employee> = if ids.is_empty() {
        HashMap::new()
    } else {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT e.id, e.employee_id, e.first_name, e.last_name, e.department_id, d.name AS department
            FROM employees e
            LEFT JOIN departments d ON d.id = e.department_id
            WHERE e.id = ANY($1)
            "#,
        )
            .bind(&ids)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect()
    };

    Ok(rows.into_iter().map(|row| row.resolve(&employees)).collect())
}

#[async_trait]
impl SearchStore for SearchRepository {
    async fn category_ids_by_name(&self, name: &str) -> Result<Vec<Uuid>, AppError> {
        self.ids_by_name("categories", name).await
    }

    async fn manufacturer_ids_by_name(&self, name: &str) -> Result<Vec<Uuid>, AppError> {
        self.ids_by_name("manufacturers", name).await
    }

    async fn product_ids(&self, filter: &ProductFilter) -> Result<Vec<Uuid>, AppError> {
        let mut builder = product_ids_query(filter);
        let ids = builder
            .build_query_scalar::<Uuid>()
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn items(&self, filter: &ItemFilter) -> Result<Vec<ItemDetail>, AppError> {
        let mut builder = items_query(filter);
        let rows = builder
            .build_query_as::<ItemDetailRow>()
            .fetch_all(&self.pool)
            .await?;
        resolve_employees(&self.pool, rows).await
    }
}

// ---
// Montagem das consultas. Cada predicado informado vira um " AND ..."
// depois de "WHERE TRUE"; os valores vão sempre como bind.
// ---
fn push_contains(builder: &mut QueryBuilder<'static, Postgres>, column: &str, term: &str) {
    builder.push(format!(" AND {column} ILIKE "));
    builder.push_bind(contains_pattern(term));
    builder.push(" ESCAPE '\\'");
}

// Lista vazia em ANY nunca casa: o eixo vira uma restrição impossível
fn push_any(builder: &mut QueryBuilder<'static, Postgres>, column: &str, ids: &[Uuid]) {
    builder.push(format!(" AND {column} = ANY("));
    builder.push_bind(ids.to_vec());
    builder.push(")");
}

fn product_ids_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT id FROM products WHERE TRUE");
    for name in &filter.names {
        push_contains(&mut builder, "name", name);
    }
    if let Some(model) = &filter.model {
        push_contains(&mut builder, "model", model);
    }
    if let Some(flag) = filter.consummable {
        builder.push(" AND consummable = ");
        builder.push_bind(flag);
    }
    if let Some(ids) = &filter.category_ids {
        push_any(&mut builder, "category_id", ids);
    }
    if let Some(ids) = &filter.manufacturer_ids {
        push_any(&mut builder, "manufacturer_id", ids);
    }
    builder
}

fn items_query(filter: &ItemFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(ITEM_DETAIL_SELECT);
    builder.push(" WHERE TRUE");
    if let Some(ids) = &filter.product_ids {
        push_any(&mut builder, "i.product_id", ids);
    }
    if let Some(warehouse) = &filter.warehouse {
        push_contains(&mut builder, "i.warehouse", warehouse);
    }
    if let Some(barcode) = filter.barcode {
        builder.push(" AND i.barcode = ");
        builder.push_bind(barcode);
    }
    if let Some(serial) = filter.serial_number {
        builder.push(" AND i.serial_number = ");
        builder.push_bind(serial);
    }
    builder.push(" ORDER BY i.barcode ASC");
    builder
}

/// Busca rápida: número = código de barras OU série; texto = OR entre
/// armazém, produto, modelo, categoria e fabricante.
fn quick_search_query(term: &QuickSearchTerm) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(ITEM_DETAIL_SELECT);
    match term {
        QuickSearchTerm::Number(n) => {
            builder.push(" WHERE i.barcode = ");
            builder.push_bind(*n);
            builder.push(" OR i.serial_number = ");
            builder.push_bind(*n);
        }
        QuickSearchTerm::Text(text) => {
            let pattern = contains_pattern(text);
            builder.push(" WHERE ");
            let mut columns = builder.separated(" OR ");
            for column in ["i.warehouse", "p.name", "p.model", "c.name", "m.name"] {
                columns.push(format!("{column} ILIKE "));
                columns.push_bind_unseparated(pattern.clone());
                columns.push_unseparated(" ESCAPE '\\'");
            }
        }
    }
    builder.push(" ORDER BY i.barcode ASC");
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    // O que vem depois do SELECT fixo
    fn tail<'a>(builder: &'a QueryBuilder<'static, Postgres>) -> &'a str {
        let sql = builder.sql();
        sql.strip_prefix(ITEM_DETAIL_SELECT).unwrap_or(sql)
    }

    #[test]
    fn product_predicates_are_joined_with_and() {
        let filter = ProductFilter {
            names: vec!["Widget".into(), "Pro".into()],
            model: Some("W-100".into()),
            consummable: Some(true),
            category_ids: Some(vec![Uuid::new_v4()]),
            manufacturer_ids: Some(vec![Uuid::new_v4()]),
        };
        let builder = product_ids_query(&filter);

        assert_eq!(
            builder.sql(),
            concat!(
                "SELECT id FROM products WHERE TRUE",
                " AND name ILIKE $1 ESCAPE '\\'",
                " AND name ILIKE $2 ESCAPE '\\'",
                " AND model ILIKE $3 ESCAPE '\\'",
                " AND consummable = $4",
                " AND category_id = ANY($5)",
                " AND manufacturer_id = ANY($6)",
            )
        );
        assert!(!builder.sql().contains(" OR "));
    }

    #[test]
    fn empty_product_filter_has_no_predicates() {
        let builder = product_ids_query(&ProductFilter::default());
        assert_eq!(builder.sql(), "SELECT id FROM products WHERE TRUE");
    }

    #[test]
    fn unmatched_axis_still_constrains_the_products() {
        let filter = ProductFilter { category_ids: Some(Vec::new()), ..Default::default() };
        let builder = product_ids_query(&filter);
        assert_eq!(builder.sql(), "SELECT id FROM products WHERE TRUE AND category_id = ANY($1)");
    }

    #[test]
    fn item_predicates_are_joined_with_and_and_sorted_by_barcode() {
        let filter = ItemFilter {
            product_ids: Some(vec![Uuid::new_v4()]),
            warehouse: Some("Denver".into()),
            barcode: Some(100),
            serial_number: Some(1000),
        };
        let builder = items_query(&filter);

        assert!(builder.sql().starts_with(ITEM_DETAIL_SELECT));
        assert_eq!(
            tail(&builder),
            concat!(
                " WHERE TRUE",
                " AND i.product_id = ANY($1)",
                " AND i.warehouse ILIKE $2 ESCAPE '\\'",
                " AND i.barcode = $3",
                " AND i.serial_number = $4",
                " ORDER BY i.barcode ASC",
            )
        );
    }

    #[test]
    fn quick_search_text_is_or_ed_across_columns() {
        let builder = quick_search_query(&QuickSearchTerm::Text("acme".into()));
        assert_eq!(
            tail(&builder),
            concat!(
                " WHERE i.warehouse ILIKE $1 ESCAPE '\\'",
                " OR p.name ILIKE $2 ESCAPE '\\'",
                " OR p.model ILIKE $3 ESCAPE '\\'",
                " OR c.name ILIKE $4 ESCAPE '\\'",
                " OR m.name ILIKE $5 ESCAPE '\\'",
                " ORDER BY i.barcode ASC",
            )
        );
    }

    #[test]
    fn quick_search_number_matches_barcode_or_serial() {
        let builder = quick_search_query(&QuickSearchTerm::Number(42));
        assert_eq!(
            tail(&builder),
            " WHERE i.barcode = $1 OR i.serial_number = $2 ORDER BY i.barcode ASC"
        );
    }
}
