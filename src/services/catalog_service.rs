// src/services/catalog_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        catalog_repo::{LookupTable, NewProduct, ProductChanges},
        CatalogRepository, ItemRepository,
    },
    models::{
        catalog::{
            Category, CreateProductPayload, LowStockEntry, Manufacturer, MinimumRequired,
            ProductDetail, ProductRecord, ProductView, UpdateProductPayload,
        },
        inventory::Item,
    },
};

/// Estoque baixo: para cada consumível com mínimo > 0, conta os itens na
/// prateleira; `shortfall = na_prateleira - mínimo`. Só entram os negativos.
pub fn low_stock_report(products: &[ProductDetail], items: &[Item]) -> Vec<LowStockEntry> {
    let mut on_shelf: HashMap<Uuid, i64> = HashMap::new();
    for item in items.iter().filter(|i| i.is_on_shelf()) {
        *on_shelf.entry(item.product_id).or_default() += 1;
    }

    products
        .iter()
        .filter(|p| p.consummable && p.minimum_required.quantity > Decimal::ZERO)
        .filter_map(|p| {
            let count = on_shelf.get(&p.id).copied().unwrap_or(0);
            let shortfall = Decimal::from(count) - p.minimum_required.quantity;
            (shortfall < Decimal::ZERO).then(|| LowStockEntry {
                product: p.full(),
                on_shelf: count,
                shortfall,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
    item_repo: ItemRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository, item_repo: ItemRepository) -> Self {
        Self { catalog_repo, item_repo }
    }

    // ---
    // Categorias
    // ---
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.catalog_repo.list_lookup(LookupTable::Categories).await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        self.catalog_repo.find_lookup(LookupTable::Categories, id).await
    }

    pub async fn create_category(&self, name: &str, added_by: Uuid) -> Result<Category, AppError> {
        self.catalog_repo.create_lookup(LookupTable::Categories, name.trim(), added_by).await
    }

    pub async fn rename_category(&self, id: Uuid, name: &str, added_by: Uuid) -> Result<Category, AppError> {
        self.catalog_repo.rename_lookup(LookupTable::Categories, id, name.trim(), added_by).await
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        self.catalog_repo.delete_lookup(LookupTable::Categories, id).await
    }

    // ---
    // Fabricantes
    // ---
    pub async fn list_manufacturers(&self) -> Result<Vec<Manufacturer>, AppError> {
        self.catalog_repo.list_lookup(LookupTable::Manufacturers).await
    }

    pub async fn get_manufacturer(&self, id: Uuid) -> Result<Manufacturer, AppError> {
        self.catalog_repo.find_lookup(LookupTable::Manufacturers, id).await
    }

    pub async fn create_manufacturer(&self, name: &str, added_by: Uuid) -> Result<Manufacturer, AppError> {
        self.catalog_repo.create_lookup(LookupTable::Manufacturers, name.trim(), added_by).await
    }

    pub async fn rename_manufacturer(
        &self,
        id: Uuid,
        name: &str,
        added_by: Uuid,
    ) -> Result<Manufacturer, AppError> {
        self.catalog_repo.rename_lookup(LookupTable::Manufacturers, id, name.trim(), added_by).await
    }

    pub async fn delete_manufacturer(&self, id: Uuid) -> Result<(), AppError> {
        self.catalog_repo.delete_lookup(LookupTable::Manufacturers, id).await
    }

    // ---
    // Produtos
    // ---
    pub async fn list_products(&self) -> Result<Vec<ProductView>, AppError> {
        let products = self.catalog_repo.list_products().await?;
        Ok(products.iter().map(ProductDetail::full).collect())
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductView, AppError> {
        Ok(self.catalog_repo.find_product_detail(id).await?.full())
    }

    pub async fn create_product(&self, payload: &CreateProductPayload) -> Result<ProductRecord, AppError> {
        let product = NewProduct {
            name: payload.name.trim().to_string(),
            model: payload.model.as_ref().map(|m| m.trim().to_string()),
            manufacturer_id: payload.manufacturer,
            category_id: payload.category,
            consummable: payload.consummable,
            minimum_required: payload
                .minimum_required
                .clone()
                .unwrap_or(MinimumRequired { quantity: Decimal::ZERO, units: None }),
        };
        let created = self.catalog_repo.create_product(&product).await?;
        tracing::info!("📦 Produto '{}' criado.", created.name);
        Ok(created.compact())
    }

    pub async fn update_product(
        &self,
        path_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<ProductRecord, AppError> {
        if payload.id != path_id {
            return Err(AppError::BadRequest("The id in the path and body don't match.".to_string()));
        }
        let changes = ProductChanges {
            name: payload.name.as_ref().map(|n| n.trim().to_string()),
            model: payload.model.as_ref().map(|m| m.trim().to_string()),
            manufacturer_id: payload.manufacturer,
            category_id: payload.category,
            consummable: payload.consummable,
            minimum_quantity: payload.minimum_required.as_ref().map(|m| m.quantity),
            minimum_units: payload.minimum_required.as_ref().and_then(|m| m.units.clone()),
        };
        Ok(self.catalog_repo.update_product(path_id, &changes).await?.compact())
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        self.catalog_repo.delete_product(id).await
    }

    pub async fn low_stock(&self) -> Result<Vec<LowStockEntry>, AppError> {
        let products = self.catalog_repo.products_with_minimum().await?;
        if products.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let items = self.item_repo.find_by_products(&ids).await?;
        Ok(low_stock_report(&products, &items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        catalog::NamedRef,
        inventory::fixtures::{check_in, check_out, item},
    };

    fn consumable(minimum: i64) -> ProductDetail {
        ProductDetail {
            id: Uuid::new_v4(),
            name: "Gloves".into(),
            model: None,
            consummable: true,
            minimum_required: MinimumRequired { quantity: Decimal::from(minimum), units: Some("pairs".into()) },
            category: NamedRef { id: Uuid::new_v4(), name: "Safety".into() },
            manufacturer: NamedRef { id: Uuid::new_v4(), name: "Acme".into() },
        }
    }

    #[test]
    fn shortfall_is_on_shelf_minus_minimum() {
        let gloves = consumable(5);
        let employee = Uuid::new_v4();
        let mut items: Vec<Item> = (1..=3).map(|n| item(n, gloves.id, "Denver")).collect();
        // Item fora da prateleira não conta
        let mut out = item(4, gloves.id, "Denver");
        out.record_check_out(check_out(employee, 1));
        items.push(out);
        let report = low_stock_report(&[gloves.clone()], &items);

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].on_shelf, 3);
        assert_eq!(report[0].shortfall, Decimal::from(-2));
    }

    #[test]
    fn returned_items_count_as_on_shelf() {
        let gloves = consumable(2);
        let employee = Uuid::new_v4();
        let mut returned = item(1, gloves.id, "Austin");
        returned.record_check_out(check_out(employee, 1));
        returned.record_check_in(check_in(employee, 2));

        let report = low_stock_report(&[gloves], &[returned]);
        assert_eq!(report[0].shortfall, Decimal::from(-1));
    }

    #[test]
    fn products_at_or_above_minimum_are_left_out() {
        let gloves = consumable(1);
        let mut durable = consumable(3);
        durable.consummable = false;
        let items = vec![item(1, gloves.id, "Denver")];
        assert!(low_stock_report(&[gloves, durable], &items).is_empty());
    }
}
