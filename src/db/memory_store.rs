// src/db/memory_store.rs
// Store em memória para testar o planejador de busca sem Postgres.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::search_repo::SearchStore,
    models::{
        catalog::{MinimumRequired, NamedRef, ProductDetail},
        inventory::{
            CheckOutCondition, ItemCondition, ItemDetail, Location, Registration, ResolvedCheckIn,
            ResolvedCheckOut,
        },
        search::{ItemFilter, ProductFilter},
    },
};

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn day(n: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default() + Duration::days(n)
}

#[derive(Default)]
pub struct MemoryStore {
    categories: Vec<NamedRef>,
    manufacturers: Vec<NamedRef>,
    products: Vec<ProductDetail>,
    items: Vec<ItemDetail>,
    // Contadores de idas ao store, para verificar passos pulados
    pub name_lookups: AtomicUsize,
    pub product_lookups: AtomicUsize,
    pub item_lookups: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.categories.push(NamedRef { id, name: name.to_string() });
        id
    }

    pub fn add_manufacturer(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.manufacturers.push(NamedRef { id, name: name.to_string() });
        id
    }

    pub fn add_product(
        &mut self,
        name: &str,
        model: Option<&str>,
        category: Uuid,
        manufacturer: Uuid,
        consummable: bool,
    ) -> Uuid {
        let find = |list: &[NamedRef], id: Uuid| {
            list.iter()
                .find(|r| r.id == id)
                .cloned()
                .unwrap_or(NamedRef { id, name: String::new() })
        };
        let id = Uuid::new_v4();
        self.products.push(ProductDetail {
            id,
            name: name.to_string(),
            model: model.map(str::to_string),
            consummable,
            minimum_required: MinimumRequired { quantity: Decimal::ZERO, units: None },
            category: find(&self.categories, category),
            manufacturer: find(&self.manufacturers, manufacturer),
        });
        id
    }

    pub fn add_item(&mut self, barcode: i64, product_id: Uuid, warehouse: &str) -> Uuid {
        let id = Uuid::new_v4();
        let product = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .expect("produto precisa existir antes do item");
        self.items.push(ItemDetail {
            id,
            barcode,
            serial_number: barcode * 10,
            registered: Registration { date: day(0), condition: ItemCondition::New },
            product,
            checked_out: Vec::new(),
            checked_in: Vec::new(),
            location: Location {
                warehouse: warehouse.to_string(),
                aisle: None,
                shelf: None,
                bin: None,
            },
        });
        id
    }

    fn item_mut(&mut self, id: Uuid) -> &mut ItemDetail {
        self.items.iter_mut().find(|i| i.id == id).expect("item inexistente")
    }

    pub fn check_out(&mut self, item: Uuid, on_day: i64) {
        self.item_mut(item).checked_out.insert(0, ResolvedCheckOut {
            employee: None,
            barcode: None,
            date: day(on_day),
            condition: CheckOutCondition::InUse,
            authorized_by: None,
        });
    }

    pub fn check_in(&mut self, item: Uuid, on_day: i64) {
        self.item_mut(item).checked_in.insert(0, ResolvedCheckIn {
            employee: None,
            barcode: None,
            date: day(on_day),
            authorized_by: None,
        });
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchStore for MemoryStore {
    async fn category_ids_by_name(&self, name: &str) -> Result<Vec<Uuid>, AppError> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.categories.iter().filter(|c| contains(&c.name, name)).map(|c| c.id).collect())
    }

    async fn manufacturer_ids_by_name(&self, name: &str) -> Result<Vec<Uuid>, AppError> {
        self.name_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.manufacturers.iter().filter(|m| contains(&m.name, name)).map(|m| m.id).collect())
    }

    async fn product_ids(&self, filter: &ProductFilter) -> Result<Vec<Uuid>, AppError> {
        self.product_lookups.fetch_add(1, Ordering::SeqCst);
        let ids = self
            .products
            .iter()
            .filter(|p| filter.names.iter().all(|n| contains(&p.name, n)))
            .filter(|p| match &filter.model {
                Some(model) => p.model.as_deref().is_some_and(|m| contains(m, model)),
                None => true,
            })
            .filter(|p| filter.consummable.is_none_or(|flag| p.consummable == flag))
            .filter(|p| {
                filter.category_ids.as_ref().is_none_or(|ids| ids.contains(&p.category.id))
            })
            .filter(|p| {
                filter.manufacturer_ids.as_ref().is_none_or(|ids| ids.contains(&p.manufacturer.id))
            })
            .map(|p| p.id)
            .collect();
        Ok(ids)
    }

    async fn items(&self, filter: &ItemFilter) -> Result<Vec<ItemDetail>, AppError> {
        self.item_lookups.fetch_add(1, Ordering::SeqCst);
        let mut items: Vec<ItemDetail> = self
            .items
            .iter()
            .filter(|i| filter.product_ids.as_ref().is_none_or(|ids| ids.contains(&i.product.id)))
            .filter(|i| {
                filter.warehouse.as_ref().is_none_or(|w| contains(&i.location.warehouse, w))
            })
            .filter(|i| filter.barcode.is_none_or(|b| i.barcode == b))
            .filter(|i| filter.serial_number.is_none_or(|s| i.serial_number == s))
            .cloned()
            .collect();
        items.sort_by_key(|i| i.barcode);
        Ok(items)
    }
}
