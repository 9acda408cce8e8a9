// src/services/inventory_service.rs

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        catalog_repo::LookupTable, item_repo::NewItem, CatalogRepository, ItemRepository,
        SearchRepository, StaffRepository, UserRepository,
    },
    models::{
        auth::{Principal, ACCESS_LEVELS},
        catalog::{NamedRef, Product},
        inventory::{
            CheckInEvent, CheckInPayload, CheckOutEvent, CheckOutPayload, CreateItemPayload,
            ItemDetail, ItemRecord, ItemView, UpdateItemPayload, ITEM_CONDITIONS,
        },
        search::{EmployeeOption, QuickSearchTerm, SearchableFields},
    },
};

// Quantos códigos de barras de exemplo vão para o formulário de busca
const SAMPLE_BARCODES: i64 = 5;

fn ensure_same_id(path_id: Uuid, body_id: Uuid) -> Result<(), AppError> {
    if path_id != body_id {
        return Err(AppError::BadRequest("The id in the path and body don't match.".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct InventoryService {
    item_repo: ItemRepository,
    catalog_repo: CatalogRepository,
    staff_repo: StaffRepository,
    user_repo: UserRepository,
    search_repo: SearchRepository,
}

impl InventoryService {
    pub fn new(
        item_repo: ItemRepository,
        catalog_repo: CatalogRepository,
        staff_repo: StaffRepository,
        user_repo: UserRepository,
        search_repo: SearchRepository,
    ) -> Self {
        Self { item_repo, catalog_repo, staff_repo, user_repo, search_repo }
    }

    // ---
    // CRUD de itens
    // ---
    pub async fn create_item(&self, payload: &CreateItemPayload) -> Result<ItemRecord, AppError> {
        let registered = payload.registered.as_ref();
        let mut location = payload.location.clone();
        location.warehouse = location.warehouse.trim().to_string();

        let item = NewItem {
            barcode: payload.barcode,
            product_id: payload.product,
            serial_number: payload.serial_number.unwrap_or_default(),
            registered_at: registered.and_then(|r| r.date).unwrap_or_else(Utc::now),
            registered_condition: registered.and_then(|r| r.condition).unwrap_or_default(),
            location,
        };
        let created = self.item_repo.create_item(&item).await?;
        tracing::info!("🏷️ Item {} cadastrado.", created.barcode);
        Ok(created.compact())
    }

    pub async fn get_item(&self, id: Uuid) -> Result<ItemRecord, AppError> {
        Ok(self.item_repo.find_by_id(id).await?.compact())
    }

    pub async fn update_item(&self, path_id: Uuid, payload: &UpdateItemPayload) -> Result<ItemRecord, AppError> {
        ensure_same_id(path_id, payload.id)?;
        Ok(self.item_repo.update_location(path_id, &payload.location).await?.compact())
    }

    pub async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        self.item_repo.delete_item(id).await
    }

    pub async fn quick_search(&self, raw: &str) -> Result<Vec<ItemView>, AppError> {
        let term = QuickSearchTerm::parse(raw)?;
        let items = self.search_repo.quick_search(&term).await?;
        if items.is_empty() {
            return Err(AppError::NoItemsFound);
        }
        Ok(items.iter().map(ItemDetail::full).collect())
    }

    pub async fn warehouses(&self) -> Result<Vec<String>, AppError> {
        self.item_repo.distinct_warehouses().await
    }

    // ---
    // Saída e entrada.
    // Lê o estado, o modelo valida e recalcula `is_checked_out` (StateGuard),
    // e o repositório grava com um UPDATE guardado pelo valor lido.
    // ---
    pub async fn check_out(
        &self,
        caller: &Principal,
        path_id: Uuid,
        payload: &CheckOutPayload,
    ) -> Result<ItemView, AppError> {
        ensure_same_id(path_id, payload.item_id)?;
        let employee = self.staff_repo.find_by_number_or_fail(payload.employee_id).await?;
        let item = self.item_repo.find_by_id(path_id).await?;

        let event = CheckOutEvent {
            employee: employee.id,
            barcode: payload.barcode,
            date: Utc::now(),
            condition: payload.condition.unwrap_or_default(),
            authorized_by: caller.employee_id,
        };
        let guard = item.plan_check_out(event.clone())?;
        let updated = self.item_repo.prepend_check_out(path_id, &event, guard).await?;

        tracing::info!("📤 Item {} entregue ao funcionário {}.", updated.barcode, employee.employee_id);
        Ok(self.item_repo.find_detail(path_id).await?.full())
    }

    pub async fn check_in(
        &self,
        caller: &Principal,
        path_id: Uuid,
        payload: &CheckInPayload,
    ) -> Result<ItemView, AppError> {
        ensure_same_id(path_id, payload.item_id)?;
        let employee = self.staff_repo.find_by_number_or_fail(payload.employee_id).await?;
        let item = self.item_repo.find_by_id(path_id).await?;

        let event = CheckInEvent {
            employee: employee.id,
            barcode: payload.barcode,
            date: Utc::now(),
            authorized_by: caller.employee_id,
        };
        let guard = item.plan_check_in(event.clone())?;
        let updated = self.item_repo.prepend_check_in(path_id, &event, guard).await?;

        tracing::info!("📥 Item {} devolvido pelo funcionário {}.", updated.barcode, employee.employee_id);
        Ok(self.item_repo.find_detail(path_id).await?.full())
    }

    // ---
    // Valores para o formulário de busca
    // ---
    pub async fn searchable_fields(&self) -> Result<SearchableFields, AppError> {
        let (categories, manufacturers, departments, employees, linked) = tokio::try_join!(
            self.catalog_repo.list_lookup::<NamedRef>(LookupTable::Categories),
            self.catalog_repo.list_lookup::<NamedRef>(LookupTable::Manufacturers),
            self.staff_repo.list_departments(),
            self.staff_repo.list_employees(),
            self.user_repo.linked_employee_ids()
        )?;
        let (warehouses, units, checked_out, checked_in, products) = tokio::try_join!(
            self.item_repo.distinct_warehouses(),
            self.catalog_repo.distinct_units(),
            self.item_repo.sample_barcodes(true, SAMPLE_BARCODES),
            self.item_repo.sample_barcodes(false, SAMPLE_BARCODES),
            self.catalog_repo.list_raw_products()
        )?;

        let linked: HashSet<Uuid> = linked.into_iter().collect();
        let ids_with_no_account = employees
            .iter()
            .filter(|e| !linked.contains(&e.id))
            .map(|e| e.employee_id)
            .collect();

        Ok(SearchableFields {
            categories,
            manufacturers,
            departments: departments
                .into_iter()
                .map(|d| NamedRef { id: d.id, name: d.name })
                .collect(),
            employees: employees
                .iter()
                .map(|e| EmployeeOption { id: e.employee_id, name: e.full_name() })
                .collect(),
            ids_with_no_account,
            warehouses,
            units,
            access_levels: ACCESS_LEVELS,
            conditions: ITEM_CONDITIONS.to_vec(),
            checked_out_barcodes: checked_out,
            checked_in_barcodes: checked_in,
            products: products.iter().map(Product::compact).collect(),
        })
    }
}
