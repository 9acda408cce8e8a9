// src/models/search.rs

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::AccessLevels,
        catalog::{NamedRef, ProductRecord},
        inventory::ItemCondition,
    },
};

pub const EMPTY_SEARCH_MESSAGE: &str = "Enter at least one value to search for.";

// ---
// Campos pesquisáveis: conjunto fechado, um braço por campo
// ---
#[derive(Debug, Clone, PartialEq)]
pub enum SearchField {
    ProductName(String),
    Model(String),
    Category(String),
    Manufacturer(String),
    Consummable(bool),
    Warehouse(String),
    OnShelf(bool),
    Barcode(i64),
    SerialNumber(i64),
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::BadRequest(format!("'{key}' must be true or false."))),
    }
}

fn parse_number(key: &str, raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("'{key}' must be a whole number.")))
}

impl SearchField {
    /// Converte um par chave/valor da query string.
    /// `Ok(None)` = chave desconhecida ou valor vazio (ignorados).
    pub fn parse(key: &str, raw: &str) -> Result<Option<Self>, AppError> {
        let value = raw.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let field = match key {
            "product" | "name" => Self::ProductName(value.to_string()),
            "model" => Self::Model(value.to_string()),
            "category" => Self::Category(value.to_string()),
            "manufacturer" => Self::Manufacturer(value.to_string()),
            "consummable" => Self::Consummable(parse_bool(key, value)?),
            "warehouse" => Self::Warehouse(value.to_string()),
            "onShelf" => Self::OnShelf(parse_bool(key, value)?),
            "barcode" => Self::Barcode(parse_number(key, value)?),
            "serialNumber" => Self::SerialNumber(parse_number(key, value)?),
            _ => return Ok(None),
        };
        Ok(Some(field))
    }
}

// ---
// Filtros entregues ao store (todos os predicados em AND)
// ---
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    // "product" e "name" podem vir juntos: ambos precisam bater
    pub names: Vec<String>,
    pub model: Option<String>,
    pub consummable: Option<bool>,
    // `Some(vec![])` = eixo informado que não casou nada: nenhum produto passa
    pub category_ids: Option<Vec<Uuid>>,
    pub manufacturer_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub product_ids: Option<Vec<Uuid>>,
    pub warehouse: Option<String>,
    pub barcode: Option<i64>,
    pub serial_number: Option<i64>,
}

// ---
// Plano da busca: campos agrupados pela coleção onde são resolvidos
// ---
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub product: ProductFilter,
    pub item: ItemFilter,
    // Derivado: aplicado em memória depois do fetch
    pub on_shelf: Option<bool>,
}

impl QueryPlan {
    pub fn from_fields(fields: impl IntoIterator<Item = SearchField>) -> Self {
        let mut plan = Self::default();
        for field in fields {
            match field {
                SearchField::ProductName(name) => plan.product.names.push(name),
                SearchField::Model(model) => plan.product.model = Some(model),
                SearchField::Category(name) => plan.category = Some(name),
                SearchField::Manufacturer(name) => plan.manufacturer = Some(name),
                SearchField::Consummable(flag) => plan.product.consummable = Some(flag),
                SearchField::Warehouse(name) => plan.item.warehouse = Some(name),
                SearchField::OnShelf(flag) => plan.on_shelf = Some(flag),
                SearchField::Barcode(code) => plan.item.barcode = Some(code),
                SearchField::SerialNumber(serial) => plan.item.serial_number = Some(serial),
            }
        }
        // Ordem estável, independente da ordem da query string
        plan.product.names.sort();
        plan
    }

    /// Lê a query string inteira. Sem nenhum campo reconhecido = 400.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut fields = Vec::with_capacity(params.len());
        for (key, raw) in params {
            if let Some(field) = SearchField::parse(key, raw)? {
                fields.push(field);
            }
        }
        if fields.is_empty() {
            return Err(AppError::BadRequest(EMPTY_SEARCH_MESSAGE.to_string()));
        }
        Ok(Self::from_fields(fields))
    }

    /// Existe algum predicado no nível de produto (incluindo os dois saltos)?
    pub fn needs_products(&self) -> bool {
        self.category.is_some()
            || self.manufacturer.is_some()
            || !self.product.names.is_empty()
            || self.product.model.is_some()
            || self.product.consummable.is_some()
    }
}

// ---
// Busca rápida por um termo só
// ---
#[derive(Debug, Clone, PartialEq)]
pub enum QuickSearchTerm {
    // Código de barras OU número de série
    Number(i64),
    // Armazém, produto, modelo, categoria ou fabricante (OR)
    Text(String),
}

impl QuickSearchTerm {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let term = raw.trim();
        if term.is_empty() {
            return Err(AppError::BadRequest(EMPTY_SEARCH_MESSAGE.to_string()));
        }
        Ok(match term.parse::<i64>() {
            Ok(n) => Self::Number(n),
            Err(_) => Self::Text(term.to_string()),
        })
    }
}

// ---
// Valores para montar os formulários de busca no cliente
// ---
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeOption {
    // employeeId "humano"
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchableFields {
    pub categories: Vec<NamedRef>,
    pub manufacturers: Vec<NamedRef>,
    pub departments: Vec<NamedRef>,
    pub employees: Vec<EmployeeOption>,
    pub ids_with_no_account: Vec<i64>,
    pub warehouses: Vec<String>,
    pub units: Vec<String>,
    pub access_levels: AccessLevels,
    pub conditions: Vec<ItemCondition>,
    pub checked_out_barcodes: Vec<i64>,
    pub checked_in_barcodes: Vec<i64>,
    pub products: Vec<ProductRecord>,
}
