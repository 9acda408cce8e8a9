// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Fabricantes ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub id: Uuid,
    pub name: String,
    pub added_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Par {id, name}: usado em listas de seleção e em referências resolvidas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

// --- 3. Produtos (catálogo) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MinimumRequired {
    pub quantity: Decimal,
    pub units: Option<String>,
}

// Linha crua da tabela 'products' (referências como ids)
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub manufacturer_id: Uuid,
    pub category_id: Uuid,
    pub consummable: bool,
    pub minimum_quantity: Decimal,
    pub minimum_units: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serialização "compacta": devolvida por create/update, mantém os ids das referências.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub manufacturer: Uuid,
    pub model: Option<String>,
    pub consummable: bool,
    pub minimum_required: MinimumRequired,
    pub category: Uuid,
}

impl Product {
    pub fn minimum_required(&self) -> MinimumRequired {
        MinimumRequired {
            quantity: self.minimum_quantity,
            units: self.minimum_units.clone(),
        }
    }

    pub fn compact(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name.clone(),
            manufacturer: self.manufacturer_id,
            model: self.model.clone(),
            consummable: self.consummable,
            minimum_required: self.minimum_required(),
            category: self.category_id,
        }
    }
}

/// Produto com categoria e fabricante já resolvidos.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
    pub id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub consummable: bool,
    pub minimum_required: MinimumRequired,
    pub category: NamedRef,
    pub manufacturer: NamedRef,
}

// Linha do JOIN products + categories + manufacturers
#[derive(Debug, Clone, FromRow)]
pub struct ProductDetailRow {
    pub id: Uuid,
    pub name: String,
    pub model: Option<String>,
    pub consummable: bool,
    pub minimum_quantity: Decimal,
    pub minimum_units: Option<String>,
    pub category_id: Uuid,
    pub category_name: String,
    pub manufacturer_id: Uuid,
    pub manufacturer_name: String,
}

impl From<ProductDetailRow> for ProductDetail {
    fn from(row: ProductDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            model: row.model,
            consummable: row.consummable,
            minimum_required: MinimumRequired {
                quantity: row.minimum_quantity,
                units: row.minimum_units,
            },
            category: NamedRef { id: row.category_id, name: row.category_name },
            manufacturer: NamedRef { id: row.manufacturer_id, name: row.manufacturer_name },
        }
    }
}

/// Serialização "completa": referências achatadas para os nomes.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
    pub consummable: bool,
    pub minimum_required: MinimumRequired,
    pub category: String,
}

impl ProductDetail {
    pub fn full(&self) -> ProductView {
        ProductView {
            id: self.id,
            name: self.name.clone(),
            manufacturer: self.manufacturer.name.clone(),
            model: self.model.clone(),
            consummable: self.consummable,
            minimum_required: self.minimum_required.clone(),
            category: self.category.name.clone(),
        }
    }
}

// --- 4. Relatório de estoque baixo ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockEntry {
    pub product: ProductView,
    pub on_shelf: i64,
    // Negativo = abaixo do mínimo
    pub shortfall: Decimal,
}

// ---
// Payloads
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("The value can't be negative.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_minimum_required(val: &MinimumRequired) -> Result<(), ValidationError> {
    validate_not_negative(&val.quantity)
}

// Categoria, fabricante e departamento só têm nome
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NamePayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateNamePayload {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Uuid,
    pub category: Uuid,
    #[serde(default)]
    pub consummable: bool,
    #[validate(custom(function = "validate_minimum_required"))]
    pub minimum_required: Option<MinimumRequired>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Name can't be empty."))]
    pub name: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<Uuid>,
    pub category: Option<Uuid>,
    pub consummable: Option<bool>,
    #[validate(custom(function = "validate_minimum_required"))]
    pub minimum_required: Option<MinimumRequired>,
}
