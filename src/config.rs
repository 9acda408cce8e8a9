// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        CatalogRepository, ItemRepository, SearchRepository, SearchStore, StaffRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, inventory_service::InventoryService,
        search_service::SearchService, staff_service::StaffService, user_service::UserService,
    },
};

// ---
// Configuração lida do ambiente (.env opcional)
// ---
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_days: i64,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub search_timeout: Duration,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).with_context(|| format!("{name} deve ser definida"))
}

fn or_default<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} tem um valor inválido: '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiry_days: or_default("JWT_EXPIRY_DAYS", 20)?,
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:3000".to_string())?,
            db_max_connections: or_default("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(or_default("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            search_timeout: Duration::from_secs(or_default("SEARCH_TIMEOUT_SECS", 10)?),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub catalog_service: CatalogService,
    pub staff_service: StaffService,
    pub inventory_service: InventoryService,
    pub search_service: SearchService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(settings.db_acquire_timeout)
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let search_store: Arc<dyn SearchStore> = Arc::new(SearchRepository::new(db_pool.clone()));
        Ok(Self::from_parts(db_pool, settings, search_store))
    }

    /// Monta o gráfico de dependências. O store de busca é injetável (testes).
    pub fn from_parts(db_pool: PgPool, settings: &Settings, search_store: Arc<dyn SearchStore>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let staff_repo = StaffRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let item_repo = ItemRepository::new(db_pool.clone());
        let search_repo = SearchRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            staff_repo.clone(),
            settings.jwt_secret.clone(),
            settings.jwt_expiry_days,
            db_pool.clone(),
        );
        let user_service = UserService::new(user_repo.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), item_repo.clone());
        let staff_service = StaffService::new(staff_repo.clone(), item_repo.clone());
        let inventory_service =
            InventoryService::new(item_repo, catalog_repo, staff_repo, user_repo, search_repo);
        let search_service = SearchService::new(search_store, settings.search_timeout);

        Self {
            db_pool,
            auth_service,
            user_service,
            catalog_service,
            staff_service,
            inventory_service,
            search_service,
        }
    }
}
