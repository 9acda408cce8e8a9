pub mod auth;
pub mod catalog_service;
pub mod inventory_service;
pub mod search_service;
pub mod staff_service;
pub mod user_service;
