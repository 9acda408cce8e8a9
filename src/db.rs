pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod item_repo;
pub use item_repo::ItemRepository;
pub mod search_repo;
pub use search_repo::{SearchRepository, SearchStore};
pub mod staff_repo;
pub use staff_repo::StaffRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

#[cfg(test)]
pub mod memory_store;
