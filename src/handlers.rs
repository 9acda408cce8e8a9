pub mod auth;
pub mod catalog;
pub mod inventory;
pub mod search;
pub mod staff;
pub mod users;
