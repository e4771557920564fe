//! Application services orchestrating the store and the cache.

pub mod error;
pub mod health;
pub mod jokes;
pub mod repos;
pub mod seed;
