//! KidSafe PC agent adapters: SQLite, hosts file, OS commands and the
//! Firebase REST store.
pub mod database;
pub mod hosts;
pub mod remote;
pub mod repositories;
pub mod system;
