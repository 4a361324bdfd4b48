//! Loading and saving the library through a key-value store.

pub mod gateway;

pub use gateway::PersistenceGateway;
