/// Key-value store abstraction and its backends.
pub mod kv_store;
/// Persisted shapes of tournaments and score cards.
pub mod models;
/// Storage abstraction layer errors.
pub mod storage;
