// Adapters layer: concrete store backends, the HTTP surface and exports.

pub mod csv_export;
pub mod http;
pub mod jsonl_store;
pub mod memory_store;
