// Application layer: wires config, store backends and the HTTP surface together.

pub mod export;
pub mod server;
