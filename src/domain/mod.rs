// Domain layer: the contact message model and the storage port.

pub mod model;
pub mod ports;
