//! Optimizer passes

mod load_forwarding;

pub use load_forwarding::LoadForwarding;
