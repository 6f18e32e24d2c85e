pub mod cors;
pub mod fault;

pub use cors::{CorsPolicy, cors_middleware};
pub use fault::catch_fault_layer;
