//! Domain layer: entities, status taxonomies, derived-state functions, and
//! the async traits implemented by the infrastructure layer. No I/O here.

pub mod error;
pub mod key_pool;
pub mod validation;

pub use error::DomainError;
