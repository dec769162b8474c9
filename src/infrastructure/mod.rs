//! Infrastructure layer: concrete implementations of the domain seams plus
//! process-level concerns.

pub mod key_pool;
pub mod logging;
pub mod quota;
pub mod validation;
