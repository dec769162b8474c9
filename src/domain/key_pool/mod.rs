//! Key pool domain: pool entities, storage trait, and the batch import
//! contract.

mod batch;
mod entity;
mod repository;

pub use batch::{
    AddApiKeysBatchResponse, BatchSummary, KeyImportCandidate, KeyImportResult, KeyImportStatus,
    KeyImporter,
};
pub use entity::{PoolKey, PoolKeyStatus};
pub use repository::KeyPoolRepository;

#[cfg(test)]
pub use batch::mock;
