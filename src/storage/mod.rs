mod memory_store;

use thiserror::Error;

use crate::models::ParsedTransaction;
use crate::types::BusinessId;

pub use memory_store::MemoryStore;

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("Transaction [{transaction_id}] already exists for business [{business_id}]")]
    Duplicate {
        business_id: BusinessId,
        transaction_id: String
    }
}

/// Boundary to wherever imported transactions ultimately live.
///
/// `insert` must be atomic per row: the duplicate check and the write are one
/// operation, so two concurrent uploads carrying the same transaction id
/// cannot both land it. A failed insert must leave existing data untouched.
pub trait TransactionStore: Send + Sync + 'static {
    fn exists(&self, business_id: BusinessId, transaction_id: &str) -> bool;
    fn insert(&self, business_id: BusinessId, transaction: ParsedTransaction) -> Result<(), InsertError>;
}
