use crate::models::ParsedTransaction;
use crate::storage::{InsertError, TransactionStore};
use crate::types::BusinessId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// In-memory transaction store backed by a concurrent map, keyed by
/// `(business_id, transaction_id)` so businesses never collide.
pub struct MemoryStore {
    transactions: DashMap<(BusinessId, String), ParsedTransaction>
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new()
        }
    }

    pub fn get(&self, business_id: BusinessId, transaction_id: &str) -> Option<ParsedTransaction> {
        self.transactions
            .get(&(business_id, transaction_id.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn count(&self, business_id: BusinessId) -> usize {
        self.transactions.iter().filter(|entry| entry.key().0 == business_id).count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore for MemoryStore {
    fn exists(&self, business_id: BusinessId, transaction_id: &str) -> bool {
        self.transactions.contains_key(&(business_id, transaction_id.to_string()))
    }

    fn insert(&self, business_id: BusinessId, transaction: ParsedTransaction) -> Result<(), InsertError> {
        //NOTE: The entry API holds the shard lock across the check and the
        //      write, which is what closes the check-then-act race between
        //      concurrent uploads.
        match self.transactions.entry((business_id, transaction.transaction_id.clone())) {
            Entry::Occupied(_) => Err(InsertError::Duplicate {
                business_id,
                transaction_id: transaction.transaction_id
            }),
            Entry::Vacant(slot) => {
                slot.insert(transaction);
                Ok(())
            }
        }
    }
}
