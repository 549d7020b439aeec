//! In-process run id sequence
//!
//! Seeded from the maximum id already stored in the warehouse. Every
//! allocation takes the lock, so concurrent submissions in one process
//! never share an id. Separate processes still need a single writer.

use async_trait::async_trait;
use domain::repositories::{RunIdAllocator, WarehouseTable};
use domain::{DomainResult, RunId};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

pub struct SequenceRunIdAllocator {
    seed: RunId,
    issued: Mutex<HashMap<WarehouseTable, RunId>>,
}

impl SequenceRunIdAllocator {
    /// `stored_max` is the current `MAX(ID)`; `None` for an empty table
    pub fn from_stored_max(stored_max: Option<&str>) -> DomainResult<Self> {
        Ok(Self {
            seed: RunId::next_after(stored_max)?,
            issued: Mutex::new(HashMap::new()),
        })
    }

    /// Last id handed out for `table`, if any
    pub async fn last_issued(&self, table: WarehouseTable) -> Option<RunId> {
        self.issued.lock().await.get(&table).copied()
    }
}

#[async_trait]
impl RunIdAllocator for SequenceRunIdAllocator {
    async fn allocate(&self, table: WarehouseTable) -> DomainResult<RunId> {
        let mut issued = self.issued.lock().await;
        let next = match issued.get(&table) {
            Some(last) => last.next()?,
            None => self.seed,
        };
        issued.insert(table, next);

        debug!(table = %table, run_id = %next, "Allocated run id");
        Ok(next)
    }
}
