use std::future::Future;
use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{LookupError, OpdbMachine};
use crate::clock::Clock;
use crate::models::{Machine, MachineRecord};

/// Local persistence for cached machines.
pub trait MachineStore: Send + Sync {
    fn find(
        &self,
        opdb_id: &str,
    ) -> impl Future<Output = Result<Option<Machine>, sqlx::Error>> + Send;

    /// Inserts or overwrites the row for `record.opdb_id` in one statement.
    fn upsert(
        &self,
        record: &MachineRecord,
    ) -> impl Future<Output = Result<Machine, sqlx::Error>> + Send;
}

/// Authoritative remote source of machine metadata.
pub trait MachineLookup: Send + Sync {
    fn fetch(
        &self,
        opdb_id: &str,
    ) -> impl Future<Output = Result<OpdbMachine, LookupError>> + Send;
}

impl<T: MachineStore> MachineStore for Arc<T> {
    fn find(
        &self,
        opdb_id: &str,
    ) -> impl Future<Output = Result<Option<Machine>, sqlx::Error>> + Send {
        (**self).find(opdb_id)
    }

    fn upsert(
        &self,
        record: &MachineRecord,
    ) -> impl Future<Output = Result<Machine, sqlx::Error>> + Send {
        (**self).upsert(record)
    }
}

impl<T: MachineLookup> MachineLookup for Arc<T> {
    fn fetch(
        &self,
        opdb_id: &str,
    ) -> impl Future<Output = Result<OpdbMachine, LookupError>> + Send {
        (**self).fetch(opdb_id)
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("machine storage failed: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::Lookup(LookupError::NotFound))
    }
}

/// Cache-aside resolver: serves rows younger than the freshness window from
/// the store and refreshes everything else from the remote lookup.
///
/// A failed refresh returns the error and leaves any stale row in place; stale
/// data is never served as a fallback. Misses on the remote side are not
/// cached.
pub struct MachineCache<S, L> {
    store: S,
    lookup: L,
    clock: Arc<dyn Clock>,
    freshness: Duration,
}

impl<S: MachineStore, L: MachineLookup> MachineCache<S, L> {
    pub fn new(store: S, lookup: L, clock: Arc<dyn Clock>, freshness: Duration) -> Self {
        Self {
            store,
            lookup,
            clock,
            freshness,
        }
    }

    pub async fn resolve(&self, opdb_id: &str) -> Result<Machine, ResolveError> {
        let now = self.clock.now();
        let refreshing = match self.store.find(opdb_id).await? {
            Some(machine) if now - machine.last_synced_at < self.freshness => {
                debug!(opdb_id, "machine cache hit");
                return Ok(machine);
            }
            Some(_) => true,
            None => false,
        };

        let remote = self.lookup.fetch(opdb_id).await.inspect_err(|err| {
            warn!(opdb_id, refreshing, error = %err, "machine lookup failed");
        })?;

        let record = MachineRecord::from_remote(opdb_id, remote, self.clock.now());
        let machine = self.store.upsert(&record).await?;
        info!(opdb_id, refreshing, "synchronized machine from OPDB");

        Ok(machine)
    }
}
