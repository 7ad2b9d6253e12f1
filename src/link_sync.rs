//! Many-to-many link synchronisation.
//!
//! Given the complete desired set of related ids for one objective, read the
//! persisted set once, then issue only the missing links and the stale
//! unlinks. Writes run one at a time; the first failure aborts the loop and
//! is returned. Writes already applied are not rolled back.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::{
    client::ApiClient,
    error::ApiError,
    models::{Id, ObjectiveLevel},
    services::paths,
};

/// The three operations a link set exposes.
#[async_trait]
pub trait RelationStore: Send + Sync {
    async fn current(&self) -> Result<Vec<Id>, ApiError>;
    async fn link(&self, related: &str) -> Result<(), ApiError>;
    async fn unlink(&self, related: &str) -> Result<(), ApiError>;

    /// Cache key patterns made stale by a change to this set.
    fn invalidates(&self) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub added: Vec<Id>,
    pub removed: Vec<Id>,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// `(desired − current, current − desired)`, both in id order.
pub fn diff(current: &BTreeSet<Id>, desired: &BTreeSet<Id>) -> (Vec<Id>, Vec<Id>) {
    let to_add = desired.difference(current).cloned().collect();
    let to_remove = current.difference(desired).cloned().collect();
    (to_add, to_remove)
}

pub async fn sync<S>(store: &S, desired: &BTreeSet<Id>) -> Result<SyncReport, ApiError>
where
    S: RelationStore + ?Sized,
{
    let current: BTreeSet<Id> = store.current().await?.into_iter().collect();
    let (to_add, to_remove) = diff(&current, desired);
    tracing::debug!(
        current = current.len(),
        add = to_add.len(),
        remove = to_remove.len(),
        "link diff"
    );

    let mut report = SyncReport::default();
    for id in to_add {
        store.link(&id).await?;
        report.added.push(id);
    }
    for id in to_remove {
        store.unlink(&id).await?;
        report.removed.push(id);
    }
    Ok(report)
}

/// The REST-backed link set of one module or topic objective.
pub struct ObjectiveLinks<'a> {
    api: &'a ApiClient,
    level: ObjectiveLevel,
    parent_id: &'a str,
    objective_id: &'a str,
}

impl<'a> ObjectiveLinks<'a> {
    pub fn new(api: &'a ApiClient, level: ObjectiveLevel, parent_id: &'a str, objective_id: &'a str) -> Self {
        Self {
            api,
            level,
            parent_id,
            objective_id,
        }
    }

    /// Syncs, then drops the cache entries this set declares stale.
    pub async fn sync(&self, desired: &BTreeSet<Id>) -> Result<SyncReport, ApiError> {
        let outcome = crate::link_sync::sync(self, desired).await;
        match &outcome {
            Ok(report) => tracing::info!(
                level = %self.level,
                objective_id = self.objective_id,
                added = report.added.len(),
                removed = report.removed.len(),
                "objective links synced"
            ),
            Err(e) => tracing::error!(
                level = %self.level,
                objective_id = self.objective_id,
                error = %e,
                "objective link sync aborted"
            ),
        }
        // a failed run may still have written some links
        self.api.invalidate_all(&self.invalidates()).await;
        outcome
    }

    /// Links every id without reading first; for objectives created just now.
    pub async fn link_all<'i, I>(&self, ids: I) -> Result<usize, ApiError>
    where
        I: IntoIterator<Item = &'i Id>,
    {
        let mut n = 0;
        for id in ids {
            RelationStore::link(self, id).await?;
            n += 1;
        }
        Ok(n)
    }
}

#[async_trait]
impl RelationStore for ObjectiveLinks<'_> {
    async fn current(&self) -> Result<Vec<Id>, ApiError> {
        let rows = self
            .api
            .linked(self.level, self.parent_id, self.objective_id)
            .await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    async fn link(&self, related: &str) -> Result<(), ApiError> {
        self.api
            .link(self.level, self.parent_id, self.objective_id, related, false)
            .await
    }

    async fn unlink(&self, related: &str) -> Result<(), ApiError> {
        self.api
            .unlink(self.level, self.parent_id, self.objective_id, related)
            .await
    }

    fn invalidates(&self) -> Vec<String> {
        vec![paths::objectives(self.level, self.parent_id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<Id> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_touches_only_the_symmetric_difference() {
        let (add, remove) = diff(&set(&["A", "B", "C"]), &set(&["B", "C", "D"]));
        assert_eq!(add, vec!["D".to_string()]);
        assert_eq!(remove, vec!["A".to_string()]);
    }

    #[test]
    fn diff_of_equal_sets_is_empty() {
        let s = set(&["x", "y"]);
        let (add, remove) = diff(&s, &s);
        assert!(add.is_empty() && remove.is_empty());
    }
}
