//! Sort-order manager.
//!
//! A parent's custom sort order is the Ids of its ranked children, ordered
//! by ascending rank and joined by the configured delimiter. Rank 0 means
//! "unranked" and never appears in the order.

use crate::error::ProvisionResult;
use crate::provisioner::{SetScope, TaxonomyProvisioner};
use termsync_store::ParentRef;
use termsync_types::TermStoreId;
use tracing::debug;

/// Builds the persisted order for a list of `(child, rank)` pairs.
///
/// Children with rank 0 are left out. Equal ranks keep their input order.
/// Returns `None` when no child is ranked.
///
/// ```
/// use termsync_engine::custom_sort_order;
/// use termsync_types::TermStoreId;
///
/// let (a, b, c) = (TermStoreId::new(), TermStoreId::new(), TermStoreId::new());
/// let order = custom_sort_order(&[(a, 3), (b, 1), (c, 2)], ':').unwrap();
/// assert_eq!(order, format!("{b}:{c}:{a}"));
/// ```
pub fn custom_sort_order(children: &[(TermStoreId, u32)], delimiter: char) -> Option<String> {
    let mut ranked: Vec<_> = children.iter().filter(|(_, rank)| *rank > 0).collect();
    if ranked.is_empty() {
        return None;
    }
    ranked.sort_by_key(|(_, rank)| *rank);

    let ids: Vec<String> = ranked.iter().map(|(id, _)| id.to_string()).collect();
    Some(ids.join(&delimiter.to_string()))
}

/// Ranked children known for one parent during a run, and the order that
/// parent currently has in the store.
#[derive(Debug, Default)]
pub(crate) struct SiblingRanks {
    ranked: Vec<(TermStoreId, u32)>,
    persisted: Option<String>,
}

impl SiblingRanks {
    fn insert(&mut self, id: TermStoreId, rank: u32) {
        match self.ranked.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = rank,
            None => self.ranked.push((id, rank)),
        }
    }
}

impl TaxonomyProvisioner<'_> {
    /// Adds ranked children to the run's table for `parent`.
    pub(crate) fn record_ranks(
        &mut self,
        parent: ParentRef,
        scope: &SetScope,
        ranked: Vec<(TermStoreId, u32)>,
    ) -> ProvisionResult<()> {
        if !self.ranks.contains_key(&parent) {
            let persisted = self.current_sort_order(parent, scope)?;
            self.ranks.insert(
                parent,
                SiblingRanks {
                    ranked: Vec::new(),
                    persisted,
                },
            );
        }
        if let Some(entry) = self.ranks.get_mut(&parent) {
            for (id, rank) in ranked {
                entry.insert(id, rank);
            }
        }
        Ok(())
    }

    /// Commits the order recorded for `parent` if it differs from what the
    /// store has.
    pub(crate) fn commit_sort_order(&mut self, parent: ParentRef) -> ProvisionResult<()> {
        let Some(entry) = self.ranks.get_mut(&parent) else {
            return Ok(());
        };
        let Some(order) = custom_sort_order(&entry.ranked, self.config.sort_order_delimiter) else {
            return Ok(());
        };
        if entry.persisted.as_deref() == Some(order.as_str()) {
            debug!("Sort order of {} unchanged", parent);
            return Ok(());
        }

        debug!("Setting sort order of {} to {}", parent, order);
        self.changes.set_custom_sort_order(parent, &order);
        entry.persisted = Some(order);
        self.flush()
    }

    fn current_sort_order(
        &self,
        parent: ParentRef,
        scope: &SetScope,
    ) -> ProvisionResult<Option<String>> {
        Ok(match parent {
            ParentRef::Set(id) => self
                .store
                .term_set(scope.group_id, id)?
                .and_then(|s| s.custom_sort_order),
            ParentRef::Term(id) => self.store.term(id)?.and_then(|t| t.custom_sort_order),
        })
    }
}
