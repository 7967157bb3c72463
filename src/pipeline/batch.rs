use std::collections::HashSet;

use crate::model::work_item::WorkItemId;

/// Split `ids` into consecutive chunks of at most `size`, keeping order.
pub fn partition(ids: &[WorkItemId], size: usize) -> Vec<Vec<WorkItemId>> {
    let size = size.max(1);
    ids.chunks(size).map(<[WorkItemId]>::to_vec).collect()
}

/// Keep the first occurrence of every id.
pub fn dedupe(ids: Vec<WorkItemId>) -> Vec<WorkItemId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
