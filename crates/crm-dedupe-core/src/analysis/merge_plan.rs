use crate::model::{ClientRecord, DuplicateGroup};
use serde::Serialize;
use tracing::info;

/// Proposed resolution of one duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct MergeEntry {
    pub group_id: String,
    /// The surviving record, with `total_paid` summed over the whole group.
    pub keep: ClientRecord,
    pub remove_ids: Vec<String>,
}

/// A merge proposal for reviewed duplicate groups. Building it never touches
/// stored data; applying it is left to the backend's merge operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergePlan {
    pub entries: Vec<MergeEntry>,
}

impl MergePlan {
    /// For each group keep the first client, fold the payments of the others
    /// into it and mark the rest for removal. Groups with fewer than two
    /// clients are skipped.
    pub fn build(groups: &[DuplicateGroup]) -> Self {
        let mut entries = Vec::new();

        for group in groups {
            let Some((first, rest)) = group.clients.split_first() else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let paid: Option<f64> = group
                .clients
                .iter()
                .filter_map(|c| c.total_paid)
                .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v));

            let mut keep = first.clone();
            keep.total_paid = paid;

            entries.push(MergeEntry {
                group_id: group.id.clone(),
                keep,
                remove_ids: rest.iter().map(|c| c.id.clone()).collect(),
            });
        }

        let plan = MergePlan { entries };
        info!(
            "Merge plan: {} groups, {} clients to remove",
            plan.entries.len(),
            plan.removal_count()
        );
        plan
    }

    pub fn removal_count(&self) -> usize {
        self.entries.iter().map(|e| e.remove_ids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
