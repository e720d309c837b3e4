use super::normalize::{normalize_name, normalize_phone};
use super::similarity::similarity_percent;
use crate::config::{DEFAULT_BATCH_SIZE, DEFAULT_COUNTRY_PREFIX, DEFAULT_NAME_SIMILARITY_THRESHOLD};
use crate::model::{ClientRecord, DuplicateGroup, DuplicateType};
use crate::progress::{ScanReporter, SilentReporter};
use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Confidence attached to every phone-match group.
pub const EXACT_CONFIDENCE: u8 = 100;
/// Confidence attached to every name-similarity group. A fixed value per
/// classification, not a function of the measured similarity.
pub const NAME_CONFIDENCE: u8 = 85;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub country_prefix: String,
    pub name_similarity_threshold: f64,
    pub batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            country_prefix: DEFAULT_COUNTRY_PREFIX.to_string(),
            name_similarity_threshold: DEFAULT_NAME_SIMILARITY_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Default)]
pub struct DuplicateScanner {
    options: ScanOptions,
}

/// Scan with default options and no progress reporting.
pub fn scan(clients: &[ClientRecord]) -> Vec<DuplicateGroup> {
    DuplicateScanner::default().scan(clients, &SilentReporter)
}

impl DuplicateScanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Propose duplicate groups for an already-loaded list of clients:
    /// 1. Normalize phones and names (parallel, order preserved)
    /// 2. Group by normalized phone → `exact` groups
    /// 3. Greedy name clustering against cluster representatives
    /// 4. Drop clients already in an `exact` group from name clusters
    /// 5. Emit remaining clusters of two or more as `name` groups
    ///
    /// Never fails: missing or malformed fields only reduce match quality.
    pub fn scan(&self, clients: &[ClientRecord], reporter: &dyn ScanReporter) -> Vec<DuplicateGroup> {
        let start = Instant::now();
        let total = clients.len();
        reporter.on_scan_start(total);
        info!("Scanning {} clients for duplicates...", total);

        let keys: Vec<(String, String)> = clients
            .par_iter()
            .map(|c| {
                (
                    normalize_phone(&c.phone, &self.options.country_prefix),
                    normalize_name(&c.name),
                )
            })
            .collect();

        // Phase 1: phone buckets in first-seen order
        let mut phone_buckets = KeyedBuckets::default();
        for (batch_index, batch) in keys.chunks(self.options.batch_size.max(1)).enumerate() {
            let offset = batch_index * self.options.batch_size.max(1);
            for (i, (phone, _)) in batch.iter().enumerate() {
                if !phone.is_empty() {
                    phone_buckets.push(phone, offset + i);
                }
            }
            reporter.on_phone_progress(offset + batch.len(), total);
        }

        // Phase 2: greedy name clusters
        let mut name_clusters = NameClusters::new(self.options.name_similarity_threshold);
        for (batch_index, batch) in keys.chunks(self.options.batch_size.max(1)).enumerate() {
            let offset = batch_index * self.options.batch_size.max(1);
            for (i, (_, name)) in batch.iter().enumerate() {
                if !name.is_empty() {
                    name_clusters.assign(name, offset + i);
                }
            }
            reporter.on_name_progress(offset + batch.len(), total);
        }

        // Phase 3: emit groups, exact first
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut in_exact_group: AHashSet<usize> = AHashSet::new();

        for (phone, members) in phone_buckets.into_buckets() {
            if members.len() < 2 {
                continue;
            }
            trace!("Phone {} shared by {} clients", phone, members.len());
            in_exact_group.extend(members.iter().copied());
            groups.push(build_group(
                groups.len() + 1,
                clients,
                &members,
                DuplicateType::Exact,
                EXACT_CONFIDENCE,
            ));
        }
        let exact_count = groups.len();

        for cluster in name_clusters.into_clusters() {
            let members: Vec<usize> = cluster
                .members
                .into_iter()
                .filter(|idx| !in_exact_group.contains(idx))
                .collect();
            if members.len() < 2 {
                continue;
            }
            trace!(
                "Name cluster '{}' has {} clients outside exact groups",
                cluster.representative,
                members.len()
            );
            groups.push(build_group(
                groups.len() + 1,
                clients,
                &members,
                DuplicateType::Name,
                NAME_CONFIDENCE,
            ));
        }

        let duration = start.elapsed();
        debug!(
            "Duplicate scan completed in {:.3}s: {} exact groups, {} name groups",
            duration.as_secs_f64(),
            exact_count,
            groups.len() - exact_count,
        );
        reporter.on_scan_complete(groups.len(), duration.as_secs_f64());

        groups
    }
}

fn build_group(
    sequence: usize,
    clients: &[ClientRecord],
    members: &[usize],
    duplicate_type: DuplicateType,
    confidence: u8,
) -> DuplicateGroup {
    DuplicateGroup {
        id: format!("dup-{}", sequence),
        clients: members.iter().map(|&idx| clients[idx].clone()).collect(),
        duplicate_type,
        confidence,
    }
}

/// Buckets of record indices keyed by string, iterated in first-seen key order.
#[derive(Default)]
struct KeyedBuckets {
    slots: AHashMap<String, usize>,
    buckets: Vec<(String, Vec<usize>)>,
}

impl KeyedBuckets {
    fn push(&mut self, key: &str, idx: usize) {
        match self.slots.get(key) {
            Some(&slot) => self.buckets[slot].1.push(idx),
            None => {
                self.slots.insert(key.to_string(), self.buckets.len());
                self.buckets.push((key.to_string(), vec![idx]));
            }
        }
    }

    fn into_buckets(self) -> impl Iterator<Item = (String, Vec<usize>)> {
        self.buckets.into_iter()
    }
}

struct NameCluster {
    representative: String,
    members: Vec<usize>,
}

/// Greedy, order-sensitive clustering. Each name is compared only with the
/// representatives of clusters created before it and joins the first one it
/// is similar enough to; otherwise it founds a new cluster. The result
/// depends on input order and is not a globally optimal clustering.
struct NameClusters {
    threshold: f64,
    // name → slot of the cluster it joined
    seen: AHashMap<String, usize>,
    clusters: Vec<NameCluster>,
}

impl NameClusters {
    fn new(threshold: f64) -> Self {
        Self {
            threshold,
            seen: AHashMap::new(),
            clusters: Vec::new(),
        }
    }

    fn assign(&mut self, name: &str, idx: usize) {
        if let Some(&slot) = self.seen.get(name) {
            self.clusters[slot].members.push(idx);
            return;
        }

        let matched = self
            .clusters
            .iter()
            .position(|cluster| similarity_percent(name, &cluster.representative) > self.threshold);

        match matched {
            Some(slot) => {
                self.seen.insert(name.to_string(), slot);
                self.clusters[slot].members.push(idx);
            }
            None => {
                self.seen.insert(name.to_string(), self.clusters.len());
                self.clusters.push(NameCluster {
                    representative: name.to_string(),
                    members: vec![idx],
                });
            }
        }
    }

    fn into_clusters(self) -> Vec<NameCluster> {
        self.clusters
    }
}
