use ahash::AHashSet;
use crm_dedupe_core::analysis::duplicates::{
    DuplicateScanner, ScanOptions, EXACT_CONFIDENCE, NAME_CONFIDENCE,
};
use crm_dedupe_core::analysis::merge_plan::MergePlan;
use crm_dedupe_core::analysis::normalize::normalize_phone;
use crm_dedupe_core::{scan, ClientRecord, DuplicateGroup, DuplicateType, ScanReporter};
use std::sync::Mutex;

fn client(id: &str, name: &str, phone: &str) -> ClientRecord {
    ClientRecord::new(id, name, phone)
}

fn ids(group: &DuplicateGroup) -> Vec<&str> {
    group.client_ids().collect()
}

fn assert_group_invariants(clients: &[ClientRecord], groups: &[DuplicateGroup]) {
    let mut in_exact: AHashSet<&str> = AHashSet::new();
    for group in groups {
        assert!(group.clients.len() >= 2, "group {} too small", group.id);
        if group.duplicate_type == DuplicateType::Exact {
            for id in group.client_ids() {
                assert!(in_exact.insert(id), "{} is in two exact groups", id);
            }
        }
    }
    for group in groups.iter().filter(|g| g.duplicate_type == DuplicateType::Name) {
        for id in group.client_ids() {
            assert!(!in_exact.contains(id), "{} is in an exact and a name group", id);
        }
    }

    for a in clients {
        for b in clients {
            if a.id == b.id {
                continue;
            }
            let pa = normalize_phone(&a.phone, "+243");
            let pb = normalize_phone(&b.phone, "+243");
            if !pa.is_empty() && pa == pb {
                assert!(
                    groups.iter().any(|g| g.duplicate_type == DuplicateType::Exact
                        && g.contains(&a.id)
                        && g.contains(&b.id)),
                    "{} and {} share a phone but no exact group",
                    a.id,
                    b.id
                );
            }
        }
    }
}

#[test]
fn test_scan_empty_list() {
    assert!(scan(&[]).is_empty());
}

#[test]
fn test_scan_single_client() {
    assert!(scan(&[client("1", "Paul Kabila", "0812345678")]).is_empty());
}

#[test]
fn test_scan_exact_phone_scenario() {
    let clients = vec![
        client("1", "Paul Kabila", "0812345678"),
        client("2", "Paul Kabila", "0812345678"),
        client("3", "Marie Tshala", "0899999999"),
    ];

    let groups = scan(&clients);

    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.id, "dup-1");
    assert_eq!(ids(group), vec!["1", "2"]);
    assert_eq!(group.duplicate_type, DuplicateType::Exact);
    assert_eq!(group.confidence, 100);
    assert!(!groups.iter().any(|g| g.contains("3")));
}

#[test]
fn test_scan_matches_phones_across_formats() {
    let clients = vec![
        client("a", "Alice", "+243 812 345 678"),
        client("b", "Bob", "(081) 234-5678"),
        client("c", "Carl", "00812345678"),
    ];

    let groups = scan(&clients);

    assert_eq!(groups.len(), 1);
    assert_eq!(ids(&groups[0]), vec!["a", "b", "c"]);
    assert_group_invariants(&clients, &groups);
}

#[test]
fn test_scan_groups_names_differing_in_case_and_spacing() {
    let clients = vec![
        client("1", "Jean Mukendi", "0811111111"),
        client("2", "jean  mukendi", "0822222222"),
    ];

    let groups = scan(&clients);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].duplicate_type, DuplicateType::Name);
    assert_eq!(groups[0].confidence, NAME_CONFIDENCE);
    assert_eq!(ids(&groups[0]), vec!["1", "2"]);
}

#[test]
fn test_scan_groups_similar_names() {
    let clients = vec![
        client("1", "Paul Kabila", "0811111111"),
        client("2", "Marie Tshala", "0822222222"),
        client("3", "Paul Kabela", "0833333333"),
    ];

    let groups = scan(&clients);

    assert_eq!(groups.len(), 1);
    assert_eq!(ids(&groups[0]), vec!["1", "3"]);
}

#[test]
fn test_scan_threshold_is_strict() {
    // two substitutions over ten letters: exactly 80%
    let clients = vec![
        client("1", "abcdefghij", ""),
        client("2", "abcdefghxy", ""),
    ];
    assert!(scan(&clients).is_empty());
}

#[test]
fn test_exact_match_suppresses_name_match() {
    let clients = vec![
        client("1", "Paul Kabila", "0812345678"),
        client("2", "Paul Kabila", "0812345678"),
        client("3", "Paul Kabila", "0899999999"),
    ];

    let groups = scan(&clients);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].duplicate_type, DuplicateType::Exact);
    assert_eq!(groups[0].confidence, EXACT_CONFIDENCE);
    assert_group_invariants(&clients, &groups);
}

#[test]
fn test_name_group_keeps_members_outside_exact_groups() {
    let clients = vec![
        client("1", "Paul Kabila", "0812345678"),
        client("2", "Paul Kabila", "0812345678"),
        client("3", "Paul Kabila", "0899999999"),
        client("4", "Paul Kabilla", "0877777777"),
    ];

    let groups = scan(&clients);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, "dup-1");
    assert_eq!(groups[0].duplicate_type, DuplicateType::Exact);
    assert_eq!(groups[1].id, "dup-2");
    assert_eq!(groups[1].duplicate_type, DuplicateType::Name);
    assert_eq!(ids(&groups[1]), vec!["3", "4"]);
    assert_group_invariants(&clients, &groups);
}

#[test]
fn test_missing_fields_never_match() {
    let clients = vec![
        client("1", "", ""),
        client("2", "", "n/a"),
        client("3", "1234", "---"),
    ];
    assert!(scan(&clients).is_empty());
}

#[test]
fn test_name_clustering_depends_on_input_order() {
    let rep = client("r", "aaaaaaaaaa", "");
    let near = client("x", "aaaaaaaaab", "");
    let far = client("y", "aaaaaaaabb", "");

    // "y" is only 80% like the representative "r", so it starts its own cluster
    let groups = scan(&[rep.clone(), near.clone(), far.clone()]);
    assert_eq!(groups.len(), 1);
    assert_eq!(ids(&groups[0]), vec!["r", "x"]);

    // with "y" first, "x" joins "y" and "r" is left alone
    let groups = scan(&[far, rep, near]);
    assert_eq!(groups.len(), 1);
    assert_eq!(ids(&groups[0]), vec!["y", "x"]);
}

#[test]
fn test_invariants_on_mixed_input() {
    let clients = vec![
        client("1", "Jean Mukendi", "0811111111"),
        client("2", "Jean Mukendi", "+243811111111"),
        client("3", "Jeanne Mukendi", "0822222222"),
        client("4", "Marie Tshala", "0822222222"),
        client("5", "Mari Tshala", "0833333333"),
        client("6", "Marie Tshala", "0844444444"),
        client("7", "Pierre Ilunga", ""),
        client("8", "Pierre Ilunga", ""),
        client("9", "Odette", "0811111111"),
    ];

    let groups = scan(&clients);

    assert_group_invariants(&clients, &groups);
    let exact: Vec<_> = groups
        .iter()
        .filter(|g| g.duplicate_type == DuplicateType::Exact)
        .collect();
    assert_eq!(exact.len(), 2);
    assert_eq!(ids(exact[0]), vec!["1", "2", "9"]);
    assert_eq!(ids(exact[1]), vec!["3", "4"]);
    assert!(groups.iter().any(|g| ids(g) == vec!["5", "6"]));
    assert!(groups.iter().any(|g| ids(g) == vec!["7", "8"]));
}

#[test]
fn test_custom_country_prefix() {
    let scanner = DuplicateScanner::new(ScanOptions {
        country_prefix: "+33".to_string(),
        ..ScanOptions::default()
    });
    let clients = vec![
        client("1", "Anne", "06 12 34 56 78"),
        client("2", "Bruno", "+33612345678"),
    ];

    let groups = scanner.scan(&clients, &crm_dedupe_core::SilentReporter);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].duplicate_type, DuplicateType::Exact);
}

#[derive(Default)]
struct RecordingReporter {
    phone: Mutex<Vec<(usize, usize)>>,
    name: Mutex<Vec<(usize, usize)>>,
    completed: Mutex<Option<usize>>,
}

impl ScanReporter for RecordingReporter {
    fn on_phone_progress(&self, processed: usize, total: usize) {
        self.phone.lock().unwrap().push((processed, total));
    }

    fn on_name_progress(&self, processed: usize, total: usize) {
        self.name.lock().unwrap().push((processed, total));
    }

    fn on_scan_complete(&self, groups: usize, _duration_secs: f64) {
        *self.completed.lock().unwrap() = Some(groups);
    }
}

#[test]
fn test_progress_reported_per_batch() {
    let scanner = DuplicateScanner::new(ScanOptions {
        batch_size: 2,
        ..ScanOptions::default()
    });
    let clients: Vec<ClientRecord> = (0..5)
        .map(|i| client(&i.to_string(), &format!("Client {}", i), "0812345678"))
        .collect();
    let reporter = RecordingReporter::default();

    let groups = scanner.scan(&clients, &reporter);

    assert_eq!(*reporter.phone.lock().unwrap(), vec![(2, 5), (4, 5), (5, 5)]);
    assert_eq!(*reporter.name.lock().unwrap(), vec![(2, 5), (4, 5), (5, 5)]);
    assert_eq!(*reporter.completed.lock().unwrap(), Some(groups.len()));
}

#[test]
fn test_merge_plan_keeps_first_and_sums_payments() {
    let clients = vec![
        client("1", "Paul Kabila", "0812345678").with_total_paid(100.0),
        client("2", "Paul Kabila", "0812345678").with_total_paid(50.5),
        client("3", "Paul Kabila", "0812345678"),
    ];
    let groups = scan(&clients);

    let plan = MergePlan::build(&groups);

    assert_eq!(plan.entries.len(), 1);
    let entry = &plan.entries[0];
    assert_eq!(entry.group_id, "dup-1");
    assert_eq!(entry.keep.id, "1");
    assert_eq!(entry.keep.total_paid, Some(150.5));
    assert_eq!(entry.remove_ids, vec!["2", "3"]);
    assert_eq!(plan.removal_count(), 2);
}

#[test]
fn test_merge_plan_empty_for_no_groups() {
    let plan = MergePlan::build(&[]);
    assert!(plan.is_empty());
    assert_eq!(plan.removal_count(), 0);
}
