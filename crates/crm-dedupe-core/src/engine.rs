use crate::analysis::duplicates::DuplicateScanner;
use crate::audit::{AuditEvent, AuditEventKind, EventSink, TracingEventSink};
use crate::config::AppConfig;
use crate::error::Error;
use crate::ingest;
use crate::model::{ClientRecord, DuplicateGroup, DuplicateType};
use crate::progress::ScanReporter;
use crate::storage::Database;
use ahash::AHashSet;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct DedupeEngine {
    config: AppConfig,
    db_path: String,
    events: Arc<dyn EventSink>,
}

#[derive(Debug)]
pub struct ScanReport {
    pub load_duration: Duration,
    pub scan_duration: Duration,
    pub total_clients: usize,
    pub groups: Vec<DuplicateGroup>,
    pub exact_groups: usize,
    pub name_groups: usize,
    /// Distinct clients appearing in any group.
    pub flagged_clients: usize,
}

impl DedupeEngine {
    pub fn new(config: AppConfig) -> Self {
        let db_path = config.db_path.clone();
        Self {
            config,
            db_path,
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.db_path = path.to_string();
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn open_database(&self) -> Result<Database, Error> {
        Ok(Database::open(&self.db_path)?)
    }

    /// Load a CSV or JSON export and upsert it into the local store.
    pub fn import(&self, path: &Path) -> Result<usize, Error> {
        let clients = ingest::load_clients(path)?;
        let db = self.open_database()?;
        let written = db.insert_clients(&clients)?;
        self.events.record(AuditEvent::new(
            AuditEventKind::ClientsImported,
            json!({ "source": path.display().to_string(), "rows": written }),
        ));
        Ok(written)
    }

    /// Scan every stored client for duplicates:
    /// 1. Load all clients from SQLite
    /// 2. Run the duplicate scanner over them
    pub fn scan(&self, reporter: &dyn ScanReporter) -> Result<ScanReport, Error> {
        info!("Loading clients...");
        let load_start = Instant::now();
        let db = self.open_database()?;
        let clients = db.get_all_clients()?;
        let load_duration = load_start.elapsed();
        debug!(
            "Loaded {} clients in {:.2}s",
            clients.len(),
            load_duration.as_secs_f64()
        );

        let mut report = self.scan_records(&clients, reporter);
        report.load_duration = load_duration;
        Ok(report)
    }

    /// Scan records the caller already holds. No storage access.
    pub fn scan_records(&self, clients: &[ClientRecord], reporter: &dyn ScanReporter) -> ScanReport {
        let scan_start = Instant::now();
        let scanner = DuplicateScanner::new(self.config.scan_options());
        let groups = scanner.scan(clients, reporter);
        let scan_duration = scan_start.elapsed();

        let exact_groups = groups
            .iter()
            .filter(|g| g.duplicate_type == DuplicateType::Exact)
            .count();
        let name_groups = groups.len() - exact_groups;
        let flagged_clients = groups
            .iter()
            .flat_map(|g| g.client_ids())
            .collect::<AHashSet<_>>()
            .len();

        self.events.record(AuditEvent::new(
            AuditEventKind::ScanCompleted,
            json!({
                "clients": clients.len(),
                "exact_groups": exact_groups,
                "name_groups": name_groups,
            }),
        ));

        ScanReport {
            load_duration: Duration::ZERO,
            scan_duration,
            total_clients: clients.len(),
            groups,
            exact_groups,
            name_groups,
            flagged_clients,
        }
    }
}
