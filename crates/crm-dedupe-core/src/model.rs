use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A client as exported by the CRM. Field names on the wire follow the
/// CRM's own columns (`nom`, `telephone`, `ville`, `total_paye`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "telephone", default)]
    pub phone: String,
    #[serde(rename = "ville", default)]
    pub city: String,
    #[serde(rename = "total_paye", default)]
    pub total_paid: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ClientRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            city: String::new(),
            total_paid: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_total_paid(mut self, total_paid: f64) -> Self {
        self.total_paid = Some(total_paid);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateType {
    /// Same normalized phone number.
    Exact,
    /// Normalized names above the similarity threshold.
    Name,
}

impl DuplicateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateType::Exact => "exact",
            DuplicateType::Name => "name",
        }
    }
}

impl fmt::Display for DuplicateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate duplicates proposed for human review. Built fresh on every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub id: String,
    pub clients: Vec<ClientRecord>,
    pub duplicate_type: DuplicateType,
    pub confidence: u8,
}

impl DuplicateGroup {
    pub fn client_ids(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(|c| c.id.as_str())
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.client_ids().any(|id| id == client_id)
    }
}
