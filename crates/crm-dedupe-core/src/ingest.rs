use crate::error::Error;
use crate::model::ClientRecord;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Load client records from a CSV file (header row using the CRM column
/// names) or a JSON array, chosen by file extension.
pub fn load_clients(path: &Path) -> Result<Vec<ClientRecord>, Error> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let clients = match extension.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        _ => return Err(Error::UnsupportedInput(path.display().to_string())),
    };

    info!("Loaded {} clients from {}", clients.len(), path.display());
    Ok(clients)
}

fn load_csv(path: &Path) -> Result<Vec<ClientRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_path(path)?;
    let mut clients = Vec::new();
    for record in reader.deserialize::<ClientRecord>() {
        clients.push(record?);
    }
    debug!("Parsed {} CSV rows", clients.len());
    Ok(clients)
}

fn load_json(path: &Path) -> Result<Vec<ClientRecord>, Error> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
