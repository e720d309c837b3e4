use super::sqlite::Database;
use crate::model::ClientRecord;
use crate::selection::IdSource;
use rusqlite::{params, Result, Row};
use tracing::debug;

const CLIENT_COLUMNS: &str = "id, nom, telephone, ville, total_paye, created_at";

fn client_from_row(row: &Row<'_>) -> Result<ClientRecord> {
    Ok(ClientRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        city: row.get(3)?,
        total_paid: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    // ── Clients ──────────────────────────────────────────────────

    /// Upsert clients by id in a single transaction. Returns rows written.
    pub fn insert_clients(&self, clients: &[ClientRecord]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO client (id, nom, telephone, ville, total_paye, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(id) DO UPDATE SET \
                    nom = excluded.nom, \
                    telephone = excluded.telephone, \
                    ville = excluded.ville, \
                    total_paye = excluded.total_paye, \
                    created_at = excluded.created_at",
            )?;
            for client in clients {
                count += stmt.execute(params![
                    client.id,
                    client.name,
                    client.phone,
                    client.city,
                    client.total_paid,
                    client.created_at,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Upserted {} clients", count);
        Ok(count)
    }

    pub fn count_clients(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM client", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// One page of clients, newest first. Pages are numbered from 1.
    pub fn get_clients_page(&self, page: usize, page_size: usize) -> Result<Vec<ClientRecord>> {
        let page_size = page_size.max(1) as i64;
        let offset = (page.max(1) as i64 - 1) * page_size;
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM client ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
            CLIENT_COLUMNS
        ))?;
        let clients = stmt
            .query_map(params![page_size, offset], client_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(clients)
    }

    /// Every client, oldest first, so scans see records in creation order.
    pub fn get_all_clients(&self) -> Result<Vec<ClientRecord>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM client ORDER BY created_at, id",
            CLIENT_COLUMNS
        ))?;
        let clients = stmt
            .query_map([], client_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(clients)
    }

    pub fn all_client_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.connection().prepare("SELECT id FROM client ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>>>()?;
        Ok(ids)
    }
}

impl IdSource for Database {
    fn fetch_all_ids(&self) -> std::result::Result<Vec<String>, crate::Error> {
        Ok(self.all_client_ids()?)
    }
}
