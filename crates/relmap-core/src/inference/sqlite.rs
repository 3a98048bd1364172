//! SQLite catalog source.

use super::catalog::{CatalogSource, ColumnInfo, ForeignKeyRow, IndexRow};
use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Reads catalog metadata from a SQLite connection via `sqlite_master` and
/// the table-valued `pragma_*` functions.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Wrap an open connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Unwrap the underlying connection.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl CatalogSource for SqliteCatalog {
    fn engine(&self) -> &str {
        "sqlite"
    }

    fn relation_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn relation_exists(&self, relation: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
            params![relation],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn columns(&self, relation: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map(params![relation], |row| {
                let not_null: i64 = row.get(2)?;
                let pk: i64 = row.get(4)?;
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    native_type: row.get(1)?,
                    // Primary key columns are implicitly non-null.
                    nullable: not_null == 0 && pk == 0,
                    default: row.get(3)?,
                    primary_key_position: (pk > 0).then_some(pk as u32),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn foreign_keys(&self, relation: &str) -> Result<Vec<ForeignKeyRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, seq, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) \
             ORDER BY id, seq",
        )?;
        let rows = stmt
            .query_map(params![relation], |row| {
                let id: i64 = row.get(0)?;
                let seq: i64 = row.get(1)?;
                Ok(ForeignKeyRow {
                    constraint: format!("{relation}_fk_{id}"),
                    position: seq as u32,
                    parent_table: row.get(2)?,
                    column: row.get(3)?,
                    parent_column: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn indexes(&self, relation: &str) -> Result<Vec<IndexRow>> {
        let mut list = self.conn.prepare(
            "SELECT name, \"unique\", origin FROM pragma_index_list(?1) \
             WHERE origin <> 'pk' ORDER BY seq",
        )?;
        let indexes = list
            .query_map(params![relation], |row| {
                let unique: i64 = row.get(1)?;
                Ok((row.get::<_, String>(0)?, unique != 0, row.get::<_, String>(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut info = self.conn.prepare(
            "SELECT seqno, name FROM pragma_index_info(?1) ORDER BY seqno",
        )?;

        let mut rows = Vec::new();
        for (name, unique, origin) in indexes {
            let columns = info
                .query_map(params![name], |row| {
                    let seqno: i64 = row.get(0)?;
                    Ok((seqno as u32, row.get::<_, Option<String>>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            // Expression indexes have no column to describe.
            if columns.iter().any(|(_, column)| column.is_none()) {
                continue;
            }

            // Engine-generated names of single-column UNIQUE constraints
            // carry no information; let inference synthesize one.
            let index = if origin == "u" && columns.len() == 1 {
                None
            } else {
                Some(name)
            };

            for (position, column) in columns.into_iter() {
                rows.push(IndexRow {
                    index: index.clone(),
                    position,
                    column: column.unwrap_or_default(),
                    unique,
                    method: None,
                });
            }
        }

        Ok(rows)
    }
}
