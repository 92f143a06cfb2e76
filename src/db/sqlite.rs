use crate::config::Config;
use crate::db::ident::{Ident, check_database_name, column_list, quote_name};
use crate::db::models::{Fields, Record, bind_value};
use crate::error::SqlitebotError;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Connection, FromRow, SqliteConnection};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Rows buffered between the producer task of `all_records` and its consumer.
const RECORD_BUFFER: usize = 64;

pub type RecordStream = ReceiverStream<Result<Record, SqlitebotError>>;

/// Stateless access to the database files under one data root.
///
/// Every operation opens its own connection and closes it before returning;
/// nothing is pooled and no statement shares a transaction with another.
/// On success the connection is closed explicitly; on error it is dropped,
/// which closes it as well.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    create_missing: bool,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>, create_missing: bool) -> Self {
        Self {
            root: root.into(),
            create_missing,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.data_path.clone(), cfg.create_databases)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a fresh connection to `database`. Without `create`, a missing
    /// file is `NoSuchDatabase`.
    pub async fn connect(
        &self,
        database: &str,
        create: bool,
    ) -> Result<SqliteConnection, SqlitebotError> {
        check_database_name(database)?;
        let path = self.root.join(database);
        if !create && !tokio::fs::try_exists(&path).await? {
            return Err(SqlitebotError::NoSuchDatabase(database.to_string()));
        }
        let opts = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(create)
            .journal_mode(SqliteJournalMode::Delete);
        Ok(SqliteConnection::connect_with(&opts).await?)
    }

    async fn connect_for_write(&self, database: &str) -> Result<SqliteConnection, SqlitebotError> {
        self.connect(database, self.create_missing).await
    }

    /// File names directly under the data root, sorted.
    pub async fn list_databases(&self) -> Result<Vec<String>, SqlitebotError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.root.display(), "data root not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub async fn list_tables(&self, database: &str) -> Result<Vec<String>, SqlitebotError> {
        let mut conn = self.connect(database, false).await?;
        let tables = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&mut conn)
        .await?;
        conn.close().await?;
        debug!(database, count = tables.len(), "listed tables");
        Ok(tables)
    }

    /// Column names in declaration order, read from the engine's metadata.
    pub async fn list_columns(
        &self,
        database: &str,
        table: &str,
    ) -> Result<Vec<String>, SqlitebotError> {
        let table = Ident::parse(table)?;
        let mut conn = self.connect(database, false).await?;
        let columns = Self::table_columns(&mut conn, &table).await?;
        conn.close().await?;
        Ok(columns.into_iter().map(|c| c.name).collect())
    }

    async fn table_columns(
        conn: &mut SqliteConnection,
        table: &Ident,
    ) -> Result<Vec<ColumnInfo>, SqlitebotError> {
        let columns = sqlx::query_as::<_, ColumnInfo>(
            "SELECT name, type, pk FROM pragma_table_info(?) ORDER BY cid",
        )
        .bind(table.as_str())
        .fetch_all(&mut *conn)
        .await?;
        if columns.is_empty() {
            return Err(SqlitebotError::NoSuchTable(table.as_str().to_string()));
        }
        Ok(columns)
    }

    /// Stream every row in scan order. The connection lives in a producer task
    /// and is closed once the rows run out or the stream is dropped.
    pub async fn all_records(
        &self,
        database: &str,
        table: &str,
    ) -> Result<RecordStream, SqlitebotError> {
        let table = Ident::parse(table)?;
        let conn = self.connect(database, false).await?;
        let sql = format!("SELECT rowid, * FROM {table}");
        let (tx, rx) = mpsc::channel(RECORD_BUFFER);
        let database = database.to_string();

        tokio::spawn(async move {
            let mut conn = conn;
            let mut sent = 0usize;
            {
                let mut rows = sqlx::query(&sql).fetch(&mut conn);
                loop {
                    let item = match rows.try_next().await {
                        Ok(Some(row)) => Record::from_row(&row).map_err(SqlitebotError::from),
                        Ok(None) => break,
                        Err(e) => Err(e.into()),
                    };
                    let failed = item.is_err();
                    if tx.send(item).await.is_err() || failed {
                        break;
                    }
                    sent += 1;
                }
            }
            if let Err(e) = conn.close().await {
                warn!(database = %database, error = %e, "failed to close connection");
            }
            debug!(database = %database, sent, "record stream finished");
        });

        Ok(ReceiverStream::new(rx))
    }

    /// `None` when no row has this id.
    pub async fn get_record(
        &self,
        database: &str,
        table: &str,
        rowid: i64,
    ) -> Result<Option<Record>, SqlitebotError> {
        let table = Ident::parse(table)?;
        let mut conn = self.connect(database, false).await?;
        let sql = format!("SELECT rowid, * FROM {table} WHERE rowid = ?");
        let row = sqlx::query(&sql)
            .bind(rowid)
            .fetch_optional(&mut conn)
            .await?;
        conn.close().await?;
        Ok(row.as_ref().map(Record::from_row).transpose()?)
    }

    /// Insert one row and return its new row id. An empty mapping inserts
    /// nothing and returns `None`.
    pub async fn insert_record(
        &self,
        database: &str,
        table: &str,
        fields: &Fields,
    ) -> Result<Option<i64>, SqlitebotError> {
        if fields.is_empty() {
            return Ok(None);
        }
        let table = Ident::parse(table)?;
        let columns = fields
            .keys()
            .map(|k| Ident::parse(k))
            .collect::<Result<Vec<_>, _>>()?;
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            column_list(&columns)
        );

        let mut conn = self.connect_for_write(database).await?;
        let query = fields
            .values()
            .fold(sqlx::query(&sql), |q, v| bind_value(q, v));
        let result = query.execute(&mut conn).await?;
        conn.close().await?;

        let rowid = result.last_insert_rowid();
        debug!(database, table = table.as_str(), rowid, "inserted record");
        Ok(Some(rowid))
    }

    /// Set the given columns on one row. Missing rows and empty mappings are
    /// no-ops.
    pub async fn update_record(
        &self,
        database: &str,
        table: &str,
        rowid: i64,
        fields: &Fields,
    ) -> Result<(), SqlitebotError> {
        if fields.is_empty() {
            return Ok(());
        }
        let table = Ident::parse(table)?;
        let assignments = fields
            .keys()
            .map(|k| Ident::parse(k).map(|col| format!("{col} = ?")))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let sql = format!("UPDATE {table} SET {assignments} WHERE rowid = ?");

        let mut conn = self.connect_for_write(database).await?;
        let query = fields
            .values()
            .fold(sqlx::query(&sql), |q, v| bind_value(q, v))
            .bind(rowid);
        let result = query.execute(&mut conn).await?;
        conn.close().await?;

        debug!(
            database,
            table = table.as_str(),
            rowid,
            affected = result.rows_affected(),
            "updated record"
        );
        Ok(())
    }

    /// Overwrite the whole row, keeping `rowid`. `values` follows the table's
    /// column order and must cover every column. An empty sequence is a no-op.
    pub async fn replace_record(
        &self,
        database: &str,
        table: &str,
        rowid: i64,
        values: &[Value],
    ) -> Result<(), SqlitebotError> {
        if values.is_empty() {
            return Ok(());
        }
        let table = Ident::parse(table)?;
        let mut conn = self.connect_for_write(database).await?;
        let columns = Self::table_columns(&mut conn, &table).await?;
        if columns.len() != values.len() {
            return Err(SqlitebotError::ValueCount {
                expected: columns.len(),
                got: values.len(),
            });
        }

        // Names come from the engine, so they are quoted rather than checked.
        let names = columns
            .iter()
            .map(|c| quote_name(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; columns.len()].join(", ");
        let alias = rowid_alias(&columns);
        let sql = match alias {
            Some(_) => format!("REPLACE INTO {table} ({names}) VALUES ({placeholders})"),
            None => format!("REPLACE INTO {table} (rowid, {names}) VALUES (?, {placeholders})"),
        };

        let query = match alias {
            // The alias column carries the row id; the value supplied for it
            // is ignored.
            Some(alias) => values
                .iter()
                .enumerate()
                .fold(sqlx::query(&sql), |q, (i, v)| {
                    if i == alias { q.bind(rowid) } else { bind_value(q, v) }
                }),
            None => values
                .iter()
                .fold(sqlx::query(&sql).bind(rowid), |q, v| bind_value(q, v)),
        };
        query.execute(&mut conn).await?;
        conn.close().await?;

        debug!(database, table = table.as_str(), rowid, "replaced record");
        Ok(())
    }

    /// Missing rows are a no-op.
    pub async fn delete_record(
        &self,
        database: &str,
        table: &str,
        rowid: i64,
    ) -> Result<(), SqlitebotError> {
        let table = Ident::parse(table)?;
        let sql = format!("DELETE FROM {table} WHERE rowid = ?");
        let mut conn = self.connect_for_write(database).await?;
        let result = sqlx::query(&sql).bind(rowid).execute(&mut conn).await?;
        conn.close().await?;

        debug!(
            database,
            table = table.as_str(),
            rowid,
            affected = result.rows_affected(),
            "deleted record"
        );
        Ok(())
    }
}

/// One row of `pragma_table_info`.
#[derive(Debug, FromRow)]
struct ColumnInfo {
    name: String,
    #[sqlx(rename = "type")]
    decl_type: String,
    pk: i64,
}

/// Position of the `INTEGER PRIMARY KEY` column, which SQLite treats as the
/// row id itself.
fn rowid_alias(columns: &[ColumnInfo]) -> Option<usize> {
    let mut pk = columns.iter().enumerate().filter(|(_, c)| c.pk > 0);
    match (pk.next(), pk.next()) {
        (Some((index, column)), None) if column.decl_type.eq_ignore_ascii_case("INTEGER") => {
            Some(index)
        }
        _ => None,
    }
}
