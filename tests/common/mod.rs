#![allow(dead_code)]

use sqlitebot::Store;
use sqlx::Connection;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

pub const TEST_DB: &str = "test";
pub const TEST_TABLE: &str = "testtbl";
pub const TEST_TABLESQL: &str = "CREATE TABLE `testtbl` (col1 INT, col2 TEXT)";

/// A data root under the system temp dir, removed on drop.
pub struct DataRoot {
    path: PathBuf,
}

impl DataRoot {
    pub fn new(label: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "sqlitebot-{label}-{}-{}",
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&path).expect("failed to create data root");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> Store {
        Store::new(self.path.clone(), false)
    }
}

impl Drop for DataRoot {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Create `database` and run each statement against it.
pub async fn seed(store: &Store, database: &str, statements: &[&str]) {
    let mut conn = store
        .connect(database, true)
        .await
        .expect("failed to create database");
    for stmt in statements {
        sqlx::query(stmt)
            .execute(&mut conn)
            .await
            .expect("seed statement failed");
    }
    conn.close().await.expect("failed to close seed connection");
}
