//! 預覽圖目錄：以 SQLite 保存 [`ThumbnailRecord`]

use crate::error::ThumbnailError;
use log::debug;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

/// 一部影片的預覽圖成品，建立後不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRecord {
    /// 原始影片路徑
    pub source_filename: String,
    /// 預覽圖檔名
    pub generated_name: String,
    pub storage_path: PathBuf,
    pub size_bytes: u64,
    /// 寫入後從磁碟重新計算的 128-bit 雜湊（hex）
    pub content_hash: String,
    /// 預覽圖 RGB8 原始像素
    pub raw_bytes: Vec<u8>,
    pub total_count: u32,
    pub row_count: u32,
    pub col_count: u32,
    pub total_width_px: u32,
    pub total_height_px: u32,
}

/// 目錄寫入端
pub trait CatalogStore {
    fn insert_thumbnail_record(&mut self, record: &ThumbnailRecord) -> Result<(), ThumbnailError>;
}

pub struct SqliteCatalog {
    conn: Connection,
}

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS THUMBNAIL (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        filename        TEXT NOT NULL,
        thumbnail_name  TEXT NOT NULL UNIQUE,
        path            TEXT NOT NULL,
        size_bytes      INTEGER NOT NULL,
        md5             TEXT NOT NULL,
        raw_data        BLOB NOT NULL,
        tb_num          INTEGER NOT NULL,
        tb_row          INTEGER NOT NULL,
        tb_col          INTEGER NOT NULL,
        tb_total_x      INTEGER NOT NULL,
        tb_total_y      INTEGER NOT NULL
    );
";

impl SqliteCatalog {
    pub fn open(db_path: &Path) -> Result<Self, ThumbnailError> {
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self, ThumbnailError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, ThumbnailError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<u64, ThumbnailError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM THUMBNAIL", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// 所有已入庫的預覽圖檔名
    pub fn generated_names(&self) -> Result<Vec<String>, ThumbnailError> {
        let mut stmt = self
            .conn
            .prepare("SELECT thumbnail_name FROM THUMBNAIL ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    pub fn find_by_name(
        &self,
        generated_name: &str,
    ) -> Result<Option<ThumbnailRecord>, ThumbnailError> {
        let mut stmt = self.conn.prepare(
            "SELECT filename, thumbnail_name, path, size_bytes, md5, raw_data,
                    tb_num, tb_row, tb_col, tb_total_x, tb_total_y
             FROM THUMBNAIL WHERE thumbnail_name = ?1",
        )?;
        let mut rows = stmt.query_map(params![generated_name], |row| {
            Ok(ThumbnailRecord {
                source_filename: row.get(0)?,
                generated_name: row.get(1)?,
                storage_path: PathBuf::from(row.get::<_, String>(2)?),
                size_bytes: row.get::<_, i64>(3)? as u64,
                content_hash: row.get(4)?,
                raw_bytes: row.get(5)?,
                total_count: row.get(6)?,
                row_count: row.get(7)?,
                col_count: row.get(8)?,
                total_width_px: row.get(9)?,
                total_height_px: row.get(10)?,
            })
        })?;

        rows.next().transpose().map_err(ThumbnailError::from)
    }

    /// 重設自動遞增序號；只在手動清空資料表後使用
    pub fn reset_sequence(&self, table_name: &str) -> Result<(), ThumbnailError> {
        self.conn.execute(
            "UPDATE sqlite_sequence SET seq = 0 WHERE name = ?1",
            params![table_name],
        )?;
        Ok(())
    }
}

impl CatalogStore for SqliteCatalog {
    fn insert_thumbnail_record(&mut self, record: &ThumbnailRecord) -> Result<(), ThumbnailError> {
        debug!("寫入目錄: {}", record.generated_name);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO THUMBNAIL
               (filename, thumbnail_name, path, size_bytes, md5, raw_data,
                tb_num, tb_row, tb_col, tb_total_x, tb_total_y)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.source_filename,
                record.generated_name,
                record.storage_path.to_string_lossy().to_string(),
                record.size_bytes as i64,
                record.content_hash,
                record.raw_bytes,
                record.total_count,
                record.row_count,
                record.col_count,
                record.total_width_px,
                record.total_height_px,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }
}
