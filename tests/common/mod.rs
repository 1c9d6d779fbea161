#![allow(dead_code)]

use rust_sheet_import::config::AppConfig;
use rust_sheet_import::infrastructure::database;
use rust_sheet_import::infrastructure::uploads::UploadStore;
use rust_sheet_import::services::import_service::ImportService;
use rust_sheet_import::services::record_store::SqlRecordStore;
use rust_sheet_import::{AppState, create_app};
use rust_xlsxwriter::Workbook;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use std::sync::Arc;
use tempfile::TempDir;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const BOUNDARY: &str = "---------------------------735323031399963166993862150";

#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Builds an .xlsx workbook with a single sheet holding `rows`.
pub fn workbook(rows: &[&[Cell]]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match *cell {
                Cell::Text(s) => {
                    ws.write_string(r as u32, c as u16, s).unwrap();
                }
                Cell::Number(n) => {
                    ws.write_number(r as u32, c as u16, n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    wb.save_to_buffer().unwrap()
}

pub fn people_workbook() -> Vec<u8> {
    workbook(&[
        &[Cell::Text("name"), Cell::Text("age")],
        &[Cell::Text("Alice"), Cell::Number(30.0)],
        &[Cell::Text("Bob"), Cell::Number(25.0)],
    ])
}

pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, content_type: &'a str, data: Vec<u8>) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub struct TestApp {
    pub router: axum::Router,
    pub db: DatabaseConnection,
    pub upload_dir: TempDir,
    pub public_dir: TempDir,
}

impl TestApp {
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub async fn people(&self) -> Vec<(String, Option<i64>)> {
        self.db
            .query_all(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT name, age FROM people ORDER BY rowid",
            ))
            .await
            .unwrap()
            .into_iter()
            .map(|row| {
                (
                    row.try_get::<String>("", "name").unwrap(),
                    row.try_get::<Option<i64>>("", "age").unwrap(),
                )
            })
            .collect()
    }
}

/// App over an in-memory SQLite database with a `people (name, age)` table.
/// `age` must be positive so tests can force an insert failure.
pub async fn setup_app() -> TestApp {
    let db = database::connect("sqlite::memory:", 1).await.unwrap();
    db.execute_unprepared(
        "CREATE TABLE people (name TEXT NOT NULL, age INTEGER CHECK (age > 0))",
    )
    .await
    .unwrap();

    let upload_dir = tempfile::tempdir().unwrap();
    let public_dir = tempfile::tempdir().unwrap();

    let config = AppConfig {
        import_table: "people".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        public_dir: public_dir.path().to_path_buf(),
        ..AppConfig::development()
    };

    let store = Arc::new(SqlRecordStore::new(db.clone(), config.import_table.clone()));
    let state = AppState {
        import_service: Arc::new(ImportService::new(store)),
        uploads: UploadStore::new(upload_dir.path()),
        config,
    };

    TestApp {
        router: create_app(state),
        db,
        upload_dir,
        public_dir,
    }
}
