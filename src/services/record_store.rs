use crate::models::{CellValue, Record};
use async_trait::async_trait;
use sea_orm::sea_query::{Alias, InsertStatement, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to build insert statement: {0}")]
    Statement(#[from] sea_orm::sea_query::error::Error),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Destination of parsed records: one `insert` call per record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, record: &Record) -> Result<(), StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Inserts records as rows of a single pre-existing table.
pub struct SqlRecordStore {
    db: DatabaseConnection,
    table: String,
}

impl SqlRecordStore {
    pub fn new(db: DatabaseConnection, table: impl Into<String>) -> Self {
        Self {
            db,
            table: table.into(),
        }
    }

    pub fn insert_statement(&self, record: &Record) -> Result<InsertStatement, StoreError> {
        let mut stmt = Query::insert();

        match self.table.split_once('.') {
            Some((schema, table)) => stmt.into_table((Alias::new(schema), Alias::new(table))),
            None => stmt.into_table(Alias::new(self.table.as_str())),
        };

        stmt.columns(record.columns().map(Alias::new))
            .values(record.values().map(|v| SimpleExpr::Value(to_db_value(v))))?;

        Ok(stmt)
    }
}

#[async_trait]
impl RecordStore for SqlRecordStore {
    async fn insert(&self, record: &Record) -> Result<(), StoreError> {
        let stmt = self.insert_statement(record)?;
        let result = self
            .db
            .execute(self.db.get_database_backend().build(&stmt))
            .await?;

        tracing::debug!(
            table = %self.table,
            rows_affected = result.rows_affected(),
            "Inserted record"
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.ping().await?;
        Ok(())
    }
}

fn to_db_value(value: &CellValue) -> Value {
    match value {
        CellValue::Text(s) => s.clone().into(),
        CellValue::Int(i) => (*i).into(),
        CellValue::Float(f) => (*f).into(),
        CellValue::Bool(b) => (*b).into(),
        CellValue::DateTime(dt) => (*dt).into(),
    }
}
