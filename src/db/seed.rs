//! Sample schema and dataset for the embedded database.
//!
//! Three related tables (projects, employees, documents) and a fixed set of
//! documents grouped by employee and month.

use crate::error::{AppError, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Schema DDL, executed in order.
pub const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS Projects (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        Name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Employees (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        FirstName TEXT NOT NULL,
        SecondName TEXT,
        LastName TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS Documents (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        DateCreated TEXT NOT NULL,
        Type TEXT CHECK(Type IN ('Estimate', 'Contract')) NOT NULL,
        ResponsibleEmployee INTEGER,
        Project INTEGER,
        FOREIGN KEY (ResponsibleEmployee) REFERENCES Employees(ID),
        FOREIGN KEY (Project) REFERENCES Projects(ID)
    )
    "#,
];

/// Project names; IDs are assigned 1.. in this order.
pub const PROJECTS: [&str; 3] = ["Проект A", "Проект B", "Проект C"];

/// Employee (first name, last name); IDs are assigned 1.. in this order.
pub const EMPLOYEES: [(&str, &str); 4] = [
    ("Иван", "Иванов"),
    ("Анна", "Смирнова"),
    ("Александр", "Кузнецов"),
    ("Мария", "Петрова"),
];

/// Document type tag stored in `Documents.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Estimate,
    Contract,
}

impl DocumentType {
    /// The value stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estimate => "Estimate",
            Self::Contract => "Contract",
        }
    }

    /// Day of month the first document of this type is dated.
    fn first_day(&self) -> u32 {
        match self {
            Self::Estimate => 10,
            Self::Contract => 20,
        }
    }
}

/// One employee's documents for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedBatch {
    pub employee_id: i64,
    pub project_id: i64,
    /// `YYYY-MM`.
    pub month: &'static str,
    pub estimates: u32,
    pub contracts: u32,
}

/// The seeded batches.
pub const BATCHES: [SeedBatch; 4] = [
    SeedBatch {
        employee_id: 1,
        project_id: 1,
        month: "2025-01",
        estimates: 10,
        contracts: 5,
    },
    SeedBatch {
        employee_id: 2,
        project_id: 2,
        month: "2025-02",
        estimates: 8,
        contracts: 4,
    },
    SeedBatch {
        employee_id: 3,
        project_id: 3,
        month: "2025-03",
        estimates: 6,
        contracts: 3,
    },
    SeedBatch {
        employee_id: 4,
        project_id: 1,
        month: "2025-04",
        estimates: 5,
        contracts: 2,
    },
];

/// A document row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDocument {
    pub date_created: String,
    pub doc_type: DocumentType,
    pub employee_id: i64,
    pub project_id: i64,
}

impl SeedBatch {
    /// Expands the batch into dated documents: estimates first, then contracts.
    pub fn documents(&self) -> Vec<SeedDocument> {
        let estimates = (0..self.estimates).map(|i| self.document(DocumentType::Estimate, i));
        let contracts = (0..self.contracts).map(|i| self.document(DocumentType::Contract, i));
        estimates.chain(contracts).collect()
    }

    fn document(&self, doc_type: DocumentType, offset: u32) -> SeedDocument {
        SeedDocument {
            date_created: format!("{}-{:02}", self.month, doc_type.first_day() + offset),
            doc_type,
            employee_id: self.employee_id,
            project_id: self.project_id,
        }
    }
}

/// All seeded documents in insertion order.
pub fn seed_documents() -> Vec<SeedDocument> {
    BATCHES.iter().flat_map(SeedBatch::documents).collect()
}

/// Creates the three tables if they do not exist yet.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    for ddl in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| AppError::init(format!("Failed to create schema: {e}")))?;
    }
    debug!("Schema created");
    Ok(())
}

/// Inserts the sample dataset in one transaction. Returns the number of documents.
pub async fn insert_seed_data(pool: &SqlitePool) -> Result<usize> {
    let seed_err = |e: sqlx::Error| AppError::init(format!("Failed to insert sample data: {e}"));

    let mut tx = pool.begin().await.map_err(seed_err)?;

    for name in PROJECTS {
        sqlx::query("INSERT INTO Projects (Name) VALUES (?)")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(seed_err)?;
    }

    for (first, last) in EMPLOYEES {
        sqlx::query("INSERT INTO Employees (FirstName, LastName) VALUES (?, ?)")
            .bind(first)
            .bind(last)
            .execute(&mut *tx)
            .await
            .map_err(seed_err)?;
    }

    let documents = seed_documents();
    for doc in &documents {
        sqlx::query(
            "INSERT INTO Documents (DateCreated, Type, ResponsibleEmployee, Project) VALUES (?, ?, ?, ?)",
        )
        .bind(&doc.date_created)
        .bind(doc.doc_type.as_str())
        .bind(doc.employee_id)
        .bind(doc.project_id)
        .execute(&mut *tx)
        .await
        .map_err(seed_err)?;
    }

    tx.commit().await.map_err(seed_err)?;

    info!(
        "Seeded {} projects, {} employees, {} documents",
        PROJECTS.len(),
        EMPLOYEES.len(),
        documents.len()
    );
    Ok(documents.len())
}
