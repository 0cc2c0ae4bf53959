//! Framework-independent description of the persisted tables.
//!
//! The embedded migrations create exactly these tables; [`verify`] checks a
//! live database against them at startup, and [`crate::db::integrity`] walks
//! the foreign keys declared here on every insert and delete.

use crate::db::{integrity, DbPool};
use crate::errors::ServiceError;
use sea_orm::ConnectionTrait;
use sea_orm_migration::SchemaManager;
use strum::Display;
use tracing::{debug, info};

pub const USERS: &str = "users";
pub const ISSUES: &str = "issues";
pub const FEEDBACKS: &str = "feedbacks";

/// Upper bound on `feedbacks.comment`, in characters.
pub const COMMENT_MAX_LEN: usize = 500;
/// Inclusive bounds on `feedbacks.rating`.
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

/// What happens to dependent rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteRule {
    Cascade,
    Restrict,
}

/// Storage type of a table's single-column primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Integer,
    Text,
}

#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub required: bool,
    pub max_len: Option<usize>,
}

#[derive(Debug)]
pub struct ForeignKeyDef {
    pub name: &'static str,
    pub column: &'static str,
    pub references: &'static str,
    pub on_delete: DeleteRule,
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub key_kind: KeyKind,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKeyDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn foreign_key(&self, column: &str) -> Option<&'static ForeignKeyDef> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}

const fn required(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        required: true,
        max_len: None,
    }
}

const fn optional(name: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        required: false,
        max_len: None,
    }
}

pub static TABLES: &[TableDef] = &[
    TableDef {
        name: USERS,
        primary_key: "id",
        key_kind: KeyKind::Text,
        columns: &[
            required("id"),
            ColumnDef {
                name: "user_name",
                required: true,
                max_len: Some(256),
            },
            optional("email"),
            optional("password_hash"),
            required("created_at"),
        ],
        foreign_keys: &[],
    },
    TableDef {
        name: ISSUES,
        primary_key: "id",
        key_kind: KeyKind::Integer,
        columns: &[
            required("id"),
            required("description"),
            required("category"),
            required("reported_date"),
            required("is_resolved"),
            required("application_user_id"),
        ],
        foreign_keys: &[ForeignKeyDef {
            name: "fk_issues_application_user_id",
            column: "application_user_id",
            references: USERS,
            on_delete: DeleteRule::Restrict,
        }],
    },
    TableDef {
        name: FEEDBACKS,
        primary_key: "id",
        key_kind: KeyKind::Integer,
        columns: &[
            required("id"),
            required("issue_id"),
            required("tenant_id"),
            ColumnDef {
                name: "comment",
                required: true,
                max_len: Some(COMMENT_MAX_LEN),
            },
            required("rating"),
            required("submitted_on"),
        ],
        foreign_keys: &[
            ForeignKeyDef {
                name: "fk_feedbacks_issue_id",
                column: "issue_id",
                references: ISSUES,
                on_delete: DeleteRule::Cascade,
            },
            ForeignKeyDef {
                name: "fk_feedbacks_tenant_id",
                column: "tenant_id",
                references: USERS,
                on_delete: DeleteRule::Restrict,
            },
        ],
    },
];

/// Looks up a table definition by name.
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}

/// Like [`table`], for names the crate itself controls.
pub(crate) fn table_def(name: &str) -> Result<&'static TableDef, ServiceError> {
    table(name).ok_or_else(|| ServiceError::SchemaMismatch(format!("unknown table {name}")))
}

/// Every foreign key, in any table, that points at `name`.
pub fn referencing(
    name: &str,
) -> impl Iterator<Item = (&'static TableDef, &'static ForeignKeyDef)> + '_ {
    TABLES.iter().flat_map(move |t| {
        t.foreign_keys
            .iter()
            .filter(move |fk| fk.references == name)
            .map(move |fk| (t, fk))
    })
}

/// Checks that every defined table and column exists in the live database.
pub async fn verify(db: &DbPool) -> Result<(), ServiceError> {
    let manager = SchemaManager::new(db);

    for table in TABLES {
        if !manager.has_table(table.name).await? {
            return Err(ServiceError::SchemaMismatch(format!(
                "table {} is missing",
                table.name
            )));
        }
        for column in table.columns {
            if !manager.has_column(table.name, column.name).await? {
                return Err(ServiceError::SchemaMismatch(format!(
                    "column {}.{} is missing",
                    table.name, column.name
                )));
            }
        }
        debug!(table = table.name, "table verified");
    }

    info!(tables = TABLES.len(), "schema verified");
    Ok(())
}

/// Row count of every defined table, in definition order.
pub async fn row_counts<C>(conn: &C) -> Result<Vec<(&'static str, u64)>, ServiceError>
where
    C: ConnectionTrait,
{
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        counts.push((table.name, integrity::count_rows(conn, table.name, None).await?));
    }
    Ok(counts)
}
