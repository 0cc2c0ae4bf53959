/*!
 * Referential-integrity enforcement
 *
 * Deletes walk the foreign keys declared in [`crate::schema`]: a RESTRICT
 * relationship with dependents rejects the delete, a CASCADE relationship
 * removes the dependents first. Inserts check that every foreign key resolves.
 *
 * Everything here runs on a `DatabaseTransaction` so a rejected delete never
 * leaves a partial cascade behind. The foreign keys created by the migrations
 * enforce the same rules at the storage level.
 */

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::schema::{self, DeleteRule, KeyKind, TableDef};
use async_recursion::async_recursion;
use metrics::counter;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr, TransactionTrait, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Rows removed by one delete, per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub table: &'static str,
    pub removed: BTreeMap<&'static str, u64>,
}

impl DeletionReport {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            removed: BTreeMap::new(),
        }
    }

    fn record(&mut self, table: &'static str, rows: u64) {
        if rows > 0 {
            *self.removed.entry(table).or_insert(0) += rows;
        }
    }

    /// Rows removed from `table`
    pub fn removed_from(&self, table: &str) -> u64 {
        self.removed.get(table).copied().unwrap_or(0)
    }

    /// Rows removed across all tables, the target row included
    pub fn total(&self) -> u64 {
        self.removed.values().sum()
    }

    /// Rows removed from tables other than the target
    pub fn cascaded(&self) -> u64 {
        self.total() - self.removed_from(self.table)
    }
}

/// Counts rows of `table`, optionally only those where `column = value`.
pub async fn count_rows<C>(
    conn: &C,
    table: &str,
    filter: Option<(&str, Value)>,
) -> Result<u64, ServiceError>
where
    C: ConnectionTrait,
{
    let mut stmt = Query::select();
    stmt.expr(Expr::cust("COUNT(*)")).from(Alias::new(table));
    if let Some((column, value)) = filter {
        stmt.and_where(Expr::col(Alias::new(column)).eq(value));
    }

    let row = conn
        .query_one(conn.get_database_backend().build(&stmt))
        .await?
        .ok_or_else(|| DbErr::Custom(format!("COUNT on {table} returned no row")))?;
    let count: i64 = row.try_get_by_index(0)?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Fails with `IntegrityViolation` unless every `(column, value)` foreign key
/// of `table` resolves to an existing parent row.
#[instrument(skip(txn, values))]
pub async fn ensure_references(
    txn: &DatabaseTransaction,
    table: &str,
    values: &[(&str, Value)],
) -> Result<(), ServiceError> {
    let def = schema::table_def(table)?;

    for (column, value) in values {
        let fk = def.foreign_key(column).ok_or_else(|| {
            ServiceError::SchemaMismatch(format!("{}.{} is not a foreign key", def.name, column))
        })?;
        let parent = schema::table_def(fk.references)?;

        let found = count_rows(txn, parent.name, Some((parent.primary_key, value.clone()))).await?;
        if found == 0 {
            counter!("tenant_issue_tracker.integrity.rejected", 1, "table" => def.name);
            warn!(
                table = def.name,
                column = *column,
                parent = parent.name,
                "insert references a missing row"
            );
            return Err(ServiceError::IntegrityViolation(format!(
                "{}.{} references {} {} which does not exist",
                def.name,
                column,
                parent.name,
                describe(value)
            )));
        }
    }

    Ok(())
}

/// Deletes the row of `table` whose primary key is `key`, honouring every
/// relationship that references it. Returns what was removed.
///
/// A missing row yields `NotFound`; a restricting dependent yields
/// `IntegrityViolation`. On error the caller must drop the transaction
/// without committing.
#[instrument(skip(txn, key), fields(key = %describe(&key)))]
pub async fn delete_cascading(
    txn: &DatabaseTransaction,
    table: &str,
    key: Value,
) -> Result<DeletionReport, ServiceError> {
    let def = schema::table_def(table)?;
    let mut report = DeletionReport::new(def.name);

    let removed = delete_row(txn, def, key.clone(), &mut report).await?;
    if removed == 0 {
        return Err(ServiceError::NotFound(format!(
            "{} {} not found",
            def.name,
            describe(&key)
        )));
    }

    let cascaded = report.cascaded();
    if cascaded > 0 {
        counter!("tenant_issue_tracker.integrity.cascaded_rows", cascaded, "table" => def.name);
    }
    debug!(table = def.name, total = report.total(), "delete completed");

    Ok(report)
}

/// [`delete_cascading`] in its own transaction, committed only on success.
pub async fn delete_atomically(
    db: &DbPool,
    table: &str,
    key: Value,
) -> Result<DeletionReport, ServiceError> {
    let txn = db.begin().await?;
    let report = delete_cascading(&txn, table, key).await?;
    txn.commit().await?;
    Ok(report)
}

#[async_recursion]
async fn delete_row(
    txn: &DatabaseTransaction,
    def: &'static TableDef,
    key: Value,
    report: &mut DeletionReport,
) -> Result<u64, ServiceError> {
    let relationships: Vec<_> = schema::referencing(def.name).collect();

    // Restrictions are checked before anything is removed
    for (child, fk) in relationships
        .iter()
        .filter(|(_, fk)| fk.on_delete == DeleteRule::Restrict)
    {
        let dependents = count_rows(txn, child.name, Some((fk.column, key.clone()))).await?;
        if dependents > 0 {
            counter!("tenant_issue_tracker.integrity.rejected", 1, "table" => def.name);
            warn!(
                table = def.name,
                dependent_table = child.name,
                dependents,
                "delete restricted"
            );
            return Err(ServiceError::IntegrityViolation(format!(
                "cannot delete {} {}: {} row(s) in {} reference it through {}",
                def.name,
                describe(&key),
                dependents,
                child.name,
                fk.column
            )));
        }
    }

    for (child, fk) in relationships
        .iter()
        .filter(|(_, fk)| fk.on_delete == DeleteRule::Cascade)
    {
        if schema::referencing(child.name).next().is_some() {
            // The child has dependents of its own; each row goes through the same rules
            for child_key in select_keys(txn, child, fk.column, key.clone()).await? {
                delete_row(txn, *child, child_key, report).await?;
            }
        } else {
            let removed = delete_where(txn, child.name, fk.column, key.clone()).await?;
            report.record(child.name, removed);
        }
    }

    let removed = delete_where(txn, def.name, def.primary_key, key).await?;
    report.record(def.name, removed);
    Ok(removed)
}

async fn select_keys(
    txn: &DatabaseTransaction,
    def: &TableDef,
    column: &str,
    value: Value,
) -> Result<Vec<Value>, ServiceError> {
    let stmt = Query::select()
        .column(Alias::new(def.primary_key))
        .from(Alias::new(def.name))
        .and_where(Expr::col(Alias::new(column)).eq(value))
        .to_owned();

    let rows = txn
        .query_all(txn.get_database_backend().build(&stmt))
        .await?;

    let keys = rows
        .iter()
        .map(|row| match def.key_kind {
            KeyKind::Integer => row.try_get_by_index::<i32>(0).map(Value::from),
            KeyKind::Text => row.try_get_by_index::<String>(0).map(Value::from),
        })
        .collect::<Result<Vec<_>, DbErr>>()?;

    Ok(keys)
}

async fn delete_where(
    txn: &DatabaseTransaction,
    table: &str,
    column: &str,
    value: Value,
) -> Result<u64, ServiceError> {
    let stmt = Query::delete()
        .from_table(Alias::new(table))
        .and_where(Expr::col(Alias::new(column)).eq(value))
        .to_owned();

    let result = txn.execute(txn.get_database_backend().build(&stmt)).await?;
    Ok(result.rows_affected())
}

fn describe(value: &Value) -> String {
    match value {
        Value::Int(Some(v)) => v.to_string(),
        Value::BigInt(Some(v)) => v.to_string(),
        Value::String(Some(v)) => v.to_string(),
        other => format!("{other:?}"),
    }
}
