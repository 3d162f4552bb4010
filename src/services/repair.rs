//! Maintenance pass that gives every post, category and tag a usable slug.
//!
//! Records are visited in id order. A blank title/name is replaced by a
//! placeholder built from the id, and a missing or malformed slug is
//! regenerated and committed before the next record is looked at, so later
//! records probe against slugs assigned earlier in the same pass. Records that
//! are already in order are left alone, which makes the pass idempotent.

use crate::services::slug::{assign_stored_slug, needs_repair, SlugScope};
use crate::services::{categories, tags};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{count} record(s) still have no valid slug after repair")]
pub struct RepairIncomplete {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairFix {
    pub id: i64,
    pub display: String,
    pub old_slug: Option<String>,
    pub new_slug: String,
    pub display_replaced: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairFailure {
    pub id: i64,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedRecord {
    pub id: i64,
    pub display: String,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScopeReport {
    pub scope: SlugScope,
    pub scanned: usize,
    pub fixes: Vec<RepairFix>,
    pub failures: Vec<RepairFailure>,
    pub unresolved: Vec<UnresolvedRecord>,
}

impl ScopeReport {
    fn new(scope: SlugScope) -> Self {
        Self {
            scope,
            scanned: 0,
            fixes: Vec::new(),
            failures: Vec::new(),
            unresolved: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairSummary {
    pub scopes: Vec<ScopeReport>,
}

impl RepairSummary {
    pub fn scanned(&self) -> usize {
        self.scopes.iter().map(|s| s.scanned).sum()
    }

    pub fn fixed(&self) -> usize {
        self.scopes.iter().map(|s| s.fixes.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.scopes.iter().map(|s| s.failures.len()).sum()
    }

    pub fn unresolved(&self) -> usize {
        self.scopes.iter().map(|s| s.unresolved.len()).sum()
    }

    pub fn scope(&self, scope: SlugScope) -> Option<&ScopeReport> {
        self.scopes.iter().find(|s| s.scope == scope)
    }

    /// Errors when the verification query still found missing or malformed slugs.
    pub fn check(&self) -> Result<(), RepairIncomplete> {
        match self.unresolved() {
            0 => Ok(()),
            count => Err(RepairIncomplete { count }),
        }
    }
}

pub fn repair_all(db: &Database, max_attempts: usize) -> Result<RepairSummary> {
    let conn = db.get()?;
    let mut scopes = Vec::with_capacity(SlugScope::ALL.len());
    for scope in SlugScope::ALL {
        scopes.push(repair_scope(&conn, scope, max_attempts)?);
    }

    let summary = RepairSummary { scopes };
    tracing::info!(
        scanned = summary.scanned(),
        fixed = summary.fixed(),
        failed = summary.failed(),
        "Slug repair finished"
    );
    if let Err(incomplete) = summary.check() {
        tracing::warn!("{}", incomplete);
    }
    Ok(summary)
}

pub fn repair_scope(conn: &Connection, scope: SlugScope, max_attempts: usize) -> Result<ScopeReport> {
    let sql = format!(
        "SELECT id, {}, slug FROM {} ORDER BY id",
        scope.display_column(),
        scope.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let mut report = ScopeReport::new(scope);
    for (id, display, slug) in records {
        report.scanned += 1;
        match repair_record(conn, scope, id, display, slug, max_attempts) {
            Ok(Some(fix)) => {
                tracing::info!(
                    %scope,
                    id,
                    old = ?fix.old_slug,
                    new = %fix.new_slug,
                    "Repaired {} '{}'",
                    scope,
                    fix.display
                );
                report.fixes.push(fix);
            }
            Ok(None) => {
                tracing::debug!(%scope, id, "Slug already valid");
            }
            Err(e) => {
                tracing::warn!(%scope, id, "Could not repair record: {:#}", e);
                report.failures.push(RepairFailure {
                    id,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    report.unresolved = find_unresolved(conn, scope)?;
    Ok(report)
}

fn repair_record(
    conn: &Connection,
    scope: SlugScope,
    id: i64,
    display: Option<String>,
    slug: Option<String>,
    max_attempts: usize,
) -> Result<Option<RepairFix>> {
    let display = display.unwrap_or_default();
    let display_blank = display.trim().is_empty();
    let slug_broken = needs_repair(slug.as_deref());

    if !display_blank && !slug_broken {
        return Ok(None);
    }

    let tx = conn.unchecked_transaction()?;

    let display = if display_blank {
        let placeholder = free_placeholder_name(&tx, scope, id)?;
        let sql = format!(
            "UPDATE {} SET {} = ? WHERE id = ?",
            scope.table(),
            scope.display_column()
        );
        tx.execute(&sql, (&placeholder, id))?;
        placeholder
    } else {
        display
    };

    let new_slug = if slug_broken {
        assign_stored_slug(&tx, scope, id, &display, max_attempts)?
    } else {
        slug.clone().unwrap_or_default()
    };

    tx.commit()?;

    Ok(Some(RepairFix {
        id,
        display,
        old_slug: slug,
        new_slug,
        display_replaced: display_blank,
    }))
}

/// `Category 3`, then `Category 3-1`, `Category 3-2`, ... until no other
/// row holds the name. Post titles are not unique and always get the base.
fn free_placeholder_name(conn: &Connection, scope: SlugScope, id: i64) -> Result<String> {
    let base = scope.placeholder_name(id);
    let taken = |name: &str| -> Result<bool> {
        match scope {
            SlugScope::Post => Ok(false),
            SlugScope::Category => categories::category_name_exists(conn, name),
            SlugScope::Tag => tags::tag_name_exists(conn, name),
        }
    };

    if !taken(&base)? {
        return Ok(base);
    }
    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !taken(&candidate)? {
            tracing::info!(%scope, id, name = %candidate, "Placeholder name already in use, probed");
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Records whose slug would still be picked up by another repair run.
fn find_unresolved(conn: &Connection, scope: SlugScope) -> Result<Vec<UnresolvedRecord>> {
    let sql = format!(
        "SELECT id, {}, slug FROM {} ORDER BY id",
        scope.display_column(),
        scope.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], |row| {
            Ok(UnresolvedRecord {
                id: row.get(0)?,
                display: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                slug: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records
        .into_iter()
        .filter(|r| needs_repair(r.slug.as_deref()))
        .collect())
}
