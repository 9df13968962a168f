use std::fmt;

use serde::Serialize;

/// Rows removed and written for one raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableChange {
    /// Raw table name.
    pub table: &'static str,
    /// Rows present before the import (all of them are replaced).
    pub deleted: usize,
    /// Rows written from the snapshot.
    pub inserted: usize,
}

/// Outcome of an import, or what an import would do in dry-run mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// True when nothing was written.
    pub dry_run: bool,
    /// One entry per raw table, in write order.
    pub tables: Vec<TableChange>,
}

impl ImportSummary {
    /// Total rows written across all tables.
    pub fn inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    /// Total rows removed across all tables.
    pub fn deleted(&self) -> usize {
        self.tables.iter().map(|t| t.deleted).sum()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.dry_run {
            "Raw import (DRY RUN, nothing written)"
        } else {
            "Raw import"
        };
        writeln!(f, "{title}")?;
        for _ in 0..title.len() {
            write!(f, "-")?;
        }
        writeln!(f)?;

        let width = self.tables.iter().map(|t| t.table.len()).max().unwrap_or(0);
        for t in &self.tables {
            writeln!(f, "{:<width$}  - {:>6}  + {:>6}", t.table, t.deleted, t.inserted)?;
        }
        write!(f, "total: -{} +{}", self.deleted(), self.inserted())
    }
}
