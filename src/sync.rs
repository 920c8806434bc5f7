//! The sync driver: fetch, validate, resolve, confirm, insert.
//!
//! Two run shapes share the same pipeline:
//!
//! 1. [`SyncDriver::run_full`] fetches the whole dataset in one request and
//!    filters invalid records silently.
//! 2. [`SyncDriver::run_paginated`] walks the source page by page. Invalid
//!    records are counted across the run, and if any were seen the operator
//!    is asked once, after the last page, whether to insert the valid new
//!    records collected so far. Declining discards everything; previously
//!    resolved records are not partially committed.
//!
//! The existing-key snapshot is refreshed from the store once per page, and
//! records accepted earlier in the run are layered on top in memory, so a
//! record accepted from page N is never accepted again from page N+1.

use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use sync_core::{
    normalize, partition, resolve_new, Confirm, ExistingKeySet, PageCursor, Paginator, Source,
    SourceRecord, Store,
};
use tracing::{info, warn};

use crate::config::SyncConfig;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Non-empty pages processed (1 in whole-dataset mode)
    pub pages: u64,
    /// Records retrieved from the source
    pub fetched: usize,
    /// Records dropped for a missing/empty foreign-key field
    pub invalid: usize,
    /// Valid records whose lookup value already existed
    pub already_present: usize,
    /// Rows written (or that would be written, in dry-run mode)
    pub inserted: usize,
    /// True when the operator declined the confirmation prompt
    pub aborted: bool,
}

/// Orchestrates one run against injected source, store, and confirmation
/// capabilities.
pub struct SyncDriver<'a> {
    source: &'a dyn Source,
    store: &'a dyn Store,
    confirm: &'a dyn Confirm,
    config: &'a SyncConfig,
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        source: &'a dyn Source,
        store: &'a dyn Store,
        confirm: &'a dyn Confirm,
        config: &'a SyncConfig,
    ) -> Self {
        SyncDriver {
            source,
            store,
            confirm,
            config,
        }
    }

    /// Whole-dataset mode: one fetch, silent filtering, no prompt.
    pub async fn run_full(&self) -> anyhow::Result<SyncReport> {
        let mut report = SyncReport::default();

        let records = self
            .source
            .fetch_all()
            .await
            .context("Failed to fetch records from source")?;
        report.fetched = records.len();
        if records.is_empty() {
            info!("Source returned no records, nothing to do");
            return Ok(report);
        }
        report.pages = 1;

        let (valid, invalid) = partition(records, self.fk_source_field()?);
        report.invalid = invalid;

        let existing = self.snapshot_existing().await?;
        let resolution = resolve_new(&valid, &self.config.mapping, &existing)?;
        report.already_present = valid.len() - resolution.new_records.len();

        report.inserted = self.insert(&resolution.new_records).await?;
        Ok(report)
    }

    /// Paginated mode: per-page resolution, one confirmation gate at the end
    /// of the run if invalid records were seen.
    pub async fn run_paginated(&self) -> anyhow::Result<SyncReport> {
        let mut report = SyncReport::default();
        let mut paginator = Paginator::new(PageCursor::new(
            self.config.source.offset,
            self.config.source.limit,
            self.config.source.mode,
        ));
        let fk_field = self.fk_source_field()?;

        let mut accepted: Vec<SourceRecord> = Vec::new();
        // Lookup values accepted earlier in this run, per destination column.
        let mut accepted_keys: HashMap<String, HashSet<String>> = HashMap::new();

        loop {
            let (records, more) = paginator.next_page(self.source).await;
            if records.is_empty() {
                break;
            }
            report.pages += 1;
            report.fetched += records.len();

            let (valid, invalid) = partition(records, fk_field);
            report.invalid += invalid;

            let mut existing = self.snapshot_existing().await?;
            for (column, values) in &accepted_keys {
                for value in values {
                    existing.add(column, value.clone());
                }
            }

            let resolution = resolve_new(&valid, &self.config.mapping, &existing)?;
            report.already_present += valid.len() - resolution.new_records.len();

            if let Some(index) = resolution.matched_pair {
                let (source_field, dest_field) = self.config.mapping.lookup_pair(index);
                let keys = accepted_keys.entry(dest_field.to_string()).or_default();
                for record in &resolution.new_records {
                    if let Some(value) = record.lookup_value(source_field) {
                        keys.insert(value);
                    }
                }
            }
            accepted.extend(resolution.new_records);

            if !more {
                break;
            }
        }

        if report.invalid > 0 {
            let prompt = format!(
                "{} record(s) were missing a country code and were skipped. \
                 Insert the {} new record(s) that were found? [y/N] ",
                report.invalid,
                accepted.len()
            );
            let proceed = self
                .confirm
                .confirm(&prompt)
                .context("Failed to read confirmation")?;
            if !proceed {
                warn!(
                    "Insertion declined by operator, discarding {} resolved record(s)",
                    accepted.len()
                );
                report.aborted = true;
                return Ok(report);
            }
        }

        report.inserted = self.insert(&accepted).await?;
        Ok(report)
    }

    fn fk_source_field(&self) -> anyhow::Result<&str> {
        self.config
            .mapping
            .fk_source_field()
            .context("Foreign-key field is not produced by the column mapping")
    }

    /// Read the current lookup-key snapshot, one store query per configured
    /// lookup column.
    async fn snapshot_existing(&self) -> anyhow::Result<ExistingKeySet> {
        let mut existing = ExistingKeySet::new();
        for column in &self.config.mapping.lookup_dest_fields {
            let snapshot = self
                .store
                .read_lookup_column(column)
                .await
                .with_context(|| format!("Failed to read destination column '{column}'"))?;
            existing.load_column(column, snapshot);
        }
        Ok(existing)
    }

    async fn insert(&self, records: &[SourceRecord]) -> anyhow::Result<usize> {
        if records.is_empty() {
            info!("No new records to insert");
            return Ok(0);
        }

        let next_id = self
            .store
            .next_id()
            .await
            .context("Failed to fetch next id from destination")?;
        let rows = normalize(records, &self.config.mapping, next_id);

        if self.config.dry_run {
            info!("Dry run: would insert {} row(s)", rows.len());
            return Ok(rows.len());
        }

        let written = self
            .store
            .insert_rows(&rows)
            .await
            .context("Failed to insert rows into destination")?;
        info!("Inserted {written} new row(s)");
        Ok(written)
    }
}

/// Asks on the terminal and reads one line from stdin.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Always answers yes (`--yes`, and modes that never prompt).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> anyhow::Result<bool> {
        Ok(true)
    }
}
