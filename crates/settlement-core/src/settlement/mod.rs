use std::collections::BTreeMap;

mod commands;
mod compat;
mod expansions;
mod init;
mod inspect;
mod normalize;
mod principles;
mod timeline;

pub use compat::Bonuses;
pub use normalize::NormalizeOutcome;

use contracts::{
    AssetDef, CampaignDef, EventRecord, LogEntry, NewSettlement, SettlementDocument,
    SettlementNote, Survivor, TimelineEvent, YearEntry,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::catalog::{AssetCatalog, AssetLibrary, GameContent};
use crate::SettlementError;

/// Bulk survivor attribute operation used by principle elections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOp {
    Increment,
    Decrement,
}

/// The settlement aggregate: the persisted document plus its dependent
/// survivors and notes, a per-session event log, and a borrowed content
/// context. All command methods return `Ok(true)` on mutation, `Ok(false)`
/// on a logged no-op, and `Err` when the command is rejected with state
/// unchanged.
#[derive(Debug)]
pub struct Settlement<'c> {
    content: &'c GameContent,
    doc: SettlementDocument,
    survivors: Vec<Survivor>,
    notes: Vec<SettlementNote>,
    event_log: Vec<LogEntry>,
    dirty: bool,
}

impl<'c> Settlement<'c> {
    /// Wraps an already-normalized document. Use [`Settlement::load`] for
    /// documents coming from storage, which may predate the current schema.
    pub fn from_parts(
        content: &'c GameContent,
        doc: SettlementDocument,
        survivors: Vec<Survivor>,
        notes: Vec<SettlementNote>,
    ) -> Self {
        Self {
            content,
            doc,
            survivors,
            notes,
            event_log: Vec::new(),
            dirty: false,
        }
    }

    /// Loads a raw document, running the normalization pipeline first. A
    /// fatal migration step aborts the load and nothing is returned.
    pub fn load(
        content: &'c GameContent,
        raw: Value,
        survivors: Vec<Survivor>,
        notes: Vec<SettlementNote>,
    ) -> Result<Self, SettlementError> {
        let outcome = normalize::normalize(content, raw)?;
        let mut settlement = Self::from_parts(content, outcome.doc, survivors, notes);
        settlement.notes.extend(outcome.extracted_notes);
        settlement.dirty = outcome.dirty;
        settlement.enforce_minimums();
        Ok(settlement)
    }

    pub fn document(&self) -> &SettlementDocument {
        &self.doc
    }

    pub fn survivors(&self) -> &[Survivor] {
        &self.survivors
    }

    pub fn notes(&self) -> &[SettlementNote] {
        &self.notes
    }

    pub fn event_log(&self) -> &[LogEntry] {
        &self.event_log
    }

    /// True when a command or migration changed state since the settlement
    /// was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn campaign(&self) -> Result<&'c CampaignDef, SettlementError> {
        self.content.campaign(&self.doc.campaign)
    }

    pub fn lantern_year(&self) -> u64 {
        self.doc.lantern_year
    }

    pub(crate) fn log_event(&mut self, event_type: &str, message: impl Into<String>) {
        let message = message.into();
        info!(settlement = %self.doc.id, event_type, "{message}");
        self.event_log.push(LogEntry {
            lantern_year: self.doc.lantern_year,
            event_type: event_type.to_string(),
            message,
        });
    }

    /// Mutable access to a named handle collection on the sheet. The names
    /// match the persisted document fields.
    pub(crate) fn collection_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "expansions" => Some(&mut self.doc.expansions),
            "innovations" => Some(&mut self.doc.innovations),
            "locations" => Some(&mut self.doc.locations),
            "principles" => Some(&mut self.doc.principles),
            "quarries" => Some(&mut self.doc.quarries),
            "nemesis_monsters" => Some(&mut self.doc.nemesis_monsters),
            "defeated_monsters" => Some(&mut self.doc.defeated_monsters),
            _ => None,
        }
    }

    pub(crate) fn collection(&self, name: &str) -> Option<&Vec<String>> {
        match name {
            "expansions" => Some(&self.doc.expansions),
            "innovations" => Some(&self.doc.innovations),
            "locations" => Some(&self.doc.locations),
            "principles" => Some(&self.doc.principles),
            "quarries" => Some(&self.doc.quarries),
            "nemesis_monsters" => Some(&self.doc.nemesis_monsters),
            "defeated_monsters" => Some(&self.doc.defeated_monsters),
            _ => None,
        }
    }

    /// Raises survival limit, population, and death count to their computed
    /// floors. Runs at the end of every load.
    pub(crate) fn enforce_minimums(&mut self) {
        let min_sl = self.min_survival_limit();
        if self.doc.survival_limit < min_sl {
            self.doc.survival_limit = min_sl;
            self.log_event(
                "enforce_minimums",
                format!("Survival Limit automatically increased to {min_sl}"),
            );
            self.dirty = true;
        }

        let min_pop = self.survivors.iter().filter(|s| !s.dead).count() as i64;
        if self.doc.population < min_pop {
            self.doc.population = min_pop;
            self.log_event(
                "enforce_minimums",
                format!("Settlement Population automatically increased to {min_pop}"),
            );
            self.dirty = true;
        }

        let min_deaths = self.survivors.iter().filter(|s| s.dead).count() as i64;
        if self.doc.death_count < min_deaths {
            self.doc.death_count = min_deaths;
            self.log_event(
                "enforce_minimums",
                format!("Settlement Death Count automatically increased to {min_deaths}"),
            );
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests;
