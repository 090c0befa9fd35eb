use super::*;
use tracing::error;

impl<'c> Settlement<'c> {
    /// Adds expansion content. Unknown and already-present handles are
    /// pruned with a warning. Timeline deltas only apply to the current
    /// lantern year and later; past years stay untouched.
    pub fn add_expansions(&mut self, handles: &[String]) -> Result<bool, SettlementError> {
        let mut accepted = Vec::new();
        for handle in handles {
            if !self.content.expansions.contains_key(handle) {
                warn!(settlement = %self.doc.id, handle, "unknown expansion handle is being ignored");
                continue;
            }
            if self.doc.expansions.contains(handle) {
                warn!(settlement = %self.doc.id, handle, "expansion is already present");
                continue;
            }
            accepted.push(handle.clone());
        }

        if accepted.is_empty() {
            return Ok(false);
        }

        let current_ly = self.doc.lantern_year;
        for handle in &accepted {
            let expansion = self.content.expansion(handle)?.clone();
            self.log_event(
                "add_expansion",
                format!("Adding '{}' expansion content!", expansion.name),
            );

            self.doc.expansions.push(handle.clone());

            for event in expansion.timeline_add.iter().filter(|e| e.ly >= current_ly) {
                self.add_timeline_event(event)?;
            }
            for event in expansion.timeline_rm.iter().filter(|e| e.ly >= current_ly) {
                self.rm_timeline_event(event)?;
            }

            for monster in &expansion.rm_nemesis_monsters {
                if let Some(position) = self.doc.nemesis_monsters.iter().position(|m| m == monster) {
                    self.doc.nemesis_monsters.remove(position);
                    info!(settlement = %self.doc.id, monster, "removed nemesis monster");
                }
            }
        }

        self.dirty = true;
        Ok(true)
    }

    /// Removes expansion content, undoing timeline deltas on a best-effort
    /// basis: a timeline reversal that no longer applies is logged and
    /// skipped rather than rolling anything back, so manual timeline edits
    /// made after the expansion was added can survive removal.
    pub fn rm_expansions(&mut self, handles: &[String]) -> Result<bool, SettlementError> {
        let mut accepted = Vec::new();
        for handle in handles {
            if !self.content.expansions.contains_key(handle) {
                warn!(settlement = %self.doc.id, handle, "unknown expansion handle is being ignored");
                continue;
            }
            if !self.doc.expansions.contains(handle) {
                warn!(settlement = %self.doc.id, handle, "expansion is not present");
                continue;
            }
            accepted.push(handle.clone());
        }

        if accepted.is_empty() {
            return Ok(false);
        }

        let current_ly = self.doc.lantern_year;
        for handle in &accepted {
            let expansion = self.content.expansion(handle)?.clone();
            self.log_event(
                "rm_expansion",
                format!("Removing '{}' ({}) expansion content!", expansion.name, expansion.handle),
            );

            if let Some(position) = self.doc.expansions.iter().position(|e| e == handle) {
                self.doc.expansions.remove(position);
            }

            for event in expansion.timeline_add.iter().filter(|e| e.ly >= current_ly) {
                if let Err(err) = self.rm_timeline_event(event) {
                    error!(
                        settlement = %self.doc.id,
                        expansion = %expansion.handle,
                        %event,
                        "could not remove timeline event: {err}"
                    );
                }
            }
            for event in expansion.timeline_rm.iter().filter(|e| e.ly >= current_ly) {
                if let Err(err) = self.add_timeline_event(event) {
                    error!(
                        settlement = %self.doc.id,
                        expansion = %expansion.handle,
                        %event,
                        "could not restore timeline event: {err}"
                    );
                }
            }

            for monster in &expansion.rm_nemesis_monsters {
                if !self.doc.nemesis_monsters.contains(monster) {
                    self.doc.nemesis_monsters.push(monster.clone());
                    info!(settlement = %self.doc.id, monster, "restored nemesis monster");
                }
            }
        }

        self.dirty = true;
        Ok(true)
    }
}
