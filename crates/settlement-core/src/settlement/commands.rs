use super::*;

impl<'c> Settlement<'c> {
    pub fn add_location(&mut self, handle: &str) -> Result<bool, SettlementError> {
        let location = self.content.locations.require(handle)?.clone();

        if self.doc.locations.iter().any(|l| l == handle) {
            warn!(settlement = %self.doc.id, handle, "ignoring duplicate location");
            return Ok(false);
        }

        self.doc.locations.push(handle.to_string());
        if location.levels.is_some() {
            self.doc.location_levels.insert(handle.to_string(), 1);
        }
        self.log_event(
            "add_location",
            format!("Added '{}' to settlement locations.", location.name),
        );
        self.dirty = true;
        Ok(true)
    }

    pub fn rm_location(&mut self, handle: &str) -> Result<bool, SettlementError> {
        let location = self.content.locations.require(handle)?.clone();

        let Some(position) = self.doc.locations.iter().position(|l| l == handle) else {
            warn!(settlement = %self.doc.id, handle, "location is not on the sheet");
            return Ok(false);
        };

        self.doc.locations.remove(position);
        self.log_event(
            "rm_location",
            format!("Removed '{}' from settlement locations.", location.name),
        );
        self.dirty = true;
        Ok(true)
    }

    pub fn add_innovation(&mut self, handle: &str) -> Result<bool, SettlementError> {
        if self.doc.innovations.iter().any(|i| i == handle) {
            warn!(settlement = %self.doc.id, handle, "ignoring duplicate innovation");
            return Ok(false);
        }

        let innovation = self.content.innovations.require(handle)?.clone();

        self.doc.innovations.push(handle.to_string());
        if innovation.levels.is_some() {
            self.doc.innovation_levels.insert(handle.to_string(), 1);
        }
        self.log_event(
            "add_innovation",
            format!("Added '{}' to settlement innovations.", innovation.name),
        );
        self.dirty = true;
        Ok(true)
    }

    pub fn rm_innovation(&mut self, handle: &str) -> Result<bool, SettlementError> {
        let innovation = self.content.innovations.require(handle)?.clone();

        let Some(position) = self.doc.innovations.iter().position(|i| i == handle) else {
            warn!(settlement = %self.doc.id, handle, "innovation is not on the sheet");
            return Ok(false);
        };

        self.doc.innovations.remove(position);
        self.log_event(
            "rm_innovation",
            format!("Removed '{}' from settlement innovations.", innovation.name),
        );
        self.dirty = true;
        Ok(true)
    }

    pub fn set_innovation_level(&mut self, handle: &str, level: i64) -> Result<bool, SettlementError> {
        let innovation = self.content.innovations.require(handle)?.clone();

        if !self.doc.innovations.iter().any(|i| i == handle) {
            return Err(SettlementError::Validation(format!(
                "innovation '{handle}' is not on the sheet"
            )));
        }

        self.doc.innovation_levels.insert(handle.to_string(), level);
        self.log_event(
            "set_innovation_level",
            format!("Set '{}' innovation level to {level}.", innovation.name),
        );
        self.dirty = true;
        Ok(true)
    }

    pub fn set_location_level(&mut self, handle: &str, level: i64) -> Result<bool, SettlementError> {
        let location = self.content.locations.require(handle)?.clone();

        if !self.doc.locations.iter().any(|l| l == handle) {
            return Err(SettlementError::Validation(format!(
                "location '{handle}' is not on the sheet"
            )));
        }

        self.doc.location_levels.insert(handle.to_string(), level);
        self.log_event(
            "set_location_level",
            format!("Set '{}' location level to {level}.", location.name),
        );
        self.dirty = true;
        Ok(true)
    }

    pub fn set_current_quarry(&mut self, quarry: &str) -> Result<bool, SettlementError> {
        let monster = self.content.monsters.require(quarry)?.clone();
        self.doc.current_quarry = Some(quarry.to_string());
        self.log_event("set_quarry", format!("Set target monster to {}", monster.name));
        self.dirty = true;
        Ok(true)
    }

    /// Sets the lost-settlements count. Negative input clamps to zero.
    pub fn set_lost_settlements(&mut self, value: i64) -> Result<bool, SettlementError> {
        let value = value.max(0);
        self.doc.lost_settlements = value;
        self.log_event("set_lost_settlements", format!("Set Lost Settlements count to {value}"));
        self.dirty = true;
        Ok(true)
    }

    /// Adds `modifier` to the endeavor-token count, clamped at zero.
    pub fn update_endeavor_tokens(&mut self, modifier: i64) -> Result<bool, SettlementError> {
        let value = (self.doc.endeavor_tokens + modifier).max(0);
        self.doc.endeavor_tokens = value;
        self.log_event("update_endeavor_tokens", format!("Set endeavor tokens to {value}"));
        self.dirty = true;
        Ok(true)
    }

    /// Replaces the achieved-levels list for a nemesis monster already on
    /// the sheet roster. An off-roster nemesis is a logged no-op.
    pub fn update_nemesis_levels(&mut self, handle: &str, levels: Vec<i64>) -> Result<bool, SettlementError> {
        if !self.doc.nemesis_monsters.iter().any(|n| n == handle) {
            warn!(settlement = %self.doc.id, handle, "nemesis is not on the sheet roster");
            return Ok(false);
        }

        self.doc.nemesis_encounters.insert(handle.to_string(), levels);
        self.log_event("update_nemesis_levels", format!("Updated nemesis encounters for '{handle}'"));
        self.dirty = true;
        Ok(true)
    }

    /// Adds `modifier` to the population, clamped at zero.
    pub fn update_population(&mut self, modifier: i64) -> Result<bool, SettlementError> {
        let value = (self.doc.population + modifier).max(0);
        self.doc.population = value;
        self.log_event("update_population", format!("Updated settlement population to {value}"));
        self.dirty = true;
        Ok(true)
    }

    pub fn add_settlement_note(&mut self, note: SettlementNote) -> Result<bool, SettlementError> {
        if note.note.trim().is_empty() {
            return Err(SettlementError::Validation("settlement note is empty".to_string()));
        }
        let author = note.author.clone();
        self.notes.push(SettlementNote {
            note: note.note.trim().to_string(),
            ..note
        });
        info!(settlement = %self.doc.id, author, "added a settlement note");
        self.dirty = true;
        Ok(true)
    }

    pub fn rm_settlement_note(&mut self, js_id: &str) -> Result<bool, SettlementError> {
        let before = self.notes.len();
        self.notes.retain(|note| note.js_id != js_id);
        if self.notes.len() == before {
            warn!(settlement = %self.doc.id, js_id, "no settlement note to remove");
            return Ok(false);
        }
        info!(settlement = %self.doc.id, js_id, "removed a settlement note");
        self.dirty = true;
        Ok(true)
    }
}
