use super::*;

impl<'c> Settlement<'c> {
    /// Creates a new settlement: builds the base sheet, applies the
    /// campaign's sheet init and timeline template, then layers on the
    /// requested expansions, specials, and prefab survivors.
    pub fn create(
        content: &'c GameContent,
        id: impl Into<String>,
        request: &NewSettlement,
    ) -> Result<Self, SettlementError> {
        let campaign_handle = if request.campaign.is_empty() {
            content
                .campaigns
                .values()
                .find(|campaign| campaign.default)
                .map(|campaign| campaign.handle.clone())
                .ok_or_else(|| SettlementError::Validation("no default campaign".to_string()))?
        } else {
            content.campaign(&request.campaign)?.handle.clone()
        };

        let doc = SettlementDocument {
            id: id.into(),
            name: request.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            campaign: campaign_handle,
            lantern_year: 0,
            population: 0,
            death_count: 0,
            survival_limit: 1,
            lost_settlements: 0,
            meta: contracts::SchemaMeta::current(),
            ..SettlementDocument::default()
        };

        let mut settlement = Self::from_parts(content, doc, Vec::new(), Vec::new());
        let name = settlement.doc.name.clone();
        settlement.log_event("new_settlement", format!("Created {name}"));

        settlement.initialize_sheet()?;
        settlement.initialize_timeline()?;

        // Requested expansions join the campaign's sheet-init expansions,
        // then everything goes through add_expansions so timeline deltas
        // and nemesis roster changes apply uniformly.
        let mut all_expansions = settlement.doc.expansions.clone();
        for handle in &request.expansions {
            if !all_expansions.contains(handle) {
                all_expansions.push(handle.clone());
            }
        }
        settlement.doc.expansions.clear();
        settlement.add_expansions(&all_expansions)?;

        for special in &request.specials {
            settlement.apply_special(special)?;
        }

        for template_handle in &request.survivors {
            let template = content.survivor_template(template_handle)?.clone();
            settlement.add_survivor_from_template(&template);
            settlement
                .doc
                .storage
                .extend(template.storage.iter().cloned());
        }

        settlement.enforce_minimums();
        settlement.dirty = true;
        Ok(settlement)
    }

    /// Copies the campaign's `settlement_sheet_init` onto the sheet. Runs
    /// once at creation; it overwrites without asking.
    pub(crate) fn initialize_sheet(&mut self) -> Result<(), SettlementError> {
        let init = self.campaign()?.settlement_sheet_init.clone();
        self.doc.quarries = init.quarries;
        self.doc.nemesis_monsters = init.nemesis_monsters;
        self.doc.nemesis_encounters = init.nemesis_encounters;
        self.doc.expansions = init.expansions;
        self.doc.storage = init.storage;
        self.dirty = true;
        info!(settlement = %self.doc.id, "initialized settlement sheet");
        Ok(())
    }

    /// Applies a new-settlement special script: survivors, storage grants,
    /// a starting quarry, and scripted timeline events.
    pub(crate) fn apply_special(&mut self, handle: &str) -> Result<(), SettlementError> {
        let script = self.content.special(handle)?.clone();

        for template in &script.random_survivors {
            self.add_survivor_from_template(template);
        }

        for grant in &script.storage {
            for _ in 0..grant.quantity {
                self.doc.storage.push(grant.name.clone());
            }
        }

        if let Some(quarry) = &script.current_quarry {
            self.set_current_quarry(quarry)?;
        }

        for event in &script.timeline_events {
            self.add_timeline_event(event)?;
        }

        let script_name = script.name.clone();
        self.log_event("apply_special", format!("Automatically applied '{script_name}' parameters."));
        Ok(())
    }

    pub(crate) fn add_survivor_from_template(&mut self, template: &contracts::SurvivorTemplate) {
        let ordinal = self.survivors.len() + 1;
        let name = template
            .name
            .clone()
            .unwrap_or_else(|| format!("Survivor {ordinal}"));
        self.survivors.push(Survivor {
            id: format!("{}_survivor_{ordinal}", self.doc.id),
            settlement: self.doc.id.clone(),
            name,
            sex: template.sex.clone(),
            dead: false,
            attributes: template.attributes.clone(),
        });
        self.dirty = true;
    }
}
