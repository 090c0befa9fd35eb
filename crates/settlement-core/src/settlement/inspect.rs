use super::*;

impl<'c> Settlement<'c> {
    /// Renders the settlement as one JSON view: the sheet with its computed
    /// minimums, the compatible game assets, option decks, and survivor
    /// derived data. Everything the sheet needs comes from this one call.
    pub fn serialize(&self) -> Result<Value, SettlementError> {
        let campaign = self.campaign()?;

        let mut sheet = serde_json::to_value(&self.doc)
            .map_err(|err| SettlementError::Validation(format!("sheet does not serialize: {err}")))?;
        if let Some(sheet) = sheet.as_object_mut() {
            for key in ["locations", "innovations", "defeated_monsters"] {
                if let Some(list) = sheet.get_mut(key).and_then(Value::as_array_mut) {
                    list.sort_by(|a, b| a.as_str().unwrap_or("").cmp(b.as_str().unwrap_or("")));
                }
            }
            sheet.insert("settlement_notes".to_string(), json!(self.notes));
            sheet.insert(
                "enforce_survival_limit".to_string(),
                json!(self.enforce_survival_limit()),
            );
            sheet.insert(
                "minimum_survival_limit".to_string(),
                json!(self.min_survival_limit()),
            );
            sheet.insert(
                "minimum_population".to_string(),
                json!(self.survivors.iter().filter(|s| !s.dead).count()),
            );
            sheet.insert(
                "minimum_death_count".to_string(),
                json!(self.survivors.iter().filter(|s| s.dead).count()),
            );
        }

        let bonuses = self.bonuses();

        Ok(json!({
            "sheet": sheet,
            "user_assets": {
                "survivors": self.survivors,
            },
            "game_assets": {
                "innovations": self.available_assets(&self.content.innovations, &[]),
                "locations": self.available_assets(&self.content.locations, &[]),
                "monsters": self.available_assets(&self.content.monsters, &[]),
                "events": self.available_assets(&self.content.events, &[]),
                "innovation_deck": self.innovation_deck(),
                "principles_options": self.principles_options()?,
                "milestones_options": self.milestones_options()?,
                "nemesis_options": self.monster_option_names("nemesis_monsters")?,
                "quarry_options": self.monster_option_names("quarries")?,
                "special_showdown_options": self.special_showdowns()?,
                "survival_actions": self.survival_actions()?,
                "campaign": campaign,
            },
            "survivor_bonuses": {
                "settlement_buff": bonuses.settlement_buffs,
                "survivor_buff": bonuses.survivor_buffs,
                "departure_buff": bonuses.departure_buffs,
            },
            "survivor_attribute_milestones": campaign.survivor_attribute_milestones,
            "eligible_parents": self.eligible_parents(),
            "event_log": self.event_log,
        }))
    }

    /// Campaign principle groups in sort order, each option flagged when it
    /// is the active election.
    pub fn principles_options(&self) -> Result<Vec<Value>, SettlementError> {
        let campaign = self.campaign()?;

        let mut groups = Vec::with_capacity(campaign.principles.len());
        for handle in &campaign.principles {
            groups.push(self.content.principle_group(handle)?);
        }
        groups.sort_by_key(|group| group.sort_order);

        let mut output = Vec::with_capacity(groups.len());
        for group in groups {
            let mut options = serde_json::Map::new();
            for option in &group.option_handles {
                let asset = self.content.innovations.require(option)?;
                options.insert(
                    option.clone(),
                    json!({
                        "handle": asset.handle,
                        "name": asset.name,
                        "checked": self.doc.principles.contains(option),
                    }),
                );
            }
            output.push(json!({
                "handle": group.handle,
                "name": group.name,
                "sort_order": group.sort_order,
                "options": options,
            }));
        }
        Ok(output)
    }

    /// Campaign milestone definitions, for the sheet's milestone controls.
    pub fn milestones_options(&self) -> Result<Vec<Value>, SettlementError> {
        let campaign = self.campaign()?;
        let mut output = Vec::with_capacity(campaign.milestones.len());
        for handle in &campaign.milestones {
            let milestone = self.content.milestone(handle)?;
            output.push(json!(milestone));
        }
        Ok(output)
    }

    fn monster_option_names(&self, monster_type: &str) -> Result<Vec<Value>, SettlementError> {
        Ok(self
            .monster_options(monster_type)?
            .into_iter()
            .map(|monster| json!({ "handle": monster.handle, "name": monster.name }))
            .collect())
    }

    /// Living survivors grouped by sex; the lists carry names and ids only.
    pub fn eligible_parents(&self) -> Value {
        let mut male = Vec::new();
        let mut female = Vec::new();
        for survivor in self.survivors.iter().filter(|s| !s.dead) {
            let entry = json!({ "name": survivor.name, "id": survivor.id });
            match survivor.sex.as_str() {
                "M" => male.push(entry),
                "F" => female.push(entry),
                _ => {}
            }
        }
        json!({ "male": male, "female": female })
    }
}
