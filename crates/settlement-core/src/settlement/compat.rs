use super::*;

/// Buff texts aggregated across acquired innovations and principles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bonuses {
    pub settlement_buffs: BTreeMap<String, String>,
    pub survivor_buffs: BTreeMap<String, String>,
    pub departure_buffs: BTreeMap<String, String>,
}

impl<'c> Settlement<'c> {
    /// Whether an asset may be used by this settlement: its campaign
    /// exclusions, expansion requirement, and the campaign's forbidden map
    /// all have to clear. The forbidden map is keyed by asset kind and may
    /// list either handles or display names.
    pub fn is_compatible(&self, asset: &AssetDef) -> bool {
        if asset.excluded_campaigns.contains(&self.doc.campaign) {
            return false;
        }

        if let Some(expansion) = asset.expansion.as_deref() {
            if !self.doc.expansions.iter().any(|e| e == expansion) {
                return false;
            }
        }

        if let Ok(campaign) = self.campaign() {
            if let Some(forbidden) = campaign.forbidden.get(&asset.kind) {
                if forbidden.contains(&asset.handle) || forbidden.contains(&asset.name) {
                    return false;
                }
            }
        }

        true
    }

    /// Compatible assets from a library, keyed by handle, with an optional
    /// kind exclusion.
    pub fn available_assets(
        &self,
        library: &'c AssetLibrary,
        exclude_kinds: &[&str],
    ) -> BTreeMap<String, &'c AssetDef> {
        library
            .filter_by_type(exclude_kinds)
            .into_iter()
            .filter(|asset| self.is_compatible(asset))
            .map(|asset| (asset.handle.clone(), asset))
            .collect()
    }

    /// Acquired innovation definitions, optionally with active principles.
    /// Unknown handles in the document are skipped with a warning.
    pub(crate) fn acquired_innovations(&self, include_principles: bool) -> Vec<&'c AssetDef> {
        let mut handles: Vec<&String> = self.doc.innovations.iter().collect();
        if include_principles {
            handles.extend(self.doc.principles.iter());
        }

        let mut output = Vec::with_capacity(handles.len());
        for handle in handles {
            match self.content.innovations.get_asset(handle) {
                Some(asset) => output.push(asset),
                None => warn!(settlement = %self.doc.id, handle, "ignoring unknown innovation handle"),
            }
        }
        output
    }

    /// Derives the current innovation deck from scratch:
    ///
    /// 1. start from all compatible innovations, principles excluded;
    /// 2. collect the consequences of acquired innovations, then drop the
    ///    acquired innovations from the pool;
    /// 3. seed the deck with unacquired, compatible consequences;
    /// 4. force in pool innovations whose `available_if` condition is met;
    /// 5. return the deck as a sorted list of display names.
    pub fn innovation_deck(&self) -> Vec<String> {
        let mut pool = self.available_assets(&self.content.innovations, &["principle"]);

        let mut consequences: Vec<String> = Vec::new();
        for handle in &self.doc.innovations {
            if let Some(asset) = pool.get(handle.as_str()) {
                consequences.extend(asset.consequences.iter().cloned());
            }
            pool.remove(handle.as_str());
        }
        consequences.sort();
        consequences.dedup();

        let mut deck: BTreeMap<String, &AssetDef> = BTreeMap::new();
        for consequence in &consequences {
            if self.doc.innovations.iter().any(|i| i == consequence) {
                continue;
            }
            pool.remove(consequence.as_str());
            if let Some(asset) = self.content.innovations.get_asset(consequence) {
                if self.is_compatible(asset) {
                    deck.insert(asset.handle.clone(), asset);
                }
            }
        }

        for asset in pool.values() {
            for condition in &asset.available_if {
                let met = self
                    .collection(&condition.collection)
                    .map(|collection| collection.contains(&condition.handle))
                    .unwrap_or(false);
                if met {
                    deck.insert(asset.handle.clone(), asset);
                }
            }
        }

        let mut names: Vec<String> = deck.values().map(|asset| asset.name.clone()).collect();
        names.sort();
        names
    }

    /// Minimum survival limit: the sum of survival-limit contributions from
    /// acquired innovations and active principles.
    pub fn min_survival_limit(&self) -> i64 {
        self.acquired_innovations(true)
            .iter()
            .map(|asset| asset.survival_limit)
            .sum()
    }

    /// False when any active expansion suspends survival-limit enforcement.
    pub fn enforce_survival_limit(&self) -> bool {
        for handle in &self.doc.expansions {
            if let Ok(expansion) = self.content.expansion(handle) {
                if !expansion.enforce_survival_limit {
                    return false;
                }
            }
        }
        true
    }

    pub fn bonuses(&self) -> Bonuses {
        let mut bonuses = Bonuses::default();
        for asset in self.acquired_innovations(true) {
            if let Some(buff) = &asset.settlement_buff {
                bonuses
                    .settlement_buffs
                    .insert(asset.handle.clone(), buff.clone());
            }
            if let Some(buff) = &asset.survivor_buff {
                bonuses
                    .survivor_buffs
                    .insert(asset.handle.clone(), buff.clone());
            }
            if let Some(buff) = &asset.departure_buff {
                bonuses
                    .departure_buffs
                    .insert(asset.handle.clone(), buff.clone());
            }
        }
        bonuses
    }

    /// Survival actions for the campaign, flagged available when an
    /// acquired innovation grants them.
    pub fn survival_actions(&self) -> Result<Vec<AssetDef>, SettlementError> {
        let campaign = self.campaign()?;

        let granted: Vec<&str> = self
            .acquired_innovations(true)
            .iter()
            .filter_map(|asset| asset.survival_action.as_deref())
            .collect();

        let mut actions = Vec::with_capacity(campaign.survival_actions.len());
        for handle in &campaign.survival_actions {
            let mut action = self.content.survival_actions.require(handle)?.clone();
            action.available = handle == "dodge" || granted.contains(&handle.as_str());
            actions.push(action);
        }
        Ok(actions)
    }

    /// Special showdown monster handles available from the campaign plus
    /// active expansions.
    pub fn special_showdowns(&self) -> Result<Vec<String>, SettlementError> {
        let mut output = self.campaign()?.special_showdowns.clone();
        for handle in &self.doc.expansions {
            if let Ok(expansion) = self.content.expansion(handle) {
                output.extend(expansion.special_showdowns.iter().cloned());
            }
        }
        output.sort();
        output.dedup();
        Ok(output)
    }

    /// Selectable monster options for a sheet collection: campaign and
    /// expansion rosters, minus what the sheet already has, minus
    /// incompatible and campaign-forbidden monsters.
    pub fn monster_options(&self, monster_type: &str) -> Result<Vec<&'c AssetDef>, SettlementError> {
        let campaign = self.campaign()?;

        let mut candidates: Vec<String> = match monster_type {
            "quarries" => campaign.quarries.clone(),
            "nemesis_monsters" => campaign.nemesis_monsters.clone(),
            _ => {
                return Err(SettlementError::Validation(format!(
                    "'{monster_type}' is not a monster collection"
                )))
            }
        };

        for handle in &self.doc.expansions {
            if let Ok(expansion) = self.content.expansion(handle) {
                match monster_type {
                    "quarries" => candidates.extend(expansion.quarries.iter().cloned()),
                    _ => candidates.extend(expansion.nemesis_monsters.iter().cloned()),
                }
            }
        }
        candidates.sort();
        candidates.dedup();

        let on_sheet = self.collection(monster_type).cloned().unwrap_or_default();
        let forbidden = campaign.forbidden.get(monster_type).cloned().unwrap_or_default();

        let mut options = Vec::new();
        for handle in candidates {
            if on_sheet.contains(&handle) || forbidden.contains(&handle) {
                continue;
            }
            let Some(monster) = self.content.monsters.get_asset(&handle) else {
                continue;
            };
            // Final-boss monsters are not selectable sheet options.
            if monster.sub_type.as_deref() == Some("final_boss") {
                continue;
            }
            if self.is_compatible(monster) {
                options.push(monster);
            }
        }
        Ok(options)
    }
}
