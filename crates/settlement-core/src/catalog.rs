//! Asset catalogs and the explicit game-content context.
//!
//! Every content family (innovations, locations, monsters, events, survival
//! actions) is an [`AssetLibrary`] behind the one [`AssetCatalog`] trait.
//! [`GameContent`] bundles the libraries plus the campaign, expansion,
//! principle, milestone, and special definitions; callers pass it explicitly
//! wherever rules need content.

use std::collections::BTreeMap;

use contracts::{
    AssetDef, CampaignDef, ExpansionDef, MilestoneDef, PrincipleGroupDef, SpecialDef,
    SurvivorTemplate,
};

use crate::SettlementError;

pub trait AssetCatalog {
    fn get_asset(&self, handle: &str) -> Option<&AssetDef>;

    /// Exact-then-case-insensitive name lookup. Legacy documents stored
    /// display names rather than handles, with inconsistent casing.
    fn get_asset_from_name(&self, name: &str) -> Option<&AssetDef>;

    fn get_handles(&self) -> Vec<&str>;

    fn get_names(&self) -> Vec<&str>;

    /// All assets whose kind is not in `exclude_kinds`.
    fn filter_by_type(&self, exclude_kinds: &[&str]) -> Vec<&AssetDef>;
}

#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    assets: BTreeMap<String, AssetDef>,
}

impl AssetLibrary {
    pub fn new(assets: Vec<AssetDef>) -> Self {
        let assets = assets
            .into_iter()
            .map(|asset| (asset.handle.clone(), asset))
            .collect();
        Self { assets }
    }

    pub fn require(&self, handle: &str) -> Result<&AssetDef, SettlementError> {
        self.assets
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(handle.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetDef> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetCatalog for AssetLibrary {
    fn get_asset(&self, handle: &str) -> Option<&AssetDef> {
        self.assets.get(handle)
    }

    fn get_asset_from_name(&self, name: &str) -> Option<&AssetDef> {
        if let Some(asset) = self.assets.values().find(|asset| asset.name == name) {
            return Some(asset);
        }
        let folded = name.to_lowercase();
        self.assets
            .values()
            .find(|asset| asset.name.to_lowercase() == folded)
    }

    fn get_handles(&self) -> Vec<&str> {
        self.assets.keys().map(String::as_str).collect()
    }

    fn get_names(&self) -> Vec<&str> {
        self.assets.values().map(|asset| asset.name.as_str()).collect()
    }

    fn filter_by_type(&self, exclude_kinds: &[&str]) -> Vec<&AssetDef> {
        self.assets
            .values()
            .filter(|asset| !exclude_kinds.contains(&asset.kind.as_str()))
            .collect()
    }
}

/// Everything the rules engine needs to evaluate a settlement, passed
/// explicitly instead of read from globals.
#[derive(Debug, Clone, Default)]
pub struct GameContent {
    pub campaigns: BTreeMap<String, CampaignDef>,
    pub expansions: BTreeMap<String, ExpansionDef>,
    pub innovations: AssetLibrary,
    pub locations: AssetLibrary,
    pub monsters: AssetLibrary,
    pub events: AssetLibrary,
    pub survival_actions: AssetLibrary,
    pub milestones: BTreeMap<String, MilestoneDef>,
    pub principles: BTreeMap<String, PrincipleGroupDef>,
    pub specials: BTreeMap<String, SpecialDef>,
    pub survivor_templates: BTreeMap<String, SurvivorTemplate>,
}

impl GameContent {
    pub fn campaign(&self, handle: &str) -> Result<&CampaignDef, SettlementError> {
        self.campaigns
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(format!("campaign '{handle}'")))
    }

    pub fn campaign_from_name(&self, name: &str) -> Option<&CampaignDef> {
        self.campaigns.values().find(|campaign| campaign.name == name)
    }

    pub fn expansion(&self, handle: &str) -> Result<&ExpansionDef, SettlementError> {
        self.expansions
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(format!("expansion '{handle}'")))
    }

    pub fn expansion_from_name(&self, name: &str) -> Option<&ExpansionDef> {
        self.expansions
            .values()
            .find(|expansion| expansion.name == name)
    }

    pub fn principle_group(&self, handle: &str) -> Result<&PrincipleGroupDef, SettlementError> {
        self.principles
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(format!("principle group '{handle}'")))
    }

    pub fn milestone(&self, handle: &str) -> Result<&MilestoneDef, SettlementError> {
        self.milestones
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(format!("milestone '{handle}'")))
    }

    pub fn special(&self, handle: &str) -> Result<&SpecialDef, SettlementError> {
        self.specials
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(format!("special '{handle}'")))
    }

    pub fn survivor_template(&self, handle: &str) -> Result<&SurvivorTemplate, SettlementError> {
        self.survivor_templates
            .get(handle)
            .ok_or_else(|| SettlementError::UnknownAsset(format!("survivor template '{handle}'")))
    }

    /// The library backing a settlement collection name, for operations that
    /// are generic over which collection they touch.
    pub fn library_for(&self, collection: &str) -> Option<&AssetLibrary> {
        match collection {
            "innovations" => Some(&self.innovations),
            "locations" => Some(&self.locations),
            "quarries" | "nemesis_monsters" | "defeated_monsters" => Some(&self.monsters),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> AssetLibrary {
        AssetLibrary::new(vec![
            AssetDef {
                handle: "hovel".to_string(),
                name: "Hovel".to_string(),
                kind: "innovation".to_string(),
                ..AssetDef::default()
            },
            AssetDef {
                handle: "new_life".to_string(),
                name: "New Life".to_string(),
                kind: "principle".to_string(),
                ..AssetDef::default()
            },
        ])
    }

    #[test]
    fn name_lookup_falls_back_to_case_insensitive() {
        let lib = library();
        assert_eq!(lib.get_asset_from_name("Hovel").map(|a| a.handle.as_str()), Some("hovel"));
        assert_eq!(lib.get_asset_from_name("hOVEL").map(|a| a.handle.as_str()), Some("hovel"));
        assert!(lib.get_asset_from_name("Lantern Oven").is_none());
    }

    #[test]
    fn filter_by_type_excludes_kinds() {
        let lib = library();
        let filtered = lib.filter_by_type(&["principle"]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].handle, "hovel");
    }
}
