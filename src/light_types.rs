use crate::error::{LightError, Result};
use crate::host::{NodeRef, SceneHost};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightCategory {
    Point,
    Spot,
    Directional,
    Ambient,
    Area,
    Volume,
}

impl LightCategory {
    pub const ALL: [LightCategory; 6] = [
        LightCategory::Point,
        LightCategory::Spot,
        LightCategory::Directional,
        LightCategory::Ambient,
        LightCategory::Area,
        LightCategory::Volume,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            LightCategory::Point => "Point Light",
            LightCategory::Spot => "Spot Light",
            LightCategory::Directional => "Directional Light",
            LightCategory::Ambient => "Ambient Light",
            LightCategory::Area => "Area Light",
            LightCategory::Volume => "Volume Light",
        }
    }

    /// Token written into light files. Also the node type the scene host
    /// creates and reports back from `object_type`.
    pub fn persisted_token(self) -> &'static str {
        match self {
            LightCategory::Point => "pointLight",
            LightCategory::Spot => "spotLight",
            LightCategory::Directional => "directionalLight",
            LightCategory::Ambient => "ambientLight",
            LightCategory::Area => "areaLight",
            LightCategory::Volume => "volumeLight",
        }
    }

    /// Conventional `<firstWordLowercased>Light` form of the display name.
    pub fn derived_token(self) -> String {
        let first = self.display_name().split_whitespace().next().unwrap_or_default();
        format!("{}Light", first.to_lowercase())
    }
}

impl fmt::Display for LightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Accepts the display name ("Spot Light"), the short name ("spot") or the
/// persisted token ("spotLight"), ignoring case.
impl FromStr for LightCategory {
    type Err = LightError;

    fn from_str(value: &str) -> Result<Self> {
        let needle = value.trim();
        LightCategory::ALL
            .into_iter()
            .find(|category| {
                category.display_name().eq_ignore_ascii_case(needle)
                    || category.persisted_token().eq_ignore_ascii_case(needle)
                    || category
                        .display_name()
                        .split_whitespace()
                        .next()
                        .is_some_and(|first| first.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| LightError::UnsupportedCategory(needle.to_string()))
    }
}

/// Closed lookup table from light categories to host creation and tokens.
#[derive(Debug, Clone)]
pub struct LightTypeRegistry {
    categories: Vec<LightCategory>,
}

impl Default for LightTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LightTypeRegistry {
    pub fn new() -> Self {
        Self { categories: LightCategory::ALL.to_vec() }
    }

    /// Registry limited to the given categories, kept in the given order.
    pub fn with_categories(categories: impl IntoIterator<Item = LightCategory>) -> Self {
        let mut unique = Vec::new();
        for category in categories {
            if !unique.contains(&category) {
                unique.push(category);
            }
        }
        Self { categories: unique }
    }

    pub fn contains(&self, category: LightCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Categories in registry order.
    pub fn categories(&self) -> &[LightCategory] {
        &self.categories
    }

    /// Categories sorted by display name, for category pickers.
    pub fn all_categories(&self) -> Vec<LightCategory> {
        let mut sorted = self.categories.clone();
        sorted.sort_by_key(|category| category.display_name());
        sorted
    }

    pub fn host_types(&self) -> Vec<&'static str> {
        self.categories.iter().map(|category| category.persisted_token()).collect()
    }

    pub fn create<H: SceneHost + ?Sized>(&self, host: &mut H, category: LightCategory) -> Result<NodeRef> {
        if !self.contains(category) {
            return Err(LightError::UnsupportedCategory(category.display_name().to_string()));
        }
        let node = host.create_light(category.persisted_token())?;
        debug!(category = %category, node = %node, "created light");
        Ok(node)
    }

    pub fn category_named(&self, display_name: &str) -> Result<LightCategory> {
        let trimmed = display_name.trim();
        self.categories
            .iter()
            .copied()
            .find(|category| category.display_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LightError::UnsupportedCategory(trimmed.to_string()))
    }

    pub fn category_for_type(&self, host_type: &str) -> Option<LightCategory> {
        self.categories.iter().copied().find(|category| category.persisted_token() == host_type)
    }

    /// First category, in registry order, whose persisted token equals `token`.
    pub fn reconcile(&self, token: &str) -> Option<LightCategory> {
        self.categories.iter().copied().find(|category| category.persisted_token() == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_tokens_follow_naming_convention() {
        for category in LightCategory::ALL {
            assert_eq!(category.persisted_token(), category.derived_token(), "{category}");
        }
    }

    #[test]
    fn reconciles_point_and_area_tokens() {
        let registry = LightTypeRegistry::new();
        assert_eq!(registry.reconcile("pointLight"), Some(LightCategory::Point));
        assert_eq!(registry.reconcile("areaLight"), Some(LightCategory::Area));
        assert_eq!(registry.reconcile("ambientLight"), Some(LightCategory::Ambient));
        assert_eq!(registry.reconcile("meshLight"), None);
        assert_eq!(registry.reconcile("PointLight"), None);
    }

    #[test]
    fn all_categories_sorted_by_display_name() {
        let names: Vec<_> =
            LightTypeRegistry::new().all_categories().into_iter().map(LightCategory::display_name).collect();
        assert_eq!(
            names,
            ["Ambient Light", "Area Light", "Directional Light", "Point Light", "Spot Light", "Volume Light"]
        );
    }

    #[test]
    fn category_lookup_by_display_name() {
        let registry = LightTypeRegistry::with_categories([LightCategory::Spot, LightCategory::Point]);
        assert_eq!(registry.category_named(" spot light ").unwrap(), LightCategory::Spot);
        let err = registry.category_named("Area Light").unwrap_err();
        assert!(matches!(err, LightError::UnsupportedCategory(ref name) if name == "Area Light"));
        assert_eq!(registry.host_types(), ["spotLight", "pointLight"]);
    }

    #[test]
    fn parses_names_tokens_and_short_forms() {
        assert_eq!("Volume Light".parse::<LightCategory>().unwrap(), LightCategory::Volume);
        assert_eq!("directionalLight".parse::<LightCategory>().unwrap(), LightCategory::Directional);
        assert_eq!("AMBIENT".parse::<LightCategory>().unwrap(), LightCategory::Ambient);
        assert!("Light".parse::<LightCategory>().is_err());
    }

    #[test]
    fn subset_registry_rejects_missing_category() {
        let registry = LightTypeRegistry::with_categories([LightCategory::Point, LightCategory::Point]);
        assert_eq!(registry.categories(), &[LightCategory::Point]);
        let mut scene = crate::scene::MemoryScene::new();
        let err = registry.create(&mut scene, LightCategory::Volume).unwrap_err();
        assert_eq!(err.kind(), "unsupported_category");
        assert!(scene.nodes().is_empty());
    }
}
