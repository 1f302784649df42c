//! Light panel entries.
//!
//! A [`PanelEntry`] is bound to exactly one light in the scene host and edits
//! it live: every widget interaction writes straight through to the host
//! attribute it mirrors, with nothing buffered on the panel side.

use crate::error::{LightError, Result};
use crate::host::{AttributeValue, HostError, LightAttribute, NodeRef, SceneHost};
use crate::light_types::{LightCategory, LightTypeRegistry};
use crate::solo::SoloRequest;
use crate::toolkit::{PanelToolkit, PanelView};
use glam::DVec3;
use std::fmt;
use tracing::debug;

pub const INTENSITY_MIN: i32 = 1;
pub const INTENSITY_MAX: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PanelEntry {
    id: EntryId,
    light: NodeRef,
    transform: NodeRef,
    category: LightCategory,
    visible: bool,
    suppressed: bool,
    soloed: bool,
    intensity: i32,
    color: DVec3,
}

impl PanelEntry {
    /// Binds a panel to `node`, which may be the light shape or its transform.
    pub fn bind<H: SceneHost + ?Sized>(
        id: EntryId,
        host: &H,
        registry: &LightTypeRegistry,
        node: &NodeRef,
    ) -> Result<Self> {
        let (light, category) = resolve_light(host, registry, node)?;
        let transform = host.transform_of(&light)?;
        let visible = host.get_bool(&transform, LightAttribute::Visibility)?;
        let intensity = slider_value(host.get_float(&light, LightAttribute::Intensity)?);
        let color = host.get_vector(&light, LightAttribute::Color)?;
        Ok(Self { id, light, transform, category, visible, suppressed: false, soloed: false, intensity, color })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn light(&self) -> &NodeRef {
        &self.light
    }

    pub fn transform(&self) -> &NodeRef {
        &self.transform
    }

    pub fn category(&self) -> LightCategory {
        self.category
    }

    /// Checkbox state: the user's visibility unless dimmed by a solo.
    pub fn checked(&self) -> bool {
        self.visible && !self.suppressed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn is_soloed(&self) -> bool {
        self.soloed
    }

    pub fn intensity(&self) -> i32 {
        self.intensity
    }

    pub fn color(&self) -> DVec3 {
        self.color
    }

    pub fn view(&self) -> PanelView {
        PanelView {
            entry: self.id,
            label: self.transform.to_string(),
            checked: self.checked(),
            soloed: self.soloed,
            intensity: self.intensity,
            swatch: swatch_rgb(self.color),
        }
    }

    /// Visibility checkbox toggled. Returns `false` if the light is gone.
    pub fn set_visible<H: SceneHost + ?Sized>(&mut self, host: &mut H, visible: bool) -> Result<bool> {
        if !self.is_live(&*host) {
            return Ok(false);
        }
        self.visible = visible;
        self.suppressed = false;
        host.set_attribute(&self.transform, LightAttribute::Visibility, AttributeValue::Bool(visible))?;
        Ok(true)
    }

    /// Intensity slider dragged; the value is clamped to the slider range.
    pub fn set_intensity<H: SceneHost + ?Sized>(&mut self, host: &mut H, value: i32) -> Result<bool> {
        if !self.is_live(&*host) {
            return Ok(false);
        }
        self.intensity = value.clamp(INTENSITY_MIN, INTENSITY_MAX);
        host.set_attribute(&self.light, LightAttribute::Intensity, AttributeValue::Float(f64::from(self.intensity)))?;
        Ok(true)
    }

    /// Opens the color dialog seeded with the light's current color and
    /// writes the chosen color back. `None` when cancelled or the light is gone.
    pub fn pick_color<H, T>(&mut self, host: &mut H, toolkit: &mut T) -> Result<Option<DVec3>>
    where
        H: SceneHost + ?Sized,
        T: PanelToolkit + ?Sized,
    {
        if !self.is_live(&*host) {
            return Ok(None);
        }
        let current = host.get_vector(&self.light, LightAttribute::Color)?;
        let Some(reply) = toolkit.pick_color(current) else {
            return Ok(None);
        };
        let color = parse_color_reply(&reply)?;
        host.set_attribute(&self.light, LightAttribute::Color, AttributeValue::Vector(color))?;
        self.color = color;
        toolkit.update_panel(&self.view());
        Ok(Some(color))
    }

    /// Solo button toggled. Only raises the request; visibility is left to
    /// the solo controller.
    pub fn request_solo(&self, active: bool) -> SoloRequest {
        SoloRequest { entry: self.id, active }
    }

    /// Dims (`true`) or un-dims (`false`) the panel. Un-dimming restores the
    /// user's own visibility flag.
    pub fn disable_light<H: SceneHost + ?Sized>(&mut self, host: &mut H, active: bool) -> Result<()> {
        self.suppressed = active;
        if self.is_live(&*host) {
            host.set_attribute(&self.transform, LightAttribute::Visibility, AttributeValue::Bool(self.checked()))?;
        }
        Ok(())
    }

    pub(crate) fn set_soloed(&mut self, soloed: bool) {
        self.soloed = soloed;
    }

    /// Detaches the panel and deletes the light's transform. Returns `false`
    /// when the light had already been removed from the scene.
    pub fn delete<H, T>(&self, host: &mut H, toolkit: &mut T) -> Result<bool>
    where
        H: SceneHost + ?Sized,
        T: PanelToolkit + ?Sized,
    {
        toolkit.detach_panel(self.id);
        if !host.exists(&self.transform) {
            debug!(entry = %self.id, node = %self.transform, "light already deleted");
            return Ok(false);
        }
        host.delete_node(&self.transform)?;
        Ok(true)
    }

    fn is_live<H: SceneHost + ?Sized>(&self, host: &H) -> bool {
        let live = host.exists(&self.light) && host.exists(&self.transform);
        if !live {
            debug!(entry = %self.id, node = %self.light, "light no longer in scene; ignoring edit");
        }
        live
    }
}

fn resolve_light<H: SceneHost + ?Sized>(
    host: &H,
    registry: &LightTypeRegistry,
    node: &NodeRef,
) -> Result<(NodeRef, LightCategory)> {
    let candidate = match host.shape_of(node) {
        Ok(shape) => shape.unwrap_or_else(|| node.clone()),
        Err(HostError::MissingNode(_)) => {
            return Err(LightError::InvalidReference { node: node.to_string(), found: "no such node".into() })
        }
        Err(err) => return Err(err.into()),
    };
    let node_type = host.object_type(&candidate)?;
    match registry.category_for_type(&node_type) {
        Some(category) => Ok((candidate, category)),
        None => Err(LightError::InvalidReference { node: node.to_string(), found: node_type }),
    }
}

fn slider_value(intensity: f64) -> i32 {
    if intensity.is_nan() {
        return INTENSITY_MIN;
    }
    (intensity.round() as i32).clamp(INTENSITY_MIN, INTENSITY_MAX)
}

/// Parses the color dialog reply, `"r g b"` or `"r g b a"`. Alpha is dropped
/// and every color component must lie in [0,1].
pub fn parse_color_reply(reply: &str) -> Result<DVec3> {
    let parts = reply
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse::<f64>)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| LightError::MalformedColor(reply.to_string()))?;
    let color = match parts.as_slice() {
        [r, g, b] | [r, g, b, _] => DVec3::new(*r, *g, *b),
        _ => return Err(LightError::MalformedColor(reply.to_string())),
    };
    // Components must be finite and in [0,1] or the light file cannot be read back.
    if !color.is_finite() || color.min_element() < 0.0 || color.max_element() > 1.0 {
        return Err(LightError::MalformedColor(reply.to_string()));
    }
    Ok(color)
}

/// Scales a [0,1] color to 0–255 channels, rounding half away from zero.
pub fn swatch_rgb(color: DVec3) -> [u8; 3] {
    let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, TRANSFORM_TYPE};
    use crate::toolkit::HeadlessToolkit;

    fn bound_point(scene: &mut MemoryScene) -> PanelEntry {
        let registry = LightTypeRegistry::new();
        let shape = registry.create(scene, LightCategory::Point).expect("create light");
        PanelEntry::bind(EntryId::new(1), &*scene, &registry, &shape).expect("bind entry")
    }

    #[test]
    fn binds_from_transform_reference() {
        let mut scene = MemoryScene::new();
        let registry = LightTypeRegistry::new();
        registry.create(&mut scene, LightCategory::Spot).unwrap();
        let entry = PanelEntry::bind(EntryId::new(4), &scene, &registry, &NodeRef::from("spotLight1")).unwrap();
        assert_eq!(entry.light().as_str(), "spotLightShape1");
        assert_eq!(entry.category(), LightCategory::Spot);
        assert!(entry.checked());
        assert_eq!(entry.intensity(), 1);
        assert_eq!(entry.view().label, "spotLight1");
    }

    #[test]
    fn rejects_non_light_nodes() {
        let mut scene = MemoryScene::new();
        let registry = LightTypeRegistry::new();
        let cube = scene.insert_node("pCube1", TRANSFORM_TYPE, None).unwrap();
        scene.insert_node("pCubeShape1", "mesh", Some(cube.clone())).unwrap();
        let err = PanelEntry::bind(EntryId::new(1), &scene, &registry, &cube).unwrap_err();
        assert!(matches!(err, LightError::InvalidReference { ref found, .. } if found == "mesh"));

        let err = PanelEntry::bind(EntryId::new(1), &scene, &registry, &NodeRef::from("ghost")).unwrap_err();
        assert_eq!(err.kind(), "invalid_reference");
    }

    #[test]
    fn edits_write_through_to_host() {
        let mut scene = MemoryScene::new();
        let mut entry = bound_point(&mut scene);
        assert!(entry.set_intensity(&mut scene, 250).unwrap());
        assert_eq!(scene.get_float(entry.light(), LightAttribute::Intensity).unwrap(), 100.0);
        assert!(entry.set_visible(&mut scene, false).unwrap());
        assert!(!scene.get_bool(entry.transform(), LightAttribute::Visibility).unwrap());
        assert!(!entry.checked());
    }

    #[test]
    fn color_pick_drops_alpha_and_updates_swatch() {
        let mut scene = MemoryScene::new();
        let mut toolkit = HeadlessToolkit::new();
        let mut entry = bound_point(&mut scene);
        toolkit.attach_panel(&entry.view());
        toolkit.queue_color_reply("1 0.5 0 1");

        let picked = entry.pick_color(&mut scene, &mut toolkit).unwrap();
        assert_eq!(picked, Some(DVec3::new(1.0, 0.5, 0.0)));
        assert_eq!(toolkit.last_seed(), Some(DVec3::ONE));
        assert_eq!(scene.get_vector(entry.light(), LightAttribute::Color).unwrap(), DVec3::new(1.0, 0.5, 0.0));
        assert_eq!(toolkit.panel(entry.id()).unwrap().swatch, [255, 128, 0]);

        assert_eq!(entry.pick_color(&mut scene, &mut toolkit).unwrap(), None, "empty queue acts as cancel");
    }

    #[test]
    fn malformed_color_reply_leaves_light_untouched() {
        let mut scene = MemoryScene::new();
        let mut toolkit = HeadlessToolkit::new();
        let mut entry = bound_point(&mut scene);
        toolkit.queue_color_reply("red");
        let err = entry.pick_color(&mut scene, &mut toolkit).unwrap_err();
        assert_eq!(err.kind(), "malformed_color");
        assert_eq!(entry.color(), DVec3::ONE);
        assert!(parse_color_reply("0.1 0.2").is_err());
        assert_eq!(parse_color_reply("0.1, 0.2, 0.3").unwrap(), DVec3::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn color_reply_rejects_components_outside_unit_range() {
        let mut scene = MemoryScene::new();
        let mut toolkit = HeadlessToolkit::new();
        let mut entry = bound_point(&mut scene);
        for reply in ["nan 0 0 1", "inf 0 0", "2 0 0 1", "0 -0.5 0"] {
            toolkit.queue_color_reply(reply);
            let err = entry.pick_color(&mut scene, &mut toolkit).unwrap_err();
            assert_eq!(err.kind(), "malformed_color", "{reply}");
        }
        assert_eq!(scene.get_vector(entry.light(), LightAttribute::Color).unwrap(), DVec3::ONE);
        assert_eq!(parse_color_reply("0 1 0 2").unwrap(), DVec3::Y, "alpha is not range-checked");
    }

    #[test]
    fn disable_restores_last_known_visibility() {
        let mut scene = MemoryScene::new();
        let mut entry = bound_point(&mut scene);
        entry.set_visible(&mut scene, false).unwrap();
        entry.disable_light(&mut scene, true).unwrap();
        assert!(!entry.checked());
        entry.disable_light(&mut scene, false).unwrap();
        assert!(!entry.checked(), "hidden light stays hidden after un-dim");

        entry.set_visible(&mut scene, true).unwrap();
        entry.disable_light(&mut scene, true).unwrap();
        assert!(!scene.get_bool(entry.transform(), LightAttribute::Visibility).unwrap());
        entry.disable_light(&mut scene, false).unwrap();
        assert!(scene.get_bool(entry.transform(), LightAttribute::Visibility).unwrap());
    }

    #[test]
    fn edits_on_deleted_light_are_noops() {
        let mut scene = MemoryScene::new();
        let mut toolkit = HeadlessToolkit::new();
        let mut entry = bound_point(&mut scene);
        assert!(entry.delete(&mut scene, &mut toolkit).unwrap());
        assert!(!entry.delete(&mut scene, &mut toolkit).unwrap());
        assert!(!entry.set_intensity(&mut scene, 40).unwrap());
        assert!(!entry.set_visible(&mut scene, false).unwrap());
        entry.disable_light(&mut scene, true).unwrap();
    }

    #[test]
    fn swatch_scales_and_clamps() {
        assert_eq!(swatch_rgb(DVec3::new(0.0, 1.0, 0.2)), [0, 255, 51]);
        assert_eq!(swatch_rgb(DVec3::new(-1.0, 2.0, 0.5)), [0, 255, 128]);
        let view = PanelView { entry: EntryId::new(1), label: String::new(), checked: true, soloed: false, intensity: 1, swatch: [1, 2, 3] };
        assert_eq!(view.swatch_style(), "background-color: rgba(1, 2, 3, 1.0)");
    }
}
