use crate::error::Result;
use crate::host::{NodeRef, SceneHost};
use crate::light_types::{LightCategory, LightTypeRegistry};
use crate::panel::{EntryId, PanelEntry};
use crate::solo::{SoloController, SoloRequest};
use crate::toolkit::PanelToolkit;
use glam::DVec3;
use tracing::{debug, info, warn};

/// Live set of light panels, in discovery/creation order.
pub struct LightCollection<H, T> {
    host: H,
    toolkit: T,
    registry: LightTypeRegistry,
    default_category: LightCategory,
    entries: Vec<PanelEntry>,
    solo: SoloController,
    next_id: u64,
    revision: u64,
}

impl<H: SceneHost, T: PanelToolkit> LightCollection<H, T> {
    pub fn new(host: H, toolkit: T) -> Self {
        Self::with_registry(host, toolkit, LightTypeRegistry::new(), LightCategory::Point)
    }

    pub fn with_registry(host: H, toolkit: T, registry: LightTypeRegistry, default_category: LightCategory) -> Self {
        Self {
            host,
            toolkit,
            registry,
            default_category,
            entries: Vec::new(),
            solo: SoloController::new(),
            next_id: 0,
            revision: 0,
        }
    }

    pub fn registry(&self) -> &LightTypeRegistry {
        &self.registry
    }

    pub fn default_category(&self) -> LightCategory {
        self.default_category
    }

    /// Category used when a create request names none (the picker selection).
    pub fn set_default_category(&mut self, category: LightCategory) {
        self.default_category = category;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    pub fn into_parts(self) -> (H, T) {
        (self.host, self.toolkit)
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> Option<&PanelEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn entry_for(&self, node: &NodeRef) -> Option<&PanelEntry> {
        self.entries.iter().find(|entry| entry.light() == node || entry.transform() == node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn soloed_entry(&self) -> Option<EntryId> {
        self.solo.current()
    }

    /// Bumped on every structural change to the entry set.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drops every panel and rebuilds the set from a scan of the scene.
    pub fn populate(&mut self) -> Result<usize> {
        self.solo.release(&mut self.entries, &mut self.host)?;
        for entry in self.entries.drain(..) {
            self.toolkit.detach_panel(entry.id());
        }
        self.solo.reset();
        let host_types = self.registry.host_types();
        for node in self.host.list_lights(&host_types) {
            if let Err(err) = self.add_light(&node) {
                warn!(node = %node, error = %err, "skipping light during scan");
            }
        }
        self.revision = self.revision.wrapping_add(1);
        info!(count = self.entries.len(), "light panels populated");
        Ok(self.entries.len())
    }

    /// Binds a panel to an existing light. A light that already has a panel
    /// keeps its existing entry. A light added while another is soloed starts
    /// dimmed.
    pub fn add_light(&mut self, node: &NodeRef) -> Result<EntryId> {
        let id = EntryId::new(self.next_id);
        let mut entry = PanelEntry::bind(id, &self.host, &self.registry, node)?;
        if let Some(existing) = self.entries.iter().find(|existing| existing.light() == entry.light()) {
            debug!(node = %node, entry = %existing.id(), "light already has a panel");
            return Ok(existing.id());
        }
        if let Some(soloed) = self.solo.current() {
            debug!(node = %node, solo = %soloed, "dimming light added during solo");
            entry.disable_light(&mut self.host, true)?;
        }
        self.next_id += 1;
        self.toolkit.attach_panel(&entry.view());
        self.entries.push(entry);
        self.revision = self.revision.wrapping_add(1);
        Ok(id)
    }

    /// Creates a light of `category`, or of the default category when `None`,
    /// and appends a panel for it.
    pub fn create_light(&mut self, category: Option<LightCategory>) -> Result<NodeRef> {
        let category = category.unwrap_or(self.default_category);
        let node = self.registry.create(&mut self.host, category)?;
        self.add_light(&node)?;
        info!(category = %category, node = %node, "light created");
        Ok(node)
    }

    /// Same as [`create_light`](Self::create_light) with the category given
    /// by its display name.
    pub fn create_light_named(&mut self, display_name: Option<&str>) -> Result<NodeRef> {
        let category = display_name.map(|name| self.registry.category_named(name)).transpose()?;
        self.create_light(category)
    }

    /// Removes the panel and deletes its light. Unknown ids are a no-op and
    /// return `false`.
    pub fn delete_entry(&mut self, id: EntryId) -> Result<bool> {
        let Some(index) = self.entries.iter().position(|entry| entry.id() == id) else {
            debug!(entry = %id, "delete requested for unknown entry");
            return Ok(false);
        };
        if self.solo.current() == Some(id) {
            self.solo.release(&mut self.entries, &mut self.host)?;
            self.refresh_panels();
        }
        let entry = self.entries.remove(index);
        self.revision = self.revision.wrapping_add(1);
        entry.delete(&mut self.host, &mut self.toolkit)?;
        info!(entry = %id, node = %entry.transform(), "light deleted");
        Ok(true)
    }

    pub fn on_solo_requested(&mut self, id: EntryId, active: bool) -> Result<()> {
        self.solo.apply(SoloRequest { entry: id, active }, &mut self.entries, &mut self.host)?;
        self.refresh_panels();
        Ok(())
    }

    pub fn set_visibility(&mut self, id: EntryId, visible: bool) -> Result<bool> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id() == id) else {
            return Ok(false);
        };
        let applied = entry.set_visible(&mut self.host, visible)?;
        self.toolkit.update_panel(&entry.view());
        Ok(applied)
    }

    pub fn set_intensity(&mut self, id: EntryId, value: i32) -> Result<bool> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id() == id) else {
            return Ok(false);
        };
        let applied = entry.set_intensity(&mut self.host, value)?;
        self.toolkit.update_panel(&entry.view());
        Ok(applied)
    }

    pub fn pick_color(&mut self, id: EntryId) -> Result<Option<DVec3>> {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id() == id) else {
            return Ok(None);
        };
        entry.pick_color(&mut self.host, &mut self.toolkit)
    }

    fn refresh_panels(&mut self) {
        for entry in &self.entries {
            self.toolkit.update_panel(&entry.view());
        }
    }
}
