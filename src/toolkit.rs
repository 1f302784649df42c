use crate::panel::EntryId;
use glam::DVec3;
use std::collections::{BTreeMap, VecDeque};

/// Renderable state of one light panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub entry: EntryId,
    pub label: String,
    pub checked: bool,
    pub soloed: bool,
    pub intensity: i32,
    pub swatch: [u8; 3],
}

impl PanelView {
    /// Style sheet snippet for the color button.
    pub fn swatch_style(&self) -> String {
        let [r, g, b] = self.swatch;
        format!("background-color: rgba({r}, {g}, {b}, 1.0)")
    }
}

/// Widget surface the panels are drawn on.
pub trait PanelToolkit {
    fn attach_panel(&mut self, view: &PanelView);

    fn update_panel(&mut self, view: &PanelView);

    fn detach_panel(&mut self, entry: EntryId);

    /// Runs the host color dialog seeded with `current`.
    ///
    /// Returns the dialog's textual reply (`"r g b a"`), or `None` when the
    /// user cancels.
    fn pick_color(&mut self, current: DVec3) -> Option<String>;
}

/// Toolkit without a window: keeps the attached panels in memory and answers
/// color picks from a queue.
#[derive(Debug, Default)]
pub struct HeadlessToolkit {
    panels: BTreeMap<EntryId, PanelView>,
    color_replies: VecDeque<String>,
    last_seed: Option<DVec3>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_color_reply(&mut self, reply: impl Into<String>) {
        self.color_replies.push_back(reply.into());
    }

    pub fn panel(&self, entry: EntryId) -> Option<&PanelView> {
        self.panels.get(&entry)
    }

    pub fn panels(&self) -> impl Iterator<Item = &PanelView> {
        self.panels.values()
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    pub fn last_seed(&self) -> Option<DVec3> {
        self.last_seed
    }
}

impl PanelToolkit for HeadlessToolkit {
    fn attach_panel(&mut self, view: &PanelView) {
        self.panels.insert(view.entry, view.clone());
    }

    fn update_panel(&mut self, view: &PanelView) {
        if let Some(panel) = self.panels.get_mut(&view.entry) {
            *panel = view.clone();
        }
    }

    fn detach_panel(&mut self, entry: EntryId) {
        self.panels.remove(&entry);
    }

    fn pick_color(&mut self, current: DVec3) -> Option<String> {
        self.last_seed = Some(current);
        self.color_replies.pop_front()
    }
}
