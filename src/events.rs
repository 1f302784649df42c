use crate::light_types::LightCategory;
use crate::panel::EntryId;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    VisibilityToggled { entry: EntryId, visible: bool },
    IntensityChanged { entry: EntryId, value: i32 },
    ColorPickRequested { entry: EntryId },
    SoloToggled { entry: EntryId, active: bool },
    DeleteRequested { entry: EntryId },
    CreateRequested { category: Option<LightCategory> },
    SaveRequested { name: Option<String> },
    LoadRequested { path: PathBuf },
    RefreshRequested,
}

impl PanelEvent {
    pub fn entry(&self) -> Option<EntryId> {
        match self {
            PanelEvent::VisibilityToggled { entry, .. }
            | PanelEvent::IntensityChanged { entry, .. }
            | PanelEvent::ColorPickRequested { entry }
            | PanelEvent::SoloToggled { entry, .. }
            | PanelEvent::DeleteRequested { entry } => Some(*entry),
            _ => None,
        }
    }
}

impl fmt::Display for PanelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelEvent::VisibilityToggled { entry, visible } => {
                write!(f, "VisibilityToggled entry={entry} visible={visible}")
            }
            PanelEvent::IntensityChanged { entry, value } => {
                write!(f, "IntensityChanged entry={entry} value={value}")
            }
            PanelEvent::ColorPickRequested { entry } => write!(f, "ColorPickRequested entry={entry}"),
            PanelEvent::SoloToggled { entry, active } => write!(f, "SoloToggled entry={entry} active={active}"),
            PanelEvent::DeleteRequested { entry } => write!(f, "DeleteRequested entry={entry}"),
            PanelEvent::CreateRequested { category } => match category {
                Some(category) => write!(f, "CreateRequested category={category}"),
                None => write!(f, "CreateRequested category=<selected>"),
            },
            PanelEvent::SaveRequested { name } => match name {
                Some(name) => write!(f, "SaveRequested name={name}"),
                None => write!(f, "SaveRequested"),
            },
            PanelEvent::LoadRequested { path } => write!(f, "LoadRequested path={}", path.display()),
            PanelEvent::RefreshRequested => write!(f, "RefreshRequested"),
        }
    }
}

/// Input notifications waiting to be dispatched, in arrival order.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<PanelEvent>,
}

impl EventQueue {
    pub fn push(&mut self, event: PanelEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<PanelEvent> {
        self.events.drain(..).collect()
    }
}
