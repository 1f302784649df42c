use crate::error::Result;
use crate::host::SceneHost;
use crate::panel::{EntryId, PanelEntry};
use tracing::{debug, info};

/// Raised by a panel's solo button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloRequest {
    pub entry: EntryId,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloState {
    Normal,
    Soloed,
}

/// Keeps at most one entry soloed. The current solo is tracked here rather
/// than inferred from whichever panel raised the request.
#[derive(Debug, Default)]
pub struct SoloController {
    current: Option<EntryId>,
}

impl SoloController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<EntryId> {
        self.current
    }

    pub fn state_of(&self, entry: EntryId) -> SoloState {
        if self.current == Some(entry) {
            SoloState::Soloed
        } else {
            SoloState::Normal
        }
    }

    pub fn apply<H: SceneHost + ?Sized>(
        &mut self,
        request: SoloRequest,
        entries: &mut [PanelEntry],
        host: &mut H,
    ) -> Result<()> {
        if !entries.iter().any(|entry| entry.id() == request.entry) {
            debug!(entry = %request.entry, "solo request for unknown entry ignored");
            return Ok(());
        }
        if request.active {
            if let Some(previous) = self.current.filter(|previous| *previous != request.entry) {
                debug!(previous = %previous, next = %request.entry, "clearing previous solo");
            }
            self.current = Some(request.entry);
            for entry in entries.iter_mut() {
                entry.set_soloed(entry.id() == request.entry);
            }
            for entry in entries.iter_mut() {
                let dimmed = entry.id() != request.entry;
                entry.disable_light(host, dimmed)?;
            }
            info!(entry = %request.entry, "light soloed");
        } else if self.current == Some(request.entry) {
            self.release(entries, host)?;
        } else if let Some(entry) = entries.iter_mut().find(|entry| entry.id() == request.entry) {
            entry.set_soloed(false);
        }
        Ok(())
    }

    /// Drops any active solo and un-dims every entry.
    pub fn release<H: SceneHost + ?Sized>(&mut self, entries: &mut [PanelEntry], host: &mut H) -> Result<()> {
        let Some(previous) = self.current.take() else {
            return Ok(());
        };
        for entry in entries.iter_mut() {
            entry.set_soloed(false);
        }
        for entry in entries.iter_mut() {
            entry.disable_light(host, false)?;
        }
        info!(entry = %previous, "solo released");
        Ok(())
    }

    /// Forgets the current solo without touching any entry.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
