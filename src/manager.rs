//! Event dispatch for the light panel.
//!
//! [`LightManager`] is what a UI front-end talks to: it owns the collection
//! and the persistence codec, routes each [`PanelEvent`], and turns every
//! outcome into a [`StatusMessage`] so that no failure ever escapes to the
//! host application.

use crate::collection::LightCollection;
use crate::config::LightManagerConfig;
use crate::error::LightError;
use crate::events::{EventQueue, PanelEvent};
use crate::host::SceneHost;
use crate::persistence::{LoadReport, PersistenceCodec};
use crate::toolkit::PanelToolkit;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub message: String,
}

pub struct LightManager<H, T> {
    collection: LightCollection<H, T>,
    codec: PersistenceCodec,
    status: Option<StatusMessage>,
    last_saved: Option<PathBuf>,
    last_load: Option<LoadReport>,
}

impl<H: SceneHost, T: PanelToolkit> LightManager<H, T> {
    pub fn new(collection: LightCollection<H, T>, codec: PersistenceCodec) -> Self {
        Self { collection, codec, status: None, last_saved: None, last_load: None }
    }

    pub fn from_config(host: H, toolkit: T, config: &LightManagerConfig) -> Self {
        let collection = LightCollection::with_registry(host, toolkit, config.registry(), config.default_category);
        Self::new(collection, config.codec())
    }

    /// Scans the scene once so the panel reflects what is already there.
    pub fn open(&mut self) {
        self.dispatch(PanelEvent::RefreshRequested);
    }

    pub fn collection(&self) -> &LightCollection<H, T> {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut LightCollection<H, T> {
        &mut self.collection
    }

    pub fn codec(&self) -> &PersistenceCodec {
        &self.codec
    }

    pub fn into_collection(self) -> LightCollection<H, T> {
        self.collection
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }

    pub fn last_load(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            StatusKind::Error => error!(%message, "light manager"),
            StatusKind::Warning => warn!(%message, "light manager"),
            StatusKind::Info | StatusKind::Success => info!(%message, "light manager"),
        }
        self.status = Some(StatusMessage { kind, message });
    }

    fn report_failure(&mut self, action: &str, err: &LightError) {
        self.set_status(StatusKind::Error, format!("{action} failed ({}): {err}", err.kind()));
    }

    /// Dispatches every queued event in arrival order. Returns how many ran.
    pub fn pump(&mut self, queue: &mut EventQueue) -> usize {
        let events = queue.drain();
        let count = events.len();
        for event in events {
            self.dispatch(event);
        }
        count
    }

    pub fn dispatch(&mut self, event: PanelEvent) {
        debug!(event = %event, "dispatching panel event");
        match event {
            PanelEvent::VisibilityToggled { entry, visible } => {
                match self.collection.set_visibility(entry, visible) {
                    Ok(true) => {}
                    Ok(false) => debug!(entry = %entry, "visibility toggle ignored"),
                    Err(err) => self.report_failure(&format!("Toggling visibility of {entry}"), &err),
                }
            }
            PanelEvent::IntensityChanged { entry, value } => {
                if let Err(err) = self.collection.set_intensity(entry, value) {
                    self.report_failure(&format!("Setting intensity of {entry}"), &err);
                }
            }
            PanelEvent::ColorPickRequested { entry } => {
                if let Err(err) = self.collection.pick_color(entry) {
                    self.report_failure(&format!("Picking color for {entry}"), &err);
                }
            }
            PanelEvent::SoloToggled { entry, active } => {
                if let Err(err) = self.collection.on_solo_requested(entry, active) {
                    self.report_failure(&format!("Soloing {entry}"), &err);
                }
            }
            PanelEvent::DeleteRequested { entry } => match self.collection.delete_entry(entry) {
                Ok(true) => self.set_status(StatusKind::Info, format!("Deleted light {entry}.")),
                Ok(false) => debug!(entry = %entry, "delete ignored; entry already gone"),
                Err(err) => self.report_failure(&format!("Deleting {entry}"), &err),
            },
            PanelEvent::CreateRequested { category } => match self.collection.create_light(category) {
                Ok(node) => self.set_status(StatusKind::Success, format!("Created {node}.")),
                Err(err) => {
                    let category = category.unwrap_or(self.collection.default_category());
                    self.report_failure(&format!("Creating {category}"), &err);
                }
            },
            PanelEvent::SaveRequested { name } => {
                let result = match name.as_deref() {
                    Some(name) => self.codec.save_as(&self.collection, name),
                    None => self.codec.save(&self.collection),
                };
                match result {
                    Ok(saved) => {
                        self.set_status(
                            StatusKind::Success,
                            format!("Saved {} lights to {}", saved.lights, saved.path.display()),
                        );
                        self.last_saved = Some(saved.path);
                    }
                    Err(err) => self.report_failure("Saving lights", &err),
                }
            }
            PanelEvent::LoadRequested { path } => match self.codec.load(&path, &mut self.collection) {
                Ok(report) => {
                    if report.skipped.is_empty() {
                        self.set_status(
                            StatusKind::Success,
                            format!("Loaded {} lights from {}", report.created.len(), path.display()),
                        );
                    } else {
                        let skipped =
                            report.skipped.iter().map(|record| record.name.as_str()).collect::<Vec<_>>().join(", ");
                        self.set_status(
                            StatusKind::Warning,
                            format!(
                                "Loaded {} lights from {}; skipped unknown types for {skipped}",
                                report.created.len(),
                                path.display()
                            ),
                        );
                    }
                    self.last_load = Some(report);
                }
                Err(err) => self.report_failure(&format!("Loading {}", path.display()), &err),
            },
            PanelEvent::RefreshRequested => {
                if let Err(err) = self.collection.populate() {
                    self.report_failure("Refreshing lights", &err);
                }
            }
        }
    }
}
