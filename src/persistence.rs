//! Light files.
//!
//! A light file is a pretty-printed JSON object keyed by each light's
//! transform name:
//!
//! ```json
//! {
//!     "pointLight1": {
//!         "translate": [0.0, 4.0, 0.0],
//!         "rotate": [0.0, 0.0, 0.0],
//!         "type": "pointLight",
//!         "intensity": 5.0,
//!         "color": [1.0, 0.0, 0.0]
//!     }
//! }
//! ```
//!
//! Saves never overwrite an earlier file. Loads parse the whole file before
//! the scene is touched, then skip records whose `type` is missing or matches
//! no registered category.

use crate::collection::LightCollection;
use crate::error::{LightError, Result};
use crate::host::{AttributeValue, LightAttribute, NodeRef, SceneHost};
use crate::light_types::{LightCategory, LightTypeRegistry};
use crate::toolkit::PanelToolkit;
use chrono::Local;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

pub const LIGHT_FILE_PREFIX: &str = "lightFile";
pub const LIGHT_FILE_EXTENSION: &str = "json";
const TIMESTAMP_FORMAT: &str = "%m%d%H%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRecord {
    pub translate: DVec3,
    pub rotate: DVec3,
    /// Persisted type token; absent or `null` in files written by other tools.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub intensity: f64,
    pub color: DVec3,
}

pub type PersistedRecord = BTreeMap<String, LightRecord>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub name: String,
    /// `None` when the record carried no type token at all.
    pub token: Option<String>,
}

/// Where a save went and how many lights it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub lights: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Transforms of the lights created, in record order.
    pub created: Vec<NodeRef>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, Clone)]
pub struct PersistenceCodec {
    directory: PathBuf,
}

impl PersistenceCodec {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    /// `<user data dir>/LightManager`, or `./LightManager` when the platform
    /// reports no data directory.
    pub fn default_directory() -> PathBuf {
        dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("LightManager")
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn ensure_directory(&self) -> Result<()> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(|err| {
                LightError::io(format!("creating light directory {}", self.directory.display()), err)
            })?;
        }
        Ok(())
    }

    /// Reads every live entry's placement and shading from the host.
    pub fn capture<H: SceneHost, T: PanelToolkit>(collection: &LightCollection<H, T>) -> Result<PersistedRecord> {
        let host = collection.host();
        let mut record = PersistedRecord::new();
        for entry in collection.entries() {
            if !host.exists(entry.light()) || !host.exists(entry.transform()) {
                warn!(node = %entry.transform(), "light vanished from scene; not saved");
                continue;
            }
            let host_type = host.object_type(entry.light())?;
            let kind = match collection.registry().category_for_type(&host_type) {
                Some(category) => category.persisted_token().to_string(),
                None => host_type,
            };
            record.insert(
                entry.transform().to_string(),
                LightRecord {
                    translate: host.get_vector(entry.transform(), LightAttribute::Translate)?,
                    rotate: host.get_vector(entry.transform(), LightAttribute::Rotate)?,
                    kind: Some(kind),
                    intensity: host.get_float(entry.light(), LightAttribute::Intensity)?,
                    color: host.get_vector(entry.light(), LightAttribute::Color)?,
                },
            );
        }
        Ok(record)
    }

    /// Writes `lightFile_<MMDDHHmm>.json`. Lights that vanished from the
    /// scene are not written and not counted.
    pub fn save<H: SceneHost, T: PanelToolkit>(&self, collection: &LightCollection<H, T>) -> Result<SavedFile> {
        let stem = format!("{LIGHT_FILE_PREFIX}_{}", Local::now().format(TIMESTAMP_FORMAT));
        self.save_with_stem(collection, &stem)
    }

    /// Writes the lights under a caller-chosen file name.
    pub fn save_as<H: SceneHost, T: PanelToolkit>(
        &self,
        collection: &LightCollection<H, T>,
        name: &str,
    ) -> Result<SavedFile> {
        self.save_with_stem(collection, &sanitize_stem(name))
    }

    fn save_with_stem<H: SceneHost, T: PanelToolkit>(
        &self,
        collection: &LightCollection<H, T>,
        stem: &str,
    ) -> Result<SavedFile> {
        let record = Self::capture(collection)?;
        self.ensure_directory()?;
        let path = self.unused_path(stem);
        write_atomically(&path, &record)?;
        info!(path = %path.display(), lights = record.len(), "saved light file");
        Ok(SavedFile { path, lights: record.len() })
    }

    fn unused_path(&self, stem: &str) -> PathBuf {
        let mut path = self.directory.join(format!("{stem}.{LIGHT_FILE_EXTENSION}"));
        let mut suffix = 1u32;
        while path.exists() {
            path = self.directory.join(format!("{stem}_{suffix}.{LIGHT_FILE_EXTENSION}"));
            suffix += 1;
        }
        path
    }

    pub fn read(path: impl AsRef<Path>) -> Result<PersistedRecord> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).map_err(|err| LightError::io(format!("reading light file {}", path.display()), err))?;
        serde_json::from_slice(&bytes)
            .map_err(|source| LightError::MalformedRecord { path: path.to_path_buf(), source })
    }

    /// Recreates the lights stored in `path` and refreshes the collection once.
    pub fn load<H: SceneHost, T: PanelToolkit>(
        &self,
        path: impl AsRef<Path>,
        collection: &mut LightCollection<H, T>,
    ) -> Result<LoadReport> {
        let path = path.as_ref();
        let record = Self::read(path)?;
        let report = Self::apply(&record, collection)?;
        info!(
            path = %path.display(),
            created = report.created.len(),
            skipped = report.skipped.len(),
            "loaded light file"
        );
        Ok(report)
    }

    /// Creates a light per record, skipping records whose token matches no
    /// category. The collection is refreshed once even when the host fails
    /// partway, so lights created before the failure still get panels.
    pub fn apply<H: SceneHost, T: PanelToolkit>(
        record: &PersistedRecord,
        collection: &mut LightCollection<H, T>,
    ) -> Result<LoadReport> {
        let registry = collection.registry().clone();
        let mut report = LoadReport::default();
        let mut failure = None;
        for (name, light) in record {
            let Some(category) = light.kind.as_deref().and_then(|token| registry.reconcile(token)) else {
                warn!(light = %name, token = ?light.kind, "no light category matches token; skipping");
                report.skipped.push(SkippedRecord { name: name.clone(), token: light.kind.clone() });
                continue;
            };
            match Self::recreate(collection.host_mut(), &registry, category, light) {
                Ok(transform) => report.created.push(transform),
                Err(err) => {
                    warn!(light = %name, error = %err, "light creation failed; stopping load");
                    failure = Some(err);
                    break;
                }
            }
        }
        let refreshed = collection.populate();
        if let Some(err) = failure {
            if let Err(refresh) = refreshed {
                warn!(error = %refresh, "refresh after failed load also failed");
            }
            return Err(err);
        }
        refreshed?;
        Ok(report)
    }

    fn recreate<H: SceneHost>(
        host: &mut H,
        registry: &LightTypeRegistry,
        category: LightCategory,
        light: &LightRecord,
    ) -> Result<NodeRef> {
        let shape = registry.create(host, category)?;
        host.set_attribute(&shape, LightAttribute::Intensity, AttributeValue::Float(light.intensity))?;
        host.set_attribute(&shape, LightAttribute::Color, AttributeValue::Vector(light.color))?;
        let transform = host.transform_of(&shape)?;
        host.set_attribute(&transform, LightAttribute::Translate, AttributeValue::Vector(light.translate))?;
        host.set_attribute(&transform, LightAttribute::Rotate, AttributeValue::Vector(light.rotate))?;
        Ok(transform)
    }

    /// Light files in the directory, most recently written first.
    pub fn list_saves(&self) -> Result<Vec<PathBuf>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let context = || format!("scanning light files under {}", self.directory.display());
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(|err| LightError::io(context(), err))? {
            let entry = entry.map_err(|err| LightError::io(context(), err))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(LIGHT_FILE_EXTENSION) {
                continue;
            }
            let modified = entry.metadata().and_then(|meta| meta.modified()).unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((modified, path));
        }
        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }
}

fn sanitize_stem(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix(".json").unwrap_or(trimmed);
    if trimmed.is_empty() {
        return LIGHT_FILE_PREFIX.to_string();
    }
    trimmed.chars().map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' { ch } else { '_' }).collect()
}

fn write_atomically(path: &Path, record: &PersistedRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|err| LightError::io(format!("encoding light file {}", path.display()), err.into()))?;
    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or(LIGHT_FILE_PREFIX);
    let staging = path.with_file_name(format!(".{file_name}.tmp"));
    let written = fs::write(&staging, json.as_bytes()).and_then(|()| fs::rename(&staging, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&staging);
        return Err(LightError::io(format!("writing light file {}", path.display()), err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;
    use crate::scene::MemoryScene;
    use crate::toolkit::HeadlessToolkit;

    /// Scene that refuses to create lights once its budget is spent.
    struct LimitedScene {
        inner: MemoryScene,
        creates_left: usize,
    }

    impl SceneHost for LimitedScene {
        fn create_light(&mut self, host_type: &str) -> std::result::Result<NodeRef, HostError> {
            if self.creates_left == 0 {
                return Err(HostError::UnsupportedType(host_type.to_string()));
            }
            self.creates_left -= 1;
            self.inner.create_light(host_type)
        }

        fn delete_node(&mut self, node: &NodeRef) -> std::result::Result<(), HostError> {
            self.inner.delete_node(node)
        }

        fn list_lights(&self, host_types: &[&str]) -> Vec<NodeRef> {
            self.inner.list_lights(host_types)
        }

        fn get_attribute(
            &self,
            node: &NodeRef,
            attribute: LightAttribute,
        ) -> std::result::Result<AttributeValue, HostError> {
            self.inner.get_attribute(node, attribute)
        }

        fn set_attribute(
            &mut self,
            node: &NodeRef,
            attribute: LightAttribute,
            value: AttributeValue,
        ) -> std::result::Result<(), HostError> {
            self.inner.set_attribute(node, attribute, value)
        }

        fn transform_of(&self, node: &NodeRef) -> std::result::Result<NodeRef, HostError> {
            self.inner.transform_of(node)
        }

        fn shape_of(&self, node: &NodeRef) -> std::result::Result<Option<NodeRef>, HostError> {
            self.inner.shape_of(node)
        }

        fn object_type(&self, node: &NodeRef) -> std::result::Result<String, HostError> {
            self.inner.object_type(node)
        }

        fn exists(&self, node: &NodeRef) -> bool {
            self.inner.exists(node)
        }
    }

    fn record(kind: Option<&str>) -> LightRecord {
        LightRecord {
            translate: DVec3::ZERO,
            rotate: DVec3::ZERO,
            kind: kind.map(str::to_string),
            intensity: 1.0,
            color: DVec3::ONE,
        }
    }

    #[test]
    fn host_failure_mid_load_still_refreshes_panels() {
        let scene = LimitedScene { inner: MemoryScene::new(), creates_left: 1 };
        let mut lights = LightCollection::new(scene, HeadlessToolkit::new());
        let mut file = PersistedRecord::new();
        file.insert("a".into(), record(Some("pointLight")));
        file.insert("b".into(), record(Some("spotLight")));

        let err = PersistenceCodec::apply(&file, &mut lights).unwrap_err();
        assert_eq!(err.kind(), "host");
        assert_eq!(lights.host().inner.light_count(), 1);
        assert_eq!(lights.len(), 1, "the light created before the failure has a panel");
        assert_eq!(lights.toolkit().panel_count(), 1);
    }

    #[test]
    fn missing_type_token_parses_as_none() {
        let text = r#"{"a": {"type": null, "intensity": 1, "color": [1,1,1], "translate": [0,0,0], "rotate": [0,0,0]},
                       "b": {"intensity": 1, "color": [1,1,1], "translate": [0,0,0], "rotate": [0,0,0]}}"#;
        let file: PersistedRecord = serde_json::from_str(text).unwrap();
        assert_eq!(file["a"].kind, None);
        assert_eq!(file["b"].kind, None);
    }

    #[test]
    fn record_uses_type_key_and_arrays() {
        let record = LightRecord {
            translate: DVec3::new(1.0, 2.0, 3.0),
            rotate: DVec3::ZERO,
            kind: Some("spotLight".into()),
            intensity: 2.0,
            color: DVec3::new(0.0, 0.5, 1.0),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "spotLight");
        assert_eq!(value["translate"], serde_json::json!([1.0, 2.0, 3.0]));
        assert_eq!(value["color"], serde_json::json!([0.0, 0.5, 1.0]));
    }

    #[test]
    fn integer_fields_parse() {
        let text = r#"{"light1": {"type": "pointLight", "intensity": 5, "color": [1,0,0], "translate": [0,0,0], "rotate": [0,0,0]}}"#;
        let record: PersistedRecord = serde_json::from_str(text).unwrap();
        assert_eq!(record["light1"].intensity, 5.0);
        assert_eq!(record["light1"].color, DVec3::X);
    }

    #[test]
    fn sanitizes_requested_names() {
        assert_eq!(sanitize_stem(" key lights.json "), "key_lights");
        assert_eq!(sanitize_stem("   "), "lightFile");
        assert_eq!(sanitize_stem("rim/../fill"), "rim____fill");
    }

    #[test]
    fn unused_path_appends_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let codec = PersistenceCodec::new(dir.path());
        let first = codec.unused_path("lightFile_01020304");
        assert_eq!(first.file_name().unwrap(), "lightFile_01020304.json");
        fs::write(&first, "{}").unwrap();
        let second = codec.unused_path("lightFile_01020304");
        assert_eq!(second.file_name().unwrap(), "lightFile_01020304_1.json");
    }

    #[test]
    fn missing_file_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = PersistenceCodec::read(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("absent.json"));
    }
}
