pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod light_types;
pub mod manager;
pub mod panel;
pub mod persistence;
pub mod scene;
pub mod solo;
pub mod toolkit;

pub use collection::LightCollection;
pub use error::{LightError, Result};
pub use host::{AttributeValue, HostError, LightAttribute, NodeRef, SceneHost};
pub use light_types::{LightCategory, LightTypeRegistry};
pub use manager::LightManager;
pub use panel::{EntryId, PanelEntry};
pub use persistence::{LoadReport, PersistenceCodec, SavedFile};
pub use scene::MemoryScene;
pub use solo::SoloController;
pub use toolkit::{HeadlessToolkit, PanelToolkit};
