//! In-memory scene host.
//!
//! Lights are stored the way DCC hosts lay them out: a transform node named
//! `<type><N>` carrying visibility and placement, with a light shape
//! `<type>Shape<N>` parented under it carrying intensity and color. The whole
//! scene can be written to and read from a JSON scene document.

use crate::host::{AttributeValue, HostError, LightAttribute, NodeRef, SceneHost};
use anyhow::{Context, Result};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const TRANSFORM_TYPE: &str = "transform";

const LIGHT_NODE_TYPES: [&str; 6] =
    ["pointLight", "spotLight", "directionalLight", "ambientLight", "areaLight", "volumeLight"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryScene {
    #[serde(default)]
    nodes: Vec<SceneNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: NodeRef,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeRef>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl SceneNode {
    fn new(name: NodeRef, node_type: impl Into<String>, parent: Option<NodeRef>) -> Self {
        Self { name, node_type: node_type.into(), parent, attributes: BTreeMap::new() }
    }

    fn with(mut self, attribute: LightAttribute, value: AttributeValue) -> Self {
        self.attributes.insert(attribute.name().to_string(), value);
        self
    }

    pub fn attribute(&self, attribute: LightAttribute) -> Option<AttributeValue> {
        self.attributes.get(attribute.name()).copied()
    }

    pub fn is_light(&self) -> bool {
        LIGHT_NODE_TYPES.contains(&self.node_type.as_str())
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, name: &NodeRef) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| &node.name == name)
    }

    fn node_mut(&mut self, name: &NodeRef) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|node| &node.name == name)
    }

    /// Adds an arbitrary node, e.g. a mesh shape, without light defaults.
    pub fn insert_node(
        &mut self,
        name: impl Into<NodeRef>,
        node_type: impl Into<String>,
        parent: Option<NodeRef>,
    ) -> Result<NodeRef, HostError> {
        if let Some(parent) = &parent {
            if self.node(parent).is_none() {
                return Err(HostError::MissingNode(parent.clone()));
            }
        }
        let name = self.unique_name(&name.into());
        self.nodes.push(SceneNode::new(name.clone(), node_type, parent));
        Ok(name)
    }

    /// Count of light shapes currently in the scene.
    pub fn light_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_light()).count()
    }

    fn unique_name(&self, base: &NodeRef) -> NodeRef {
        if self.node(base).is_none() {
            return base.clone();
        }
        let mut index = 1u32;
        loop {
            let candidate = NodeRef::new(format!("{base}{index}"));
            if self.node(&candidate).is_none() {
                return candidate;
            }
            index += 1;
        }
    }

    fn next_light_names(&self, host_type: &str) -> (NodeRef, NodeRef) {
        let mut index = 1u32;
        loop {
            let transform = NodeRef::new(format!("{host_type}{index}"));
            let shape = NodeRef::new(format!("{host_type}Shape{index}"));
            if self.node(&transform).is_none() && self.node(&shape).is_none() {
                return (transform, shape);
            }
            index += 1;
        }
    }

    fn collect_subtree(&self, root: &NodeRef) -> Vec<NodeRef> {
        let mut doomed = vec![root.clone()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor].clone();
            doomed.extend(
                self.nodes.iter().filter(|node| node.parent.as_ref() == Some(&current)).map(|node| node.name.clone()),
            );
            cursor += 1;
        }
        doomed
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene file {}", path.display()))?;
        let scene = serde_json::from_slice::<MemoryScene>(&bytes)
            .with_context(|| format!("Parsing scene file {}", path.display()))?;
        Ok(scene)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating scene directory {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes()).with_context(|| format!("Writing scene file {}", path.display()))?;
        Ok(())
    }
}

impl SceneHost for MemoryScene {
    fn create_light(&mut self, host_type: &str) -> Result<NodeRef, HostError> {
        if !LIGHT_NODE_TYPES.contains(&host_type) {
            return Err(HostError::UnsupportedType(host_type.to_string()));
        }
        let (transform, shape) = self.next_light_names(host_type);
        self.nodes.push(
            SceneNode::new(transform.clone(), TRANSFORM_TYPE, None)
                .with(LightAttribute::Visibility, AttributeValue::Bool(true))
                .with(LightAttribute::Translate, AttributeValue::Vector(DVec3::ZERO))
                .with(LightAttribute::Rotate, AttributeValue::Vector(DVec3::ZERO)),
        );
        self.nodes.push(
            SceneNode::new(shape.clone(), host_type, Some(transform))
                .with(LightAttribute::Visibility, AttributeValue::Bool(true))
                .with(LightAttribute::Intensity, AttributeValue::Float(1.0))
                .with(LightAttribute::Color, AttributeValue::Vector(DVec3::ONE)),
        );
        Ok(shape)
    }

    fn delete_node(&mut self, node: &NodeRef) -> Result<(), HostError> {
        if self.node(node).is_none() {
            return Err(HostError::MissingNode(node.clone()));
        }
        let doomed = self.collect_subtree(node);
        self.nodes.retain(|candidate| !doomed.contains(&candidate.name));
        Ok(())
    }

    fn list_lights(&self, host_types: &[&str]) -> Vec<NodeRef> {
        self.nodes
            .iter()
            .filter(|node| host_types.contains(&node.node_type.as_str()))
            .map(|node| node.name.clone())
            .collect()
    }

    fn get_attribute(&self, node: &NodeRef, attribute: LightAttribute) -> Result<AttributeValue, HostError> {
        let entry = self.node(node).ok_or_else(|| HostError::MissingNode(node.clone()))?;
        entry.attribute(attribute).ok_or_else(|| HostError::MissingAttribute { node: node.clone(), attribute })
    }

    fn set_attribute(
        &mut self,
        node: &NodeRef,
        attribute: LightAttribute,
        value: AttributeValue,
    ) -> Result<(), HostError> {
        if !attribute.accepts(&value) {
            return Err(HostError::mismatch(node, attribute));
        }
        let entry = self.node_mut(node).ok_or_else(|| HostError::MissingNode(node.clone()))?;
        entry.attributes.insert(attribute.name().to_string(), value);
        Ok(())
    }

    fn transform_of(&self, node: &NodeRef) -> Result<NodeRef, HostError> {
        let entry = self.node(node).ok_or_else(|| HostError::MissingNode(node.clone()))?;
        Ok(entry.parent.clone().unwrap_or_else(|| entry.name.clone()))
    }

    fn shape_of(&self, node: &NodeRef) -> Result<Option<NodeRef>, HostError> {
        let entry = self.node(node).ok_or_else(|| HostError::MissingNode(node.clone()))?;
        if entry.node_type != TRANSFORM_TYPE {
            return Ok(None);
        }
        Ok(self.nodes.iter().find(|child| child.parent.as_ref() == Some(node)).map(|child| child.name.clone()))
    }

    fn object_type(&self, node: &NodeRef) -> Result<String, HostError> {
        self.node(node).map(|entry| entry.node_type.clone()).ok_or_else(|| HostError::MissingNode(node.clone()))
    }

    fn exists(&self, node: &NodeRef) -> bool {
        self.node(node).is_some()
    }
}
