//! Scene-host capability surface.
//!
//! The light manager never owns scene nodes. It names them through [`NodeRef`]
//! and reaches them only through a [`SceneHost`], which is the seam between
//! this crate and whatever runtime actually holds the scene.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scene-unique, stable node name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(String);

impl NodeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightAttribute {
    Visibility,
    Intensity,
    Color,
    Translate,
    Rotate,
}

impl LightAttribute {
    pub const ALL: [LightAttribute; 5] = [
        LightAttribute::Visibility,
        LightAttribute::Intensity,
        LightAttribute::Color,
        LightAttribute::Translate,
        LightAttribute::Rotate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LightAttribute::Visibility => "visibility",
            LightAttribute::Intensity => "intensity",
            LightAttribute::Color => "color",
            LightAttribute::Translate => "translate",
            LightAttribute::Rotate => "rotate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    fn expected(self) -> &'static str {
        match self {
            LightAttribute::Visibility => "a boolean",
            LightAttribute::Intensity => "a number",
            LightAttribute::Color | LightAttribute::Translate | LightAttribute::Rotate => "a 3-component vector",
        }
    }

    pub fn accepts(self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (LightAttribute::Visibility, AttributeValue::Bool(_))
                | (LightAttribute::Intensity, AttributeValue::Float(_))
                | (LightAttribute::Color | LightAttribute::Translate | LightAttribute::Rotate, AttributeValue::Vector(_))
        )
    }
}

impl fmt::Display for LightAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Float(f64),
    Vector(DVec3),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            AttributeValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            AttributeValue::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<DVec3> {
        match *self {
            AttributeValue::Vector(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("scene node '{0}' does not exist")]
    MissingNode(NodeRef),
    #[error("scene host cannot create nodes of type '{0}'")]
    UnsupportedType(String),
    #[error("attribute '{attribute}' is not present on '{node}'")]
    MissingAttribute { node: NodeRef, attribute: LightAttribute },
    #[error("attribute '{attribute}' on '{node}' expects {expected}")]
    AttributeMismatch { node: NodeRef, attribute: LightAttribute, expected: &'static str },
}

impl HostError {
    pub fn mismatch(node: &NodeRef, attribute: LightAttribute) -> Self {
        HostError::AttributeMismatch { node: node.clone(), attribute, expected: attribute.expected() }
    }
}

/// Operations the light manager drives on the external scene.
///
/// Light creation returns the light shape; visibility and transform
/// attributes live on the shape's parent transform.
pub trait SceneHost {
    fn create_light(&mut self, host_type: &str) -> Result<NodeRef, HostError>;

    /// Deletes `node` and everything parented under it.
    fn delete_node(&mut self, node: &NodeRef) -> Result<(), HostError>;

    /// Light shapes of the given node types, in scene order.
    fn list_lights(&self, host_types: &[&str]) -> Vec<NodeRef>;

    fn get_attribute(&self, node: &NodeRef, attribute: LightAttribute) -> Result<AttributeValue, HostError>;

    fn set_attribute(
        &mut self,
        node: &NodeRef,
        attribute: LightAttribute,
        value: AttributeValue,
    ) -> Result<(), HostError>;

    /// Parent transform of a shape; a transform is its own transform.
    fn transform_of(&self, node: &NodeRef) -> Result<NodeRef, HostError>;

    /// First shape under a transform, `None` for nodes without shapes.
    fn shape_of(&self, node: &NodeRef) -> Result<Option<NodeRef>, HostError>;

    fn object_type(&self, node: &NodeRef) -> Result<String, HostError>;

    fn exists(&self, node: &NodeRef) -> bool;

    fn get_bool(&self, node: &NodeRef, attribute: LightAttribute) -> Result<bool, HostError> {
        self.get_attribute(node, attribute)?.as_bool().ok_or_else(|| HostError::mismatch(node, attribute))
    }

    fn get_float(&self, node: &NodeRef, attribute: LightAttribute) -> Result<f64, HostError> {
        self.get_attribute(node, attribute)?.as_float().ok_or_else(|| HostError::mismatch(node, attribute))
    }

    fn get_vector(&self, node: &NodeRef, attribute: LightAttribute) -> Result<DVec3, HostError> {
        self.get_attribute(node, attribute)?.as_vector().ok_or_else(|| HostError::mismatch(node, attribute))
    }
}
