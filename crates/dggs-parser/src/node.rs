//! Abstract grid-node handle.
//!
//! Traversal and cell extraction are written against this trait rather than
//! the container library, so deep hierarchies can be walked with an explicit
//! worklist and the logic can be exercised against an in-memory tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use cube_common::{CubeError, CubeResult};

/// A numeric array member of a grid node, with its dimension sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl ArrayData {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> CubeResult<Self> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(CubeError::MalformedInput(format!(
                "array data length {} does not match shape {shape:?}",
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }
}

/// One node of a nested named-group hierarchy.
pub trait GridNode: Sized {
    /// Slash-delimited address of this node; the root is the empty string.
    fn address(&self) -> &str;

    /// Child sub-groups of this node.
    fn children(&self) -> CubeResult<Vec<Self>>;

    /// Whether the node holds an array member of the given name.
    fn has_member(&self, name: &str) -> bool;

    /// Read an array member.
    fn read_member(&self, name: &str) -> CubeResult<ArrayData>;

    /// Read a numeric attribute, if present.
    fn attr_doubles(&self, name: &str) -> CubeResult<Option<Vec<f64>>>;

    /// Read a string attribute, if present.
    fn attr_string(&self, name: &str) -> CubeResult<Option<String>>;
}

/// In-memory group tree used to exercise traversal and extraction.
#[derive(Debug, Clone, Default)]
pub struct MemGroup {
    pub groups: BTreeMap<String, MemGroup>,
    pub members: BTreeMap<String, ArrayData>,
    pub attr_doubles: BTreeMap<String, Vec<f64>>,
    pub attr_strings: BTreeMap<String, String>,
}

impl MemGroup {
    pub fn with_group(mut self, name: &str, group: MemGroup) -> Self {
        self.groups.insert(name.to_string(), group);
        self
    }

    pub fn with_member(mut self, name: &str, shape: Vec<usize>, values: Vec<f64>) -> Self {
        let data = ArrayData::new(shape, values).expect("member shape is consistent");
        self.members.insert(name.to_string(), data);
        self
    }

    pub fn with_attr_doubles(mut self, name: &str, values: Vec<f64>) -> Self {
        self.attr_doubles.insert(name.to_string(), values);
        self
    }

    pub fn with_attr_string(mut self, name: &str, value: &str) -> Self {
        self.attr_strings.insert(name.to_string(), value.to_string());
        self
    }
}

/// Handle into a [`MemGroup`] tree; resolves its address on each access.
#[derive(Debug, Clone)]
pub struct MemNode {
    root: Arc<MemGroup>,
    address: String,
}

impl MemNode {
    pub fn root(tree: MemGroup) -> Self {
        Self {
            root: Arc::new(tree),
            address: String::new(),
        }
    }

    fn resolve(&self) -> CubeResult<&MemGroup> {
        let mut current: &MemGroup = &self.root;
        for segment in self.address.split('/').filter(|s| !s.is_empty()) {
            current = current.groups.get(segment).ok_or_else(|| {
                CubeError::ContainerRead(format!("missing group {:?}", self.address))
            })?;
        }
        Ok(current)
    }
}

impl GridNode for MemNode {
    fn address(&self) -> &str {
        &self.address
    }

    fn children(&self) -> CubeResult<Vec<Self>> {
        let group = self.resolve()?;
        Ok(group
            .groups
            .keys()
            .map(|name| Self {
                root: Arc::clone(&self.root),
                address: format!("{}/{name}", self.address),
            })
            .collect())
    }

    fn has_member(&self, name: &str) -> bool {
        self.resolve()
            .map(|group| group.members.contains_key(name))
            .unwrap_or(false)
    }

    fn read_member(&self, name: &str) -> CubeResult<ArrayData> {
        let group = self.resolve()?;
        group.members.get(name).cloned().ok_or_else(|| {
            CubeError::ContainerRead(format!("missing member {name:?} at {:?}", self.address))
        })
    }

    fn attr_doubles(&self, name: &str) -> CubeResult<Option<Vec<f64>>> {
        Ok(self.resolve()?.attr_doubles.get(name).cloned())
    }

    fn attr_string(&self, name: &str) -> CubeResult<Option<String>> {
        Ok(self.resolve()?.attr_strings.get(name).cloned())
    }
}
