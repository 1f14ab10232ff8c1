//! Track path definitions.
//!
//! A track is described by numbered main paths (`"0"`, `"1"`, ...). Each main
//! path may fork into one left and one right subpath (`"0_left"`,
//! `"0_right"`). Every path lists the block objects where it starts, where it
//! ends, and which blocks it ignores. The tree is stored as a dense arena of
//! nodes referring to each other by slot index; removals compact the arena
//! and renumber the links.
//!
//! # Example
//!
//! ```
//! use trackverts::path::{Category, PathTree, Side};
//!
//! let mut tree = PathTree::new();
//! let main = tree.create_path();
//! tree.add_subpath(&main, Side::Left).unwrap();
//! tree.add_objects(&main, Category::Start, ["quad_00", "quad_01"]).unwrap();
//!
//! let json = tree.export();
//! assert_eq!(json["pathCount"], 1);
//! assert_eq!(json["path0"]["hasLeft"], true);
//! assert_eq!(json["path0"]["quadStart"][1], "quad_01");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, VertexError};

/// Version tag written into exported path files.
pub const EXPORT_HEADER: u32 = 2;

/// Side of a main path a subpath branches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Left branch.
    Left,
    /// Right branch.
    Right,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Object list of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Blocks where the path starts.
    Start,
    /// Blocks where the path ends.
    End,
    /// Blocks the path ignores.
    Ignore,
}

/// One path node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathNode {
    id: String,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    start: Vec<String>,
    end: Vec<String>,
    ignore: Vec<String>,
}

impl PathNode {
    fn new(id: String, parent: Option<usize>) -> Self {
        Self {
            id,
            parent,
            left: None,
            right: None,
            start: Vec::new(),
            end: Vec::new(),
            ignore: Vec::new(),
        }
    }

    /// Path identifier, e.g. `"3"` or `"3_left"`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this is a main path.
    pub fn is_main(&self) -> bool {
        self.parent.is_none()
    }

    /// Object names in one category, in insertion order.
    pub fn objects(&self, category: Category) -> &[String] {
        match category {
            Category::Start => &self.start,
            Category::End => &self.end,
            Category::Ignore => &self.ignore,
        }
    }

    fn objects_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Start => &mut self.start,
            Category::End => &mut self.end,
            Category::Ignore => &mut self.ignore,
        }
    }

    fn child(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Arena of main paths and their subpaths.
///
/// The editing state serializes as is, so a tree can be stored between
/// sessions and restored with `serde_json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTree {
    nodes: Vec<PathNode>,
    mains: Vec<usize>,
}

impl PathTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of main paths.
    pub fn main_count(&self) -> usize {
        self.mains.len()
    }

    /// Number of paths, subpaths included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no path exists.
    pub fn is_empty(&self) -> bool {
        self.mains.is_empty()
    }

    /// Identifiers of every path, each main path followed by its subpaths.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::with_capacity(self.len());
        for &slot in &self.mains {
            if let Some(node) = self.slot(slot) {
                ids.push(node.id());
                for side in [Side::Left, Side::Right] {
                    if let Some(child) = node.child(side).and_then(|c| self.slot(c)) {
                        ids.push(child.id());
                    }
                }
            }
        }
        ids
    }

    /// Look up a path by identifier.
    pub fn get(&self, id: &str) -> Option<&PathNode> {
        self.find(id).and_then(|slot| self.slot(slot))
    }

    /// Append a new main path and return its identifier.
    pub fn create_path(&mut self) -> String {
        let id = self.mains.len().to_string();
        let slot = self.insert(PathNode::new(id.clone(), None));
        self.mains.push(slot);
        log::debug!("created path {}", id);
        id
    }

    /// Add a left or right subpath to a main path and return its identifier.
    ///
    /// Adding a side that already exists returns the existing subpath.
    ///
    /// # Errors
    ///
    /// * [`VertexError::PathNotFound`] if `parent` does not exist
    /// * [`VertexError::InvalidState`] if `parent` is itself a subpath
    pub fn add_subpath(&mut self, parent: &str, side: Side) -> Result<String> {
        let parent_slot = self.require(parent)?;
        let node = self.node(parent_slot)?;
        if !node.is_main() {
            return Err(VertexError::InvalidState(format!(
                "path {} is a subpath and cannot branch",
                parent
            )));
        }
        if let Some(existing) = node.child(side).and_then(|c| self.slot(c)) {
            return Ok(existing.id.clone());
        }

        let id = format!("{}_{}", parent, side);
        let slot = self.insert(PathNode::new(id.clone(), Some(parent_slot)));
        let parent_node = self.node_mut(parent_slot)?;
        match side {
            Side::Left => parent_node.left = Some(slot),
            Side::Right => parent_node.right = Some(slot),
        }
        log::debug!("added subpath {}", id);
        Ok(id)
    }

    /// Remove the last main path together with its subpaths.
    ///
    /// Returns the identifier of the removed main path.
    ///
    /// # Errors
    ///
    /// Returns [`VertexError::InvalidState`] if there are no paths.
    pub fn remove_last_path(&mut self) -> Result<String> {
        let slot = self
            .mains
            .pop()
            .ok_or_else(|| VertexError::InvalidState("no paths to remove".to_string()))?;
        let node = self.node(slot)?;
        let id = node.id.clone();
        let mut doomed = vec![slot];
        doomed.extend(node.left);
        doomed.extend(node.right);
        self.remove_slots(&doomed);
        log::debug!("removed path {}", id);
        Ok(id)
    }

    /// Remove both subpaths of a main path. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`VertexError::PathNotFound`] if `path` does not exist.
    pub fn remove_subpaths(&mut self, path: &str) -> Result<usize> {
        let slot = self.require(path)?;
        let node = self.node_mut(slot)?;
        let children: Vec<usize> = [node.left.take(), node.right.take()].into_iter().flatten().collect();
        self.remove_slots(&children);
        Ok(children.len())
    }

    /// Add object names to one category of a path, skipping names already
    /// listed. Returns how many names were new.
    ///
    /// # Errors
    ///
    /// Returns [`VertexError::PathNotFound`] if `path` does not exist.
    pub fn add_objects<I, N>(&mut self, path: &str, category: Category, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let slot = self.require(path)?;
        let list = self.node_mut(slot)?.objects_mut(category);
        let mut added = 0;
        for name in names {
            let name = name.into();
            if name.is_empty() || list.contains(&name) {
                continue;
            }
            list.push(name);
            added += 1;
        }
        if added == 0 {
            log::info!("all objects were already listed for path {}", path);
        }
        Ok(added)
    }

    /// Remove object names from one category of a path. Returns how many
    /// names were removed.
    ///
    /// # Errors
    ///
    /// Returns [`VertexError::PathNotFound`] if `path` does not exist.
    pub fn remove_objects<I, N>(&mut self, path: &str, category: Category, names: I) -> Result<usize>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let slot = self.require(path)?;
        let names: Vec<N> = names.into_iter().collect();
        let list = self.node_mut(slot)?.objects_mut(category);
        let before = list.len();
        list.retain(|existing| !names.iter().any(|n| n.as_ref() == existing));
        Ok(before - list.len())
    }

    /// Export the main paths as a JSON document.
    ///
    /// Subpaths only show up through the `hasLeft` and `hasRight` flags of
    /// their main path.
    pub fn export(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("header".to_string(), Value::from(EXPORT_HEADER));

        for (index, node) in self.mains.iter().filter_map(|&s| self.slot(s)).enumerate() {
            let record = json!({
                "hasLeft": node.left.is_some(),
                "hasRight": node.right.is_some(),
                "index": index,
                "quadEnd": node.end,
                "quadIgnore": node.ignore,
                "quadStart": node.start,
            });
            doc.insert(format!("path{}", node.id), record);
        }

        doc.insert("pathCount".to_string(), Value::from(self.mains.len()));
        Value::Object(doc)
    }

    /// Export as pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export()).map_err(|e| VertexError::InvalidState(e.to_string()))
    }

    fn insert(&mut self, node: PathNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn slot(&self, slot: usize) -> Option<&PathNode> {
        self.nodes.get(slot)
    }

    fn node(&self, slot: usize) -> Result<&PathNode> {
        self.slot(slot)
            .ok_or_else(|| VertexError::InvalidState(format!("empty path slot {}", slot)))
    }

    fn node_mut(&mut self, slot: usize) -> Result<&mut PathNode> {
        self.nodes
            .get_mut(slot)
            .ok_or_else(|| VertexError::InvalidState(format!("empty path slot {}", slot)))
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.find(id).ok_or_else(|| VertexError::PathNotFound(id.to_string()))
    }

    /// Drop the given slots and renumber every link to the survivors.
    fn remove_slots(&mut self, doomed: &[usize]) {
        if doomed.is_empty() {
            return;
        }
        let mut remap = Vec::with_capacity(self.nodes.len());
        let mut next = 0;
        for slot in 0..self.nodes.len() {
            if doomed.contains(&slot) {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }

        let mut slot = 0;
        self.nodes.retain(|_| {
            let keep = remap[slot].is_some();
            slot += 1;
            keep
        });

        let map = |link: Option<usize>| link.and_then(|s| remap.get(s).copied().flatten());
        for node in &mut self.nodes {
            node.parent = map(node.parent);
            node.left = map(node.left);
            node.right = map(node.right);
        }
        self.mains = self.mains.iter().filter_map(|&s| map(Some(s))).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_remove() {
        let mut tree = PathTree::new();
        assert_eq!(tree.create_path(), "0");
        assert_eq!(tree.create_path(), "1");
        assert_eq!(tree.main_count(), 2);

        assert_eq!(tree.remove_last_path().unwrap(), "1");
        assert_eq!(tree.create_path(), "1");
        assert_eq!(tree.remove_last_path().unwrap(), "1");
        assert_eq!(tree.remove_last_path().unwrap(), "0");
        assert!(tree.is_empty());
        assert!(matches!(tree.remove_last_path(), Err(VertexError::InvalidState(_))));
    }

    #[test]
    fn test_subpaths() {
        let mut tree = PathTree::new();
        let main = tree.create_path();
        assert_eq!(tree.add_subpath(&main, Side::Left).unwrap(), "0_left");
        assert_eq!(tree.add_subpath(&main, Side::Left).unwrap(), "0_left");
        assert_eq!(tree.add_subpath(&main, Side::Right).unwrap(), "0_right");
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.ids(), vec!["0", "0_left", "0_right"]);

        assert!(matches!(
            tree.add_subpath("0_left", Side::Right),
            Err(VertexError::InvalidState(_))
        ));
        assert!(matches!(
            tree.add_subpath("7", Side::Right),
            Err(VertexError::PathNotFound(_))
        ));

        assert_eq!(tree.remove_subpaths(&main).unwrap(), 2);
        assert!(tree.get("0_left").is_none());
        assert_eq!(tree.remove_subpaths(&main).unwrap(), 0);
    }

    #[test]
    fn test_remove_last_drops_subpaths() {
        let mut tree = PathTree::new();
        tree.create_path();
        let second = tree.create_path();
        tree.add_subpath(&second, Side::Right).unwrap();
        tree.add_subpath("0", Side::Left).unwrap();

        tree.remove_last_path().unwrap();
        assert!(tree.get("1_right").is_none());
        assert!(tree.get("0_left").is_some());
        assert_eq!(tree.ids(), vec!["0", "0_left"]);
    }

    #[test]
    fn test_objects_no_duplicates() {
        let mut tree = PathTree::new();
        let main = tree.create_path();
        assert_eq!(tree.add_objects(&main, Category::Start, ["a", "b"]).unwrap(), 2);
        assert_eq!(tree.add_objects(&main, Category::Start, ["b", "c", ""]).unwrap(), 1);
        assert_eq!(tree.add_objects(&main, Category::End, ["a"]).unwrap(), 1);

        let node = tree.get(&main).unwrap();
        assert_eq!(node.objects(Category::Start), &["a", "b", "c"]);
        assert_eq!(node.objects(Category::End), &["a"]);
        assert!(node.objects(Category::Ignore).is_empty());

        assert_eq!(tree.remove_objects(&main, Category::Start, ["a", "zz"]).unwrap(), 1);
        assert_eq!(tree.get(&main).unwrap().objects(Category::Start), &["b", "c"]);

        let sub = tree.add_subpath(&main, Side::Left).unwrap();
        assert_eq!(tree.add_objects(&sub, Category::Ignore, ["x"]).unwrap(), 1);
        assert!(matches!(
            tree.add_objects("9", Category::Ignore, ["x"]),
            Err(VertexError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_export_format() {
        let mut tree = PathTree::new();
        let first = tree.create_path();
        let second = tree.create_path();
        tree.add_subpath(&second, Side::Right).unwrap();
        tree.add_objects(&first, Category::Start, ["s0"]).unwrap();
        tree.add_objects(&first, Category::End, ["e0"]).unwrap();
        tree.add_objects(&second, Category::Ignore, ["i1"]).unwrap();

        let json = tree.export();
        assert_eq!(json["header"], 2);
        assert_eq!(json["pathCount"], 2);
        assert_eq!(json["path0"]["index"], 0);
        assert_eq!(json["path0"]["hasLeft"], false);
        assert_eq!(json["path0"]["quadStart"], serde_json::json!(["s0"]));
        assert_eq!(json["path0"]["quadEnd"], serde_json::json!(["e0"]));
        assert_eq!(json["path1"]["hasRight"], true);
        assert_eq!(json["path1"]["quadIgnore"], serde_json::json!(["i1"]));
        assert!(json.get("path1_right").is_none());

        let text = tree.to_json_string().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json);
    }

    #[test]
    fn test_arena_stays_dense() {
        let mut tree = PathTree::new();
        for _ in 0..50 {
            let main = tree.create_path();
            tree.add_subpath(&main, Side::Left).unwrap();
            tree.add_subpath(&main, Side::Right).unwrap();
            tree.remove_last_path().unwrap();
            assert!(tree.nodes.is_empty());
        }

        let first = tree.create_path();
        let second = tree.create_path();
        tree.add_subpath(&first, Side::Left).unwrap();
        tree.add_subpath(&second, Side::Right).unwrap();
        for _ in 0..50 {
            tree.add_subpath(&first, Side::Right).unwrap();
            tree.remove_subpaths(&first).unwrap();
        }
        assert_eq!(tree.nodes.len(), 3);

        // Links into slots after the removed ones are renumbered
        assert_eq!(tree.ids(), vec!["0", "1", "1_right"]);
        assert_eq!(tree.export()["path1"]["hasRight"], true);
        tree.add_objects("1_right", Category::End, ["e"]).unwrap();
        assert_eq!(tree.remove_last_path().unwrap(), "1");
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.ids(), vec!["0"]);
    }

    #[test]
    fn test_state_round_trip() {
        let mut tree = PathTree::new();
        let main = tree.create_path();
        tree.add_subpath(&main, Side::Left).unwrap();
        tree.add_objects(&main, Category::Ignore, ["pit"]).unwrap();

        let text = serde_json::to_string(&tree).unwrap();
        let restored: PathTree = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, tree);
        assert_eq!(restored.ids(), vec!["0", "0_left"]);
    }

    #[test]
    fn test_empty_export() {
        let json = PathTree::new().export();
        assert_eq!(json, serde_json::json!({"header": 2, "pathCount": 0}));
    }
}
