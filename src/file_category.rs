//! Category resolution for sorting files by extension.
//!
//! This module holds the nested, ordered category table loaded from configuration and
//! answers which category path (category, sub-category, ...) a file name belongs to.
//!
//! # Examples
//!
//! ```
//! use dirsort::file_category::{CategoryTable, Classification};
//!
//! let table = CategoryTable::new()
//!     .with_leaf("programs", ["exe", "msi"])
//!     .with_branch(
//!         "documents",
//!         CategoryTable::new()
//!             .with_leaf("pdf", ["pdf", "PDF"])
//!             .with_leaf("text", ["txt"]),
//!     );
//!
//! assert_eq!(table.resolve("setup.exe"), Classification::Category("programs".into()));
//! assert_eq!(
//!     table.resolve("notes.txt"),
//!     Classification::Nested(vec!["documents".into(), "text".into()])
//! );
//! assert_eq!(table.resolve("README"), Classification::Unclassified);
//! ```

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::collections::HashSet;
use std::fmt;

/// Directory name used for files no category claims.
pub const OTHER_DIR: &str = "Other";

/// The outcome of classifying a single file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No category lists the file's extension, or the file has none.
    Unclassified,
    /// A top-level category without sub-categories (or the branch fallback).
    Category(String),
    /// A label path from the top-level category down to the matching sub-category.
    Nested(Vec<String>),
}

impl Classification {
    /// Returns the raw labels of this classification, outermost first.
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Classification::Unclassified => Vec::new(),
            Classification::Category(label) => vec![label.as_str()],
            Classification::Nested(labels) => labels.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Classification::Unclassified)
    }

    /// Returns the directory components this classification sorts into.
    ///
    /// Labels are title-cased for the directory name only; unclassified files go to
    /// [`OTHER_DIR`].
    ///
    /// ```
    /// use dirsort::file_category::Classification;
    ///
    /// let nested = Classification::Nested(vec!["office".into(), "power point".into()]);
    /// assert_eq!(nested.dir_components(), vec!["Office", "Power Point"]);
    /// assert_eq!(Classification::Unclassified.dir_components(), vec!["Other"]);
    /// ```
    pub fn dir_components(&self) -> Vec<String> {
        match self {
            Classification::Unclassified => vec![OTHER_DIR.to_string()],
            _ => self.labels().into_iter().map(title_case).collect(),
        }
    }

    /// Puts `label` in front of a classification found one level down.
    fn under(label: &str, inner: Classification) -> Classification {
        match inner {
            Classification::Unclassified => Classification::Category(label.to_string()),
            Classification::Category(sub) => Classification::Nested(vec![label.to_string(), sub]),
            Classification::Nested(mut labels) => {
                labels.insert(0, label.to_string());
                Classification::Nested(labels)
            }
        }
    }
}

/// A single entry of a [`CategoryTable`].
#[derive(Debug, Clone)]
pub enum CategoryNode {
    /// A category that lists its extensions directly.
    Leaf(HashSet<String>),
    /// A category split into sub-categories.
    Branch {
        children: CategoryTable,
        /// Union of every extension below this branch.
        all: HashSet<String>,
    },
}

impl CategoryNode {
    pub fn leaf<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CategoryNode::Leaf(extensions.into_iter().map(Into::into).collect())
    }

    /// Builds a branch and precomputes the union of its descendants' extensions.
    pub fn branch(children: CategoryTable) -> Self {
        let all = children.all_extensions();
        CategoryNode::Branch { children, all }
    }

    /// Returns true if this node, or anything below it, lists `extension`.
    pub fn contains(&self, extension: &str) -> bool {
        match self {
            CategoryNode::Leaf(extensions) => extensions.contains(extension),
            CategoryNode::Branch { all, .. } => all.contains(extension),
        }
    }
}

/// An ordered mapping of category names to extension sets or nested tables.
///
/// Order is the configured order and decides priority: the first category listing an
/// extension wins. The table is immutable once built and safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    entries: Vec<(String, CategoryNode)>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a leaf category.
    pub fn with_leaf<I, S>(self, name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_node(name, CategoryNode::leaf(extensions))
    }

    /// Appends a category with sub-categories.
    pub fn with_branch(self, name: impl Into<String>, children: CategoryTable) -> Self {
        self.with_node(name, CategoryNode::branch(children))
    }

    /// Appends a node, replacing (in place) any existing category of the same name.
    pub fn with_node(mut self, name: impl Into<String>, node: CategoryNode) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = node,
            None => self.entries.push((name, node)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&CategoryNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates categories in configured order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Returns the union of every extension listed anywhere in this table.
    pub fn all_extensions(&self) -> HashSet<String> {
        let mut all = HashSet::new();
        for (_, node) in &self.entries {
            match node {
                CategoryNode::Leaf(extensions) => all.extend(extensions.iter().cloned()),
                CategoryNode::Branch { all: below, .. } => all.extend(below.iter().cloned()),
            }
        }
        all
    }

    /// Classifies a file name (not a path) by its extension.
    pub fn resolve(&self, file_name: &str) -> Classification {
        match extension_of(file_name) {
            Some(extension) => self.resolve_extension(extension),
            None => Classification::Unclassified,
        }
    }

    /// Classifies a bare extension (without the leading dot). Matching is case-sensitive.
    pub fn resolve_extension(&self, extension: &str) -> Classification {
        for (name, node) in &self.entries {
            if !node.contains(extension) {
                continue;
            }
            return match node {
                CategoryNode::Leaf(_) => Classification::Category(name.clone()),
                CategoryNode::Branch { children, .. } => {
                    Classification::under(name, children.resolve_extension(extension))
                }
            };
        }
        Classification::Unclassified
    }
}

impl<'de> Deserialize<'de> for CategoryTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TableVisitor)
    }
}

impl<'de> Deserialize<'de> for CategoryNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

/// Reads a table entry by entry so document order survives.
struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = CategoryTable;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a table of category names to extension lists or sub-tables")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: Vec<(String, CategoryNode)> = Vec::new();
        while let Some((name, node)) = map.next_entry::<String, CategoryNode>()? {
            if entries.iter().any(|(existing, _)| *existing == name) {
                return Err(de::Error::custom(format!("duplicate category `{}`", name)));
            }
            entries.push((name, node));
        }
        Ok(CategoryTable { entries })
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = CategoryNode;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-empty list of extensions or a non-empty table of sub-categories")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut extensions = HashSet::new();
        while let Some(extension) = seq.next_element::<String>()? {
            extensions.insert(extension);
        }
        if extensions.is_empty() {
            return Err(de::Error::invalid_length(0, &self));
        }
        Ok(CategoryNode::Leaf(extensions))
    }

    fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let children = TableVisitor.visit_map(map)?;
        if children.is_empty() {
            return Err(de::Error::invalid_length(0, &self));
        }
        Ok(CategoryNode::branch(children))
    }
}

/// Splits a file name into its stem and extension (without the dot).
///
/// Leading dots do not start an extension (`.bashrc` has none) and a trailing dot
/// yields no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    let trimmed = name.trim_start_matches('.');
    match trimmed.rsplit_once('.') {
        Some((_, extension)) if !extension.is_empty() => {
            (&name[..name.len() - extension.len() - 1], Some(extension))
        }
        _ => (name, None),
    }
}

/// Returns the extension of a file name without its leading dot.
pub fn extension_of(name: &str) -> Option<&str> {
    split_extension(name).1
}

/// Title-cases a label: the first letter after any non-letter is upper-cased, every other
/// letter lower-cased (`"power point"` becomes `"Power Point"`, `"mp3s"` becomes `"Mp3S"`).
pub fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut after_letter = false;
    for c in label.chars() {
        if after_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    out
}
