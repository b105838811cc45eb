//! Annotations: semantic facts attached to tree nodes by analyzers.

use serde::Serialize;

/// One fact about a node, tagged with the analyzer that produced it.
///
/// `path` locates the fact inside the node (e.g. which nested address of a
/// parameter it is about); empty means the node as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    pub value: String,
    pub analyzer_id: String,
}

impl Annotation {
    /// The engine fills in `analyzer_id` when the annotation is attached.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: String::new(),
            value: value.into(),
            analyzer_id: String::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// Append-only annotation list of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Annotations {
    items: Vec<Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach annotations produced by `analyzer_id`, stamping provenance.
    pub fn append(&mut self, analyzer_id: &str, annotations: Vec<Annotation>) {
        self.items.extend(annotations.into_iter().map(|mut a| {
            a.analyzer_id = analyzer_id.to_string();
            a
        }));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.items.iter()
    }

    pub fn from_analyzer<'a>(&'a self, analyzer_id: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.items.iter().filter(move |a| a.analyzer_id == analyzer_id)
    }

    /// First annotation with `key`.
    pub fn get(&self, key: &str) -> Option<&Annotation> {
        self.items.iter().find(|a| a.key == key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
