//! Mapping tree data model.
//!
//! A [`ClassNode`] is built once per input file, merged into new nodes, and
//! finally rendered. Nodes own their children outright and never point back
//! at their parent, so subtrees can be moved and cloned freely.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

/// Reserved source name of constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Separator between an outer class name and a nested class's local name.
pub const NESTED_SEPARATOR: char = '$';

/// Synthetic method names are already unique per class.
static SYNTHETIC_METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^method_[0-9]+$").expect("synthetic method regex"));

/// Whether `name` follows the synthetic `method_<digits>` pattern.
pub fn is_synthetic_method_name(name: &str) -> bool {
    SYNTHETIC_METHOD_RE.is_match(name)
}

// ---------------------------------------------------------------------------
// MethodKey
// ---------------------------------------------------------------------------

/// Identity of a method within one class.
///
/// Overloads share a source name, so the descriptor is part of the key,
/// except for synthetic names where the name alone is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    pub name: String,
    pub descriptor: Option<String>,
}

impl MethodKey {
    /// Key a method by name and descriptor, dropping the descriptor for
    /// synthetic names.
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        let name = name.into();
        let descriptor = if is_synthetic_method_name(&name) {
            None
        } else {
            Some(descriptor.into())
        };
        Self { name, descriptor }
    }
}

impl std::fmt::Display for MethodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.descriptor {
            Some(desc) => write!(f, "{}{desc}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Member entries
// ---------------------------------------------------------------------------

/// A renamed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub source_name: String,
    pub target_name: String,
    /// JVM type descriptor, e.g. `I` or `Ljava/lang/String;`.
    pub descriptor: String,
    /// One name per auxiliary namespace, when correlated.
    pub aux_names: Option<Vec<String>>,
}

/// A renamed parameter, keyed by local variable index in its method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgEntry {
    pub index: u32,
    pub target_name: String,
}

/// A renamed method (or a constructor) with its renamed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub source_name: String,
    pub target_name: String,
    /// JVM method descriptor, e.g. `(I)V`.
    pub descriptor: String,
    pub args: BTreeMap<u32, ArgEntry>,
    /// One name per auxiliary namespace, when correlated.
    pub aux_names: Option<Vec<String>>,
}

impl MethodEntry {
    /// A constructor entry: `<init>` maps to `<init>` in every namespace.
    pub fn constructor(descriptor: impl Into<String>, aux_namespaces: usize) -> Self {
        Self {
            source_name: CONSTRUCTOR_NAME.to_string(),
            target_name: CONSTRUCTOR_NAME.to_string(),
            descriptor: descriptor.into(),
            args: BTreeMap::new(),
            aux_names: (aux_namespaces > 0)
                .then(|| vec![CONSTRUCTOR_NAME.to_string(); aux_namespaces]),
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.source_name == CONSTRUCTOR_NAME
    }

    pub fn key(&self) -> MethodKey {
        MethodKey::new(&self.source_name, &self.descriptor)
    }

    /// Record a parameter rename. Returns `false` for identity renames, which
    /// are not stored.
    pub fn insert_arg(&mut self, index: u32, target_name: impl Into<String>) -> bool {
        let target_name = target_name.into();
        if target_name == index.to_string() {
            return false;
        }
        self.args.insert(index, ArgEntry { index, target_name });
        true
    }
}

// ---------------------------------------------------------------------------
// ClassNode
// ---------------------------------------------------------------------------

/// One class and everything nested under it.
///
/// Source and target names of nested classes are fully qualified
/// (`outer$inner`); the `nested` map is keyed by the local source name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    source_name: String,
    pub target_name: String,
    pub aux_names: Option<Vec<String>>,
    pub fields: IndexMap<String, FieldEntry>,
    pub methods: IndexMap<MethodKey, MethodEntry>,
    pub nested: BTreeMap<String, ClassNode>,
}

impl ClassNode {
    /// Create a class with no members. `target_name` of `None` leaves it unmapped.
    pub fn new(source_name: impl Into<String>, target_name: Option<String>) -> Self {
        let source_name = source_name.into();
        Self {
            target_name: target_name.unwrap_or_else(|| source_name.clone()),
            source_name,
            aux_names: None,
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            nested: BTreeMap::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The part of the source name after the last `$`.
    pub fn local_name(&self) -> &str {
        self.source_name
            .rsplit(NESTED_SEPARATOR)
            .next()
            .unwrap_or(&self.source_name)
    }

    /// Whether this class carries its own rename.
    pub fn is_renamed(&self) -> bool {
        self.target_name != self.source_name
    }

    /// Whether rendering this class would emit nothing at all.
    pub fn is_elided(&self) -> bool {
        !self.is_renamed()
            && self.fields.is_empty()
            && self.methods.is_empty()
            && self.nested.values().all(ClassNode::is_elided)
    }

    /// Record a field rename. Returns `false` for identity renames, which
    /// are not stored.
    pub fn insert_field(&mut self, field: FieldEntry) -> bool {
        if field.source_name == field.target_name {
            return false;
        }
        self.fields.insert(field.source_name.clone(), field);
        true
    }

    /// Record a method rename and return its key. Identity renames other
    /// than constructors are not stored.
    pub fn insert_method(&mut self, method: MethodEntry) -> Option<MethodKey> {
        if !method.is_constructor() && method.source_name == method.target_name {
            return None;
        }
        let key = method.key();
        self.methods.insert(key.clone(), method);
        Some(key)
    }

    /// Number of field, method and argument entries in this subtree.
    pub fn entry_count(&self) -> usize {
        self.fields.len()
            + self
                .methods
                .values()
                .map(|m| 1 + m.args.len())
                .sum::<usize>()
            + self.nested.values().map(ClassNode::entry_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(source: &str, target: &str, desc: &str) -> MethodEntry {
        MethodEntry {
            source_name: source.into(),
            target_name: target.into(),
            descriptor: desc.into(),
            args: BTreeMap::new(),
            aux_names: None,
        }
    }

    #[test]
    fn synthetic_names_drop_descriptor_from_key() {
        assert_eq!(MethodKey::new("method_123", "()V").descriptor, None);
        assert_eq!(
            MethodKey::new("tick", "()V").descriptor.as_deref(),
            Some("()V")
        );
        assert!(!is_synthetic_method_name("method_"));
        assert!(!is_synthetic_method_name("method_12a"));
        assert!(!is_synthetic_method_name("xmethod_12"));
    }

    #[test]
    fn overloads_get_distinct_keys() {
        let mut class = ClassNode::new("a/b", None);
        class.insert_method(method("run", "go", "()V"));
        class.insert_method(method("run", "go", "(I)V"));
        assert_eq!(class.methods.len(), 2);
    }

    #[test]
    fn identity_entries_are_not_stored() {
        let mut class = ClassNode::new("a/b", None);
        assert!(!class.insert_field(FieldEntry {
            source_name: "f".into(),
            target_name: "f".into(),
            descriptor: "I".into(),
            aux_names: None,
        }));
        assert!(class.insert_method(method("m", "m", "()V")).is_none());
        assert!(class.fields.is_empty());
        assert!(class.methods.is_empty());
        assert!(class.is_elided());
    }

    #[test]
    fn constructor_is_always_stored() {
        let mut class = ClassNode::new("a/b", None);
        let key = class.insert_method(MethodEntry::constructor("(I)V", 3));
        assert!(key.is_some());
        let ctor = &class.methods[&key.unwrap()];
        assert_eq!(ctor.target_name, CONSTRUCTOR_NAME);
        assert_eq!(ctor.aux_names.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn identity_args_are_not_stored() {
        let mut m = method("m", "n", "(II)V");
        assert!(!m.insert_arg(1, "1"));
        assert!(m.insert_arg(2, "count"));
        assert_eq!(m.args.len(), 1);
    }

    #[test]
    fn elision_is_recursive() {
        let mut outer = ClassNode::new("a", None);
        let mut inner = ClassNode::new("a$b", None);
        inner
            .nested
            .insert("c".into(), ClassNode::new("a$b$c", None));
        outer.nested.insert("b".into(), inner);
        assert!(outer.is_elided());

        outer
            .nested
            .get_mut("b")
            .unwrap()
            .nested
            .get_mut("c")
            .unwrap()
            .target_name = "x$y$z".into();
        assert!(!outer.is_elided());
    }

    #[test]
    fn local_name_strips_outer_classes() {
        assert_eq!(ClassNode::new("a/b$c$d", None).local_name(), "d");
        assert_eq!(ClassNode::new("a/b", None).local_name(), "a/b");
    }
}
