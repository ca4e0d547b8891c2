//! The seam through which auxiliary-namespace names reach the tree builder.
//!
//! The builder only asks questions by source name; where the answers come
//! from (a tiny table, nothing at all) is up to the implementation.

/// Looks up auxiliary-namespace names for source identifiers.
pub trait Correlator {
    /// Auxiliary namespaces, in output column order. Empty when no
    /// correlation is in use.
    fn namespaces(&self) -> &[String];

    /// Names of a class (fully qualified source name) in each namespace.
    fn class_names(&self, class: &str) -> Option<&[String]>;

    /// Names of a field or method of `class` in each namespace.
    fn member_names(&self, class: &str, member: &str) -> Option<&[String]>;

    /// Number of auxiliary columns every record must carry.
    fn width(&self) -> usize {
        self.namespaces().len()
    }

    /// Names for a class record, padded with empty names when the class is
    /// not in the table. `None` when correlation is off.
    fn class_columns(&self, class: &str) -> Option<Vec<String>> {
        pad_columns(self.width(), self.class_names(class))
    }

    /// Names for a member record, padded like [`Correlator::class_columns`].
    fn member_columns(&self, class: &str, member: &str) -> Option<Vec<String>> {
        pad_columns(self.width(), self.member_names(class, member))
    }
}

fn pad_columns(width: usize, found: Option<&[String]>) -> Option<Vec<String>> {
    if width == 0 {
        return None;
    }
    let mut names = found.map(<[String]>::to_vec).unwrap_or_default();
    names.resize(width, String::new());
    Some(names)
}

/// Correlation turned off: no namespaces, no names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrelation;

impl Correlator for NoCorrelation {
    fn namespaces(&self) -> &[String] {
        &[]
    }

    fn class_names(&self, _class: &str) -> Option<&[String]> {
        None
    }

    fn member_names(&self, _class: &str, _member: &str) -> Option<&[String]> {
        None
    }
}
