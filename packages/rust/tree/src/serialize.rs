//! Canonical serializer: renders class trees as tiny v2 style text.
//!
//! ```text
//! tiny	2	0	intermediary	named[	<aux>...]
//! c	<source>	<target>[	<aux>...]
//! 	f	<descriptor>	<source>	<target>[	<aux>...]
//! 	m	<descriptor>	<source>	<target>[	<aux>...]
//! 		p	<index>		<target>[	<empty>...]
//! 	c	<nested source>	<nested target>[	<aux>...]
//! ```
//!
//! Everything is sorted, so rendering the same tree always yields the same
//! text. Classes that carry no information are elided.

use mapfold_shared::{AppConfig, ClassNode, FieldEntry, MethodEntry};

/// Namespace columns of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Namespace of source names.
    pub primary: String,
    /// Namespace of target names.
    pub target: String,
    /// Auxiliary namespaces, in column order. Empty without correlation.
    pub auxiliary: Vec<String>,
}

impl Layout {
    /// Layout from config. Auxiliary columns are only present when a
    /// correlation table is in use.
    pub fn from_config(config: &AppConfig, correlated: bool) -> Self {
        Self {
            primary: config.correlation.primary_namespace.clone(),
            target: config.output.target_namespace.clone(),
            auxiliary: if correlated {
                config.correlation.auxiliary_namespaces.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// The versioned header row, without a trailing newline.
    pub fn header(&self) -> String {
        let mut header = format!("tiny\t2\t0\t{}\t{}", self.primary, self.target);
        for ns in &self.auxiliary {
            header.push('\t');
            header.push_str(ns);
        }
        header
    }
}

/// Render a full output file: header, then each class independently.
pub fn render<'a>(classes: impl IntoIterator<Item = &'a ClassNode>, layout: &Layout) -> String {
    let mut out = layout.header();
    out.push('\n');
    for class in classes {
        write_class(class, 0, layout, &mut out);
    }
    out
}

/// Append one class subtree at `depth`. Elided classes append nothing.
pub fn write_class(class: &ClassNode, depth: usize, layout: &Layout, out: &mut String) {
    if class.is_elided() {
        return;
    }

    indent(out, depth);
    out.push_str("c\t");
    out.push_str(class.source_name());
    out.push('\t');
    out.push_str(&class.target_name);
    push_aux(out, class.aux_names.as_deref(), layout.auxiliary.len());
    out.push('\n');

    let mut fields: Vec<&FieldEntry> = class.fields.values().collect();
    fields.sort_by(|a, b| a.source_name.cmp(&b.source_name));
    for field in fields {
        write_member(
            out,
            depth + 1,
            'f',
            &field.descriptor,
            &field.source_name,
            &field.target_name,
        );
        push_aux(out, field.aux_names.as_deref(), layout.auxiliary.len());
        out.push('\n');
    }

    let mut methods: Vec<&MethodEntry> = class.methods.values().collect();
    methods.sort_by(|a, b| {
        a.source_name
            .cmp(&b.source_name)
            .then_with(|| a.descriptor.cmp(&b.descriptor))
    });
    for method in methods {
        write_member(
            out,
            depth + 1,
            'm',
            &method.descriptor,
            &method.source_name,
            &method.target_name,
        );
        push_aux(out, method.aux_names.as_deref(), layout.auxiliary.len());
        out.push('\n');

        // BTreeMap iteration is already ascending by index.
        for arg in method.args.values() {
            indent(out, depth + 2);
            out.push_str("p\t");
            out.push_str(&arg.index.to_string());
            out.push_str("\t\t");
            out.push_str(&arg.target_name);
            push_aux(out, None, layout.auxiliary.len());
            out.push('\n');
        }
    }

    for nested in class.nested.values() {
        write_class(nested, depth + 1, layout, out);
    }
}

fn indent(out: &mut String, depth: usize) {
    out.extend(std::iter::repeat_n('\t', depth));
}

fn write_member(
    out: &mut String,
    depth: usize,
    tag: char,
    descriptor: &str,
    source: &str,
    target: &str,
) {
    indent(out, depth);
    out.push(tag);
    out.push('\t');
    out.push_str(descriptor);
    out.push('\t');
    out.push_str(source);
    out.push('\t');
    out.push_str(target);
}

/// Exactly `width` auxiliary columns: known names first, then empties.
fn push_aux(out: &mut String, names: Option<&[String]>, width: usize) {
    let names = names.unwrap_or_default();
    for i in 0..width {
        out.push('\t');
        if let Some(name) = names.get(i) {
            out.push_str(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn plain() -> Layout {
        Layout::from_config(&AppConfig::default(), false)
    }

    fn correlated() -> Layout {
        Layout::from_config(&AppConfig::default(), true)
    }

    fn render_one(class: &ClassNode, layout: &Layout) -> String {
        let mut out = String::new();
        write_class(class, 0, layout, &mut out);
        out
    }

    #[test]
    fn header_lists_present_namespaces() {
        assert_eq!(plain().header(), "tiny\t2\t0\tintermediary\tnamed");
        assert_eq!(
            correlated().header(),
            "tiny\t2\t0\tintermediary\tnamed\tglue\tserver\tclient"
        );
    }

    #[test]
    fn members_are_sorted_and_args_ascend() {
        let mut class = ClassNode::new("a/b", Some("x/y".into()));
        for (source, target) in [("zeta", "z"), ("alpha", "a")] {
            class.insert_field(FieldEntry {
                source_name: source.into(),
                target_name: target.into(),
                descriptor: "I".into(),
                aux_names: None,
            });
        }
        let mut method = MethodEntry {
            source_name: "run".into(),
            target_name: "go".into(),
            descriptor: "(III)V".into(),
            args: BTreeMap::new(),
            aux_names: None,
        };
        method.insert_arg(3, "c");
        method.insert_arg(1, "a");
        method.insert_arg(2, "b");
        class.insert_method(method);
        class.insert_method(MethodEntry::constructor("()V", 0));

        let text = render_one(&class, &plain());
        assert_eq!(
            text,
            "c\ta/b\tx/y\n\
             \tf\tI\talpha\ta\n\
             \tf\tI\tzeta\tz\n\
             \tm\t()V\t<init>\t<init>\n\
             \tm\t(III)V\trun\tgo\n\
             \t\tp\t1\t\ta\n\
             \t\tp\t2\t\tb\n\
             \t\tp\t3\t\tc\n"
        );
    }

    #[test]
    fn unmapped_empty_class_is_elided() {
        let mut class = ClassNode::new("a/b", None);
        class.insert_field(FieldEntry {
            source_name: "f".into(),
            target_name: "f".into(),
            descriptor: "I".into(),
            aux_names: None,
        });
        class
            .nested
            .insert("c".into(), ClassNode::new("a/b$c", None));
        assert_eq!(render_one(&class, &plain()), "");
    }

    #[test]
    fn nested_classes_indent_one_level_deeper() {
        let mut class = ClassNode::new("a", None);
        let mut inner = ClassNode::new("a$b", Some("x$y".into()));
        inner.insert_field(FieldEntry {
            source_name: "f".into(),
            target_name: "g".into(),
            descriptor: "J".into(),
            aux_names: None,
        });
        class.nested.insert("b".into(), inner);

        assert_eq!(
            render_one(&class, &plain()),
            "c\ta\ta\n\tc\ta$b\tx$y\n\t\tf\tJ\tf\tg\n"
        );
    }

    #[test]
    fn aux_columns_are_padded_to_layout_width() {
        let mut class = ClassNode::new("a", Some("b".into()));
        class.aux_names = Some(vec!["g".into()]);
        let mut method = MethodEntry::constructor("()V", 3);
        method.insert_arg(1, "x");
        class.insert_method(method);

        assert_eq!(
            render_one(&class, &correlated()),
            "c\ta\tb\tg\t\t\n\
             \tm\t()V\t<init>\t<init>\t<init>\t<init>\t<init>\n\
             \t\tp\t1\t\tx\t\t\t\n"
        );
    }

    #[test]
    fn render_writes_header_then_classes() {
        let a = ClassNode::new("a", Some("A".into()));
        let skipped = ClassNode::new("b", None);
        let text = render([&a, &skipped], &plain());
        assert_eq!(text, "tiny\t2\t0\tintermediary\tnamed\nc\ta\tA\n");
    }
}
