//! Recursive-descent builder turning mapping tree lines into a [`ClassNode`].
//!
//! Input format, one record per line, nesting by leading tabs:
//! ```text
//! CLASS <source> [<target>]
//! 	FIELD <source> <target> <descriptor>
//! 	METHOD <source> <target> <descriptor>
//! 		ARG <index> <target>
//! 	CLASS <local source> [<local target>]
//! ```

use std::path::Path;

use tracing::{debug, instrument, warn};

use mapfold_shared::{
    CONSTRUCTOR_NAME, ClassNode, Correlator, FieldEntry, MapfoldError, MethodEntry, MethodKey,
    NESTED_SEPARATOR, Result,
};

use crate::ParseError;
use crate::line::{Line, RecordKind, classify, depth_of};
use crate::merge::merge_deep;

/// Resolved names of the class enclosing a nested CLASS record.
#[derive(Debug, Clone, Copy)]
pub struct Outer<'a> {
    pub source: &'a str,
    pub target: &'a str,
}

/// Parse one mapping file's content into its root class.
///
/// The first line must be a CLASS record. Lines after the root class's
/// subtree are ignored.
#[instrument(skip_all, fields(origin = %origin.display()))]
pub fn parse_str(content: &str, origin: &Path, correlator: &dyn Correlator) -> Result<ClassNode> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(MapfoldError::malformed(origin, 1, "file contains no CLASS record"));
    }

    let mut cursor = 0;
    let root = build_class(&lines, &mut cursor, None, correlator)
        .map_err(|e| MapfoldError::malformed(origin, e.line, e.message))?;

    if cursor < lines.len() {
        warn!(
            ignored_lines = lines.len() - cursor,
            first_ignored = cursor + 1,
            "content after the root class was ignored"
        );
    }

    debug!(
        class = root.source_name(),
        entries = root.entry_count(),
        "parsed mapping file"
    );
    Ok(root)
}

/// Build the class whose CLASS record sits at `lines[*cursor]`.
///
/// On return `cursor` points at the first line at the class's own depth or
/// shallower, or past the end of input.
pub fn build_class(
    lines: &[&str],
    cursor: &mut usize,
    outer: Option<Outer<'_>>,
    correlator: &dyn Correlator,
) -> std::result::Result<ClassNode, ParseError> {
    let head = read_line(lines, *cursor)?;
    if head.kind() != RecordKind::Class {
        return Err(ParseError::new(
            *cursor + 1,
            format!("expected a CLASS record, found {}", head.tokens[0]),
        ));
    }
    let local_source = head
        .token(1)
        .ok_or_else(|| ParseError::new(*cursor + 1, "CLASS record needs a source name"))?;
    let local_target = head.token(2);

    let mut class = match outer {
        None => ClassNode::new(local_source, local_target.map(String::from)),
        Some(outer) => ClassNode::new(
            qualify(outer.source, local_source),
            Some(qualify(outer.target, local_target.unwrap_or(local_source))),
        ),
    };
    class.aux_names = correlator.class_columns(class.source_name());
    *cursor += 1;

    let mut active: Option<MethodKey> = None;

    while *cursor < lines.len() {
        // Depth first: a blank line at this depth or shallower ends the subtree.
        if depth_of(lines[*cursor]) <= head.depth {
            break;
        }
        let line = read_line(lines, *cursor)?;

        match line.kind() {
            RecordKind::Class => {
                active = None;
                let key = line
                    .token(1)
                    .ok_or_else(|| {
                        ParseError::new(*cursor + 1, "CLASS record needs a source name")
                    })?
                    .to_string();
                let outer = Outer {
                    source: class.source_name(),
                    target: &class.target_name,
                };
                let child = build_class(lines, cursor, Some(outer), correlator)?;
                let child = match class.nested.remove(&key) {
                    Some(existing) => merge_deep(&existing, &child),
                    None => child,
                };
                class.nested.insert(key, child);
                // build_class already advanced past the child's subtree.
                continue;
            }
            RecordKind::Field => read_field(&mut class, &line, *cursor + 1, correlator)?,
            RecordKind::Method => {
                active = read_method(&mut class, &line, *cursor + 1, correlator)?;
            }
            RecordKind::Arg => read_arg(&mut class, active.as_ref(), &line, *cursor + 1)?,
            RecordKind::Other => {}
        }

        *cursor += 1;
    }

    Ok(class)
}

fn read_line<'a>(lines: &[&'a str], index: usize) -> std::result::Result<Line<'a>, ParseError> {
    classify(lines[index], index + 1)
}

fn qualify(outer: &str, local: &str) -> String {
    format!("{outer}{NESTED_SEPARATOR}{local}")
}

fn read_field(
    class: &mut ClassNode,
    line: &Line<'_>,
    line_no: usize,
    correlator: &dyn Correlator,
) -> std::result::Result<(), ParseError> {
    match line.tokens.len() {
        // FIELD <source> <descriptor>: unmapped.
        3 => Ok(()),
        n if n >= 4 => {
            let source = line.tokens[1];
            let field = FieldEntry {
                source_name: source.to_string(),
                target_name: line.tokens[2].to_string(),
                descriptor: line.tokens[3].to_string(),
                aux_names: correlator.member_columns(class.source_name(), source),
            };
            class.insert_field(field);
            Ok(())
        }
        _ => Err(ParseError::new(
            line_no,
            "FIELD record needs a source name and a descriptor",
        )),
    }
}

/// Returns the key of the stored method, which becomes the active method.
fn read_method(
    class: &mut ClassNode,
    line: &Line<'_>,
    line_no: usize,
    correlator: &dyn Correlator,
) -> std::result::Result<Option<MethodKey>, ParseError> {
    if line.tokens.len() < 3 {
        return Err(ParseError::new(
            line_no,
            "METHOD record needs a source name and a descriptor",
        ));
    }

    let source = line.tokens[1];
    let descriptor = line.tokens[line.tokens.len().min(4) - 1];

    if source == CONSTRUCTOR_NAME {
        return Ok(class.insert_method(MethodEntry::constructor(descriptor, correlator.width())));
    }
    if line.tokens.len() == 3 {
        // METHOD <source> <descriptor>: unmapped.
        return Ok(None);
    }

    let method = MethodEntry {
        source_name: source.to_string(),
        target_name: line.tokens[2].to_string(),
        descriptor: descriptor.to_string(),
        args: Default::default(),
        aux_names: correlator.member_columns(class.source_name(), source),
    };
    Ok(class.insert_method(method))
}

fn read_arg(
    class: &mut ClassNode,
    active: Option<&MethodKey>,
    line: &Line<'_>,
    line_no: usize,
) -> std::result::Result<(), ParseError> {
    let (Some(raw_index), Some(target)) = (line.token(1), line.token(2)) else {
        return Err(ParseError::new(
            line_no,
            "ARG record needs an index and a name",
        ));
    };
    let index: u32 = raw_index.parse().map_err(|_| {
        ParseError::new(line_no, format!("ARG index '{raw_index}' is not a number"))
    })?;

    let Some(method) = active.and_then(|key| class.methods.get_mut(key)) else {
        debug!(line = line_no, index, "ARG without a mapped method, skipped");
        return Ok(());
    };
    method.insert_arg(index, target);
    Ok(())
}
