//! Reader for the canonical output format.
//!
//! Turns the serializer's text back into trees, mainly so tooling and tests
//! can check what a run produced.

use mapfold_shared::{ArgEntry, ClassNode, FieldEntry, MethodEntry, MethodKey, NESTED_SEPARATOR};

use crate::ParseError;

/// One tab-separated record with its indentation.
struct Record<'a> {
    line_no: usize,
    depth: usize,
    columns: Vec<&'a str>,
}

/// Parse canonical text (header included) into its top-level classes.
pub fn read_canonical(content: &str) -> Result<Vec<ClassNode>, ParseError> {
    let mut lines = content.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| ParseError::new(1, "missing tiny header"))?;
    let header: Vec<&str> = header.split('\t').collect();
    if header.len() < 5 || header[..3] != ["tiny", "2", "0"] {
        return Err(ParseError::new(1, "expected a 'tiny 2 0' header with two namespaces"));
    }
    let aux_width = header.len() - 5;

    let records: Vec<Record<'_>> = lines
        .filter(|(_, line)| !line.is_empty())
        .map(|(i, line)| {
            let body = line.trim_start_matches('\t');
            Record {
                line_no: i + 1,
                depth: line.len() - body.len(),
                columns: body.split('\t').collect(),
            }
        })
        .collect();

    let mut classes = Vec::new();
    let mut cursor = 0;
    while cursor < records.len() {
        classes.push(read_class(&records, &mut cursor, None, aux_width)?);
    }
    Ok(classes)
}

fn read_class(
    records: &[Record<'_>],
    cursor: &mut usize,
    outer: Option<&str>,
    aux_width: usize,
) -> Result<ClassNode, ParseError> {
    let head = &records[*cursor];
    let [tag, source, target, aux @ ..] = head.columns.as_slice() else {
        return Err(ParseError::new(head.line_no, "class record needs two names"));
    };
    if *tag != "c" {
        return Err(ParseError::new(
            head.line_no,
            format!("expected a class record, found '{tag}'"),
        ));
    }
    if let Some(outer) = outer {
        if !source.starts_with(outer) {
            return Err(ParseError::new(
                head.line_no,
                format!("nested class {source} is not inside {outer}"),
            ));
        }
    }

    let mut class = ClassNode::new(*source, Some(target.to_string()));
    class.aux_names = aux_columns(aux, aux_width);
    *cursor += 1;

    let mut active: Option<MethodKey> = None;
    while *cursor < records.len() {
        let record = &records[*cursor];
        if record.depth <= head.depth {
            break;
        }

        match record.columns.as_slice() {
            ["c", ..] if record.depth == head.depth + 1 => {
                active = None;
                let child = read_class(records, cursor, Some(class.source_name()), aux_width)?;
                let prefix = format!("{}{NESTED_SEPARATOR}", class.source_name());
                let key = child
                    .source_name()
                    .strip_prefix(&prefix)
                    .unwrap_or(child.local_name())
                    .to_string();
                class.nested.insert(key, child);
                continue;
            }
            ["f", descriptor, source, target, aux @ ..] => {
                class.insert_field(FieldEntry {
                    source_name: source.to_string(),
                    target_name: target.to_string(),
                    descriptor: descriptor.to_string(),
                    aux_names: aux_columns(aux, aux_width),
                });
            }
            ["m", descriptor, source, target, aux @ ..] => {
                active = class.insert_method(MethodEntry {
                    source_name: source.to_string(),
                    target_name: target.to_string(),
                    descriptor: descriptor.to_string(),
                    args: Default::default(),
                    aux_names: aux_columns(aux, aux_width),
                });
            }
            ["p", index, _, target, ..] => {
                let index: u32 = index.parse().map_err(|_| {
                    ParseError::new(
                        record.line_no,
                        format!("parameter index '{index}' is not a number"),
                    )
                })?;
                let method = active
                    .as_ref()
                    .and_then(|key| class.methods.get_mut(key))
                    .ok_or_else(|| ParseError::new(record.line_no, "parameter outside a method"))?;
                method.args.insert(
                    index,
                    ArgEntry {
                        index,
                        target_name: target.to_string(),
                    },
                );
            }
            _ => {
                return Err(ParseError::new(record.line_no, "unrecognised record"));
            }
        }
        *cursor += 1;
    }

    Ok(class)
}

fn aux_columns(aux: &[&str], width: usize) -> Option<Vec<String>> {
    (width > 0).then(|| {
        let mut names: Vec<String> = aux.iter().take(width).map(|s| s.to_string()).collect();
        names.resize(width, String::new());
        names
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_classes_members_and_params() {
        let text = "tiny\t2\t0\tintermediary\tnamed\n\
                    c\ta\tA\n\
                    \tf\tI\tf\tg\n\
                    \tm\t()V\tm\tn\n\
                    \t\tp\t1\t\tx\n\
                    \tc\ta$b\tA$B\n\
                    c\tc\tC\n";
        let classes = read_canonical(text).unwrap();
        assert_eq!(classes.len(), 2);

        let a = &classes[0];
        assert_eq!(a.target_name, "A");
        assert_eq!(a.fields["f"].target_name, "g");
        let m = &a.methods[&MethodKey::new("m", "()V")];
        assert_eq!(m.args[&1].target_name, "x");
        assert_eq!(a.nested["b"].target_name, "A$B");
        assert_eq!(classes[1].source_name(), "c");
    }

    #[test]
    fn aux_columns_follow_header_width() {
        let text = "tiny\t2\t0\tintermediary\tnamed\tglue\tserver\tclient\n\
                    c\ta\tA\tg\t\t\n\
                    \tf\tI\tf\tg\t\t\t\n";
        let classes = read_canonical(text).unwrap();
        assert_eq!(
            classes[0].aux_names,
            Some(vec!["g".into(), String::new(), String::new()])
        );
        assert_eq!(
            classes[0].fields["f"].aux_names,
            Some(vec![String::new(); 3])
        );
    }

    #[test]
    fn rejects_bad_header_and_stray_params() {
        assert!(read_canonical("").is_err());
        assert!(read_canonical("v1\tofficial\tnamed\n").is_err());
        let stray = "tiny\t2\t0\ta\tb\nc\tx\tY\n\t\tp\t1\t\tz\n";
        assert_eq!(read_canonical(stray).unwrap_err().line, 3);
    }
}
