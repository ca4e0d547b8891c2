use std::collections::BTreeMap;

use mapfold_shared::{AppConfig, ClassNode, FieldEntry, MethodEntry};
use mapfold_tree::{Layout, merge, merge_deep, read_canonical, render};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn descriptor() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("I".to_string()),
        Just("J".to_string()),
        Just("()V".to_string()),
        Just("(I)Z".to_string()),
        Just("(Ljava/lang/String;)V".to_string()),
    ]
}

fn method() -> impl Strategy<Value = MethodEntry> {
    (
        name(),
        descriptor(),
        prop::collection::vec((0u32..12, name()), 0..5),
    )
        .prop_map(|(source, descriptor, args)| {
            let mut m = MethodEntry {
                target_name: format!("named_{source}"),
                source_name: source,
                descriptor,
                args: BTreeMap::new(),
                aux_names: None,
            };
            for (index, target) in args {
                m.insert_arg(index, target);
            }
            m
        })
}

/// A class with at least one rename, so it is never elided.
fn class(source: String, depth: u32) -> BoxedStrategy<ClassNode> {
    let members = (
        prop::collection::vec((name(), descriptor()), 0..5),
        prop::collection::vec(method(), 0..5),
    );
    let leaf = members.prop_map(move |(fields, methods)| {
        let mut class = ClassNode::new(source.clone(), Some(format!("{source}_named")));
        for (field, descriptor) in fields {
            class.insert_field(FieldEntry {
                target_name: format!("named_{field}"),
                source_name: field,
                descriptor,
                aux_names: None,
            });
        }
        for m in methods {
            class.insert_method(m);
        }
        class
    });

    if depth == 0 {
        return leaf.boxed();
    }
    (leaf, prop::collection::vec(name(), 0..3))
        .prop_flat_map(move |(parent, locals)| {
            let children: Vec<_> = locals
                .into_iter()
                .map(|local| {
                    let qualified = format!("{}${local}", parent.source_name());
                    class(qualified, depth - 1).prop_map(move |c| (local.clone(), c))
                })
                .collect();
            (Just(parent), children)
        })
        .prop_map(|(mut parent, children)| {
            for (local, child) in children {
                parent.nested.insert(local, child);
            }
            parent
        })
        .boxed()
}

fn tree() -> impl Strategy<Value = ClassNode> {
    name().prop_flat_map(|root| class(format!("pkg/{root}"), 2))
}

proptest! {
    #[test]
    fn merge_with_itself_is_identity(t in tree()) {
        prop_assert_eq!(&merge(&t, &t), &t);
        prop_assert_eq!(&merge_deep(&t, &t), &t);
    }

    #[test]
    fn rendered_tree_reads_back_equal(t in tree()) {
        let layout = Layout::from_config(&AppConfig::default(), false);
        let text = render([&t], &layout);
        let read = read_canonical(&text).expect("canonical output parses");
        prop_assert_eq!(read.len(), 1);
        prop_assert_eq!(&read[0], &t);
    }

    #[test]
    fn params_render_in_ascending_order(t in tree()) {
        let layout = Layout::from_config(&AppConfig::default(), false);
        let text = render([&t], &layout);
        let mut last: Option<u32> = None;
        for line in text.lines() {
            let cols: Vec<&str> = line.trim_start_matches('\t').split('\t').collect();
            match cols[0] {
                "p" => {
                    let index: u32 = cols[1].parse().unwrap();
                    if let Some(prev) = last {
                        prop_assert!(prev < index, "{} rendered after {}", index, prev);
                    }
                    last = Some(index);
                }
                _ => last = None,
            }
        }
    }

    #[test]
    fn one_sided_rename_survives_either_order(t in tree()) {
        let plain = ClassNode::new(t.source_name(), None);
        prop_assert_eq!(&merge(&plain, &t).target_name, &t.target_name);
        prop_assert_eq!(&merge(&t, &plain).target_name, &t.target_name);
    }
}
