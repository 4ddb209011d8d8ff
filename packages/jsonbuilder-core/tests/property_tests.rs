use std::collections::HashSet;

use jsonbuilder_core::locate::for_each;
use jsonbuilder_core::{
    build, import, Dragged, EditorConfig, Error, Kind, MemoryPersistence, Node, NodeId, NoopRender,
    SequentialIds, Session,
};
use proptest::prelude::*;
use serde_json::{Map, Number, Value};

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_filter_map("finite", |f| Number::from_f64(f).map(Value::Number)),
        "[a-z ]{0,6}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z0-9]{0,3}", inner), 0..4)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn document() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-z]{1,4}", json_value()), 0..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
}

fn all_ids(forest: &[Node]) -> Vec<NodeId> {
    let mut ids = Vec::new();
    for_each(forest, |node, _| ids.push(node.id));
    ids
}

fn assert_invariants(forest: &[Node]) -> Result<(), TestCaseError> {
    let ids = all_ids(forest);
    let unique: HashSet<_> = ids.iter().copied().collect();
    prop_assert_eq!(unique.len(), ids.len());
    prop_assert!(!unique.contains(&NodeId::ROOT));

    let mut shape_ok = true;
    for_each(forest, |node, parent| {
        let keyed = node.key.is_some();
        shape_ok &= match parent {
            Some(Kind::Array) => !keyed,
            _ => keyed,
        };
        shape_ok &= node.is_container() || node.children().is_empty();
    });
    prop_assert!(shape_ok);

    let root_keys: HashSet<_> = forest.iter().map(|root| root.key.as_deref()).collect();
    prop_assert_eq!(root_keys.len(), forest.len());
    Ok(())
}

#[derive(Clone, Debug)]
enum Op {
    Create(usize, usize),
    Move(usize, usize),
    Remove(usize),
    Toggle(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => (0usize..5, any::<usize>()).prop_map(|(k, t)| Op::Create(k, t)),
            3 => (any::<usize>(), any::<usize>()).prop_map(|(n, t)| Op::Move(n, t)),
            1 => any::<usize>().prop_map(Op::Remove),
            1 => any::<usize>().prop_map(Op::Toggle),
        ],
        1..40,
    )
}

/// Picks an existing id or the canvas root.
fn pick(forest: &[Node], idx: usize) -> NodeId {
    let ids = all_ids(forest);
    if idx % (ids.len() + 1) == 0 {
        NodeId::ROOT
    } else {
        ids[idx % (ids.len() + 1) - 1]
    }
}

proptest! {
    #[test]
    fn import_build_roundtrips_content_and_order(doc in document()) {
        let forest = import(&doc, &mut SequentialIds::default(), &EditorConfig::default()).unwrap();
        let rebuilt = build(&forest);
        prop_assert_eq!(
            serde_json::to_string(&rebuilt).unwrap(),
            serde_json::to_string(&doc).unwrap()
        );
        assert_invariants(&forest)?;
    }

    #[test]
    fn random_edits_keep_forest_well_formed(script in ops()) {
        let mut session = Session::with_defaults(NoopRender, MemoryPersistence::default());
        for op in script {
            match op {
                Op::Create(kind, target) => {
                    let target = pick(session.forest(), target);
                    let _ = session.drop_node(Dragged::New(Kind::ALL[kind]), target);
                }
                Op::Move(node, target) => {
                    let node = pick(session.forest(), node);
                    let target = pick(session.forest(), target);
                    let before = session.forest().to_vec();
                    let inside = session.find(node).map_or(false, |n| n.contains(target));
                    let outcome = session.drop_node(Dragged::Existing(node), target);
                    if inside {
                        // scalar targets are refused as containers before the cycle check
                        let refused = matches!(
                            outcome,
                            Err(Error::CyclicMove { .. }) | Err(Error::InvalidContainer(_))
                        );
                        prop_assert!(refused);
                        prop_assert_eq!(session.forest(), before.as_slice());
                    }
                }
                Op::Remove(node) => {
                    let node = pick(session.forest(), node);
                    session.remove(node);
                }
                Op::Toggle(node) => {
                    let node = pick(session.forest(), node);
                    session.toggle_collapse(node);
                }
            }
            assert_invariants(session.forest())?;
        }
    }
}
