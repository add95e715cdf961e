use igprof_calltree::aggregator::{
    build_call_tree_from_str, build_collapsed_stacks, calculate_hot_paths, calculate_tree_stats,
    CallIdentity, CallTreeNode, EngineTag, TreeBuilder,
};
use igprof_calltree::utils::{ReferenceKind, TreeError};
use pretty_assertions::assert_eq;

const EXAMPLE: &str = "\
P=(HEX ID=1 N=(prog) T=0.01)
C1 FN1=(F1=(a.c)+10 N=(foo))+0 V0:(5,5,5)
C2 FN2=(F1+20 N=(bar))+0 V0:(3,3,3)
C2 FN2+0 V0:(2,2,2)
";

const MIXED: &str = "\
P=(HEX ID=2 N=(python) T=0.008)
C1 FN1=(F1=(bin/python)+648 N=(main))+0 V0=(PERF_TICKS):(1,1,1)
C2 FN2=(F1+700 N=(eval))+10 V0:(2,2,2)
C3 E1=python FN3=(F2=(lib/os.py)+58 N=(basename))+a V0:(4,4,4)
C3 E1 FN3+b V0:(1,1,1)
C2 FN4=(F1+900 N=(@?0x804c533))+3 V0:(6,6,6)
C1 FN1+0 V0:(2,2,2)
C2 FN2+10 V0:(3,3,3)
";

fn sum_self_counts(tree: &CallTreeNode) -> u64 {
    tree.walk().map(|(_, node)| node.self_count()).sum()
}

fn assert_inclusive_counts(tree: &CallTreeNode) {
    for (_, node) in tree.walk() {
        let below: u64 = node.children().iter().map(CallTreeNode::count).sum();
        assert_eq!(node.count(), node.self_count() + below);
    }
}

#[test]
fn test_example_counts() {
    let tree = build_call_tree_from_str(EXAMPLE).unwrap();
    let foo = tree.child_named("foo").unwrap();
    let bar = foo.child_named("bar").unwrap();

    assert_eq!((tree.count(), foo.count(), bar.count()), (10, 10, 5));
}

#[test]
fn test_cost_is_conserved() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    assert_eq!(tree.count(), 19);
    assert_eq!(sum_self_counts(&tree), 19);
    assert_inclusive_counts(&tree);
}

#[test]
fn test_repeated_path_merges_into_one_branch() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    assert_eq!(tree.children().len(), 1);

    let main = tree.child_named("main").unwrap();
    assert_eq!(main.self_count(), 3);

    let eval = main.child(&CallIdentity {
        file: "bin/python".to_string(),
        function: "eval".to_string(),
        offset: "10".to_string(),
    });
    let eval = eval.unwrap();
    assert_eq!(eval.self_count(), 5);
    assert_eq!(eval.count(), 10);

    let engines: Vec<&EngineTag> = eval.children().iter().map(CallTreeNode::engine).collect();
    assert_eq!(
        engines,
        vec![
            &EngineTag::NamedEngine("python".to_string()),
            &EngineTag::NamedEngine("python".to_string())
        ]
    );
}

#[test]
fn test_siblings_have_distinct_identities() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    for (_, node) in tree.walk() {
        let mut seen = std::collections::HashSet::new();
        for child in node.children() {
            assert!(seen.insert(child.identity().cloned()));
        }
    }
}

#[test]
fn test_anonymous_function_identity() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    let main = tree.child_named("main").unwrap();
    assert!(main.child_named("@?0x804c533").is_some());
}

#[test]
fn test_unknown_engine_reference() {
    let trace = "C1 E4 FN1=(F1=(a.c)+0 N=(f))+0";
    match build_call_tree_from_str(trace) {
        Err(TreeError::UnknownReference { line_number, source }) => {
            assert_eq!(line_number, 1);
            assert_eq!(source.kind, ReferenceKind::Engine);
            assert_eq!(source.id, 4);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_unknown_file_reference() {
    let trace = "C1 FN1=(F2+0 N=(f))+0";
    match build_call_tree_from_str(trace) {
        Err(TreeError::UnknownReference { source, .. }) => {
            assert_eq!(source.kind, ReferenceKind::File);
            assert_eq!(source.id, 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_incremental_builder_matches_batch() {
    let mut builder = TreeBuilder::new();
    for line in MIXED.lines() {
        builder.feed_line(line).unwrap();
    }
    assert_eq!(builder.line_number(), 8);
    assert_eq!(builder.tables().engine_of(1), Some("python"));
    assert_eq!(builder.tables().file_of(2), Some("lib/os.py"));

    let tree = builder.finish();
    assert_eq!(tree, build_call_tree_from_str(MIXED).unwrap());
}

#[test]
fn test_tree_stats() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    let stats = calculate_tree_stats(&tree);

    assert_eq!(stats.node_count, 5);
    assert_eq!(stats.leaf_count, 3);
    assert_eq!(stats.max_depth, 3);
    assert_eq!(stats.ticks_by_engine.get("native"), Some(&14));
    assert_eq!(stats.ticks_by_engine.get("python"), Some(&5));
}

#[test]
fn test_hot_paths_from_tree() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    let stacks = build_collapsed_stacks(&tree);
    let hot_paths = calculate_hot_paths(&stacks, tree.count(), 2);

    assert_eq!(hot_paths.len(), 2);
    assert_eq!(hot_paths[0].stack, "main@0;@?0x804c533@3");
    assert_eq!(hot_paths[0].ticks, 6);
    assert_eq!(hot_paths[1].stack, "main@0;eval@10");
    assert_eq!(hot_paths[1].ticks, 5);
}

#[test]
fn test_collapsed_stacks_use_line_numbers_for_engines() {
    let tree = build_call_tree_from_str(MIXED).unwrap();
    let stacks = build_collapsed_stacks(&tree);
    let lines: Vec<String> = stacks.iter().map(|s| s.to_line()).collect();

    assert!(lines.contains(&"main@0;eval@10;lib/os.py:10 4".to_string()));
    assert!(lines.contains(&"main@0;eval@10;lib/os.py:11 1".to_string()));
    let total: u64 = stacks.iter().map(|s| s.weight).sum();
    assert_eq!(total, tree.count());
}

#[test]
fn test_deep_trace_builds_and_drops() {
    let depth = 20_000u64;
    let mut trace = String::from("C1 FN1=(F1=(a.c)+0 N=(f))+0\n");
    for call in 2..depth {
        trace.push_str(&format!("C{:x} FN1+0\n", call));
    }
    trace.push_str(&format!("C{:x} FN1+0 V0:(1,1,1)\n", depth));

    let tree = build_call_tree_from_str(&trace).unwrap();
    assert_eq!(tree.count(), 1);
    assert_eq!(tree.max_depth(), depth as usize);

    let copy = tree.clone();
    assert!(copy == tree);
    assert_eq!(calculate_tree_stats(&copy).leaf_count, 1);

    drop(copy);
    drop(tree);
}
