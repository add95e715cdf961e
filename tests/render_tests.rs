use igprof_calltree::aggregator::{build_call_tree_from_str, build_collapsed_stacks};
use igprof_calltree::render::{
    collapsed_text, generate_flamegraph, generate_text_summary, render_dot, FlamegraphConfig,
};
use igprof_calltree::utils::RenderError;
use pretty_assertions::assert_eq;

const EXAMPLE: &str = "\
P=(HEX ID=1 N=(prog) T=0.01)
C1 FN1=(F1=(a.c)+10 N=(foo))+0 V0:(5,5,5)
C2 FN2=(F1+20 N=(bar))+0 V0:(3,3,3)
C2 FN2+0 V0:(2,2,2)
";

const ENGINE: &str = "\
C1 FN1=(F1=(bin/python)+648 N=(main))+0 V0:(1,1,1)
C2 E1=python FN2=(F2=(lib/os.py)+58 N=(basename))+1f V0:(3,3,3)
";

#[test]
fn test_dot_example_graph() {
    let tree = build_call_tree_from_str(EXAMPLE).unwrap();
    let dot = render_dot(&tree);

    let expected = "\
digraph calltree {
  0 [label=\"$ prog\\n10 : 100%\", shape=doublecircle, style=filled, fillcolor=\"0.000 1.000 1.000\"];
  1 [label=\"foo @ 0\\n10 : 100%\", style=filled, fillcolor=\"0.000 1.000 1.000\"];
  0 -> 1;
  2 [label=\"bar @ 0\\n5 : 50%\", style=filled, fillcolor=\"0.250 1.000 1.000\"];
  1 -> 2;
}
";
    assert_eq!(dot, expected);
}

#[test]
fn test_dot_named_engine_uses_box_and_line() {
    let tree = build_call_tree_from_str(ENGINE).unwrap();
    let dot = render_dot(&tree);

    assert!(dot.contains("label=\"$ root\\n4 : 100%\", shape=doublecircle"));
    assert!(dot.contains("label=\"lib/os.py, line 31\\n3 : 75%\", shape=box"));
    assert!(dot.contains("fillcolor=\"0.125 1.000 1.000\""));
}

#[test]
fn test_dot_empty_tree_is_lone_root() {
    let tree = build_call_tree_from_str("").unwrap();
    let dot = render_dot(&tree);

    assert_eq!(dot.matches("label=").count(), 1);
    assert!(!dot.contains("->"));
    assert!(dot.contains("fillcolor=\"0.500 1.000 1.000\""));
}

#[test]
fn test_collapsed_text_from_tree() {
    let tree = build_call_tree_from_str(EXAMPLE).unwrap();
    let stacks = build_collapsed_stacks(&tree);

    assert_eq!(collapsed_text(&stacks), "foo@0 5\nfoo@0;bar@0 5\n");
}

#[test]
fn test_flamegraph_from_tree() {
    let tree = build_call_tree_from_str(ENGINE).unwrap();
    let stacks = build_collapsed_stacks(&tree);
    let config = FlamegraphConfig::new().with_title("Python run").with_width(800);

    let svg = generate_flamegraph(&stacks, Some(&config)).unwrap();

    assert!(svg.contains("<svg"));
    assert!(svg.contains("Python run"));
    assert!(svg.contains("lib/os.py:31"));
}

#[test]
fn test_flamegraph_rejects_tree_without_ticks() {
    let tree = build_call_tree_from_str("C1 FN1=(F1=(a.c)+0 N=(idle))+0").unwrap();
    let stacks = build_collapsed_stacks(&tree);

    assert!(matches!(
        generate_flamegraph(&stacks, None),
        Err(RenderError::EmptyTree)
    ));
}

#[test]
fn test_text_summary_from_tree() {
    let tree = build_call_tree_from_str(ENGINE).unwrap();
    let stacks = build_collapsed_stacks(&tree);
    let summary = generate_text_summary(&tree, &stacks, 10);

    assert!(summary.contains("Total ticks: 4"));
    assert!(summary.contains("main@0;lib/os.py:31"));
    assert!(!summary.contains("Showing top"));
}
