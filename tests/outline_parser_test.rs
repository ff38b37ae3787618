//! Integration tests for the outline parse session and tree builder.

use conceptmap::domain::scanner::ParseMode;
use conceptmap::domain::{DomainError, Orientation, OutlineParser};
use conceptmap::util::testing;

const CS10: &str = "\
name: CS10
term: Fall 2023
orientation: left to right
start date: 2023 08 23
styles:
  name: core, shape: box, style: filled, fillcolor: #3A73A5
  name: extra, shape: ellipse, style: dashed, fillcolor: #AAAAAA
end
class levels:
  First Steps: #dddddd
  Mastered: #1d4f8a
end
student levels:
  First Steps: #dddddd
  Needs Practice: #a6d1f2
  Mastered: #1d4f8a
end
nodes:
    Abstraction [core, Week1]
        Functions [core, Week2]
        Recursion [core, Week4]
    Data [extra, Week3]
        Lists [core, Week3]
end
";

fn labels_with_parents(source: &str) -> Vec<(String, Option<String>)> {
    let outline = OutlineParser::parse(source).expect("parse outline");
    outline
        .tree
        .iter()
        .map(|(_, node)| {
            let parent = node
                .parent
                .and_then(|p| outline.tree.get_node(p))
                .map(|p| p.data.label.clone());
            (node.data.label.clone(), parent)
        })
        .collect()
}

fn node_section(body: &str) -> String {
    format!("name: T\nterm: Fall 2023\nstart date: 2023 01 09\nnodes:\n{body}end\n")
}

#[test]
fn given_full_outline_when_parsing_then_collects_header_fields() {
    testing::init_test_setup();

    // Act
    let outline = OutlineParser::parse(CS10).expect("parse outline");

    // Assert
    assert_eq!(outline.name, "CS10");
    assert_eq!(outline.term, "Fall 2023");
    assert_eq!(outline.orientation, Orientation::LeftToRight);
    assert_eq!(outline.formatted_start_date(), "8/23/2023");
    assert_eq!(outline.styles.len(), 2);
    assert_eq!(outline.styles["extra"].fillcolor, "#AAAAAA");
    assert_eq!(outline.class_levels.len(), 2);
    assert_eq!(outline.student_levels.len(), 3);
    assert_eq!(outline.student_levels[1].name, "Needs Practice");
    assert_eq!(outline.student_levels[1].color, "#a6d1f2");
}

#[test]
fn given_full_outline_when_parsing_then_builds_tree_by_indentation() {
    // Act
    let nodes = labels_with_parents(CS10);

    // Assert
    let expected = vec![
        ("CS10", None),
        ("Abstraction", Some("CS10")),
        ("Functions", Some("Abstraction")),
        ("Recursion", Some("Abstraction")),
        ("Data", Some("CS10")),
        ("Lists", Some("Data")),
    ];
    let actual: Vec<(&str, Option<&str>)> = nodes
        .iter()
        .map(|(label, parent)| (label.as_str(), parent.as_deref()))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn given_full_outline_when_parsing_then_ids_are_dense_from_root() {
    // Act
    let outline = OutlineParser::parse(CS10).expect("parse outline");

    // Assert
    let ids: Vec<usize> = outline.tree.iter().map(|(_, n)| n.data.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(outline.count(), 6);
}

#[test]
fn given_two_parses_when_counting_ids_then_each_session_restarts() {
    // Act
    let first = OutlineParser::parse(CS10).expect("first parse");
    let second = OutlineParser::parse(CS10).expect("second parse");

    // Assert
    let max_id = |o: &conceptmap::domain::Outline| o.tree.iter().map(|(_, n)| n.data.id).max();
    assert_eq!(max_id(&first), Some(6));
    assert_eq!(max_id(&second), Some(6));
}

#[test]
fn given_nodes_when_parsing_then_root_week_is_maximum() {
    // Act
    let outline = OutlineParser::parse(CS10).expect("parse outline");

    // Assert
    let root = outline.tree.root().and_then(|r| outline.tree.get_node(r));
    let root = root.expect("root exists");
    assert_eq!(root.data.week, 4);
    assert_eq!(root.data.style, "root");
}

#[test]
fn given_single_level_dedent_when_parsing_then_attaches_to_grandparent() {
    // Arrange
    let source = node_section(
        "    A [core, Week1]\n        B [core, Week1]\n            C [core, Week1]\n        D [core, Week1]\n",
    );

    // Act
    let nodes = labels_with_parents(&source);

    // Assert
    let d = nodes.iter().find(|(l, _)| l == "D").expect("D parsed");
    assert_eq!(d.1.as_deref(), Some("A"));
}

#[test]
fn given_two_level_dedent_when_parsing_then_only_pops_one_level() {
    // Arrange: F is indented at depth 2 directly after a depth-4 node
    let source = node_section(
        "    A [core, Week1]\n        B [core, Week1]\n            C [core, Week1]\n                E [core, Week1]\n        F [core, Week1]\n",
    );

    // Act
    let nodes = labels_with_parents(&source);

    // Assert: lands under B (depth 3), not under A
    let f = nodes.iter().find(|(l, _)| l == "F").expect("F parsed");
    assert_eq!(f.1.as_deref(), Some("B"));
}

#[test]
fn given_indent_after_dedent_when_parsing_then_nests_under_node_moved_up_to() {
    // Arrange: D dedents from C, then E indents one level again
    let source = node_section(
        "    A [core, Week1]\n        B [core, Week1]\n            C [core, Week1]\n        D [core, Week1]\n            E [core, Week1]\n",
    );

    // Act
    let nodes = labels_with_parents(&source);

    // Assert: the cursor stayed on B after the dedent
    let d = nodes.iter().find(|(l, _)| l == "D").expect("D parsed");
    let e = nodes.iter().find(|(l, _)| l == "E").expect("E parsed");
    assert_eq!(d.1.as_deref(), Some("A"));
    assert_eq!(e.1.as_deref(), Some("B"));
}

#[test]
fn given_sibling_after_dedent_when_parsing_then_shares_parent_of_node_moved_up_to() {
    // Arrange
    let source = node_section(
        "    A [core, Week1]\n        B [core, Week1]\n            C [core, Week1]\n        D [core, Week1]\n        F [core, Week2]\n",
    );

    // Act
    let nodes = labels_with_parents(&source);

    // Assert
    let f = nodes.iter().find(|(l, _)| l == "F").expect("F parsed");
    assert_eq!(f.1.as_deref(), Some("A"));
}

#[test]
fn given_trailing_note_on_node_line_when_parsing_then_accepted() {
    // Arrange
    let source = node_section("    A [core, Week1] # revisit in week 5\n");

    // Act
    let nodes = labels_with_parents(&source);

    // Assert
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[1].0, "A");
}

#[test]
fn given_dedent_back_to_top_level_when_parsing_then_attaches_to_root() {
    // Arrange
    let source = node_section(
        "    A [core, Week1]\n        B [core, Week1]\n            C [core, Week1]\n    G [core, Week2]\n",
    );

    // Act
    let nodes = labels_with_parents(&source);

    // Assert
    let g = nodes.iter().find(|(l, _)| l == "G").expect("G parsed");
    assert_eq!(g.1.as_deref(), Some("T"));
}

#[test]
fn given_missing_week_suffix_when_parsing_then_format_error_with_line() {
    // Arrange
    let source = node_section("    Abstraction [core, Week1]\n        Broken [core]\n");

    // Act
    let result = OutlineParser::parse(&source);

    // Assert
    match result {
        Err(DomainError::Format { line, text, .. }) => {
            assert_eq!(line, 6);
            assert_eq!(text, "        Broken [core]");
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn given_nested_node_before_top_level_when_parsing_then_format_error() {
    // Arrange
    let source = node_section("        Orphan [core, Week1]\n");

    // Act
    let result = OutlineParser::parse(&source);

    // Assert
    assert!(matches!(result, Err(DomainError::Format { .. })));
}

#[test]
fn given_bad_level_line_when_parsing_then_format_error() {
    // Arrange
    let source = "class levels:\n  First Steps dddddd\nend\n";

    // Act
    let result = OutlineParser::parse(source);

    // Assert
    assert!(matches!(result, Err(DomainError::Format { line: 2, .. })));
}

#[test]
fn given_comments_outside_sections_when_parsing_then_ignored() {
    // Arrange
    let source = format!("# course outline\n\n{CS10}\ntrailing notes\n");

    // Act
    let outline = OutlineParser::parse(&source).expect("parse outline");

    // Assert
    assert_eq!(outline.count(), 6);
}

#[test]
fn given_unterminated_section_when_parsing_then_accepted() {
    // Arrange
    let mut parser = OutlineParser::new();

    // Act
    parser.parse_line(1, "nodes:").expect("header");
    parser
        .parse_line(2, "    Only [core, Week7]")
        .expect("node line");

    // Assert
    assert_eq!(parser.mode(), ParseMode::Node);
    let outline = parser.finish();
    assert_eq!(outline.count(), 2);
}

#[test]
fn given_right_to_left_orientation_when_parsing_then_recorded() {
    // Arrange
    let source = "orientation: right to left\n";

    // Act
    let outline = OutlineParser::parse(source).expect("parse outline");

    // Assert
    assert_eq!(outline.orientation, Orientation::RightToLeft);
    assert_eq!(outline.orientation.code(), "RL");
}

#[test]
fn given_impossible_start_date_when_parsing_then_format_error() {
    // Arrange
    let source = "start date: 2023 02 30\n";

    // Act
    let result = OutlineParser::parse(source);

    // Assert
    assert!(matches!(result, Err(DomainError::Format { line: 1, .. })));
}
