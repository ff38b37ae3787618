//! Integration tests for positional and name-keyed mastery aggregation.

use std::collections::BTreeMap;

use conceptmap::domain::mastery::{
    apply_mastery_map, assign_positional, calculate_class_level, update_node_mastery,
};
use conceptmap::domain::{
    ClassLevel, DomainError, NodeDocument, OutlineDocument, OutlineParser, RenderMode,
};
use rstest::rstest;

const LEVELS: &str = "\
class levels:
  First Steps: #dddddd
  Needs Practice: #a6d1f2
  In Progress: #6aafe6
  Almost There: #3a83c2
  Mastered: #1d4f8a
end
student levels:
  First Steps: #dddddd
  Needs Practice: #a6d1f2
  In Progress: #6aafe6
  Almost There: #3a83c2
  Mastered: #1d4f8a
end
";

const FLAT: &str = "\
nodes:
    Variables [core, Week1]
    Loops [core, Week2]
    Lists [core, Week3]
end
";

const NESTED: &str = "\
nodes:
    Abstraction [core, Week1]
        Functions [core, Week2]
        Recursion [core, Week4]
    Data [core, Week3]
        Lists [core, Week3]
end
";

fn render_document(nodes: &str) -> OutlineDocument {
    let source = format!("name: CS10\nterm: Fall 2023\nstart date: 2023 08 23\n{LEVELS}{nodes}");
    let outline = OutlineParser::parse(&source).expect("parse outline");
    OutlineDocument::from_outline(&outline, "CS10", RenderMode::Render).expect("build document")
}

fn find<'a>(root: &'a NodeDocument, name: &str) -> &'a NodeDocument {
    root.walk()
        .into_iter()
        .find(|n| n.name == name)
        .unwrap_or_else(|| panic!("node {name} not found"))
}

fn mastery(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn given_flat_leaves_when_assigning_positionally_then_root_gets_floor_mean() {
    // Arrange
    let mut doc = render_document(FLAT);

    // Act
    let (student, class) = assign_positional(&mut doc.nodes, 5, 5, "210", "").expect("assign");

    // Assert
    let levels: Vec<Option<u32>> = doc.nodes.children().iter().map(|n| n.student_level).collect();
    assert_eq!(levels, [Some(2), Some(1), Some(0)]);
    assert_eq!(student, 1);
    assert_eq!(doc.nodes.student_level, Some(1));
    assert_eq!(class, 0);
    assert_eq!(doc.nodes.class_level, Some(ClassLevel::Index(0)));
}

#[test]
fn given_nested_tree_when_assigning_positionally_then_digits_follow_traversal_order() {
    // Arrange
    let mut doc = render_document(NESTED);

    // Act
    assign_positional(&mut doc.nodes, 5, 5, "430", "12").expect("assign");

    // Assert
    assert_eq!(find(&doc.nodes, "Functions").student_level, Some(4));
    assert_eq!(find(&doc.nodes, "Recursion").student_level, Some(3));
    assert_eq!(find(&doc.nodes, "Lists").student_level, Some(0));
    assert_eq!(find(&doc.nodes, "Abstraction").student_level, Some(3));
    assert_eq!(find(&doc.nodes, "Data").student_level, Some(0));
    assert_eq!(doc.nodes.student_level, Some(1));

    assert_eq!(
        find(&doc.nodes, "Abstraction").class_level,
        Some(ClassLevel::Index(1))
    );
    assert_eq!(find(&doc.nodes, "Lists").class_level, Some(ClassLevel::Index(0)));
}

#[rstest]
#[case("9", 4)]
#[case("5", 4)]
#[case("4", 4)]
#[case("3", 3)]
fn given_digit_beyond_palette_when_assigning_then_clamps_to_last_level(
    #[case] digits: &str,
    #[case] expected: u32,
) {
    // Arrange
    let mut doc = render_document("nodes:\n    Only [core, Week1]\nend\n");

    // Act
    assign_positional(&mut doc.nodes, 5, 5, digits, "").expect("assign");

    // Assert
    assert_eq!(find(&doc.nodes, "Only").student_level, Some(expected));
}

#[test]
fn given_short_digit_string_when_assigning_then_remaining_leaves_are_zero() {
    // Arrange
    let mut doc = render_document(FLAT);

    // Act
    assign_positional(&mut doc.nodes, 5, 5, "4", "").expect("assign");

    // Assert
    assert_eq!(find(&doc.nodes, "Variables").student_level, Some(4));
    assert_eq!(find(&doc.nodes, "Loops").student_level, Some(0));
    assert_eq!(find(&doc.nodes, "Lists").student_level, Some(0));
}

#[test]
fn given_non_digit_mastery_when_assigning_then_invalid_mastery() {
    // Arrange
    let mut doc = render_document(FLAT);

    // Act
    let result = assign_positional(&mut doc.nodes, 5, 5, "2x0", "");

    // Assert
    assert!(matches!(result, Err(DomainError::InvalidMastery { .. })));
}

#[test]
fn given_mastery_map_when_applying_then_leaves_and_class_means_update() {
    // Arrange
    let mut doc = render_document(NESTED);
    let map = mastery(&[("Recursion", "mastered")]);

    // Act
    let root_mean = apply_mastery_map(&mut doc.nodes, 5, 5, &map).expect("apply");

    // Assert
    assert_eq!(find(&doc.nodes, "Recursion").student_level, Some(4));
    assert_eq!(find(&doc.nodes, "Functions").student_level, Some(0));
    assert_eq!(find(&doc.nodes, "Lists").student_level, Some(0));
    assert_eq!(
        find(&doc.nodes, "Abstraction").class_level,
        Some(ClassLevel::Mean(2.0))
    );
    assert_eq!(find(&doc.nodes, "Data").class_level, Some(ClassLevel::Mean(0.0)));
    assert_eq!(root_mean, 1.0);
}

#[test]
fn given_unknown_level_name_when_updating_then_leaf_is_first_steps() {
    // Arrange
    let mut doc = render_document(FLAT);
    let map = mastery(&[("Loops", "wizard"), ("Lists", "Almost There")]);

    // Act
    update_node_mastery(&mut doc.nodes, &map);

    // Assert
    assert_eq!(find(&doc.nodes, "Loops").student_level, Some(0));
    assert_eq!(find(&doc.nodes, "Lists").student_level, Some(3));
    assert_eq!(find(&doc.nodes, "Variables").student_level, Some(0));
    assert_eq!(doc.nodes.student_level, None);
}

#[test]
fn given_leaf_levels_when_calculating_class_level_then_returns_exact_mean() {
    // Arrange
    let mut doc = render_document(FLAT);
    update_node_mastery(&mut doc.nodes, &mastery(&[("Variables", "mastered")]));

    // Act
    let mean = calculate_class_level(&mut doc.nodes);

    // Assert
    assert!((mean - 4.0 / 3.0).abs() < 1e-12);
    assert_eq!(
        find(&doc.nodes, "Variables").class_level,
        Some(ClassLevel::Index(4))
    );
}

#[test]
fn given_mastered_document_when_serializing_then_level_fields_present() {
    // Arrange
    let mut doc = render_document(NESTED);
    apply_mastery_map(&mut doc.nodes, 5, 5, &mastery(&[("Recursion", "mastered")]))
        .expect("apply");

    // Act
    let value: serde_json::Value =
        serde_json::from_str(&doc.to_json_pretty().expect("serialize")).expect("json");

    // Assert
    let abstraction = &value["nodes"]["children"][0];
    assert_eq!(abstraction["class_level"], 2.0);
    assert_eq!(abstraction["children"][1]["student_level"], 4);
    assert_eq!(abstraction["children"][1]["class_level"], 4);
}
