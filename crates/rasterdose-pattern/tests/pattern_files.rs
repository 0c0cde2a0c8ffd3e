//! Parsing of complete pattern files

use proptest::prelude::*;
use rasterdose_core::{Axis, Directive, FormatError};
use rasterdose_pattern::{parse_pattern, PatternParser};
use std::io::Write;

const SERPENTINE: &str = "\
# Serpentine raster over a 4 x 4 mm square
<<<DATA>>>
step_size = 0.5
speed = 2.0
<<<PATTERN>>>
  --> Z: -4.0
  --> Y: -4.0
  {
    Z: 8.0
    Y: 1.0
    Z: -8.0
    Y: 1.0
  }*4
  Y: -8.0
<<<END>>>
";

#[test]
fn test_serpentine_file() {
    let pattern = parse_pattern(SERPENTINE).expect("serpentine should parse");

    assert_eq!(pattern.metadata.step_size, Some(0.5));
    assert_eq!(pattern.metadata.speed, Some(2.0));
    assert_eq!(
        pattern.metadata.offset,
        vec![Directive::z(-4.0), Directive::y(-4.0)]
    );
    assert_eq!(pattern.directives.len(), 17);
    assert_eq!(pattern.directives[16], Directive::y(-8.0));
    assert!(pattern.is_closed_loop());
}

#[test]
fn test_parse_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(SERPENTINE.as_bytes()).expect("write pattern");

    let mut parser = PatternParser::new();
    let from_disk = parser.parse_file(file.path()).expect("parse from disk");
    assert_eq!(from_disk, parse_pattern(SERPENTINE).unwrap());
}

#[test]
fn test_parse_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("nothing.pattern");

    let err = PatternParser::new().parse_file(&missing).unwrap_err();
    assert!(matches!(err, FormatError::Io { .. }));
    assert_eq!(err.line(), None);
}

#[test]
fn test_unknown_axis_survives_parsing() {
    let pattern = parse_pattern("<<<PATTERN>>>\nX: 1.0\nX: -1.0\n<<<END>>>").unwrap();
    assert_eq!(pattern.directives[0].axis, Axis::Other("X".to_string()));
    // Unknown axes do not count towards the loop check
    assert!(pattern.is_closed_loop());
}

#[test]
fn test_pattern_serializes_to_json() {
    let pattern = parse_pattern(SERPENTINE).unwrap();
    let json = serde_json::to_string(&pattern).unwrap();
    assert!(json.contains(r#""step_size":0.5"#));
    assert!(json.contains(r#""closed_loop":null"#));
}

fn directive_strategy() -> impl Strategy<Value = Directive> {
    (prop_oneof![Just(Axis::Z), Just(Axis::Y)], -50i32..50)
        .prop_map(|(axis, tenths)| Directive::new(axis, f64::from(tenths) / 10.0))
}

fn render(directives: &[Directive]) -> String {
    directives
        .iter()
        .map(|d| format!("{}: {}", d.axis, d.distance))
        .collect::<Vec<_>>()
        .join("\n")
}

proptest! {
    #[test]
    fn prop_repeat_expansion_preserves_order(
        block in prop::collection::vec(directive_strategy(), 0..6),
        count in 0usize..5,
    ) {
        let text = format!("<<<PATTERN>>>\n{{\n{}\n}}*{}\n<<<END>>>", render(&block), count);
        let pattern = parse_pattern(&text).unwrap();

        let expected: Vec<Directive> = (0..count).flat_map(|_| block.iter().cloned()).collect();
        prop_assert_eq!(pattern.directives, expected);
    }

    #[test]
    fn prop_comments_do_not_change_result(
        moves in prop::collection::vec(directive_strategy(), 1..10),
    ) {
        let plain = format!("<<<PATTERN>>>\n{}\n<<<END>>>", render(&moves));
        let commented = format!(
            "# top\n<<<PATTERN>>>\n{}\n# bottom\n<<<END>>>",
            moves
                .iter()
                .map(|d| format!("# before\n{}: {}", d.axis, d.distance))
                .collect::<Vec<_>>()
                .join("\n")
        );

        prop_assert_eq!(parse_pattern(&plain).unwrap(), parse_pattern(&commented).unwrap());
    }

    #[test]
    fn prop_error_flag_matches_rounded_sums(
        moves in prop::collection::vec(directive_strategy(), 0..12),
    ) {
        let pattern = parse_pattern(&format!("<<<PATTERN>>>\n{}\n<<<END>>>", render(&moves))).unwrap();
        let (z, y) = pattern.net_displacement();
        prop_assert_eq!(pattern.metadata.error, z.round() != 0.0 || y.round() != 0.0);
        prop_assert_eq!(pattern.metadata.error, pattern.closed_loop.is_some());
    }
}
