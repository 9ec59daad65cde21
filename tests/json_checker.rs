//! The JSON_checker corpus, parsed straight from disk.

use jsonlite::{dump, parse, parse_file, ParseErrorKind, Value};
use std::path::PathBuf;
use test_case::test_case;

fn corpus(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("json-checker")
        .join(name)
}

#[test_case("fail2.json", ParseErrorKind::Incomplete)]
#[test_case("fail3.json", ParseErrorKind::InvalidObject)]
#[test_case("fail4.json", ParseErrorKind::InvalidArray)]
#[test_case("fail5.json", ParseErrorKind::InvalidArray)]
#[test_case("fail6.json", ParseErrorKind::InvalidArray)]
#[test_case("fail7.json", ParseErrorKind::Extra)]
#[test_case("fail8.json", ParseErrorKind::Extra)]
#[test_case("fail9.json", ParseErrorKind::InvalidObject)]
#[test_case("fail10.json", ParseErrorKind::Extra)]
#[test_case("fail11.json", ParseErrorKind::InvalidObject)]
#[test_case("fail12.json", ParseErrorKind::InvalidValueType)]
#[test_case("fail13.json", ParseErrorKind::InvalidNumber)]
#[test_case("fail14.json", ParseErrorKind::InvalidObject)]
#[test_case("fail15.json", ParseErrorKind::InvalidEscape)]
#[test_case("fail16.json", ParseErrorKind::InvalidValueType)]
#[test_case("fail17.json", ParseErrorKind::InvalidEscape)]
#[test_case("fail19.json", ParseErrorKind::InvalidObject)]
#[test_case("fail20.json", ParseErrorKind::InvalidValueType)]
#[test_case("fail21.json", ParseErrorKind::InvalidObject)]
#[test_case("fail22.json", ParseErrorKind::InvalidArray)]
#[test_case("fail23.json", ParseErrorKind::InvalidConstant)]
#[test_case("fail24.json", ParseErrorKind::InvalidValueType)]
#[test_case("fail25.json", ParseErrorKind::ControlCharacter)]
#[test_case("fail26.json", ParseErrorKind::InvalidEscape)]
#[test_case("fail27.json", ParseErrorKind::ControlCharacter)]
#[test_case("fail28.json", ParseErrorKind::InvalidEscape)]
#[test_case("fail29.json", ParseErrorKind::InvalidNumber)]
#[test_case("fail30.json", ParseErrorKind::InvalidNumber)]
#[test_case("fail31.json", ParseErrorKind::InvalidNumber)]
#[test_case("fail32.json", ParseErrorKind::Incomplete)]
#[test_case("fail33.json", ParseErrorKind::InvalidArray)]
fn rejects(name: &str, kind: ParseErrorKind) {
    let err = parse_file(corpus(name)).unwrap_err();
    assert_eq!(err.kind(), kind, "{}: {}", name, err);
}

// Any value may be the top-level value, and nesting is only limited by
// `ParseOptions::max_depth`, so these two "failures" are accepted.
#[test_case("fail1.json")]
#[test_case("fail18.json")]
#[test_case("pass1.json")]
#[test_case("pass2.json")]
#[test_case("pass3.json")]
fn accepts(name: &str) {
    if let Err(e) = parse_file(corpus(name)) {
        panic!("{}: {}", name, e);
    }
}

#[test]
fn pass1_contents() {
    let v = parse_file(corpus("pass1.json")).unwrap();
    assert_eq!(v.len(), 20);
    assert_eq!(v[0], Value::from("JSON Test Pattern pass1"));
    assert_eq!(v[4].as_number(), -42.0);
    let obj = &v[8];
    assert_eq!(obj["integer"].as_number(), 1234567890.0);
    assert_eq!(obj["E"].as_number(), 1.23456789e34);
    assert_eq!(obj[""].as_number(), 23456789012e66);
    assert_eq!(obj["controls"].as_str(), Some("\u{8}\u{c}\n\r\t"));
    assert_eq!(obj["slash"].as_str(), Some("/ & /"));
    assert_eq!(
        obj["hex"].as_str(),
        Some("\u{123}\u{4567}\u{89AB}\u{CDEF}\u{abcd}\u{ef4A}")
    );
    assert_eq!(obj[" s p a c e d "], Value::from([1, 2, 3, 4, 5, 6, 7]));
    assert_eq!(obj["compact"], obj[" s p a c e d "]);
    let inner = parse(obj["jsontext"].as_str().unwrap()).unwrap();
    assert_eq!(inner, v[1]);
    assert_eq!(v[19], Value::from("rosebud"));
}

#[test]
fn pass1_survives_dump() {
    let v = parse_file(corpus("pass1.json")).unwrap();
    for indent in 0..=8 {
        let text = dump(&v, indent).unwrap();
        assert_eq!(parse(&text).unwrap(), v, "indent {}", indent);
    }
}
