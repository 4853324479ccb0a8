use lakshya_interface::{DocumentPath, Filter, FilterOp};
use serde_json::json;

fn college() -> serde_json::Value {
    json!({
        "name": "College of Engineering Pune",
        "city": "Pune",
        "fees": 85000,
        "courses": ["B.Tech", "M.Tech"],
        "ranking": {"nirf": 67}
    })
}

#[test]
fn numeric_comparisons() {
    let doc = college();
    assert!(Filter::new("fees", FilterOp::Lt, json!(100000)).matches(&doc));
    assert!(Filter::new("fees", FilterOp::Le, json!(85000)).matches(&doc));
    assert!(!Filter::new("fees", FilterOp::Gt, json!(85000)).matches(&doc));
    assert!(Filter::new("ranking.nirf", FilterOp::Ge, json!(50)).matches(&doc));
}

#[test]
fn contains_handles_arrays_and_case_insensitive_strings() {
    let doc = college();
    assert!(Filter::new("courses", FilterOp::Contains, json!("B.Tech")).matches(&doc));
    assert!(Filter::new("courses", FilterOp::Contains, json!("b.tech")).matches(&doc));
    assert!(!Filter::new("courses", FilterOp::Contains, json!("MBBS")).matches(&doc));
    assert!(Filter::new("name", FilterOp::Contains, json!("engineering")).matches(&doc));
}

#[test]
fn in_matches_any_candidate() {
    let doc = college();
    assert!(Filter::new("city", FilterOp::In, json!(["Mumbai", "Pune"])).matches(&doc));
    assert!(!Filter::new("city", FilterOp::In, json!("Pune")).matches(&doc));
}

#[test]
fn missing_field_never_matches() {
    let doc = college();
    assert!(!Filter::equals("state", "Maharashtra").matches(&doc));
    assert!(!Filter::new("state", FilterOp::Ne, json!("Kerala")).matches(&doc));
}

#[test]
fn mixed_types_do_not_order() {
    let doc = college();
    assert!(!Filter::new("fees", FilterOp::Lt, json!("cheap")).matches(&doc));
}

#[test]
fn filter_op_parses_from_snake_case() {
    assert_eq!("contains".parse::<FilterOp>().unwrap(), FilterOp::Contains);
    assert_eq!(FilterOp::Ge.to_string(), "ge");
}

#[test]
fn document_path_rejects_malformed_input() {
    assert!("colleges".parse::<DocumentPath>().is_err());
    assert!("/abc".parse::<DocumentPath>().is_err());
    assert!("a/b/c".parse::<DocumentPath>().is_err());
}
