use alloc::{string::String, vec, vec::Vec};

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use serde_json::{Map, Value};

use super::{collect, quickcheck_tests};
use crate::{
    AnyValue, Document, DocumentBuilder, JsonReader, Key, MemoryStream, code_for_ignore_case,
};

/// A JSON document with a container at the root.
#[derive(Clone, Debug)]
struct Doc(Value);

fn key(g: &mut Gen) -> String {
    if bool::arbitrary(g) {
        let name = *g.choose(Key::NAMES).unwrap_or(&"NAME");
        name.chars()
            .map(|c| {
                if bool::arbitrary(g) {
                    c.to_ascii_lowercase()
                } else {
                    c
                }
            })
            .collect()
    } else {
        String::arbitrary(g)
    }
}

fn value(g: &mut Gen, depth: usize) -> Value {
    let choices = if depth == 0 { 5 } else { 7 };
    match u8::arbitrary(g) % choices {
        0 => Value::Null,
        1 => Value::Bool(bool::arbitrary(g)),
        2 => Value::from(i64::arbitrary(g)),
        3 => {
            let f = f64::arbitrary(g);
            Value::from(if f.is_finite() { f } else { 0.5 })
        }
        4 => Value::String(String::arbitrary(g)),
        5 => {
            let n = usize::arbitrary(g) % 6;
            Value::Array((0..n).map(|_| value(g, depth - 1)).collect())
        }
        _ => {
            let n = usize::arbitrary(g) % 6;
            let map: Map<String, Value> = (0..n).map(|_| (key(g), value(g, depth - 1))).collect();
            Value::Object(map)
        }
    }
}

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        match value(g, 4) {
            root @ (Value::Array(_) | Value::Object(_)) => Doc(root),
            scalar => Doc(Value::Array(vec![scalar])),
        }
    }
}

#[allow(clippy::float_cmp)]
fn same(doc: &Document, ours: AnyValue, theirs: &Value) -> bool {
    match (ours, theirs) {
        (AnyValue::Null, Value::Null)
        | (AnyValue::True, Value::Bool(true))
        | (AnyValue::False, Value::Bool(false)) => true,
        (AnyValue::Integer(i), Value::Number(n)) => n.as_i64() == Some(i),
        (AnyValue::Float(f), Value::Number(n)) => n.as_f64() == Some(f),
        (AnyValue::String(_), Value::String(s)) => doc.as_str(ours) == Some(s.as_str()),
        (AnyValue::Array(_), Value::Array(items)) => {
            ours.count() == items.len()
                && doc
                    .elements(ours)
                    .zip(items)
                    .all(|(a, b)| same(doc, a, b))
        }
        (AnyValue::Object(_), Value::Object(map)) => {
            let members = doc.members(ours);
            members.len() == map.len()
                && members.iter().zip(map).all(|(m, (k, v))| {
                    m.key == code_for_ignore_case(k.as_bytes()) && same(doc, m.value, v)
                })
        }
        _ => false,
    }
}

/// Property: the built tree matches what `serde_json` serialized, value for
/// value, with object keys reduced to their interned codes.
#[test]
fn builder_agrees_with_serde_json() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc, pretty: bool) -> bool {
        let text = if pretty {
            serde_json::to_string_pretty(&doc.0)
        } else {
            serde_json::to_string(&doc.0)
        }
        .unwrap();
        let mut builder = DocumentBuilder::new();
        if JsonReader::new(MemoryStream::new(text.as_bytes()))
            .read(&mut builder)
            .is_err()
        {
            return false;
        }
        let built = builder.document();
        built.root().is_some_and(|root| same(built, root, &doc.0))
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Doc, bool) -> bool);
}

/// Property: every strict prefix of a document fails with exactly one error,
/// except the empty one.
#[test]
fn truncated_documents_fail_once() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc, cut: usize) -> TestResult {
        let text = serde_json::to_string(&doc.0).unwrap();
        if text.len() < 2 {
            return TestResult::discard();
        }
        let cut = 1 + cut % (text.len() - 1);
        let (result, collector) = collect(&text.as_bytes()[..cut]);
        TestResult::from_bool(result.is_err() && collector.error_count() == 1)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Doc, usize) -> TestResult);
}

/// Property: arbitrary bytes never panic, and an error is reported through
/// the handler exactly when `read` fails.
#[test]
fn arbitrary_bytes_report_at_most_once() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(bytes: Vec<u8>, prefix: bool) -> bool {
        let mut input = if prefix { b"{\"a\":[".to_vec() } else { Vec::new() };
        input.extend_from_slice(&bytes);
        let (result, collector) = collect(&input);
        let errors = collector.error_count();
        match result {
            Ok(_) => errors == 0,
            Err(_) => errors == 1,
        }
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<u8>, bool) -> bool);
}

#[test]
fn oracle_helper_sees_mismatches() {
    let mut builder = DocumentBuilder::new();
    JsonReader::new(MemoryStream::new(b"[1,\"x\"]"))
        .read(&mut builder)
        .unwrap();
    let doc = builder.document();
    let root = doc.root().unwrap();
    assert!(same(doc, root, &serde_json::json!([1, "x"])));
    assert!(!same(doc, root, &serde_json::json!([1, "y"])));
    assert!(!same(doc, root, &serde_json::json!([1.5, "x"])));
    assert!(!same(doc, root, &serde_json::json!({ "a": 1 })));
}
