use alloc::{vec, vec::Vec};

use rstest::rstest;

use super::{collect, collect_with};
use crate::{
    Event, JsonKind, MemoryStream, Range, ReaderOptions, SyntaxError,
    reader::Event::{Begin, BeginArray, BeginObject, End, EndArray, EndObject, KeyValue, Root, Value},
};

fn kinds(events: &[Event]) -> Vec<JsonKind> {
    events
        .iter()
        .filter_map(|e| match e {
            Value(kind, _) | KeyValue(_, kind, _) => Some(*kind),
            _ => None,
        })
        .collect()
}

#[test]
fn empty_object_is_one_root() {
    let (result, collector) = collect(b"{}");
    assert_eq!(result, Ok(Some(JsonKind::Object)));
    assert_eq!(
        collector.events,
        [
            Begin,
            BeginObject,
            EndObject(Range::new(0, 2)),
            Root(JsonKind::Object, Range::new(0, 2)),
            End,
        ]
    );
}

#[rstest]
#[case(b"")]
#[case(b"   ")]
#[case(b"\r\n\t \n")]
fn whitespace_only_reads_nothing(#[case] input: &[u8]) {
    let (result, collector) = collect(input);
    assert_eq!(result, Ok(None));
    assert_eq!(collector.events, [Begin]);
}

#[test]
fn children_close_before_their_parent_claims_them() {
    let (result, collector) = collect(br#"{"a":[1]}"#);
    assert!(result.is_ok());
    assert_eq!(
        collector.events,
        [
            Begin,
            BeginObject,
            BeginArray,
            Value(JsonKind::Integer, Range::new(6, 1)),
            EndArray(Range::new(5, 3)),
            KeyValue(Range::new(2, 1), JsonKind::Array, Range::new(5, 3)),
            EndObject(Range::new(0, 9)),
            Root(JsonKind::Object, Range::new(0, 9)),
            End,
        ]
    );
}

#[rstest]
#[case(b"[0]", JsonKind::Integer)]
#[case(b"[-12]", JsonKind::Integer)]
#[case(b"[1.5]", JsonKind::Float)]
#[case(b"[2e3]", JsonKind::Float)]
#[case(b"[-0.0E-1]", JsonKind::Float)]
#[case(b"[1E+2]", JsonKind::Float)]
#[case(b"[true]", JsonKind::True)]
#[case(b"[false]", JsonKind::False)]
#[case(b"[null]", JsonKind::Null)]
#[case(br#"["s"]"#, JsonKind::String)]
#[case(b"[{}]", JsonKind::Object)]
#[case(b"[[]]", JsonKind::Array)]
fn scalar_kinds(#[case] input: &[u8], #[case] kind: JsonKind) {
    let (result, collector) = collect(input);
    assert_eq!(result, Ok(Some(JsonKind::Array)));
    assert_eq!(kinds(&collector.events), [kind]);
}

#[test]
fn string_ranges_exclude_quotes() {
    let input = br#"{ "name" : "box" }"#;
    let (_, collector) = collect(input);
    let Some(KeyValue(key, JsonKind::String, value)) = collector
        .events
        .iter()
        .find(|e| matches!(e, KeyValue(..)))
        .copied()
    else {
        panic!("no member in {:?}", collector.events);
    };
    let mut stream = MemoryStream::new(input);
    assert_eq!(key.view(&mut stream).to_vec().unwrap(), b"name");
    assert_eq!(value.view(&mut stream).to_vec().unwrap(), b"box");
}

#[test]
fn whitespace_between_every_token() {
    let input = b" \t{ \"a\" :\r\n[ 1 , 2 ]\n, \"b\" : { } } \n";
    let (result, collector) = collect(input);
    assert_eq!(result, Ok(Some(JsonKind::Object)));
    assert_eq!(
        kinds(&collector.events),
        [
            JsonKind::Integer,
            JsonKind::Integer,
            JsonKind::Array,
            JsonKind::Object
        ]
    );
}

#[test]
fn lone_surrogate_escape_is_accepted() {
    let (result, collector) = collect(br#"["\uD83D"]"#);
    assert_eq!(result, Ok(Some(JsonKind::Array)));
    assert_eq!(collector.error_count(), 0);
}

#[rstest]
#[case(&[0xC3, 0xA9])]
#[case(&[0xE2, 0x82, 0xAC])]
#[case(&[0xF0, 0x9F, 0x98, 0x80])]
#[case(&[0xF8, 0x88, 0x80, 0x80, 0x80])]
#[case(&[0xFC, 0x84, 0x80, 0x80, 0x80, 0x80])]
fn utf8_sequences_by_lead_byte(#[case] sequence: &[u8]) {
    let mut input = b"[\"".to_vec();
    input.extend_from_slice(sequence);
    input.extend_from_slice(b"\"]");
    let (result, _) = collect(&input);
    assert_eq!(result, Ok(Some(JsonKind::Array)));
}

#[rstest]
#[case(br#"["\"\\\/\b\f\n\r\t"]"#)]
#[case(br#"["\u0041\uFFFF\uD83D\uDE00"]"#)]
fn every_escape_is_recognized(#[case] input: &[u8]) {
    let (result, _) = collect(input);
    assert_eq!(result, Ok(Some(JsonKind::Array)));
}

#[test]
fn depth_limit_counts_the_root() {
    let options = ReaderOptions {
        max_depth: 3,
        ..ReaderOptions::default()
    };
    let (result, _) = collect_with(b"[[[1]]]", options);
    assert_eq!(result, Ok(Some(JsonKind::Array)));

    let (result, collector) = collect_with(b"[[[[1]]]]", options);
    assert_eq!(result.unwrap_err().kind(), SyntaxError::DepthLimitExceeded(3));
    assert_eq!(collector.error_count(), 1);
}

#[test]
fn default_depth_limit_stops_runaway_nesting() {
    let mut input = vec![b'['; 10_000];
    input.extend(vec![b']'; 10_000]);
    let (result, _) = collect(&input);
    assert_eq!(
        result.unwrap_err().kind(),
        SyntaxError::DepthLimitExceeded(crate::DEFAULT_MAX_DEPTH)
    );
}

#[test]
fn trailing_bytes_are_tolerated_by_default() {
    let (result, collector) = collect(b"{} trailing");
    assert_eq!(result, Ok(Some(JsonKind::Object)));
    assert!(matches!(collector.events.last(), Some(End)));
}

#[test]
fn trailing_whitespace_is_never_trailing_bytes() {
    let options = ReaderOptions {
        reject_trailing_bytes: true,
        ..ReaderOptions::default()
    };
    let (result, _) = collect_with(b"[1]\r\n  ", options);
    assert_eq!(result, Ok(Some(JsonKind::Array)));
}
