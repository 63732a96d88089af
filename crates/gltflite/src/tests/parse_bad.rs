use rstest::rstest;

use super::{collect, collect_with};
use crate::{
    BuildError, JsonHandler, JsonKind, JsonReader, MemoryStream, ParserError, Range,
    ReaderOptions, SyntaxError, reader::Event,
};

#[rstest]
#[case(br#"{"a":1,}"#, SyntaxError::TrailingComma)]
#[case(b"[1,]", SyntaxError::TrailingComma)]
#[case(b"[1, ]", SyntaxError::TrailingComma)]
#[case(b"[,1]", SyntaxError::InvalidCharacter(','))]
#[case(br#"{"a" 1}"#, SyntaxError::ExpectedColon)]
#[case(br#"{a:1}"#, SyntaxError::InvalidCharacter('a'))]
#[case(br#"{"a":01}"#, SyntaxError::InvalidCharacter('1'))]
#[case(b"[1 2]", SyntaxError::InvalidCharacter('2'))]
#[case(b"[1.]", SyntaxError::InvalidNumber)]
#[case(b"[.5]", SyntaxError::InvalidCharacter('.'))]
#[case(b"[1e]", SyntaxError::InvalidNumber)]
#[case(b"[1e+]", SyntaxError::InvalidNumber)]
#[case(b"[-]", SyntaxError::InvalidNumber)]
#[case(b"[+1]", SyntaxError::InvalidCharacter('+'))]
#[case(b"[tru]", SyntaxError::InvalidLiteral)]
#[case(b"[nul]", SyntaxError::InvalidLiteral)]
#[case(b"[True]", SyntaxError::InvalidCharacter('T'))]
#[case(br#"["\x"]"#, SyntaxError::InvalidEscape)]
#[case(br#"["\u12G4"]"#, SyntaxError::InvalidUnicodeEscape)]
#[case(br#"["\u12"]"#, SyntaxError::InvalidUnicodeEscape)]
#[case(b"[\"a\tb\"]", SyntaxError::ControlCharacterInString(b'\t'))]
#[case(b"[\"a\nb\"]", SyntaxError::ControlCharacterInString(b'\n'))]
#[case(b"[\"\xFF\"]", SyntaxError::InvalidUtf8(0xFF))]
#[case(b"[\"\x80\"]", SyntaxError::InvalidUtf8(0x80))]
#[case(b"[\"\xC3(\"]", SyntaxError::InvalidUtf8(b'('))]
#[case(br#""abc""#, SyntaxError::RootNotContainer)]
#[case(b"42", SyntaxError::RootNotContainer)]
#[case(b"null", SyntaxError::RootNotContainer)]
#[case(br#"{"a":1"#, SyntaxError::UnexpectedEndOfInput)]
#[case(b"[", SyntaxError::UnexpectedEndOfInput)]
#[case(br#"["abc"#, SyntaxError::UnexpectedEndOfInput)]
#[case(b"{]", SyntaxError::InvalidCharacter(']'))]
#[case(b"[}", SyntaxError::InvalidCharacter('}'))]
fn rejects(#[case] input: &[u8], #[case] expected: SyntaxError) {
    let (result, collector) = collect(input);
    assert_eq!(result.unwrap_err().kind(), expected);
    assert_eq!(collector.error_count(), 1, "{:?}", collector.events);
    assert!(!collector.events.iter().any(|e| matches!(e, Event::Root(..))));
}

#[test]
fn trailing_comma_reports_once_with_position() {
    let (result, collector) = collect(br#"{"a":1,}"#);
    let error = result.unwrap_err();
    assert_eq!((error.line(), error.column()), (1, 8));
    assert_eq!(
        collector.events.last(),
        Some(&Event::Error { line: 1, column: 8 })
    );
    assert_eq!(collector.error_count(), 1);
}

#[rstest]
#[case(b"{\n  \"a\": 1,\n}")]
#[case(b"{\r\n  \"a\": 1,\r\n}")]
#[case(b"{\r  \"a\": 1,\r}")]
fn line_breaks_of_every_style(#[case] input: &[u8]) {
    let (result, _) = collect(input);
    let error = result.unwrap_err();
    assert_eq!(error.kind(), SyntaxError::TrailingComma);
    assert_eq!((error.line(), error.column()), (3, 1));
}

#[test]
fn error_offset_points_past_the_failing_byte() {
    let (result, _) = collect(b"[1, x]");
    let error = result.unwrap_err();
    assert_eq!(error.kind(), SyntaxError::InvalidCharacter('x'));
    assert_eq!(error.offset(), 5);
    assert_eq!(error.column(), 5);
}

#[test]
fn trailing_bytes_can_be_rejected() {
    let options = ReaderOptions {
        reject_trailing_bytes: true,
        ..ReaderOptions::default()
    };
    let (result, collector) = collect_with(b"{} {}", options);
    assert_eq!(result.unwrap_err().kind(), SyntaxError::TrailingBytes);
    assert_eq!(collector.error_count(), 1);
}

/// Fails on the n-th scalar value.
struct RejectNth(usize);

impl<'a> JsonHandler<MemoryStream<'a>> for RejectNth {
    fn value(
        &mut self,
        _: &mut MemoryStream<'a>,
        _: JsonKind,
        _: Range,
    ) -> Result<(), BuildError> {
        if self.0 == 0 {
            return Err(BuildError::KindMismatch);
        }
        self.0 -= 1;
        Ok(())
    }
}

#[test]
fn handler_errors_abort_the_read() {
    let mut handler = RejectNth(2);
    let result = JsonReader::new(MemoryStream::new(b"[1,2,3,4]")).read(&mut handler);
    let error: ParserError = result.unwrap_err();
    assert_eq!(error.kind(), SyntaxError::Handler(BuildError::KindMismatch));
    assert_eq!(error.offset(), 6);
    assert_eq!(handler.0, 0);
}
