mod parse_bad;
mod parse_good;
mod property_reader;

use crate::{EventCollector, JsonKind, JsonReader, MemoryStream, ParserError, ReaderOptions};

/// Runs the reader over `input`, recording every event.
pub(crate) fn collect(input: &[u8]) -> (Result<Option<JsonKind>, ParserError>, EventCollector) {
    collect_with(input, ReaderOptions::default())
}

pub(crate) fn collect_with(
    input: &[u8],
    options: ReaderOptions,
) -> (Result<Option<JsonKind>, ParserError>, EventCollector) {
    let mut events = EventCollector::new();
    let result = JsonReader::with_options(MemoryStream::new(input), options).read(&mut events);
    (result, events)
}

/// Number of quickcheck cases: more on CI.
pub(crate) fn quickcheck_tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}
