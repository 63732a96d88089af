#![no_main]

use arbitrary::Arbitrary;
use gltflite::{
    DocumentBuilder, EventCollector, JsonReader, MemoryStream, ReaderOptions, load_from_slice,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    max_depth: u8,
    reject_trailing_bytes: bool,
    text: Vec<u8>,
}

fn reader(input: &Input) {
    let options = ReaderOptions {
        max_depth: usize::from(input.max_depth).max(1),
        reject_trailing_bytes: input.reject_trailing_bytes,
    };

    let mut events = EventCollector::default();
    let result = JsonReader::with_options(MemoryStream::new(&input.text), options).read(&mut events);
    assert_eq!(
        events.error_count(),
        usize::from(result.is_err()),
        "errors must be reported exactly once: {:?}",
        events.events
    );

    let mut builder = DocumentBuilder::new();
    let built = JsonReader::with_options(MemoryStream::new(&input.text), options).read(&mut builder);
    assert_eq!(built.is_ok(), result.is_ok());
    if let Ok(Some(kind)) = built {
        let root = builder.document().root().expect("successful read leaves a root");
        assert_eq!(root.kind(), kind);
    }

    let _ = load_from_slice(&input.text, options);
}

fuzz_target!(|input: Input| reader(&input));
