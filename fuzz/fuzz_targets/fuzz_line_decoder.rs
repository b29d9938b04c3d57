//! Fuzz target: `LineDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming line decoder and
//! asserts that every newline yields exactly one bounded, ASCII-only line.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use bioreactor::protocol::codec::{LineDecoder, MAX_LINE_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();

    let mut lines = 0;
    decoder.feed(data, |line| {
        assert!(line.as_str().len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
        assert!(line.as_str().is_ascii());
        assert!(!line.as_str().contains('\n'));
        lines += 1;
    });
    let newlines = data.iter().filter(|&&b| b == b'\n').count();
    assert_eq!(lines, newlines, "one line per newline");

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    assert_eq!(decoder.pending(), 0);
    decoder.feed(data, |_| {});
});
