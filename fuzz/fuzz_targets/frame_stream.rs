#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{decode_demo, text_field, DemoHeader, Limits, HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();

    // Raw bytes mostly fail at the magic, so also splice them behind a valid
    // header to reach the frame parser.
    let _ = decode_demo(data, &limits);

    let protocol = if data.first().is_some_and(|b| b & 1 == 1) { 4 } else { 3 };
    let mut header = DemoHeader::new(protocol, 24);
    header.map_name = text_field("fuzz");
    header.signon_length = data.get(1).map_or(0, |b| i32::from(*b));
    let mut out = bitstream::ByteWriter::with_capacity(HEADER_SIZE + data.len());
    wire::encode_header(&header, &mut out);
    out.write_bytes(data);
    let bytes = out.finish();

    if let Ok(demo) = decode_demo(&bytes, &limits) {
        for frame in &demo.frames {
            assert!(frame.span().end() <= bytes.len());
        }
        for frame in demo.signon_frames(&limits).flatten() {
            assert!(frame.span().end() <= HEADER_SIZE + demo.signon.len);
        }
    }
});
