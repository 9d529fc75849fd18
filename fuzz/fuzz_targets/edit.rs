#![no_main]

use codec::{
    count_ticks_with_limits, edit_with_limits, extract_buttons_with_limits, CodecLimits,
    EditOptions,
};
use libfuzzer_sys::fuzz_target;
use wire::{encode_header, DemoHeader, Limits};

fuzz_target!(|data: &[u8]| {
    let wire_limits = Limits::for_testing();
    let limits = CodecLimits::for_testing();

    let protocol = if data.first().is_some_and(|b| b & 1 == 1) { 4 } else { 3 };
    let mut header = DemoHeader::new(protocol, 24);
    header.signon_length = data.get(1).map_or(0, |b| i32::from(*b));
    let mut out = bitstream::ByteWriter::new();
    encode_header(&header, &mut out);
    out.write_bytes(data);
    let bytes = out.finish();

    let from = data.get(2).map_or(0, |b| u32::from(*b));
    let to = data.get(3).map_or(0, |b| u32::from(*b));
    let options = EditOptions::unlock().with_cut(from, to);

    let _ = count_ticks_with_limits(&bytes, &wire_limits);
    let _ = extract_buttons_with_limits(&bytes, &wire_limits, &limits);

    // Successful edits must themselves parse, and a no-op edit is the identity.
    if let Ok(edited) = edit_with_limits(&bytes, &options, &wire_limits, &limits) {
        assert!(wire::decode_demo(&edited, &Limits::default()).is_ok());
    }
    if let Ok(same) = edit_with_limits(&bytes, &EditOptions::default(), &wire_limits, &limits) {
        assert_eq!(same, bytes);
    }
});
