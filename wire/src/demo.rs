//! Whole-demo decoding: header, signon section, frame stream and trailer.

use crate::error::WireResult;
use crate::frame::{FrameDescriptor, FrameLayout, FrameStream, Span};
use crate::header::{decode_header, DemoHeader, HEADER_SIZE};
use crate::limits::Limits;
use crate::types::DemoTick;

/// A decoded demo whose frames are views into the source buffer.
#[derive(Debug, Clone)]
pub struct RawDemo<'a> {
    pub header: DemoHeader,
    pub layout: FrameLayout,
    /// Signon bytes directly after the header.
    pub signon: Span,
    /// Frames after the signon section, up to and including Stop.
    pub frames: Vec<FrameDescriptor>,
    /// Bytes after the Stop frame.
    pub trailer: Span,
    buf: &'a [u8],
}

impl<'a> RawDemo<'a> {
    /// The buffer this demo was decoded from.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Highest tick in the frame stream, or zero if it is empty.
    #[must_use]
    pub fn max_tick(&self) -> DemoTick {
        self.frames
            .iter()
            .map(|frame| frame.tick)
            .max()
            .unwrap_or_default()
    }

    /// Returns `true` if the stream ended with a Stop frame.
    #[must_use]
    pub fn has_stop(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.kind == crate::FrameKind::Stop)
    }

    /// Walks the frames of the signon section.
    #[must_use]
    pub fn signon_frames(&self, limits: &Limits) -> FrameStream<'a> {
        FrameStream::new(self.buf, self.signon, self.layout, limits)
    }
}

/// Decodes the header and returns a lazy stream over the post-signon frames.
pub fn frame_stream<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<(DemoHeader, FrameStream<'a>)> {
    let header = decode_header(buf)?;
    let layout = FrameLayout::for_protocol(header.demo_protocol)?;
    let start = HEADER_SIZE + header.signon_len();
    let stream = FrameStream::new(buf, Span::new(start, buf.len() - start), layout, limits);
    Ok((header, stream))
}

/// Decodes a complete demo into header, signon span, frames and trailer.
pub fn decode_demo<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<RawDemo<'a>> {
    let (header, mut stream) = frame_stream(buf, limits)?;
    let layout = stream.layout();

    let mut frames = Vec::new();
    for frame in stream.by_ref() {
        frames.push(frame?);
    }
    let trailer_start = stream.position();

    Ok(RawDemo {
        header,
        layout,
        signon: Span::new(HEADER_SIZE, header.signon_len()),
        frames,
        trailer: Span::new(trailer_start, buf.len() - trailer_start),
        buf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{write_frame, write_payload, FrameKind};
    use crate::header::{encode_header, text_field};
    use crate::DecodeError;
    use bitstream::ByteWriter;

    fn build(protocol: i32, signon: &[u8], frames: &[(FrameKind, u32)], trailer: &[u8]) -> Vec<u8> {
        let layout = FrameLayout::for_protocol(protocol).unwrap();
        let mut header = DemoHeader::new(protocol, 24);
        header.map_name = text_field("ctf_2fort");
        header.signon_length = i32::try_from(signon.len()).unwrap();

        let mut out = ByteWriter::new();
        encode_header(&header, &mut out);
        out.write_bytes(signon);
        for &(kind, tick) in frames {
            let mut body = ByteWriter::new();
            if kind == FrameKind::ConsoleCmd {
                write_payload(&mut body, b"status\0").unwrap();
            }
            write_frame(&mut out, layout, kind, DemoTick::new(tick), None, &body.finish()).unwrap();
        }
        out.write_bytes(trailer);
        out.finish()
    }

    #[test]
    fn decode_splits_sections() {
        let bytes = build(
            3,
            &[3, 0, 0, 0, 0],
            &[
                (FrameKind::SyncTick, 0),
                (FrameKind::ConsoleCmd, 4),
                (FrameKind::Stop, 10),
            ],
            b"xyz",
        );
        let demo = decode_demo(&bytes, &Limits::default()).unwrap();

        assert_eq!(demo.signon, Span::new(HEADER_SIZE, 5));
        assert_eq!(demo.frames.len(), 3);
        assert_eq!(demo.max_tick().raw(), 10);
        assert!(demo.has_stop());
        assert_eq!(demo.trailer.slice(&bytes).unwrap(), b"xyz");
        assert_eq!(demo.header.map_name_str(), "ctf_2fort");

        let signon: Vec<_> = demo
            .signon_frames(&Limits::default())
            .collect::<WireResult<_>>()
            .unwrap();
        assert_eq!(signon.len(), 1);
        assert_eq!(signon[0].kind, FrameKind::SyncTick);
    }

    #[test]
    fn empty_stream_has_zero_max_tick() {
        let bytes = build(4, &[], &[], &[]);
        let demo = decode_demo(&bytes, &Limits::default()).unwrap();
        assert!(demo.frames.is_empty());
        assert_eq!(demo.max_tick(), DemoTick::default());
        assert!(!demo.has_stop());
        assert_eq!(demo.trailer.len, 0);
    }

    #[test]
    fn tick_regressions_are_accepted() {
        let bytes = build(
            3,
            &[],
            &[(FrameKind::SyncTick, 20), (FrameKind::SyncTick, 5)],
            &[],
        );
        let demo = decode_demo(&bytes, &Limits::default()).unwrap();
        assert_eq!(demo.max_tick().raw(), 20);
    }

    #[test]
    fn frame_error_propagates() {
        let mut bytes = build(3, &[], &[(FrameKind::ConsoleCmd, 1)], &[]);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            decode_demo(&bytes, &Limits::default()),
            Err(DecodeError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn lazy_stream_matches_materialized() {
        let bytes = build(
            3,
            &[],
            &[(FrameKind::SyncTick, 1), (FrameKind::Stop, 2)],
            &[],
        );
        let (header, stream) = frame_stream(&bytes, &Limits::default()).unwrap();
        assert_eq!(header.demo_protocol, 3);
        let lazy: Vec<_> = stream.collect::<WireResult<_>>().unwrap();
        assert_eq!(lazy, decode_demo(&bytes, &Limits::default()).unwrap().frames);
    }
}
