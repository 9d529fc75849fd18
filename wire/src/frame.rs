//! Frame layout, lazy frame stream parsing and frame encoding.

use std::fmt;
use std::iter::FusedIterator;

use bitstream::{ByteReader, ByteWriter, CursorResult};

use crate::error::{DecodeError, EncodeError, FrameReason, LimitKind, WireResult};
use crate::header::SUPPORTED_PROTOCOLS;
use crate::limits::Limits;
use crate::types::DemoTick;

/// Size of one split-screen slot of command info.
pub const CMD_INFO_SLOT_SIZE: usize = 4 + 6 * 12;

/// Frame kinds, independent of their protocol-specific tag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameKind {
    Signon,
    Packet,
    SyncTick,
    ConsoleCmd,
    UserCmd,
    DataTables,
    Stop,
    CustomData,
    StringTables,
}

impl FrameKind {
    /// Every frame kind, in tag order.
    pub const ALL: [Self; 9] = [
        Self::Signon,
        Self::Packet,
        Self::SyncTick,
        Self::ConsoleCmd,
        Self::UserCmd,
        Self::DataTables,
        Self::Stop,
        Self::CustomData,
        Self::StringTables,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Signon => "signon",
            Self::Packet => "packet",
            Self::SyncTick => "synctick",
            Self::ConsoleCmd => "consolecmd",
            Self::UserCmd => "usercmd",
            Self::DataTables => "datatables",
            Self::Stop => "stop",
            Self::CustomData => "customdata",
            Self::StringTables => "stringtables",
        }
    }

    /// Frames that establish initial client state.
    #[must_use]
    pub const fn is_setup(self) -> bool {
        matches!(self, Self::SyncTick | Self::DataTables | Self::StringTables)
    }

    /// Frames that carry recorded client input.
    #[must_use]
    pub const fn is_command(self) -> bool {
        matches!(self, Self::ConsoleCmd | Self::UserCmd)
    }

    /// Frames whose body starts with command info.
    #[must_use]
    pub const fn has_cmd_info(self) -> bool {
        matches!(self, Self::Signon | Self::Packet)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol-dependent parts of the frame layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    protocol: i32,
}

impl FrameLayout {
    /// Returns the layout for a demo protocol.
    pub fn for_protocol(protocol: i32) -> WireResult<Self> {
        if SUPPORTED_PROTOCOLS.contains(&protocol) {
            Ok(Self { protocol })
        } else {
            Err(DecodeError::UnsupportedProtocol { found: protocol })
        }
    }

    #[must_use]
    pub const fn protocol(self) -> i32 {
        self.protocol
    }

    /// Protocol 4 records a player slot byte after the tick.
    #[must_use]
    pub const fn has_player_slot(self) -> bool {
        self.protocol >= 4
    }

    /// Number of split-screen command info slots per packet.
    #[must_use]
    pub const fn cmd_info_slots(self) -> usize {
        if self.has_player_slot() {
            2
        } else {
            1
        }
    }

    /// Size in bytes of the command info block.
    #[must_use]
    pub const fn cmd_info_size(self) -> usize {
        CMD_INFO_SLOT_SIZE * self.cmd_info_slots()
    }

    /// Size of the tag, tick and optional slot prefix.
    #[must_use]
    pub const fn frame_header_size(self) -> usize {
        if self.has_player_slot() {
            6
        } else {
            5
        }
    }

    /// Maps a raw command tag onto a frame kind.
    #[must_use]
    pub const fn kind_for_tag(self, tag: u8) -> Option<FrameKind> {
        let kind = match (tag, self.has_player_slot()) {
            (1, _) => FrameKind::Signon,
            (2, _) => FrameKind::Packet,
            (3, _) => FrameKind::SyncTick,
            (4, _) => FrameKind::ConsoleCmd,
            (5, _) => FrameKind::UserCmd,
            (6, _) => FrameKind::DataTables,
            (7, _) => FrameKind::Stop,
            (8, false) | (9, true) => FrameKind::StringTables,
            (8, true) => FrameKind::CustomData,
            _ => return None,
        };
        Some(kind)
    }

    /// Maps a frame kind onto its raw command tag.
    #[must_use]
    pub const fn tag_for(self, kind: FrameKind) -> Option<u8> {
        let tag = match kind {
            FrameKind::Signon => 1,
            FrameKind::Packet => 2,
            FrameKind::SyncTick => 3,
            FrameKind::ConsoleCmd => 4,
            FrameKind::UserCmd => 5,
            FrameKind::DataTables => 6,
            FrameKind::Stop => 7,
            FrameKind::CustomData if self.has_player_slot() => 8,
            FrameKind::CustomData => return None,
            FrameKind::StringTables if self.has_player_slot() => 9,
            FrameKind::StringTables => 8,
        };
        Some(tag)
    }
}

/// A byte range inside the buffer a frame was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    /// Borrows the spanned bytes from `buf`.
    pub fn slice(self, buf: &[u8]) -> CursorResult<&[u8]> {
        ByteReader::at(buf, self.start)?.read_bytes(self.len)
    }
}

/// One frame of the stream, as offsets into the source buffer.
///
/// A descriptor owns no payload memory; it is only meaningful together with
/// the buffer it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    pub kind: FrameKind,
    pub tick: DemoTick,
    /// Present only in protocol 4.
    pub player_slot: Option<u8>,
    /// Offset of the command tag byte.
    pub offset: usize,
    /// Everything after the tag, tick and slot prefix.
    pub body: Span,
    /// Command info block of Signon and Packet frames.
    pub cmd_info: Option<Span>,
    /// Length-prefixed payload, when the kind has one.
    pub data: Option<Span>,
}

impl FrameDescriptor {
    /// Full extent of the frame, prefix included.
    #[must_use]
    pub const fn span(&self) -> Span {
        Span::new(self.offset, self.body.end() - self.offset)
    }
}

/// Lazy iterator over the frames of a byte range.
///
/// Yields descriptors in stream order. Iteration ends after a Stop frame or
/// at the end of the range; after the first error the iterator is fused.
#[derive(Debug, Clone)]
pub struct FrameStream<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
    layout: FrameLayout,
    max_frames: usize,
    max_payload_bytes: usize,
    frames: usize,
    stopped: bool,
    done: bool,
}

impl<'a> FrameStream<'a> {
    /// Creates a stream over `buf[range]`.
    ///
    /// An out-of-bounds range yields a single `Overflow` error.
    #[must_use]
    pub fn new(buf: &'a [u8], range: Span, layout: FrameLayout, limits: &Limits) -> Self {
        Self {
            buf,
            pos: range.start,
            end: range.end(),
            layout,
            max_frames: limits.max_frames,
            max_payload_bytes: limits.max_payload_bytes,
            frames: 0,
            stopped: false,
            done: false,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Offset of the next unread byte. After a Stop frame this is the start
    /// of the trailer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` once a Stop frame has been yielded.
    #[must_use]
    pub const fn stopped(&self) -> bool {
        self.stopped
    }

    fn next_frame(&mut self) -> WireResult<FrameDescriptor> {
        if self.end > self.buf.len() {
            return Err(DecodeError::Overflow {
                requested: self.end,
                capacity: self.buf.len(),
            });
        }
        if self.frames >= self.max_frames {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::FrameCount,
                limit: self.max_frames,
                actual: self.frames + 1,
            });
        }

        let offset = self.pos;
        let window = &self.buf[..self.end];
        let mut reader = ByteReader::at(window, offset)?;

        let tag = reader.read_u8()?;
        let tick = DemoTick::new(reader.read_u32()?);
        let player_slot = if self.layout.has_player_slot() {
            Some(reader.read_u8()?)
        } else {
            None
        };
        let kind = self.layout.kind_for_tag(tag).ok_or(DecodeError::MalformedFrame {
            offset,
            reason: FrameReason::UnknownTag { tag },
        })?;

        let body_start = reader.position();
        let mut cmd_info = None;
        let data = match kind {
            FrameKind::Signon | FrameKind::Packet => {
                let info = Span::new(reader.position(), self.layout.cmd_info_size());
                reader.skip(info.len)?;
                cmd_info = Some(info);
                // sequence in, sequence out
                reader.skip(8)?;
                Some(self.read_payload(&mut reader, offset)?)
            }
            FrameKind::UserCmd => {
                // outgoing sequence
                reader.skip(4)?;
                Some(self.read_payload(&mut reader, offset)?)
            }
            FrameKind::CustomData => {
                // callback index
                reader.skip(4)?;
                Some(self.read_payload(&mut reader, offset)?)
            }
            FrameKind::ConsoleCmd | FrameKind::DataTables | FrameKind::StringTables => {
                Some(self.read_payload(&mut reader, offset)?)
            }
            FrameKind::SyncTick | FrameKind::Stop => None,
        };

        self.pos = reader.position();
        self.frames += 1;
        if kind == FrameKind::Stop {
            self.stopped = true;
        }

        Ok(FrameDescriptor {
            kind,
            tick,
            player_slot,
            offset,
            body: Span::new(body_start, self.pos - body_start),
            cmd_info,
            data,
        })
    }

    fn read_payload(&self, reader: &mut ByteReader<'_>, offset: usize) -> WireResult<Span> {
        let len = reader.read_len()?;
        let available = reader.remaining();
        if len > available {
            return Err(DecodeError::MalformedFrame {
                offset,
                reason: FrameReason::LengthPastEnd { len, available },
            });
        }
        if len > self.max_payload_bytes {
            return Err(DecodeError::LimitsExceeded {
                kind: LimitKind::PayloadBytes,
                limit: self.max_payload_bytes,
                actual: len,
            });
        }
        let span = Span::new(reader.position(), len);
        reader.skip(len)?;
        Ok(span)
    }
}

impl Iterator for FrameStream<'_> {
    type Item = WireResult<FrameDescriptor>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.stopped || self.pos >= self.end {
            return None;
        }
        match self.next_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for FrameStream<'_> {}

/// Appends one frame: tag, tick, optional player slot, then `body` verbatim.
///
/// `body` must already hold the kind-specific fields (command info,
/// sequence numbers, length prefix and payload).
pub fn write_frame(
    out: &mut ByteWriter,
    layout: FrameLayout,
    kind: FrameKind,
    tick: DemoTick,
    player_slot: Option<u8>,
    body: &[u8],
) -> Result<(), EncodeError> {
    let tag = layout.tag_for(kind).ok_or(EncodeError::UnsupportedKind {
        kind: kind.name(),
        protocol: layout.protocol(),
    })?;
    out.write_u8(tag);
    out.write_u32(tick.raw());
    if layout.has_player_slot() {
        out.write_u8(player_slot.unwrap_or(0));
    }
    out.write_bytes(body);
    Ok(())
}

/// Appends an `i32` length prefix followed by `payload`.
pub fn write_payload(out: &mut ByteWriter, payload: &[u8]) -> Result<(), EncodeError> {
    out.write_len_prefixed(payload)
        .map_err(|_| EncodeError::LengthOverflow {
            length: payload.len(),
        })
}
