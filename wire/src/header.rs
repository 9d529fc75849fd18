//! Demo header layout, decoding and encoding.

use bitstream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, WireResult};

/// Signature at offset 0 of every demo file.
pub const MAGIC: [u8; 8] = *b"HL2DEMO\0";

/// Capacity of each fixed text field in the header.
pub const MAX_OS_PATH: usize = 260;

/// Header size in bytes (1072 total).
pub const HEADER_SIZE: usize = 8 + 4 + 4 + 4 * MAX_OS_PATH + 4 + 4 + 4 + 4;

/// Demo protocols this crate understands.
pub const SUPPORTED_PROTOCOLS: [i32; 2] = [3, 4];

/// Byte offset of the playback time field.
pub const PLAYBACK_TIME_OFFSET: usize = 8 + 4 + 4 + 4 * MAX_OS_PATH;
/// Byte offset of the playback ticks field.
pub const PLAYBACK_TICKS_OFFSET: usize = PLAYBACK_TIME_OFFSET + 4;
/// Byte offset of the playback frames field.
pub const PLAYBACK_FRAMES_OFFSET: usize = PLAYBACK_TICKS_OFFSET + 4;
/// Byte offset of the signon length field.
pub const SIGNON_LENGTH_OFFSET: usize = PLAYBACK_FRAMES_OFFSET + 4;

/// The fixed-size demo header.
///
/// Text fields are kept as raw NUL-padded arrays so that encoding reproduces
/// the input exactly, including any bytes after the first NUL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoHeader {
    /// Demo file protocol (3 or 4).
    pub demo_protocol: i32,
    /// Network protocol of the recording game build.
    pub network_protocol: i32,
    pub server_name: [u8; MAX_OS_PATH],
    pub client_name: [u8; MAX_OS_PATH],
    pub map_name: [u8; MAX_OS_PATH],
    pub game_directory: [u8; MAX_OS_PATH],
    /// Declared playback duration in seconds.
    pub playback_time: f32,
    /// Declared tick count.
    pub playback_ticks: i32,
    /// Declared frame count.
    pub playback_frames: i32,
    /// Length in bytes of the signon section that follows the header.
    pub signon_length: i32,
}

impl DemoHeader {
    /// Creates a header with empty text fields and zero playback metadata.
    #[must_use]
    pub const fn new(demo_protocol: i32, network_protocol: i32) -> Self {
        Self {
            demo_protocol,
            network_protocol,
            server_name: [0; MAX_OS_PATH],
            client_name: [0; MAX_OS_PATH],
            map_name: [0; MAX_OS_PATH],
            game_directory: [0; MAX_OS_PATH],
            playback_time: 0.0,
            playback_ticks: 0,
            playback_frames: 0,
            signon_length: 0,
        }
    }

    /// Returns the signon length as a byte count.
    ///
    /// Decoded headers always have a non-negative signon length.
    #[must_use]
    pub fn signon_len(&self) -> usize {
        usize::try_from(self.signon_length).unwrap_or(0)
    }

    /// Returns the declared tick count, clamping negative values to zero.
    #[must_use]
    pub fn ticks(&self) -> u32 {
        u32::try_from(self.playback_ticks).unwrap_or(0)
    }

    /// Seconds per tick implied by the declared duration and tick count.
    #[must_use]
    pub fn tick_interval(&self) -> Option<f64> {
        let ticks = self.ticks();
        (ticks > 0).then(|| f64::from(self.playback_time) / f64::from(ticks))
    }

    /// Sets the declared tick count.
    pub fn set_ticks(&mut self, ticks: u32) {
        self.playback_ticks = i32::try_from(ticks).unwrap_or(i32::MAX);
    }

    /// Sets the declared playback duration.
    pub fn set_playback_time(&mut self, seconds: f32) {
        self.playback_time = seconds;
    }

    /// Sets the declared frame count.
    pub fn set_frames(&mut self, frames: usize) {
        self.playback_frames = i32::try_from(frames).unwrap_or(i32::MAX);
    }

    /// Returns the server name up to its first NUL.
    #[must_use]
    pub fn server_name_str(&self) -> String {
        field_str(&self.server_name)
    }

    /// Returns the client name up to its first NUL.
    #[must_use]
    pub fn client_name_str(&self) -> String {
        field_str(&self.client_name)
    }

    /// Returns the map name up to its first NUL.
    #[must_use]
    pub fn map_name_str(&self) -> String {
        field_str(&self.map_name)
    }

    /// Returns the game directory up to its first NUL.
    #[must_use]
    pub fn game_directory_str(&self) -> String {
        field_str(&self.game_directory)
    }
}

/// Builds a NUL-padded text field, truncating to leave room for a terminator.
#[must_use]
pub fn text_field(value: &str) -> [u8; MAX_OS_PATH] {
    let mut field = [0u8; MAX_OS_PATH];
    let len = value.len().min(MAX_OS_PATH - 1);
    field[..len].copy_from_slice(&value.as_bytes()[..len]);
    field
}

fn field_str(field: &[u8; MAX_OS_PATH]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(MAX_OS_PATH);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Decodes the demo header at the start of `buf`.
///
/// Validation order: magic, protocol, header length, signon length. A buffer
/// shorter than the magic that still matches its prefix is truncated rather
/// than foreign.
pub fn decode_header(buf: &[u8]) -> WireResult<DemoHeader> {
    let prefix_len = buf.len().min(MAGIC.len());
    if buf[..prefix_len] != MAGIC[..prefix_len] {
        let mut found = [0u8; 8];
        found[..prefix_len].copy_from_slice(&buf[..prefix_len]);
        return Err(DecodeError::BadMagic { found });
    }

    let mut reader = ByteReader::new(buf);
    reader.skip(MAGIC.len())?;

    let demo_protocol = reader.read_i32()?;
    if !SUPPORTED_PROTOCOLS.contains(&demo_protocol) {
        return Err(DecodeError::UnsupportedProtocol {
            found: demo_protocol,
        });
    }

    if buf.len() < HEADER_SIZE {
        return Err(DecodeError::TruncatedInput {
            requested: HEADER_SIZE,
            available: buf.len(),
        });
    }

    let network_protocol = reader.read_i32()?;
    let server_name = reader.read_array()?;
    let client_name = reader.read_array()?;
    let map_name = reader.read_array()?;
    let game_directory = reader.read_array()?;
    let playback_time = reader.read_f32()?;
    let playback_ticks = reader.read_i32()?;
    let playback_frames = reader.read_i32()?;
    let signon_length = reader.read_i32()?;

    let capacity = reader.remaining();
    match usize::try_from(signon_length) {
        Ok(len) if len <= capacity => {}
        _ => {
            return Err(DecodeError::Overflow {
                requested: signon_length.unsigned_abs() as usize,
                capacity,
            })
        }
    }

    Ok(DemoHeader {
        demo_protocol,
        network_protocol,
        server_name,
        client_name,
        map_name,
        game_directory,
        playback_time,
        playback_ticks,
        playback_frames,
        signon_length,
    })
}

/// Encodes a demo header, writing exactly [`HEADER_SIZE`] bytes.
pub fn encode_header(header: &DemoHeader, out: &mut ByteWriter) {
    out.write_bytes(&MAGIC);
    out.write_i32(header.demo_protocol);
    out.write_i32(header.network_protocol);
    out.write_bytes(&header.server_name);
    out.write_bytes(&header.client_name);
    out.write_bytes(&header.map_name);
    out.write_bytes(&header.game_directory);
    out.write_f32(header.playback_time);
    out.write_i32(header.playback_ticks);
    out.write_i32(header.playback_frames);
    out.write_i32(header.signon_length);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> DemoHeader {
        let mut header = DemoHeader::new(3, 24);
        header.server_name = text_field("Test Server");
        header.client_name = text_field("player");
        header.map_name = text_field("cp_badlands");
        header.game_directory = text_field("tf");
        header.playback_time = 10.0;
        header.playback_ticks = 660;
        header.playback_frames = 1200;
        header
    }

    fn encode(header: &DemoHeader) -> Vec<u8> {
        let mut out = ByteWriter::new();
        encode_header(header, &mut out);
        out.finish()
    }

    #[test]
    fn header_size_is_1072() {
        assert_eq!(HEADER_SIZE, 1072);
        assert_eq!(SIGNON_LENGTH_OFFSET, 1068);
        assert_eq!(PLAYBACK_TIME_OFFSET, 1056);
    }

    #[test]
    fn header_roundtrip() {
        let header = sample_header();
        let bytes = encode(&header);
        assert_eq!(bytes.len(), HEADER_SIZE);

        let decoded = decode_header(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.map_name_str(), "cp_badlands");
        assert_eq!(decoded.server_name_str(), "Test Server");
    }

    #[test]
    fn text_fields_keep_bytes_after_nul() {
        let mut header = sample_header();
        header.client_name[100] = b'x';
        let decoded = decode_header(&encode(&header)).unwrap();
        assert_eq!(decoded.client_name[100], b'x');
        assert_eq!(decoded.client_name_str(), "player");
    }

    #[test]
    fn bad_magic() {
        let mut bytes = encode(&sample_header());
        bytes[0] = b'X';
        assert!(matches!(
            decode_header(&bytes),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn short_foreign_input_is_bad_magic() {
        assert!(matches!(
            decode_header(b"PK"),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn short_matching_prefix_is_truncated() {
        assert!(matches!(
            decode_header(b"HL2D"),
            Err(DecodeError::TruncatedInput { .. })
        ));
        assert!(matches!(
            decode_header(&[]),
            Err(DecodeError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn unsupported_protocol() {
        let mut header = sample_header();
        header.demo_protocol = 36;
        assert_eq!(
            decode_header(&encode(&header)),
            Err(DecodeError::UnsupportedProtocol { found: 36 })
        );
    }

    #[test]
    fn truncated_header() {
        let bytes = encode(&sample_header());
        assert!(matches!(
            decode_header(&bytes[..HEADER_SIZE - 1]),
            Err(DecodeError::TruncatedInput {
                requested: HEADER_SIZE,
                ..
            })
        ));
    }

    #[test]
    fn signon_length_past_end_overflows() {
        let mut header = sample_header();
        header.signon_length = 10;
        let mut bytes = encode(&header);
        bytes.extend_from_slice(&[0; 9]);
        assert!(matches!(
            decode_header(&bytes),
            Err(DecodeError::Overflow {
                requested: 10,
                capacity: 9
            })
        ));
        bytes.push(0);
        assert!(decode_header(&bytes).is_ok());
    }

    #[test]
    fn negative_signon_length_overflows() {
        let mut header = sample_header();
        header.signon_length = -1;
        assert!(matches!(
            decode_header(&encode(&header)),
            Err(DecodeError::Overflow { requested: 1, .. })
        ));
    }

    #[test]
    fn tick_interval_from_declared_fields() {
        let header = sample_header();
        let interval = header.tick_interval().unwrap();
        assert!((interval - 10.0 / 660.0).abs() < 1e-12);
        assert!(DemoHeader::new(3, 24).tick_interval().is_none());
    }

    #[test]
    fn setters_saturate() {
        let mut header = sample_header();
        header.set_ticks(u32::MAX);
        assert_eq!(header.playback_ticks, i32::MAX);
        header.set_frames(7);
        assert_eq!(header.playback_frames, 7);
    }
}
