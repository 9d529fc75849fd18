//! Demo editing and tick counting.

use wire::{decode_demo, frame_stream, DemoHeader, DemoTick, FrameDescriptor, FrameKind, Limits, RawDemo};

use crate::error::CodecResult;
use crate::limits::CodecLimits;
use crate::netmsg::find_server_info;
use crate::options::{EditOptions, TickRange};
use crate::serialize::write_demo;

/// Seconds per tick assumed when the header declares no ticks.
const DEFAULT_TICK_INTERVAL: f64 = 0.015;

/// Player slot given to the viewer after unlocking: entity 1, the first
/// player entity, which is slot 0.
pub(crate) const SPECTATOR_SLOT: u8 = 0;

/// One frame of the output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlannedFrame {
    /// A source frame, written with a possibly renumbered tick.
    Original { frame: FrameDescriptor, tick: DemoTick },
    /// A Stop frame that did not exist in the source.
    SyntheticStop { tick: DemoTick },
}

/// Everything the serializer needs to produce the output.
#[derive(Debug, Clone)]
pub(crate) struct EditPlan {
    pub header: DemoHeader,
    pub frames: Vec<PlannedFrame>,
    pub keep_trailer: bool,
    /// Absolute bit to set in the signon section.
    pub hltv_bit: Option<usize>,
    /// Absolute bit where [`SPECTATOR_SLOT`] is written in the signon section.
    pub player_slot_bit: Option<usize>,
    pub neutralize_packets: bool,
}

/// Edits a demo with default limits.
///
/// A default [`EditOptions`] reproduces the input byte for byte.
///
/// # Example
///
/// ```no_run
/// use codec::{edit, EditOptions};
///
/// let demo = std::fs::read("match.dem").unwrap();
/// let clip = edit(&demo, &EditOptions::unlock().with_cut(1000, 2000)).unwrap();
/// ```
pub fn edit(bytes: &[u8], options: &EditOptions) -> CodecResult<Vec<u8>> {
    edit_with_limits(bytes, options, &Limits::default(), &CodecLimits::default())
}

/// Edits a demo.
///
/// Either a complete demo is returned or an error; nothing partial.
pub fn edit_with_limits(
    bytes: &[u8],
    options: &EditOptions,
    wire_limits: &Limits,
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    let demo = decode_demo(bytes, wire_limits)?;
    let plan = plan_edit(&demo, options, wire_limits, limits)?;
    let out = write_demo(&demo, &plan)?;
    tracing::debug!(
        frames_in = demo.frames.len(),
        frames_out = plan.frames.len(),
        ticks = plan.header.playback_ticks,
        bytes_in = bytes.len(),
        bytes_out = out.len(),
        "edited demo"
    );
    Ok(out)
}

/// Returns the highest tick in the frame stream with default limits.
pub fn count_ticks(bytes: &[u8]) -> CodecResult<u32> {
    count_ticks_with_limits(bytes, &Limits::default())
}

/// Returns the highest tick in the frame stream, or 0 if it has no frames.
///
/// The header's declared tick count is ignored; producers leave it stale.
pub fn count_ticks_with_limits(bytes: &[u8], wire_limits: &Limits) -> CodecResult<u32> {
    let (_, frames) = frame_stream(bytes, wire_limits)?;
    let mut max = 0;
    for frame in frames {
        max = max.max(frame?.tick.raw());
    }
    Ok(max)
}

pub(crate) fn plan_edit(
    demo: &RawDemo<'_>,
    options: &EditOptions,
    wire_limits: &Limits,
    limits: &CodecLimits,
) -> CodecResult<EditPlan> {
    let mut header = demo.header;
    let (frames, keep_trailer) = match options.cut {
        None => {
            let frames: Vec<_> = demo
                .frames
                .iter()
                .filter(|frame| keeps(options, frame.kind))
                .map(|&frame| PlannedFrame::Original {
                    frame,
                    tick: frame.tick,
                })
                .collect();
            if frames.len() != demo.frames.len() {
                header.set_frames(frames.len());
            }
            (frames, true)
        }
        Some(range) => {
            let frames = plan_cut(demo, options, range, &mut header);
            (frames, false)
        }
    };

    let server_info = if options.unlock_pov {
        let found = find_server_info(demo, wire_limits, limits)?;
        if found.is_none() {
            tracing::debug!(
                protocol = demo.layout.protocol(),
                "no server info in signon, skipping spectator flag"
            );
        }
        found
    } else {
        None
    };

    Ok(EditPlan {
        header,
        frames,
        keep_trailer,
        hltv_bit: server_info.map(|info| info.hltv_bit),
        player_slot_bit: server_info.map(|info| info.player_slot_bit),
        neutralize_packets: options.unlock_pov,
    })
}

fn keeps(options: &EditOptions, kind: FrameKind) -> bool {
    !(options.strip_commands && kind.is_command())
}

fn plan_cut(
    demo: &RawDemo<'_>,
    options: &EditOptions,
    range: TickRange,
    header: &mut DemoHeader,
) -> Vec<PlannedFrame> {
    let end = range.to.min(demo.max_tick().raw());
    if range.from >= end {
        tracing::trace!(from = range.from, to = range.to, end, "empty cut range");
        header.set_ticks(0);
        header.set_playback_time(0.0);
        header.set_frames(0);
        return Vec::new();
    }

    let mut frames = Vec::new();
    for &frame in &demo.frames {
        if frame.kind == FrameKind::Stop || !keeps(options, frame.kind) {
            continue;
        }
        let tick = frame.tick.raw();
        if range.contains(tick) {
            frames.push(PlannedFrame::Original {
                frame,
                tick: frame.tick.rebase(range.from),
            });
        } else if tick < range.from && frame.kind.is_setup() {
            frames.push(PlannedFrame::Original {
                frame,
                tick: DemoTick::default(),
            });
        }
    }

    let stop_tick = DemoTick::new(end - range.from);
    let stop = demo
        .frames
        .last()
        .filter(|frame| frame.kind == FrameKind::Stop && frame.tick.raw() == end);
    frames.push(match stop {
        Some(&frame) => PlannedFrame::Original {
            frame,
            tick: stop_tick,
        },
        None => PlannedFrame::SyntheticStop { tick: stop_tick },
    });

    let ticks = stop_tick.raw();
    if ticks != header.ticks() {
        let interval = header.tick_interval().unwrap_or(DEFAULT_TICK_INTERVAL);
        header.set_playback_time((f64::from(ticks) * interval) as f32);
        header.set_ticks(ticks);
    }
    header.set_frames(frames.len());
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::ByteWriter;
    use wire::{encode_header, write_frame, write_payload, FrameLayout};

    fn demo_bytes(frames: &[(FrameKind, u32)], declared_ticks: i32) -> Vec<u8> {
        let layout = FrameLayout::for_protocol(3).unwrap();
        let mut header = DemoHeader::new(3, 24);
        header.playback_ticks = declared_ticks;
        header.playback_time = declared_ticks as f32 * 0.015;
        header.playback_frames = frames.len() as i32;

        let mut out = ByteWriter::new();
        encode_header(&header, &mut out);
        for &(kind, tick) in frames {
            let mut body = ByteWriter::new();
            match kind {
                FrameKind::ConsoleCmd | FrameKind::DataTables => {
                    write_payload(&mut body, b"x").unwrap();
                }
                FrameKind::UserCmd => {
                    body.write_i32(0);
                    write_payload(&mut body, &[0, 0]).unwrap();
                }
                _ => {}
            }
            write_frame(&mut out, layout, kind, DemoTick::new(tick), None, &body.finish()).unwrap();
        }
        out.finish()
    }

    fn plan(bytes: &[u8], options: &EditOptions) -> EditPlan {
        let demo = decode_demo(bytes, &Limits::default()).unwrap();
        plan_edit(&demo, options, &Limits::default(), &CodecLimits::default()).unwrap()
    }

    fn ticks(plan: &EditPlan) -> Vec<(FrameKind, u32)> {
        plan.frames
            .iter()
            .map(|planned| match planned {
                PlannedFrame::Original { frame, tick } => (frame.kind, tick.raw()),
                PlannedFrame::SyntheticStop { tick } => (FrameKind::Stop, tick.raw()),
            })
            .collect()
    }

    #[test]
    fn noop_plan_keeps_everything() {
        let bytes = demo_bytes(&[(FrameKind::SyncTick, 0), (FrameKind::Stop, 5)], 5);
        let plan = plan(&bytes, &EditOptions::default());
        assert_eq!(ticks(&plan), [(FrameKind::SyncTick, 0), (FrameKind::Stop, 5)]);
        assert!(plan.keep_trailer);
        assert_eq!(plan.hltv_bit, None);
        assert!(!plan.neutralize_packets);
        assert_eq!(plan.header.playback_frames, 2);
    }

    #[test]
    fn cut_renumbers_and_keeps_setup() {
        let bytes = demo_bytes(
            &[
                (FrameKind::DataTables, 0),
                (FrameKind::SyncTick, 0),
                (FrameKind::ConsoleCmd, 3),
                (FrameKind::ConsoleCmd, 10),
                (FrameKind::UserCmd, 15),
                (FrameKind::ConsoleCmd, 20),
                (FrameKind::Stop, 30),
            ],
            30,
        );
        let plan = plan(&bytes, &EditOptions::default().with_cut(10, 20));
        assert_eq!(
            ticks(&plan),
            [
                (FrameKind::DataTables, 0),
                (FrameKind::SyncTick, 0),
                (FrameKind::ConsoleCmd, 0),
                (FrameKind::UserCmd, 5),
                (FrameKind::Stop, 10),
            ]
        );
        assert!(matches!(
            plan.frames.last(),
            Some(PlannedFrame::SyntheticStop { .. })
        ));
        assert!(!plan.keep_trailer);
        assert_eq!(plan.header.playback_ticks, 10);
        assert_eq!(plan.header.playback_frames, 5);
        assert!((plan.header.playback_time - 0.15).abs() < 1e-5);
    }

    #[test]
    fn cut_past_end_reuses_stop() {
        let bytes = demo_bytes(&[(FrameKind::SyncTick, 0), (FrameKind::Stop, 8)], 8);
        let plan = plan(&bytes, &EditOptions::default().with_cut(0, 100));
        assert!(matches!(
            plan.frames.last(),
            Some(PlannedFrame::Original { frame, .. }) if frame.kind == FrameKind::Stop
        ));
        assert_eq!(plan.header.playback_ticks, 8);
        assert!((plan.header.playback_time - 8.0 * 0.015).abs() < 1e-6);
    }

    #[test]
    fn empty_range_plans_no_frames() {
        let bytes = demo_bytes(&[(FrameKind::SyncTick, 0), (FrameKind::Stop, 8)], 8);
        for (from, to) in [(5, 5), (7, 3), (8, 20), (50, 60)] {
            let plan = plan(&bytes, &EditOptions::default().with_cut(from, to));
            assert!(plan.frames.is_empty(), "cut {from}..{to}");
            assert_eq!(plan.header.playback_ticks, 0);
            assert_eq!(plan.header.playback_frames, 0);
            assert_eq!(plan.header.playback_time, 0.0);
        }
    }

    #[test]
    fn strip_commands_drops_input_frames() {
        let bytes = demo_bytes(
            &[
                (FrameKind::ConsoleCmd, 1),
                (FrameKind::UserCmd, 1),
                (FrameKind::SyncTick, 1),
                (FrameKind::Stop, 2),
            ],
            2,
        );
        let plan = plan(&bytes, &EditOptions::default().with_strip_commands(true));
        assert_eq!(ticks(&plan), [(FrameKind::SyncTick, 1), (FrameKind::Stop, 2)]);
        assert_eq!(plan.header.playback_frames, 2);
    }

    #[test]
    fn unlock_without_server_info_still_neutralizes() {
        let bytes = demo_bytes(&[(FrameKind::Stop, 0)], 0);
        let plan = plan(&bytes, &EditOptions::unlock());
        assert_eq!(plan.hltv_bit, None);
        assert_eq!(plan.player_slot_bit, None);
        assert!(plan.neutralize_packets);
    }

    #[test]
    fn count_ticks_scans_stream() {
        let bytes = demo_bytes(
            &[
                (FrameKind::SyncTick, 4),
                (FrameKind::SyncTick, 2),
                (FrameKind::Stop, 3),
            ],
            99,
        );
        assert_eq!(count_ticks(&bytes).unwrap(), 4);
        assert_eq!(count_ticks(&demo_bytes(&[], 10)).unwrap(), 0);
    }
}
