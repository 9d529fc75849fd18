//! Writing an edit plan back out as a demo.

use bitstream::ByteWriter;
use wire::{encode_header, write_frame, DemoTick, FrameDescriptor, FrameKind, RawDemo};

use crate::cmdinfo::write_neutralized_block;
use crate::edit::{EditPlan, PlannedFrame, SPECTATOR_SLOT};
use crate::error::CodecResult;

pub(crate) fn write_demo(demo: &RawDemo<'_>, plan: &EditPlan) -> CodecResult<Vec<u8>> {
    let buf = demo.bytes();
    let mut out = ByteWriter::with_capacity(buf.len());

    encode_header(&plan.header, &mut out);
    // The signon section lands at the same offset it had in the source, so
    // bit positions found in the source apply unchanged.
    out.append_region(buf, demo.signon.start, demo.signon.len)?;
    if let Some(bit) = plan.hltv_bit {
        out.patch_bit(bit, true)?;
    }
    if let Some(bit) = plan.player_slot_bit {
        out.patch_bits(bit, u32::from(SPECTATOR_SLOT), 8)?;
    }

    for planned in &plan.frames {
        match *planned {
            PlannedFrame::Original { frame, tick } => {
                write_original(&mut out, demo, &frame, tick, plan.neutralize_packets)?;
            }
            PlannedFrame::SyntheticStop { tick } => {
                write_frame(&mut out, demo.layout, FrameKind::Stop, tick, Some(0), &[])?;
            }
        }
    }

    if plan.keep_trailer {
        out.append_region(buf, demo.trailer.start, demo.trailer.len)?;
    }
    Ok(out.finish())
}

fn write_original(
    out: &mut ByteWriter,
    demo: &RawDemo<'_>,
    frame: &FrameDescriptor,
    tick: DemoTick,
    neutralize: bool,
) -> CodecResult<()> {
    let buf = demo.bytes();
    match frame.cmd_info {
        Some(info) if neutralize && frame.kind == FrameKind::Packet => {
            write_frame(out, demo.layout, frame.kind, tick, frame.player_slot, &[])?;
            write_neutralized_block(info.slice(buf)?, out)?;
            out.append_region(buf, info.end(), frame.body.end() - info.end())?;
        }
        _ => {
            let body = frame.body.slice(buf)?;
            write_frame(out, demo.layout, frame.kind, tick, frame.player_slot, body)?;
        }
    }
    Ok(())
}
