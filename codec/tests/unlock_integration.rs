use codec::{
    decode_cmd_info_block, edit, edit_with_limits, extract_buttons, find_server_info, Buttons,
    CmdInfo, CodecError, CodecLimits, EditOptions, ErrorKind, LimitKind,
};
use synth::{synth_demo, CmdFields, DemoBuilder, SynthConfig, RECORDER_SLOT};
use wire::{decode_demo, DemoTick, FrameKind, Limits, RawDemo, Span};

fn frame_layout(demo: &RawDemo<'_>) -> Vec<(FrameKind, DemoTick, Option<Span>)> {
    demo.frames
        .iter()
        .map(|frame| (frame.kind, frame.tick, frame.data))
        .collect()
}

fn packet_cmd_infos(demo: &RawDemo<'_>) -> Vec<CmdInfo> {
    demo.frames
        .iter()
        .filter(|frame| frame.kind == FrameKind::Packet)
        .flat_map(|frame| {
            let block = frame.cmd_info.unwrap().slice(demo.bytes()).unwrap();
            decode_cmd_info_block(block).unwrap()
        })
        .collect()
}

#[test]
fn unlock_sets_spectator_flag_and_clears_camera() {
    let bytes = synth_demo(&SynthConfig {
        ticks: 30,
        ..SynthConfig::default()
    })
    .unwrap();

    let source = decode_demo(&bytes, &Limits::default()).unwrap();
    let info = find_server_info(&source, &Limits::default(), &CodecLimits::default())
        .unwrap()
        .unwrap();
    assert!(!info.is_hltv);
    assert!(packet_cmd_infos(&source)
        .iter()
        .all(|slot| slot.flags.locks_view()));

    let out = edit(&bytes, &EditOptions::unlock()).unwrap();
    assert_eq!(out.len(), bytes.len());

    let unlocked = decode_demo(&out, &Limits::default()).unwrap();
    let patched = find_server_info(&unlocked, &Limits::default(), &CodecLimits::default())
        .unwrap()
        .unwrap();
    assert!(patched.is_hltv);
    assert_eq!(patched.player_slot, 0);
    assert_eq!(patched.client_crc, info.client_crc);
    assert_eq!(patched.max_classes, info.max_classes);

    let slots = packet_cmd_infos(&unlocked);
    assert_eq!(slots.len(), 29);
    assert!(slots.iter().all(CmdInfo::is_neutral));

    assert_eq!(frame_layout(&unlocked), frame_layout(&source));
}

#[test]
fn unlock_protocol_four_neutralizes_both_slots() {
    let bytes = synth_demo(&SynthConfig {
        protocol: 4,
        ticks: 12,
        ..SynthConfig::default()
    })
    .unwrap();
    let out = edit(&bytes, &EditOptions::unlock()).unwrap();
    let unlocked = decode_demo(&out, &Limits::default()).unwrap();

    let slots = packet_cmd_infos(&unlocked);
    // Two packets per tick, two command info slots per packet.
    assert_eq!(slots.len(), 11 * 2 * 2);
    assert!(slots.iter().all(CmdInfo::is_neutral));
    assert!(unlocked
        .frames
        .iter()
        .any(|frame| frame.player_slot == Some(1)));
    assert_eq!(
        find_server_info(&unlocked, &Limits::default(), &CodecLimits::default()).unwrap(),
        None
    );
}

#[test]
fn unlock_moves_viewer_to_spectator_slot() {
    let mut builder = DemoBuilder::new(3).unwrap();
    builder.signon_server_info(false).sync_tick(0).stop(1);
    let bytes = builder.finish().unwrap();

    let source = decode_demo(&bytes, &Limits::default()).unwrap();
    let info = find_server_info(&source, &Limits::default(), &CodecLimits::default())
        .unwrap()
        .unwrap();
    assert_eq!(info.player_slot, RECORDER_SLOT);
    // is_hltv, is_dedicated, client crc, max classes, map md5
    assert_eq!(info.player_slot_bit - info.hltv_bit, 2 + 32 + 16 + 128);

    let out = edit(&bytes, &EditOptions::unlock()).unwrap();
    let unlocked = decode_demo(&out, &Limits::default()).unwrap();
    let patched = find_server_info(&unlocked, &Limits::default(), &CodecLimits::default())
        .unwrap()
        .unwrap();
    assert_eq!(patched.player_slot, 0);
    assert_eq!(patched.player_slot_bit, info.player_slot_bit);

    // Only the spectator flag and the slot byte differ.
    let changed: Vec<usize> = (0..bytes.len() * 8)
        .filter(|&bit| (bytes[bit / 8] >> (bit % 8)) & 1 != (out[bit / 8] >> (bit % 8)) & 1)
        .collect();
    let mut expected = vec![info.hltv_bit];
    expected.extend(
        (0..8u8)
            .filter(|&i| (RECORDER_SLOT >> i) & 1 == 1)
            .map(|i| info.player_slot_bit + usize::from(i)),
    );
    assert_eq!(changed, expected);

    let again = edit(&out, &EditOptions::unlock()).unwrap();
    assert_eq!(again, out);
}

#[test]
fn unlock_with_cut_neutralizes_written_packets() {
    let bytes = synth_demo(&SynthConfig {
        ticks: 80,
        ..SynthConfig::default()
    })
    .unwrap();
    let out = edit(&bytes, &EditOptions::unlock().with_cut(20, 40)).unwrap();
    let demo = decode_demo(&out, &Limits::default()).unwrap();
    let slots = packet_cmd_infos(&demo);
    assert_eq!(slots.len(), 20);
    assert!(slots.iter().all(CmdInfo::is_neutral));
    let info = find_server_info(&demo, &Limits::default(), &CodecLimits::default())
        .unwrap()
        .unwrap();
    assert!(info.is_hltv);
}

#[test]
fn strip_commands_drops_exactly_command_frames() {
    let bytes = synth_demo(&SynthConfig {
        ticks: 50,
        console_every: 5,
        ..SynthConfig::default()
    })
    .unwrap();
    let out = edit(&bytes, &EditOptions::default().with_strip_commands(true)).unwrap();

    let source = decode_demo(&bytes, &Limits::default()).unwrap();
    let stripped = decode_demo(&out, &Limits::default()).unwrap();
    let kept: Vec<_> = source
        .frames
        .iter()
        .filter(|frame| !frame.kind.is_command())
        .map(|frame| (frame.kind, frame.tick))
        .collect();
    let actual: Vec<_> = stripped
        .frames
        .iter()
        .map(|frame| (frame.kind, frame.tick))
        .collect();
    assert_eq!(actual, kept);
    assert_eq!(stripped.header.playback_frames as usize, kept.len());
    assert_eq!(stripped.header.playback_ticks, source.header.playback_ticks);
    assert!(extract_buttons(&out).unwrap().is_empty());
}

#[test]
fn buttons_decode_against_null_command() {
    let mut builder = DemoBuilder::new(4).unwrap();
    builder
        .sync_tick(0)
        .user_cmd(1, 0, &CmdFields::buttons(Buttons::ATTACK | Buttons::JUMP))
        .user_cmd(1, 1, &CmdFields::buttons(Buttons::DUCK))
        .user_cmd(
            2,
            0,
            &CmdFields {
                forward_move: Some(450.0),
                ..CmdFields::default()
            },
        )
        .user_cmd(3, 1, &CmdFields::buttons(0))
        .stop(3);
    let bytes = builder.finish().unwrap();

    let records = extract_buttons(&bytes).unwrap();
    let summary: Vec<_> = records
        .iter()
        .map(|r| (r.tick, r.player_slot, r.buttons.to_string(), r.forward_move))
        .collect();
    assert_eq!(
        summary,
        [
            (1, 0, "attack+jump".to_string(), 0.0),
            (1, 1, "duck".to_string(), 0.0),
            (2, 0, "-".to_string(), 450.0),
            (3, 1, "-".to_string(), 0.0),
        ]
    );
}

#[test]
fn released_buttons_report_empty_mask() {
    let mut builder = DemoBuilder::new(3).unwrap();
    builder
        .sync_tick(0)
        .user_cmd(1, 0, &CmdFields::buttons(Buttons::ATTACK))
        .user_cmd(2, 0, &CmdFields::default())
        .stop(2);
    let bytes = builder.finish().unwrap();

    let records = extract_buttons(&bytes).unwrap();
    let summary: Vec<_> = records.iter().map(|r| (r.tick, r.buttons.raw())).collect();
    assert_eq!(summary, [(1, Buttons::ATTACK), (2, 0)]);
}

#[test]
fn malformed_user_command_reports_offset() {
    let mut builder = DemoBuilder::new(3).unwrap();
    builder.sync_tick(0).user_cmd_raw(1, 0, &[0xFF]).stop(1);
    let bytes = builder.finish().unwrap();
    let err = extract_buttons(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    let demo = decode_demo(&bytes, &Limits::default()).unwrap();
    assert!(matches!(
        err,
        CodecError::MalformedInput { offset, .. } if offset == demo.frames[1].offset
    ));
}

#[test]
fn signon_scan_limit_applies_to_edits() {
    let mut builder = DemoBuilder::new(3).unwrap();
    // 40 nop messages ahead of anything useful.
    builder.signon_packet(&[0u8; 30]).stop(0);
    let bytes = builder.finish().unwrap();

    let limits = CodecLimits {
        max_signon_messages: 8,
        ..CodecLimits::default()
    };
    let err = edit_with_limits(&bytes, &EditOptions::unlock(), &Limits::default(), &limits)
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::LimitsExceeded {
            kind: LimitKind::SignonMessages,
            limit: 8,
            ..
        }
    ));
    assert!(edit(&bytes, &EditOptions::default()).is_ok());
}
