//! Demo editing for the demedit demo engine.
//!
//! This crate gives meaning to the payloads the `wire` crate delimits: the
//! command info camera block, the signon server info message and user
//! command bit streams. On top of that it offers the four operations the
//! tools are built from.
//!
//! # Features
//!
//! - POV unlock: spectator flag plus neutralized command info
//! - Cutting to a tick range with renumbered ticks
//! - Dropping console and user command frames
//! - Tick counting from the frame stream
//! - Per-tick button and movement extraction
//!
//! # Design Principles
//!
//! - **Byte fidelity** - Everything an edit does not touch is copied verbatim.
//! - **All or nothing** - An edit returns a complete demo or an error.
//! - **Deterministic** - Same input and options produce the same bytes.

mod cmdinfo;
mod edit;
mod error;
mod input;
mod limits;
mod netmsg;
mod options;
mod serialize;
mod usercmd;

pub use cmdinfo::{decode_cmd_info_block, write_neutralized_block, CmdInfo, CmdInfoFlags};
pub use edit::{count_ticks, count_ticks_with_limits, edit, edit_with_limits};
pub use error::{CodecError, CodecResult, ErrorKind, InputReason, LimitKind};
pub use input::{extract_buttons, extract_buttons_with_limits, InputRecord};
pub use limits::CodecLimits;
pub use netmsg::{find_server_info, ServerInfo};
pub use options::{EditOptions, TickRange};
pub use usercmd::{decode_user_cmd, Buttons, UserCmd};
pub use wire::Limits as WireLimits;
