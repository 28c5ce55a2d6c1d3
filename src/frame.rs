//! Control report layouts.
//!
//! Every report the keyboard accepts is [`FRAME_LEN`] bytes. Two layouts
//! are implemented:
//!
//! - `planes`: the full refresh the vendor tool sends. One start report, then
//!   one report per color channel and bank. Every key is rewritten, so keys
//!   without a color fall back to white.
//! - `entries`: sparse per-key reports carrying `(slot, color)` pairs. Keys
//!   that are not mentioned keep whatever color they had. Not yet confirmed
//!   on a real 03F0:1F41.

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use bytes::{BufMut, Bytes, BytesMut};
use clap::ValueEnum;
use tracing::debug;

use crate::color::Color;
use crate::registry::{self, PhysicalIndex, BANKS, BANK_SLOTS};
use crate::resolver::ResolvedMapping;

/// Size of every control report.
pub const FRAME_LEN: usize = 64;

/// Sparse per-key report constants (unverified on hardware).
pub mod entries {
    pub const REPORT_ID: u8 = 0x08;
    pub const OPCODE_SET_KEYS: u8 = 0x01;
    pub const HEADER_LEN: usize = 4;
    /// Slot byte plus four color bytes.
    pub const ENTRY_LEN: usize = 5;
    pub const ENTRIES_PER_FRAME: usize = (super::FRAME_LEN - HEADER_LEN) / ENTRY_LEN;
}

/// Full-refresh report constants.
pub mod planes {
    /// Sent once before the plane reports.
    pub const START_REPORT: [u8; 6] = [0x04, 0x00, 0x02, 0x00, 0xfc, 0xea];
    pub const RED_REPORT_ID: u8 = 0x05;
    pub const GREEN_REPORT_ID: u8 = 0x06;
    pub const BLUE_REPORT_ID: u8 = 0x07;
    /// Length byte per bank; the last bank only has 24 live slots.
    pub const BANK_LEN: [u8; super::BANKS] = [0x3c, 0x3c, 0x18];
    /// Color a slot gets when nothing was assigned to it.
    pub const DEFAULT_COLOR: u32 = 0x00ff_ffff;
}

/// One fixed-size report ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame(Bytes);

impl ControlFrame {
    fn from_buf(mut buf: BytesMut) -> Self {
        debug_assert!(buf.len() <= FRAME_LEN);
        buf.resize(FRAME_LEN, 0);
        Self(buf.freeze())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<[u8]> for ControlFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Display for ControlFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Converts a resolved mapping into the reports a firmware layout expects.
pub trait FrameLayout {
    /// Frames in the order they must be sent.
    fn build(&self, mapping: &ResolvedMapping) -> Vec<ControlFrame>;
}

/// Known firmware layouts.
#[derive(ValueEnum, Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum Layout {
    /// Full refresh of every key, as the vendor tool sends it; unassigned keys become white
    #[default]
    Planes,
    /// EXPERIMENTAL, unverified on hardware: sparse per-key reports; untouched keys keep their color
    Entries,
}

impl Layout {
    /// Get the frame builder for a layout.
    pub fn builder(&self) -> Box<dyn FrameLayout> {
        match self {
            Self::Planes => Box::new(PlaneLayout),
            Self::Entries => Box::new(EntryLayout),
        }
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planes => f.write_str("planes"),
            Self::Entries => f.write_str("entries"),
        }
    }
}

pub struct EntryLayout;

impl FrameLayout for EntryLayout {
    fn build(&self, mapping: &ResolvedMapping) -> Vec<ControlFrame> {
        // BTreeMap iteration is already ordered by slot.
        let pairs: Vec<(PhysicalIndex, Color)> = mapping.iter().map(|(i, c)| (*i, *c)).collect();

        let frames: Vec<ControlFrame> = pairs
            .chunks(entries::ENTRIES_PER_FRAME)
            .map(|chunk| {
                let mut buf = BytesMut::with_capacity(FRAME_LEN);

                // Report ID.
                buf.put_u8(entries::REPORT_ID);

                // Command.
                buf.put_u8(entries::OPCODE_SET_KEYS);

                // Entry count.
                buf.put_u8(chunk.len() as u8);

                // Reserved.
                buf.put_u8(0);

                for (index, color) in chunk {
                    buf.put_u8(*index);
                    buf.put_slice(&color.bytes());
                }

                ControlFrame::from_buf(buf)
            })
            .collect();

        debug!(entries = pairs.len(), frames = frames.len(), "built entry frames");
        frames
    }
}

pub struct PlaneLayout;

impl PlaneLayout {
    fn plane(
        report_id: u8,
        bank: usize,
        lit: &BTreeSet<PhysicalIndex>,
        mapping: &ResolvedMapping,
        channel: fn(&Color) -> u8,
    ) -> ControlFrame {
        let mut buf = BytesMut::with_capacity(FRAME_LEN);
        buf.put_slice(&[report_id, bank as u8, planes::BANK_LEN[bank], 0x00]);

        let fallback = Color::new(planes::DEFAULT_COLOR);
        for slot in bank * BANK_SLOTS..(bank + 1) * BANK_SLOTS {
            let index = slot as PhysicalIndex;
            if lit.contains(&index) {
                let color = mapping.get(&index).unwrap_or(&fallback);
                buf.put_u8(channel(color));
            } else {
                // No LED behind this slot.
                buf.put_u8(0);
            }
        }

        ControlFrame::from_buf(buf)
    }
}

impl FrameLayout for PlaneLayout {
    fn build(&self, mapping: &ResolvedMapping) -> Vec<ControlFrame> {
        let lit = registry::all_indices();
        let channels: [(u8, fn(&Color) -> u8); 3] = [
            (planes::RED_REPORT_ID, Color::red),
            (planes::GREEN_REPORT_ID, Color::green),
            (planes::BLUE_REPORT_ID, Color::blue),
        ];

        let mut frames = vec![ControlFrame::from_buf(BytesMut::from(
            &planes::START_REPORT[..],
        ))];
        for (report_id, channel) in channels {
            for bank in 0..BANKS {
                frames.push(Self::plane(report_id, bank, &lit, mapping, channel));
            }
        }

        debug!(entries = mapping.len(), frames = frames.len(), "built plane frames");
        frames
    }
}
