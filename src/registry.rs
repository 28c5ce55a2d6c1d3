//! Key and group name table for the reference keyboard.
//!
//! Indices are slots in the firmware's lighting address space: three banks of
//! 60 slots, walked column by column rather than in visual order. Slots that
//! have no LED behind them are simply absent from [`KEYS`].

use std::collections::BTreeSet;

use crate::error::{LightError, Result};

/// Firmware address of one lighting zone.
pub type PhysicalIndex = u8;

/// Slots per bank in the firmware address space.
pub const BANK_SLOTS: usize = 60;

/// Number of banks the firmware exposes.
pub const BANKS: usize = 3;

/// One named, individually lit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub name: &'static str,
    pub index: PhysicalIndex,
}

const fn key(name: &'static str, index: PhysicalIndex) -> Key {
    Key { name, index }
}

/// Which keys a group covers.
#[derive(Debug, Clone, Copy)]
pub enum Members {
    /// Every named key.
    Every,
    Keys(&'static [&'static str]),
}

/// A named set of keys addressable as one target.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub name: &'static str,
    pub members: Members,
}

impl Group {
    /// Member key names in definition order.
    pub fn key_names(&self) -> Vec<&'static str> {
        match self.members {
            Members::Every => KEYS.iter().map(|k| k.name).collect(),
            Members::Keys(names) => names.to_vec(),
        }
    }
}

// Slot order as reported by the firmware. Names are lower-case.
#[rustfmt::skip]
pub static KEYS: &[Key] = &[
    key("esc", 0x00),
    key("\\", 0x01),
    key("tab", 0x02),
    key("capslock", 0x03),
    key("lshift", 0x04),
    key("lcontrol", 0x05),
    key("f12", 0x06),
    key("«", 0x07),
    key("f9", 0x08),
    key("9", 0x09),
    key("o", 0x0A),
    key("l", 0x0B),
    key(",", 0x0C),
    key("<", 0x0D),
    key("leftarrow", 0x0F),
    key("f1", 0x10),
    key("1", 0x11),
    key("q", 0x12),
    key("a", 0x13),
    key("windows", 0x15),
    key("prtscrn", 0x16),
    key("f10", 0x18),
    key("0", 0x19),
    key("p", 0x1A),
    key("ç", 0x1B),
    key(".", 0x1C),
    key("enter", 0x1E),
    key("downarrow", 0x1F),
    key("f2", 0x20),
    key("2", 0x21),
    key("w", 0x22),
    key("s", 0x23),
    key("z", 0x24),
    key("lalt", 0x25),
    key("sclock", 0x26),
    key("del", 0x27),
    key("f11", 0x28),
    key("'", 0x29),
    key("+", 0x2A),
    key("º", 0x2B),
    key("-", 0x2C),
    key("rightarrow", 0x2F),
    key("f3", 0x30),
    key("3", 0x31),
    key("e", 0x32),
    key("d", 0x33),
    key("x", 0x34),
    key("pause", 0x36),
    key("delete", 0x37),
    key("numpad7", 0x39),
    key("p1", 0x3A),
    key("numlock", 0x3C),
    key("numpad6", 0x3D),
    key("f4", 0x40),
    key("4", 0x41),
    key("r", 0x42),
    key("f", 0x43),
    key("c", 0x44),
    key("space", 0x45),
    key("insert", 0x46),
    key("end", 0x47),
    key("numpad8", 0x49),
    key("p2", 0x4A),
    key("numpad/", 0x4C),
    key("numpad1", 0x4D),
    key("f5", 0x50),
    key("5", 0x51),
    key("t", 0x52),
    key("g", 0x53),
    key("v", 0x54),
    key("home", 0x56),
    key("pgdown", 0x57),
    key("stop", 0x58),
    key("numpad9", 0x59),
    key("p3", 0x5A),
    key("numpad*", 0x5C),
    key("numpad2", 0x5D),
    key("f6", 0x60),
    key("6", 0x61),
    key("y", 0x62),
    key("h", 0x63),
    key("b", 0x64),
    key("pgup", 0x66),
    key("rshift", 0x67),
    key("playlast", 0x68),
    key("p4", 0x6A),
    key("numpad-", 0x6C),
    key("numpad3", 0x6D),
    key("f7", 0x70),
    key("7", 0x71),
    key("u", 0x72),
    key("j", 0x73),
    key("n", 0x74),
    key("altgr", 0x75),
    key("´", 0x76),
    key("rctrl", 0x77),
    key("play", 0x78),
    key("numpad4", 0x79),
    key("p5", 0x7A),
    key("numpad+", 0x7C),
    key("numpad0", 0x7D),
    key("f8", 0x80),
    key("8", 0x81),
    key("i", 0x82),
    key("k", 0x83),
    key("m", 0x84),
    key("fn", 0x85),
    key("~", 0x86),
    key("arrowup", 0x87),
    key("playnext", 0x88),
    key("numpad5", 0x89),
    key("numpadenter", 0x8C),
    key("numpad.", 0x8D),
];

pub static GROUPS: &[Group] = &[
    Group { name: "all", members: Members::Every },
    Group {
        name: "system",
        members: Members::Keys(&[
            "prtscrn", "sclock", "pause", "insert", "home", "pgup", "delete", "end", "pgdown",
        ]),
    },
    Group {
        name: "arrows",
        members: Members::Keys(&["arrowup", "leftarrow", "downarrow", "rightarrow"]),
    },
    Group {
        name: "numpad",
        members: Members::Keys(&[
            "numlock", "numpad/", "numpad*", "numpad-", "numpad7", "numpad8", "numpad9",
            "numpad+", "numpad4", "numpad5", "numpad6", "numpad1", "numpad2", "numpad3",
            "numpadenter", "numpad0", "numpad.",
        ]),
    },
    Group {
        name: "pkeys",
        members: Members::Keys(&["p1", "p2", "p3", "p4", "p5"]),
    },
    Group {
        name: "fkeys",
        members: Members::Keys(&[
            "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
        ]),
    },
    Group {
        name: "media",
        members: Members::Keys(&["stop", "playlast", "play", "playnext"]),
    },
];

/// Look up a single key by name, ignoring case.
pub fn find_key(name: &str) -> Option<&'static Key> {
    let name = name.to_lowercase();
    KEYS.iter().find(|k| k.name == name)
}

/// Look up a group by name, ignoring case.
pub fn find_group(name: &str) -> Option<&'static Group> {
    let name = name.to_lowercase();
    GROUPS.iter().find(|g| g.name == name)
}

/// Expand a key or group name into the set of slots it lights.
///
/// Group names are checked first. Every group member is itself a key in
/// [`KEYS`], which the tests below enforce.
pub fn resolve(name: &str) -> Result<BTreeSet<PhysicalIndex>> {
    if let Some(group) = find_group(name) {
        return Ok(group
            .key_names()
            .into_iter()
            .filter_map(find_key)
            .map(|k| k.index)
            .collect());
    }

    find_key(name)
        .map(|k| BTreeSet::from([k.index]))
        .ok_or_else(|| LightError::UnknownTarget(name.to_string()))
}

/// Every lit slot, in ascending order.
pub fn all_indices() -> BTreeSet<PhysicalIndex> {
    KEYS.iter().map(|k| k.index).collect()
}

/// Key names sorted for display.
pub fn sorted_key_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = KEYS.iter().map(|k| k.name).collect();
    names.sort_unstable();
    names
}
