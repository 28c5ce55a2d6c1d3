//! Key and group reference shown by `--help` and by a bare invocation.

use rich_rust::markup;
use rich_rust::prelude::*;
use rich_rust::r#box::ROUNDED;

use crate::registry::{self, Members, GROUPS};

const EXAMPLE: &str = "all FFFA710F pkeys FFBF0FFA home FFBF0FFA";
const KEYS_PER_ROW: usize = 8;

fn group_members(members: Members) -> String {
    match members {
        Members::Every => "every key".to_string(),
        Members::Keys(names) => names.join(", "),
    }
}

/// Plain-text reference appended to clap's help.
pub fn plain() -> String {
    let mut out = String::new();

    out.push_str("Colors are 8 hex digits, e.g. FFFA710F. Later pairs override earlier ones.\n");
    out.push_str("The target `base` colors every key no other pair sets.\n\n");
    out.push_str(&format!("Example:\n    keycolor {EXAMPLE}\n\n"));

    out.push_str("Groups:\n");
    for group in GROUPS {
        out.push_str(&format!("    {}: {}\n", group.name, group_members(group.members)));
    }

    out.push_str("\nKeys:\n");
    for row in registry::sorted_key_names().chunks(KEYS_PER_ROW) {
        out.push_str(&format!("    {}\n", row.join("  ")));
    }

    out
}

/// Styled reference for a bare invocation.
pub fn print(console: &Console) {
    console.print("");
    console.print("[bold #4ecdc4]keycolor[/] [#95a5a6]set per-key backlight colors[/]");
    console.print("");
    console.print("  [bold #f39c12]Usage:[/] keycolor <TARGET> <COLOR> ...");
    console.print(&format!("  [bold #f39c12]Example:[/] [bold #f1c40f]keycolor {EXAMPLE}[/]"));
    console.print(
        "  [#95a5a6]Colors are 8 hex digits. Later pairs override earlier ones; `base` fills the rest.[/]",
    );
    console.print("");

    let mut groups = Table::new()
        .box_style(&ROUNDED)
        .header_style(Style::parse("bold #f1c40f").unwrap_or_default())
        .border_style(Style::parse("#3498db").unwrap_or_default())
        .with_column(Column::new("Group"))
        .with_column(Column::new("Keys"));

    for group in GROUPS {
        groups.add_row_cells([
            markup::render_or_plain(&format!("[bold #2ecc71]{}[/]", group.name)),
            markup::render_or_plain(&group_members(group.members)),
        ]);
    }
    console.print_renderable(&groups);
    console.print("");

    let mut keys = Table::new()
        .box_style(&ROUNDED)
        .header_style(Style::parse("bold #f1c40f").unwrap_or_default())
        .border_style(Style::parse("#3498db").unwrap_or_default());
    for n in 0..KEYS_PER_ROW {
        keys = keys.with_column(Column::new(if n == 0 { "Keys" } else { "" }));
    }

    for row in registry::sorted_key_names().chunks(KEYS_PER_ROW) {
        let cells: [_; KEYS_PER_ROW] = std::array::from_fn(|n| {
            markup::render_or_plain(row.get(n).copied().unwrap_or(""))
        });
        keys.add_row_cells(cells);
    }
    console.print_renderable(&keys);
    console.print("");
}
