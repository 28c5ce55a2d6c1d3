use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};
use clap_complete::Shell;
use rich_rust::markup;
use rich_rust::prelude::*;
use rich_rust::r#box::ROUNDED;
use serde::Serialize;
use tracing::{info, Level};

use crate::device::{Backend, PRODUCT_ID, VENDOR_ID};
use crate::error::LightError;
use crate::frame::{ControlFrame, Layout};
use crate::resolver::{resolve_all, ResolvedMapping};
use crate::transport::{send_frames, RecordingChannel};

mod color;
mod device;
mod error;
mod frame;
mod reference;
mod registry;
mod resolver;
mod transport;

#[derive(Parser)]
#[command(name = "keycolor")]
#[command(version)]
#[command(about = "Per-key RGB backlight control for the HP 03F0:1F41 keyboard")]
#[command(
    long_about = "Set the backlight color of single keys or key groups without the vendor app.\n\nArguments come in pairs: a key or group name, then an 8-digit hex color. Colors stay on the keyboard until they are overwritten or the keyboard loses power."
)]
struct Cli {
    /// Key or group name followed by its color, repeated (e.g. "pkeys FFBF0FFA").
    /// Options go before the first pair.
    #[arg(value_name = "TARGET COLOR", allow_hyphen_values = true)]
    pairs: Vec<String>,

    /// Report layout understood by the keyboard firmware
    #[arg(long, value_enum, default_value_t = Layout::default())]
    layout: Layout,

    /// How to reach the keyboard
    #[arg(long, value_enum, default_value_t = Backend::default())]
    backend: Backend,

    /// Build the frames and print them instead of writing to the device
    #[arg(long)]
    dry_run: bool,

    /// Print the dry run as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Log more detail to stderr (repeat for frame dumps)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

/// Machine-readable dry run.
#[derive(Serialize)]
struct DryRunReport<'a> {
    layout: String,
    colors: &'a ResolvedMapping,
    frames: Vec<String>,
}

struct KeyColor {
    console: Console,
}

impl KeyColor {
    fn new() -> Self {
        Self {
            console: Console::new(),
        }
    }

    fn apply(&self, cli: &Cli) -> Result<()> {
        let mapping = resolve_all(cli.pairs.as_slice())?;
        let frames = cli.layout.builder().build(&mapping);
        info!(
            keys = mapping.len(),
            frames = frames.len(),
            layout = %cli.layout,
            "resolved"
        );

        if cli.dry_run {
            return self.dry_run(cli, &mapping, &frames);
        }

        // Released on drop, including when a write fails.
        let mut channel = cli.backend.open()?;
        let written = send_frames(channel.as_mut(), &frames)?;

        self.console.print(&format!(
            "[bold #2ecc71]✓[/] Applied [bold]{}[/] key colors to [bold]{VENDOR_ID:04x}:{PRODUCT_ID:04x}[/] [dim]({} frames, {} bytes)[/]",
            mapping.len(),
            frames.len(),
            written
        ));
        Ok(())
    }

    fn dry_run(&self, cli: &Cli, mapping: &ResolvedMapping, frames: &[ControlFrame]) -> Result<()> {
        // Same path as a real run, minus the hardware.
        let mut channel = RecordingChannel::default();
        send_frames(&mut channel, frames)?;
        let sent: Vec<String> = channel.frames.iter().map(hex::encode).collect();

        if cli.json {
            let report = DryRunReport {
                layout: cli.layout.to_string(),
                colors: mapping,
                frames: sent,
            };
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize dry run")?;
            println!("{json}");
            return Ok(());
        }

        self.console.print("");
        self.console.print(
            "  [bold #f39c12]╭────────────────────────────────────────────────────────────╮[/]",
        );
        self.console.print(
            "  [bold #f39c12]│[/]  [bold #f39c12]⚠[/]  [bold white]DRY RUN - No changes will be made[/]                   [bold #f39c12]│[/]",
        );
        self.console.print(
            "  [bold #f39c12]╰────────────────────────────────────────────────────────────╯[/]",
        );
        self.console.print("");

        let mut table = Table::new()
            .box_style(&ROUNDED)
            .header_style(Style::parse("bold #f1c40f").unwrap_or_default())
            .border_style(Style::parse("#3498db").unwrap_or_default())
            .with_column(Column::new("Slot"))
            .with_column(Column::new("Key"))
            .with_column(Column::new("Color"));

        for key in registry::KEYS {
            if let Some(color) = mapping.get(&key.index) {
                table.add_row_cells([
                    markup::render_or_plain(&format!("0x{:02X}", key.index)),
                    markup::render_or_plain(key.name),
                    markup::render_or_plain(&format!("[bold]{color}[/]")),
                ]);
            }
        }
        self.console.print_renderable(&table);
        self.console.print("");

        self.console.print(&format!(
            "  [#95a5a6]Would send[/] [bold]{}[/] [#95a5a6]{} frame(s):[/]",
            sent.len(),
            cli.layout
        ));
        for (i, frame) in sent.iter().enumerate() {
            self.console
                .print(&format!("    [#3498db]→[/] [dim]{i:>2}[/] [#7f8c8d]{frame}[/]"));
        }
        self.console.print("");
        Ok(())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout is for results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn parse_cli() -> Cli {
    let matches = Cli::command()
        .after_help(reference::plain())
        .get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "keycolor", &mut std::io::stdout());
        return Ok(());
    }

    let keycolor = KeyColor::new();

    // Nothing to set: show what can be set and leave the device alone.
    if cli.pairs.is_empty() {
        reference::print(&keycolor.console);
        return Ok(());
    }

    keycolor.apply(cli)
}

fn main() -> ExitCode {
    let cli = parse_cli();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<LightError>()
                .map(LightError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
