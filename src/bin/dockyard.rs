use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dockyard::common::config::Config;
use dockyard::common::log::init_logging;
use dockyard::layout_engine::{RecordingHost, RegisterRequest, ToolWindowManager};
use dockyard::model::store::read_layout;
use dockyard::model::{DesktopLayout, ToolWindowAnchor};
use dockyard::sys::process::ProcessProbe;
use dockyard::sys::window_buttons::WindowButtonsConfiguration;
use strum::IntoEnumIterator;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "dockyard")]
#[command(about = "Inspect and diff tool window layouts")]
struct Cli {
    /// Config file, defaults to the user config directory
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, overridden by DOCKYARD_LOG
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report duplicate orders and doubly occupied slots
    Check { layout: PathBuf },
    /// Print the layout as a tree of panes, anchors and slots
    Show { layout: PathBuf },
    /// Apply `to` over `from` and print what the engine asks the host to do
    Diff {
        from: PathBuf,
        to: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the title bar button layout of the desktop
    WindowButtons,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log);
    let config = Config::load(cli.config.as_deref())?;
    debug!(?config, "loaded config");

    match cli.command {
        Command::Check { layout } => check(&layout),
        Command::Show { layout } => show(&layout),
        Command::Diff { from, to, json } => diff(&config, &from, &to, json),
        Command::WindowButtons => window_buttons(&config).await,
    }
}

fn load(path: &Path) -> anyhow::Result<DesktopLayout> {
    read_layout(path).with_context(|| format!("cannot load layout {}", path.display()))
}

fn check(path: &Path) -> anyhow::Result<ExitCode> {
    let layout = load(path)?;
    let violations = layout.violations();
    if violations.is_empty() {
        println!("{}: ok ({} windows)", path.display(), layout.len());
        return Ok(ExitCode::SUCCESS);
    }
    for violation in &violations {
        println!("{}: {violation}", path.display());
    }
    Ok(ExitCode::FAILURE)
}

fn show(path: &Path) -> anyhow::Result<ExitCode> {
    let layout = load(path)?;
    let mut panes = Vec::new();
    for pane in layout.panes() {
        let mut anchors = Vec::new();
        for anchor in ToolWindowAnchor::iter() {
            let mut slots = Vec::new();
            for split in [false, true] {
                let windows: Vec<String> = layout
                    .bucket(pane, anchor, split)
                    .into_iter()
                    .map(|info| {
                        let state = if info.visible { "visible" } else { "hidden" };
                        format!("{} #{} {} {}", info.id, info.order, info.window_type, state)
                    })
                    .collect();
                if !windows.is_empty() {
                    let name = if split { "split" } else { "primary" };
                    slots.push(ascii_tree::Tree::Node(name.to_string(), vec![ascii_tree::Tree::Leaf(windows)]));
                }
            }
            if !slots.is_empty() {
                anchors.push(ascii_tree::Tree::Node(anchor.to_string(), slots));
            }
        }
        panes.push(ascii_tree::Tree::Node(pane.to_string(), anchors));
    }

    let mut out = String::new();
    ascii_tree::write_tree(&mut out, &ascii_tree::Tree::Node(path.display().to_string(), panes))?;
    print!("{out}");
    Ok(ExitCode::SUCCESS)
}

fn diff(config: &Config, from: &Path, to: &Path, json: bool) -> anyhow::Result<ExitCode> {
    let from_layout = load(from)?;
    let to_layout = load(to)?;

    let mut engine = ToolWindowManager::new(RecordingHost::headless(), config.engine.clone());
    let ids: Vec<(String, ToolWindowAnchor, bool)> =
        from_layout.infos().map(|info| (info.id.clone(), info.anchor, info.split)).collect();
    engine.set_layout_on_init(from_layout)?;
    for (id, anchor, split) in ids {
        engine.register(RegisterRequest::new(id, anchor).split(split))?;
    }
    engine.host_mut().take_ops();

    engine.set_layout(to_layout)?;
    let ops = engine.host_mut().take_ops();
    if json {
        println!("{}", serde_json::to_string_pretty(&ops)?);
    } else if ops.is_empty() {
        println!("layouts are equivalent");
    } else {
        for op in &ops {
            println!("{op}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn window_buttons(config: &Config) -> anyhow::Result<ExitCode> {
    let probe = ProcessProbe::new(config.window_buttons.probe_timeout());
    let buttons = WindowButtonsConfiguration::new();
    buttons.refresh(config.window_buttons.layout_override.as_deref(), &probe).await;
    match buttons.state() {
        Some(state) => {
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("window buttons layout unavailable");
            Ok(ExitCode::FAILURE)
        }
    }
}
