//! `lensdash`: inspect a beads issue export through a lens.
//!
//! This crate provides:
//! - JSONL catalog loading with line-numbered errors
//! - Text and JSON rendering of the flat, centered, workstream and grouped views
//! - The `show`, `dump`, `lenses` and `replay` commands

#![forbid(unsafe_code)]

pub mod loader;
pub mod output;

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use lens_dashboard::{Intent, LensDashboard};
use lens_dashboard_core::{
    CatalogIndex, DashboardConfig, DepthOption, GroupByMode, LensError, LensKind, LensSelector,
    ScopeMode, SearchMode, ViewMode,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: invalid issue record: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Core(#[from] LensError),
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "lensdash", version, about = "Lens dashboard over a beads issue export")]
pub struct Cli {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render one lens.
    Show(ViewArgs),
    /// Print the plain-text dump report for a lens.
    Dump(ViewArgs),
    /// List the lenses a catalog offers.
    Lenses(LensesArgs),
    /// Apply a comma-separated key or intent script, then render.
    Replay {
        #[command(flatten)]
        view: ViewArgs,
        /// e.g. "j,j,w,enter,set-depth=3".
        #[arg(long)]
        keys: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Beads JSONL file.
    pub file: PathBuf,
    /// `label:<name>`, `epic:<id>` or `bead:<id>`.
    #[arg(long)]
    pub lens: LensKind,
    #[arg(long)]
    pub depth: Option<DepthOption>,
    #[arg(long)]
    pub view: Option<ViewMode>,
    #[arg(long = "group-by")]
    pub group_by: Option<GroupByMode>,
    /// Use the tree layout for epic and bead lenses.
    #[arg(long)]
    pub no_centered: bool,
    #[arg(long, value_delimiter = ',')]
    pub scope: Vec<String>,
    #[arg(long = "scope-mode")]
    pub scope_mode: Option<ScopeMode>,
    /// Split workstreams into label sub-workstreams.
    #[arg(long)]
    pub subdivide: bool,
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LensesArgs {
    pub file: PathBuf,
    #[arg(long, default_value = "merged")]
    pub mode: SearchMode,
    #[arg(long)]
    pub query: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub scope: Vec<String>,
    #[arg(long = "scope-mode")]
    pub scope_mode: Option<ScopeMode>,
    #[arg(long)]
    pub json: bool,
}

#[must_use]
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let stdout = io::stdout();
    match execute(cli, &mut stdout.lock()) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

/// Parse `args` (program name first) and run against `out`.
pub fn run_from<I, T>(args: I, out: &mut dyn Write) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    execute(cli, out)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn execute(cli: Cli, out: &mut dyn Write) -> CliResult<()> {
    match cli.command {
        Commands::Show(args) => handle_show(&args, out),
        Commands::Dump(args) => handle_dump(&args, out),
        Commands::Lenses(args) => handle_lenses(&args, out),
        Commands::Replay { view, keys } => handle_replay(&view, &keys, out),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn config_for(args: &ViewArgs) -> DashboardConfig {
    let mut config = DashboardConfig::from_env();
    if let Some(depth) = args.depth {
        config.default_depth = depth;
    }
    if let Some(view) = args.view {
        config.default_view = view;
    }
    if let Some(group_by) = args.group_by {
        config.default_group_by = group_by;
    }
    if args.no_centered {
        config.centered_by_default = false;
    }
    if !args.scope.is_empty() {
        config.default_scope.clone_from(&args.scope);
    }
    if let Some(mode) = args.scope_mode {
        config.default_scope_mode = mode;
    }
    config
}

fn with_dashboard<F>(args: &ViewArgs, f: F) -> CliResult<()>
where
    F: FnOnce(&mut LensDashboard<'_>) -> CliResult<()>,
{
    let catalog = loader::load_catalog(&args.file)?;
    let config = config_for(args);
    let mut dash = LensDashboard::new(&catalog, args.lens.clone(), &config);
    if args.subdivide {
        dash.toggle_subdivision();
    }
    f(&mut dash)
}

fn handle_show(args: &ViewArgs, out: &mut dyn Write) -> CliResult<()> {
    with_dashboard(args, |dash| write_view(dash, args.json, None, out))
}

fn handle_dump(args: &ViewArgs, out: &mut dyn Write) -> CliResult<()> {
    with_dashboard(args, |dash| {
        out.write_all(dash.dump_report().as_bytes())?;
        Ok(())
    })
}

fn handle_replay(args: &ViewArgs, keys: &str, out: &mut dyn Write) -> CliResult<()> {
    let script = Intent::parse_script(keys)?;
    with_dashboard(args, |dash| {
        let mut status = String::new();
        for intent in script {
            tracing::trace!(?intent, "replay");
            let outcome = dash.apply(intent);
            if !outcome.status.is_empty() {
                status = outcome.status;
            }
        }
        write_view(dash, args.json, Some(&status), out)
    })
}

fn write_view(
    dash: &LensDashboard<'_>,
    json: bool,
    status: Option<&str>,
    out: &mut dyn Write,
) -> CliResult<()> {
    if json {
        let text = serde_json::to_string_pretty(&dash.snapshot()).map_err(LensError::from)?;
        writeln!(out, "{text}")?;
    } else {
        out.write_all(output::render_view(dash).as_bytes())?;
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            writeln!(out, "{status}")?;
        }
    }
    Ok(())
}

fn handle_lenses(args: &LensesArgs, out: &mut dyn Write) -> CliResult<()> {
    let catalog = loader::load_catalog(&args.file)?;
    let index = CatalogIndex::build(&catalog);
    let scope_mode = args
        .scope_mode
        .unwrap_or_else(|| DashboardConfig::from_env().default_scope_mode);
    let mut selector = LensSelector::with_scope_mode(&catalog, &index, scope_mode);
    for label in &args.scope {
        if catalog.issues().iter().all(|i| !i.has_label(label)) {
            return Err(LensError::LabelNotFound(label.clone()).into());
        }
        selector.add_scope(label);
    }
    selector.set_mode(args.mode);
    if let Some(query) = &args.query {
        selector.set_query(query);
    }

    if args.json {
        let text = serde_json::to_string_pretty(selector.items()).map_err(LensError::from)?;
        writeln!(out, "{text}")?;
    } else {
        out.write_all(output::render_lenses(selector.items()).as_bytes())?;
    }
    Ok(())
}
