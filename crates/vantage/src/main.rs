use std::path::PathBuf;
use std::process;

use clap::Parser;
use vantage_core::entrypoint::parse_address;
use vantage_core::{Engine, Options, SessionHandle};
use vantage_utils::{info, init_logging_for_tui, init_logging_with_level, LogFormat, LogLevel};

/// Launcher for disassembly and debugging sessions.
///
/// The target selects the backend: `live:<pid-or-name>` attaches to a
/// running process, `emu:<path>` runs a file under the emulator,
/// `[tcp:|udp:]<host>:<port>` connects to a remote debug server, and a bare
/// path (or no target) opens static disassembly. Trailing arguments are
/// entrypoints: tokens starting with a digit are addresses, anything else a
/// symbol name.
#[derive(Parser, Debug)]
#[command(name = "vantage")]
#[command(version)]
#[command(about = "Open a disassembly/debugging session against a file, emulator, remote server, or live process", long_about = None)]
struct Cli
{
    /// Target specification (file path, live:<pid|name>, emu:<path>, host:port)
    target: Option<String>,

    /// Entrypoints to disassemble first (addresses or symbol names)
    entrypoints: Vec<String>,

    /// Do not backtrace memory read/write accesses
    #[arg(long)]
    no_data_trace: bool,

    /// Enable backtrace-related debug output (very verbose)
    #[arg(long)]
    debug_backtrace: bool,

    /// Load a disassembler/debugger plugin script (repeatable)
    #[arg(short = 'P', long = "plugin", value_name = "PLUGIN")]
    plugins: Vec<PathBuf>,

    /// Evaluate hook code after startup (repeatable)
    #[arg(short = 'e', long = "eval", value_name = "CODE")]
    eval: Vec<String>,

    /// Load a map file (addr <-> name associations)
    #[arg(long = "map", value_name = "MAPFILE")]
    map_file: Option<PathBuf>,

    /// Disassemble CLI entrypoints with the fast-and-shallow pass
    #[arg(long)]
    fast: bool,

    /// Request a decompilation pass once disassembly finishes
    #[arg(long)]
    decompile: bool,

    /// Window back end to use (tui, headless); same as VANTAGE_UI
    #[arg(long = "ui", value_name = "BACKEND")]
    ui_backend: Option<String>,

    /// CPU to use for shellcode and remote targets (x86, x86_64, arm64, ...)
    #[arg(long = "cpu", value_name = "CPU")]
    cpu: Option<String>,

    /// Executable file format to use (elf, pe, macho, raw)
    #[arg(long = "exe", value_name = "FORMAT")]
    exe_format: Option<String>,

    /// Rebase the loaded file to this address
    #[arg(long = "rebase", value_name = "ADDR", value_parser = parse_rebase)]
    rebase: Option<u64>,

    /// Read C function prototypes for external library functions
    #[arg(short = 'c', long = "c-header", value_name = "HEADER")]
    c_header: Option<PathBuf>,

    /// Load all relevant files with the same base filename (.h, .map, ...)
    #[arg(short = 'a', long)]
    autoload: bool,

    /// Verbose output (default)
    #[arg(short = 'v', long, overrides_with_all = ["quiet", "debug"])]
    verbose: bool,

    /// Quiet output
    #[arg(short = 'q', long, overrides_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Debug output
    #[arg(short = 'd', long, overrides_with_all = ["verbose", "quiet"])]
    debug: bool,

    /// Save user actions in this session file
    #[arg(short = 'S', long = "session", value_name = "SESSIONFILE")]
    session: Option<PathBuf>,

    /// Start a new session, discarding the old one
    #[arg(short = 'N', long = "new-session")]
    new_session: bool,

    /// Also disassemble the target's default entrypoint set
    #[arg(short = 'A', long = "disassemble-all-entrypoints")]
    dasm_all: bool,
}

fn parse_rebase(raw: &str) -> Result<u64, String>
{
    parse_address(raw).map(|addr| addr.value()).map_err(|err| err.to_string())
}

impl Cli
{
    fn log_level(&self) -> LogLevel
    {
        if self.debug {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Warn
        } else {
            LogLevel::Info
        }
    }

    fn into_options(self) -> (Options, Option<String>, Vec<String>, Option<String>)
    {
        let log_level = self.log_level();
        let options = Options {
            no_data_trace: self.no_data_trace,
            debug_backtrace: self.debug_backtrace,
            plugins: self.plugins,
            hook_code: self.eval,
            map_file: self.map_file,
            fast: self.fast,
            decompile: self.decompile,
            cpu: self.cpu,
            exe_format: self.exe_format,
            rebase: self.rebase,
            c_header: self.c_header,
            autoload: self.autoload,
            session_file: self.session,
            new_session: self.new_session,
            dasm_all_entrypoints: self.dasm_all,
            log_level,
        };
        (options, self.target, self.entrypoints, self.ui_backend)
    }
}

fn main()
{
    let cli = Cli::parse();
    let (options, target, entrypoints, ui_backend) = cli.into_options();

    // --ui is a convenience spelling of the VANTAGE_UI environment switch.
    // Set before any thread is spawned.
    if let Some(backend) = ui_backend {
        std::env::set_var("VANTAGE_UI", backend);
    }

    let backend = vantage_ui::backend_from_env();
    let log_result = match backend {
        vantage_ui::Backend::Tui => init_logging_for_tui(Some(options.log_level)).map(|_| ()),
        vantage_ui::Backend::Headless => init_logging_with_level(options.log_level, LogFormat::Pretty),
    };
    if let Err(err) = log_result {
        eprintln!("Failed to initialize logging: {err}");
        process::exit(1);
    }

    if let Err(err) = run(target.as_deref(), &entrypoints, &options, backend) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(
    target: Option<&str>,
    entrypoints: &[String],
    options: &Options,
    backend: vantage_ui::Backend,
) -> Result<(), Box<dyn std::error::Error>>
{
    let resolved = vantage_core::resolve(target, entrypoints, options)?;
    let vantage_core::ResolvedSession {
        spec,
        mut engine,
        options: effective,
        plugin_results,
        entrypoints: eps,
    } = resolved;

    info!(kind = %spec.kind, entrypoints = eps.len(), plugins = plugin_results.len(), "session resolved");

    let mut session = SessionHandle::open(effective.session_file.clone(), effective.new_session)?;
    session.replay(engine.as_mut())?;

    // Hook code runs after session replay, right before the window opens.
    for code in &effective.hook_code {
        engine.eval_hook(code)?;
    }

    let title = format!("{} - vantage", engine.describe());

    let (_engine, session) = match backend {
        vantage_ui::Backend::Tui => {
            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
            rt.block_on(vantage_ui::run_tui(engine, title, session))?
        }
        vantage_ui::Backend::Headless => vantage_ui::run_headless(engine, &title, session),
    };

    session.close()?;
    Ok(())
}
