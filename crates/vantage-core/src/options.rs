//! Launcher option bag.

use std::path::PathBuf;

use vantage_utils::LogLevel;

/// Every option the launcher recognizes.
///
/// Built once from CLI input and read-only thereafter. Autoload never
/// mutates an `Options` in place; it produces an enriched copy (see
/// [`crate::artifacts::autoload`]), so explicit CLI values always win.
#[derive(Debug, Clone)]
pub struct Options
{
    /// Do not backtrace memory read/write accesses
    pub no_data_trace: bool,
    /// Enable backtrace-related debug output (very verbose)
    pub debug_backtrace: bool,
    /// Plugin scripts to load, in order
    pub plugins: Vec<PathBuf>,
    /// Hook code strings to evaluate after startup, in order
    pub hook_code: Vec<String>,
    /// Map file (addr <-> name associations) to load
    pub map_file: Option<PathBuf>,
    /// Use the fast-and-shallow disassembly pass for CLI entrypoints
    pub fast: bool,
    /// Request a decompilation pass once disassembly finishes
    pub decompile: bool,
    /// CPU registry identifier overriding auto-detection
    pub cpu: Option<String>,
    /// Executable-format registry identifier overriding signature detection
    pub exe_format: Option<String>,
    /// Rebase the loaded image to this address before analysis
    pub rebase: Option<u64>,
    /// C header file with external function prototypes
    pub c_header: Option<PathBuf>,
    /// Derive sibling artifacts (.map, .h, plugin, session) from the target
    pub autoload: bool,
    /// Record/replay user actions in this session file
    pub session_file: Option<PathBuf>,
    /// Discard any existing session file and start fresh
    pub new_session: bool,
    /// Also disassemble the target's default entrypoint set
    pub dasm_all_entrypoints: bool,
    /// Verbosity, carried as data instead of a process-wide flag
    pub log_level: LogLevel,
}

impl Default for Options
{
    fn default() -> Self
    {
        Self {
            no_data_trace: false,
            debug_backtrace: false,
            plugins: Vec::new(),
            hook_code: Vec::new(),
            map_file: None,
            fast: false,
            decompile: false,
            cpu: None,
            exe_format: None,
            rebase: None,
            c_header: None,
            autoload: false,
            session_file: None,
            new_session: false,
            dasm_all_entrypoints: false,
            log_level: LogLevel::Info,
        }
    }
}
