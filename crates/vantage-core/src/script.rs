//! # Plugin and Hook Script Execution
//!
//! Plugins and `--eval` hook strings are programs in a small closed command
//! language, one command per line, executed synchronously against the
//! engine:
//!
//! ```text
//! # comments and blank lines are skipped
//! goto 0x1000
//! rename 0x1000 decrypt_loop
//! comment decrypt_loop xor key lives in rsi
//! disassemble decrypt_loop
//! map extra.map
//! echo plugin loaded
//! ```
//!
//! Any parse or execution error aborts the script with a line-numbered
//! error. The caller decides what that means: the artifact loader catches it
//! per plugin, while hook strings propagate it and abort startup.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::engine::Engine;
use crate::entrypoint::{self, Entrypoint};
use crate::error::{Result, VantageError};
use crate::types::Address;

/// Execute a plugin script file.
///
/// ## Errors
///
/// [`VantageError::Script`] with the file path and 1-based line number of
/// the first failing command, or an I/O-shaped `Script` error when the file
/// cannot be read.
pub fn run_file<E: Engine + ?Sized>(engine: &mut E, path: &Path) -> Result<()>
{
    let source_name = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|err| VantageError::Script {
        source_name: source_name.clone(),
        line: 0,
        message: err.to_string(),
    })?;

    run(engine, &text, &source_name)
}

/// Execute hook code handed over on the command line.
///
/// ## Errors
///
/// [`VantageError::Script`] naming `<eval>` as the source.
pub fn run_str<E: Engine + ?Sized>(engine: &mut E, code: &str) -> Result<()>
{
    run(engine, code, "<eval>")
}

fn run<E: Engine + ?Sized>(engine: &mut E, text: &str, source_name: &str) -> Result<()>
{
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        execute(engine, trimmed).map_err(|message| VantageError::Script {
            source_name: source_name.to_string(),
            line: idx + 1,
            message,
        })?;
    }

    Ok(())
}

fn execute<E: Engine + ?Sized>(engine: &mut E, line: &str) -> std::result::Result<(), String>
{
    let mut parts = line.splitn(2, char::is_whitespace);
    let verb = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match verb {
        "goto" => {
            let addr = resolve_place(engine, rest)?;
            engine.analysis_mut().focus(addr);
        }
        "rename" => {
            let (place, name) = split_arg(rest, "rename <addr|label> <name>")?;
            let addr = resolve_place(engine, place)?;
            engine.analysis_mut().rename_label(addr, name);
        }
        "comment" => {
            let (place, text) = split_arg(rest, "comment <addr|label> <text>")?;
            let addr = resolve_place(engine, place)?;
            engine.analysis_mut().set_comment(addr, text);
        }
        "disassemble" => {
            let ep = parse_place(rest)?;
            engine.disassemble(&ep).map_err(|err| err.to_string())?;
        }
        "map" => {
            if rest.is_empty() {
                return Err("map <path>".to_string());
            }
            engine.analysis_mut().load_map(Path::new(rest)).map_err(|err| err.to_string())?;
        }
        "echo" => {
            info!("{rest}");
        }
        other => {
            return Err(format!("unknown command `{other}`"));
        }
    }

    Ok(())
}

fn split_arg<'a>(rest: &'a str, usage: &str) -> std::result::Result<(&'a str, &'a str), String>
{
    rest.split_once(char::is_whitespace)
        .map(|(a, b)| (a, b.trim()))
        .filter(|(a, b)| !a.is_empty() && !b.is_empty())
        .ok_or_else(|| usage.to_string())
}

fn parse_place(token: &str) -> std::result::Result<Entrypoint, String>
{
    if token.is_empty() {
        return Err("missing address or label".to_string());
    }
    entrypoint::parse_entrypoint(token).map_err(|err| err.to_string())
}

fn resolve_place<E: Engine + ?Sized>(engine: &E, token: &str) -> std::result::Result<Address, String>
{
    match parse_place(token)? {
        Entrypoint::Address(addr) => Ok(addr),
        Entrypoint::Label(name) => engine
            .analysis()
            .resolve_label(&name)
            .ok_or_else(|| format!("unknown label `{name}`")),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::engines::static_dasm::StaticDisassembler;

    fn test_engine() -> StaticDisassembler
    {
        StaticDisassembler::empty()
    }

    #[test]
    fn test_commands_execute_in_order()
    {
        let mut engine = test_engine();
        run_str(
            &mut engine,
            "goto 0x1000\nrename 0x1000 start\ncomment start begins here\ndisassemble start",
        )
        .unwrap();

        let analysis = engine.analysis();
        assert_eq!(analysis.cursor(), Some(Address::new(0x1000)));
        assert_eq!(analysis.label_at(Address::new(0x1000)), Some("start"));
        assert_eq!(analysis.comment_at(Address::new(0x1000)), Some("begins here"));
        assert_eq!(analysis.roots()[0].addr, Some(Address::new(0x1000)));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped()
    {
        let mut engine = test_engine();
        run_str(&mut engine, "# nothing\n\n   \n# more nothing").unwrap();
        assert_eq!(engine.analysis().cursor(), None);
    }

    #[test]
    fn test_errors_carry_line_numbers()
    {
        let mut engine = test_engine();
        let err = run_str(&mut engine, "goto 0x10\nfrobnicate all").unwrap_err();
        match err {
            VantageError::Script { source_name, line, .. } => {
                assert_eq!(source_name, "<eval>");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_label_fails()
    {
        let mut engine = test_engine();
        assert!(run_str(&mut engine, "goto nowhere").is_err());
    }

    #[test]
    fn test_run_file_missing_is_error()
    {
        let mut engine = test_engine();
        assert!(run_file(&mut engine, Path::new("/no/such.vplug")).is_err());
    }
}
