//! End-to-end launcher pipeline tests: classification through artifact
//! loading, entrypoint dispatch, and session persistence, over real files in
//! a temp directory.

use std::fs;

use vantage_core::entrypoint::Entrypoint;
use vantage_core::session::{SessionHandle, UserAction};
use vantage_core::{resolve, Address, Engine, Options, TargetKind, VantageError};

/// Minimal ELF64 x86_64 header, enough for signature detection.
fn tiny_elf(entry: u64) -> Vec<u8>
{
    let mut bytes = vec![0u8; 64];
    bytes[0..4].copy_from_slice(b"\x7fELF");
    bytes[4] = 2;
    bytes[5] = 1;
    bytes[6] = 1;
    bytes[16] = 2;
    bytes[18] = 62;
    bytes[20] = 1;
    bytes[24..32].copy_from_slice(&entry.to_le_bytes());
    bytes[52] = 64;
    bytes
}

#[test]
fn full_static_launch_with_artifacts()
{
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("prog.bin");
    fs::write(&target, tiny_elf(0x40_1000)).unwrap();
    fs::write(dir.path().join("prog.map"), "0x401000 entry0\n0x402000 helper\n").unwrap();
    fs::write(dir.path().join("prog.h"), "int helper(int x);\n").unwrap();
    fs::write(
        dir.path().join("prog.vplug"),
        "comment entry0 autoloaded plugin was here\n",
    )
    .unwrap();

    let options = Options {
        autoload: true,
        ..Options::default()
    };
    let resolved = resolve(Some(target.to_str().unwrap()), &["entry0".to_string()], &options).unwrap();

    assert_eq!(resolved.spec.kind, TargetKind::StaticExecutable);
    assert_eq!(resolved.plugin_results.len(), 1);
    assert!(resolved.plugin_results[0].succeeded);

    let analysis = resolved.engine.analysis();
    assert_eq!(analysis.resolve_label("helper"), Some(Address::new(0x40_2000)));
    assert_eq!(analysis.prototypes(), ["helper"]);
    assert_eq!(analysis.comment_at(Address::new(0x40_1000)), Some("autoloaded plugin was here"));
    // The entrypoint label resolved through the map and drove focus.
    assert_eq!(analysis.cursor(), Some(Address::new(0x40_1000)));
}

#[test]
fn plugin_failures_are_isolated_per_item()
{
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("prog.bin");
    fs::write(&target, [0x90u8, 0xc3]).unwrap();

    let mut plugins = Vec::new();
    for (name, body) in [
        ("a.vplug", "rename 0x0 sc_entry\n"),
        ("b.vplug", "this is not a command\n"),
        ("c.vplug", "comment sc_entry nop sled\n"),
    ] {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        plugins.push(p);
    }

    let options = Options {
        plugins,
        ..Options::default()
    };
    let resolved = resolve(Some(target.to_str().unwrap()), &[], &options).unwrap();

    let succeeded: Vec<bool> = resolved.plugin_results.iter().map(|r| r.succeeded).collect();
    assert_eq!(succeeded, [true, false, true]);
    assert!(resolved.plugin_results[1].error.is_some());
    // The session still started and the later plugin saw the earlier one's label.
    assert_eq!(
        resolved.engine.analysis().comment_at(Address::ZERO),
        Some("nop sled")
    );
}

#[test]
fn session_round_trip_across_launches()
{
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("prog.bin");
    fs::write(&target, [0x90u8, 0xc3]).unwrap();
    let session_path = dir.path().join("prog.vantage-session");

    // First launch: fresh session, record a few actions.
    {
        let mut resolved = resolve(Some(target.to_str().unwrap()), &[], &Options::default()).unwrap();
        let mut session = SessionHandle::open(Some(session_path.clone()), false).unwrap();
        assert_eq!(session.resumed_len(), 0);

        for action in [
            UserAction::Rename {
                addr: 0,
                name: "sc_entry".to_string(),
            },
            UserAction::Disassemble { addr: 0 },
            UserAction::FocusLabel {
                label: "sc_entry".to_string(),
            },
        ] {
            vantage_core::session::apply(resolved.engine.as_mut(), &action).unwrap();
            session.record(action);
        }
        session.close().unwrap();
    }

    // Second launch: resume and replay before recording anything new.
    {
        let mut resolved = resolve(Some(target.to_str().unwrap()), &[], &Options::default()).unwrap();
        let session = SessionHandle::open(Some(session_path.clone()), false).unwrap();
        assert_eq!(session.resumed_len(), 3);
        session.replay(resolved.engine.as_mut()).unwrap();

        let analysis = resolved.engine.analysis();
        assert_eq!(analysis.label_at(Address::ZERO), Some("sc_entry"));
        assert_eq!(analysis.cursor(), Some(Address::ZERO));
        assert_eq!(analysis.roots().len(), 1);
    }

    // Third launch with a fresh session: prior content is discarded.
    {
        let mut session = SessionHandle::open(Some(session_path.clone()), true).unwrap();
        session.record(UserAction::FocusAddr { addr: 0x42 });
        session.close().unwrap();

        let session = SessionHandle::open(Some(session_path), false).unwrap();
        assert_eq!(session.actions(), [UserAction::FocusAddr { addr: 0x42 }]);
    }
}

#[test]
fn autoloaded_session_file_is_discovered()
{
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("prog.bin");
    fs::write(&target, [0x90u8]).unwrap();
    let session_path = dir.path().join("prog.vantage-session");
    fs::write(&session_path, "{\"action\":\"focus_addr\",\"addr\":16}\n").unwrap();

    let options = Options {
        autoload: true,
        ..Options::default()
    };
    let resolved = resolve(Some(target.to_str().unwrap()), &[], &options).unwrap();
    assert_eq!(resolved.options.session_file, Some(session_path));
}

#[test]
fn live_target_without_a_match_is_fatal()
{
    // A pid far outside any plausible pid range.
    let err = resolve(Some("live:3999999999"), &[], &Options::default()).unwrap_err();
    assert!(matches!(err, VantageError::TargetNotFound(_)));
}

#[test]
fn remote_target_without_a_listener_is_fatal()
{
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = resolve(Some(&endpoint), &[], &Options::default()).unwrap_err();
    assert!(matches!(err, VantageError::TargetNotFound(_)));
}

#[test]
fn hook_strings_run_against_the_engine()
{
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("prog.bin");
    fs::write(&target, [0x90u8, 0xc3]).unwrap();

    let mut resolved = resolve(Some(target.to_str().unwrap()), &[], &Options::default()).unwrap();
    vantage_core::script::run_str(resolved.engine.as_mut(), "rename 0x1 hooked").unwrap();
    assert_eq!(resolved.engine.analysis().label_at(Address::new(1)), Some("hooked"));

    // Hook errors are fatal, unlike plugin errors.
    assert!(vantage_core::script::run_str(resolved.engine.as_mut(), "bogus").is_err());
}

#[test]
fn emulated_target_sets_pc_to_first_entrypoint()
{
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("code.bin");
    fs::write(&target, [0x90u8, 0x90, 0xc3]).unwrap();

    let raw = format!("emu:{}", target.display());
    let resolved = resolve(Some(&raw), &["0x2".to_string()], &Options::default()).unwrap();

    assert_eq!(resolved.spec.kind, TargetKind::Emulated);
    assert_eq!(resolved.engine.analysis().cursor(), Some(Address::new(2)));
    assert_eq!(resolved.entrypoints, vec![Entrypoint::Address(Address::new(2))]);
    assert_eq!(resolved.engine.describe(), format!("emu:{}", target.display()));
}

#[test]
fn no_target_opens_an_empty_window()
{
    let resolved = resolve(None, &[], &Options::default()).unwrap();
    assert_eq!(resolved.spec.kind, TargetKind::StaticExecutable);
    assert!(resolved.engine.analysis().image().is_none());
    assert_eq!(resolved.engine.describe(), "(no target)");
}
