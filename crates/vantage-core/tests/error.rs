//! Tests for error handling

use vantage_core::error::{Result, VantageError};

#[test]
fn test_target_not_found_display()
{
    let error = VantageError::TargetNotFound("pid 12345".to_string());
    let message = format!("{}", error);
    assert!(message.contains("12345"));
    assert!(message.contains("no such target"));
}

#[test]
fn test_malformed_address_display()
{
    let error = VantageError::MalformedAddress("0xzz".to_string());
    let message = format!("{}", error);
    assert!(message.contains("0xzz"));
    assert!(message.contains("malformed"));
}

#[test]
fn test_decode_failure_names_the_file()
{
    let error = VantageError::DecodeFailure {
        path: "/tmp/blob".into(),
        reason: "truncated header".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("/tmp/blob"));
    assert!(message.contains("truncated header"));
}

#[test]
fn test_unknown_cpu_lists_known_identifiers()
{
    let error = VantageError::UnknownCpu("z80".to_string());
    let message = format!("{}", error);
    assert!(message.contains("z80"));
    assert!(message.contains("x86_64"));
}

#[test]
fn test_script_error_carries_location()
{
    let error = VantageError::Script {
        source_name: "bad.vplug".to_string(),
        line: 7,
        message: "unknown command `frob`".to_string(),
    };
    let message = format!("{}", error);
    assert!(message.contains("bad.vplug:7"));
    assert!(message.contains("frob"));
}

#[test]
fn test_io_error_converts()
{
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: VantageError = io.into();
    assert!(matches!(error, VantageError::Io(_)));
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: Result<()> = Ok(());
    let _error_result: Result<()> = Err(VantageError::TargetNotFound("x".to_string()));
}
