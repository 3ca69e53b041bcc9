//! # Entrypoint Resolution
//!
//! Converts the trailing positional CLI arguments into typed entrypoints.
//!
//! The rule is per-token and keys off the first byte: a token starting with
//! an ASCII digit must parse as an integer address (decimal or
//! `0x`/`0o`/`0b` prefixed) or the whole launch fails with
//! `MalformedAddress`; any other token is a symbolic label the engine
//! resolves later. List order is preserved: the first entrypoint drives the
//! initial view focus.

use crate::engine::Engine;
use crate::error::{Result, VantageError};
use crate::types::Address;

/// An analysis starting point: an absolute address or a symbol name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entrypoint
{
    /// Absolute address in the image's final (rebased) address space
    Address(Address),
    /// Symbolic label, resolved by the engine
    Label(String),
}

impl std::fmt::Display for Entrypoint
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self {
            Entrypoint::Address(addr) => write!(f, "{addr}"),
            Entrypoint::Label(name) => write!(f, "{name}"),
        }
    }
}

/// Parse one positional token into an entrypoint.
///
/// ## Errors
///
/// [`VantageError::MalformedAddress`] when the token starts with a digit but
/// is not a valid integer literal.
pub fn parse_entrypoint(token: &str) -> Result<Entrypoint>
{
    if token.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        return parse_address(token).map(Entrypoint::Address);
    }
    Ok(Entrypoint::Label(token.to_string()))
}

/// Parse an integer address literal: `0x` hex, `0o` octal, `0b` binary, or
/// decimal.
pub fn parse_address(token: &str) -> Result<Address>
{
    let malformed = || VantageError::MalformedAddress(token.to_string());

    let (digits, radix) = if let Some(rest) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        (rest, 16)
    } else if let Some(rest) = token.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = token.strip_prefix("0b") {
        (rest, 2)
    } else {
        (token, 10)
    };

    u64::from_str_radix(digits, radix).map(Address::new).map_err(|_| malformed())
}

/// Resolve the full entrypoint list for a launch.
///
/// Explicit entrypoints come first, in argument order. With `dasm_all` the
/// engine's default entrypoint set (declared entry plus exports) is appended;
/// entries that duplicate an explicit entrypoint are dropped.
///
/// ## Errors
///
/// Propagates [`VantageError::MalformedAddress`] from token parsing.
pub fn resolve_entrypoints(raw: &[String], dasm_all: bool, engine: &dyn Engine) -> Result<Vec<Entrypoint>>
{
    let mut entrypoints = raw
        .iter()
        .map(|token| parse_entrypoint(token))
        .collect::<Result<Vec<_>>>()?;

    if dasm_all {
        for ep in engine.default_entrypoints() {
            if !entrypoints.contains(&ep) {
                entrypoints.push(ep);
            }
        }
    }

    Ok(entrypoints)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_digit_leading_tokens_parse_as_addresses()
    {
        assert_eq!(parse_entrypoint("4096").unwrap(), Entrypoint::Address(Address::new(4096)));
        assert_eq!(
            parse_entrypoint("0x1000").unwrap(),
            Entrypoint::Address(Address::new(0x1000))
        );
        assert_eq!(parse_entrypoint("0o17").unwrap(), Entrypoint::Address(Address::new(0o17)));
        assert_eq!(parse_entrypoint("0b101").unwrap(), Entrypoint::Address(Address::new(5)));
    }

    #[test]
    fn test_malformed_addresses_fail()
    {
        assert!(matches!(
            parse_entrypoint("0xzz"),
            Err(VantageError::MalformedAddress(_))
        ));
        assert!(matches!(
            parse_entrypoint("12ab"),
            Err(VantageError::MalformedAddress(_))
        ));
        assert!(matches!(parse_entrypoint("0x"), Err(VantageError::MalformedAddress(_))));
    }

    #[test]
    fn test_non_digit_tokens_are_labels()
    {
        assert_eq!(parse_entrypoint("main").unwrap(), Entrypoint::Label("main".to_string()));
        // Only a leading digit selects address parsing.
        assert_eq!(
            parse_entrypoint("_0x1000").unwrap(),
            Entrypoint::Label("_0x1000".to_string())
        );
    }
}
