//! # CPU and Executable-Format Registries
//!
//! Closed registries mapping identifier strings to backend constructors.
//!
//! The launcher accepts `--cpu` and `--exe` overrides on the command line.
//! Both are resolved here against a fixed table of known identifiers; an
//! unknown identifier is rejected with a clear error. Nothing on this path
//! ever evaluates operator-supplied input as code.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Result, VantageError};

/// CPU family an image is decoded or emulated under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cpu
{
    /// 32-bit x86
    X86,
    /// 64-bit x86 (Intel/AMD)
    X86_64,
    /// 32-bit ARM
    Arm,
    /// 64-bit ARM
    Arm64,
    /// 32-bit MIPS
    Mips,
    /// 64-bit RISC-V
    RiscV64,
}

impl Cpu
{
    /// CPU of the machine the launcher itself runs on.
    ///
    /// Used as the default for shellcode and remote targets when no `--cpu`
    /// override is given.
    pub const fn host() -> Self
    {
        #[cfg(target_arch = "x86_64")]
        {
            Cpu::X86_64
        }

        #[cfg(target_arch = "aarch64")]
        {
            Cpu::Arm64
        }

        #[cfg(target_arch = "x86")]
        {
            Cpu::X86
        }

        #[cfg(target_arch = "arm")]
        {
            Cpu::Arm
        }

        #[cfg(target_arch = "riscv64")]
        {
            Cpu::RiscV64
        }

        #[cfg(not(any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "x86",
            target_arch = "arm",
            target_arch = "riscv64"
        )))]
        {
            Cpu::X86_64
        }
    }

    /// Size of a pointer in bytes for this CPU.
    #[must_use]
    pub const fn pointer_size_bytes(self) -> u8
    {
        match self {
            Cpu::X86 | Cpu::Arm | Cpu::Mips => 4,
            Cpu::X86_64 | Cpu::Arm64 | Cpu::RiscV64 => 8,
        }
    }
}

impl fmt::Display for Cpu
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Cpu::X86 => write!(f, "x86"),
            Cpu::X86_64 => write!(f, "x86_64"),
            Cpu::Arm => write!(f, "arm"),
            Cpu::Arm64 => write!(f, "arm64"),
            Cpu::Mips => write!(f, "mips"),
            Cpu::RiscV64 => write!(f, "riscv64"),
        }
    }
}

/// Executable container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExeFormat
{
    /// ELF (Linux and most Unixes)
    Elf,
    /// PE (Windows)
    Pe,
    /// Mach-O (macOS)
    MachO,
    /// Flat raw shellcode, no container
    Shellcode,
}

impl fmt::Display for ExeFormat
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ExeFormat::Elf => write!(f, "elf"),
            ExeFormat::Pe => write!(f, "pe"),
            ExeFormat::MachO => write!(f, "macho"),
            ExeFormat::Shellcode => write!(f, "shellcode"),
        }
    }
}

static CPU_REGISTRY: Lazy<HashMap<&'static str, Cpu>> = Lazy::new(|| {
    HashMap::from([
        ("x86", Cpu::X86),
        ("ia32", Cpu::X86),
        ("i386", Cpu::X86),
        ("x86_64", Cpu::X86_64),
        ("x64", Cpu::X86_64),
        ("amd64", Cpu::X86_64),
        ("arm", Cpu::Arm),
        ("arm64", Cpu::Arm64),
        ("aarch64", Cpu::Arm64),
        ("mips", Cpu::Mips),
        ("riscv64", Cpu::RiscV64),
    ])
});

static FORMAT_REGISTRY: Lazy<HashMap<&'static str, ExeFormat>> = Lazy::new(|| {
    HashMap::from([
        ("elf", ExeFormat::Elf),
        ("pe", ExeFormat::Pe),
        ("macho", ExeFormat::MachO),
        ("mach-o", ExeFormat::MachO),
        ("raw", ExeFormat::Shellcode),
        ("bin", ExeFormat::Shellcode),
        ("shellcode", ExeFormat::Shellcode),
    ])
});

/// Resolve a CPU identifier against the registry.
///
/// ## Errors
///
/// Returns [`VantageError::UnknownCpu`] for identifiers not in the table.
pub fn lookup_cpu(identifier: &str) -> Result<Cpu>
{
    CPU_REGISTRY
        .get(identifier.to_lowercase().as_str())
        .copied()
        .ok_or_else(|| VantageError::UnknownCpu(identifier.to_string()))
}

/// Resolve an executable-format identifier against the registry.
///
/// ## Errors
///
/// Returns [`VantageError::UnknownFormat`] for identifiers not in the table.
pub fn lookup_format(identifier: &str) -> Result<ExeFormat>
{
    FORMAT_REGISTRY
        .get(identifier.to_lowercase().as_str())
        .copied()
        .ok_or_else(|| VantageError::UnknownFormat(identifier.to_string()))
}

/// Sorted list of known CPU identifiers, for error messages and `--help`.
pub fn known_cpus() -> Vec<&'static str>
{
    let mut names: Vec<_> = CPU_REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Sorted list of known format identifiers.
pub fn known_formats() -> Vec<&'static str>
{
    let mut names: Vec<_> = FORMAT_REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_cpu_aliases_resolve()
    {
        assert_eq!(lookup_cpu("x86_64").unwrap(), Cpu::X86_64);
        assert_eq!(lookup_cpu("amd64").unwrap(), Cpu::X86_64);
        assert_eq!(lookup_cpu("ia32").unwrap(), Cpu::X86);
        assert_eq!(lookup_cpu("AArch64").unwrap(), Cpu::Arm64);
    }

    #[test]
    fn test_unknown_cpu_rejected()
    {
        // The original evaluated unrecognized identifiers as code; the
        // registry rejects them instead.
        assert!(matches!(lookup_cpu("Ia32.new"), Err(VantageError::UnknownCpu(_))));
        assert!(matches!(lookup_cpu("z80"), Err(VantageError::UnknownCpu(_))));
    }

    #[test]
    fn test_format_aliases_resolve()
    {
        assert_eq!(lookup_format("elf").unwrap(), ExeFormat::Elf);
        assert_eq!(lookup_format("mach-o").unwrap(), ExeFormat::MachO);
        assert_eq!(lookup_format("raw").unwrap(), ExeFormat::Shellcode);
        assert!(lookup_format("a.out").is_err());
    }

    #[test]
    fn test_pointer_sizes()
    {
        assert_eq!(Cpu::X86.pointer_size_bytes(), 4);
        assert_eq!(Cpu::Arm64.pointer_size_bytes(), 8);
    }
}
