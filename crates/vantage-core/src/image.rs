//! # Executable Image Loading
//!
//! Decodes a file on disk into a [`LoadedImage`]: container format, CPU,
//! base address, entry address, and the symbol/export tables the analysis
//! seeds its labels from.
//!
//! Format selection follows the launcher contract: an explicit `--exe`
//! override wins; otherwise the file signature decides; a file with no
//! recognizable signature is interpreted as raw shellcode under the given or
//! default CPU. Decoding failures are fatal: no partial image is returned.

use std::fs;
use std::path::{Path, PathBuf};

use object::{Object, ObjectSegment, ObjectSymbol};
use tracing::debug;

use crate::error::{Result, VantageError};
use crate::registry::{Cpu, ExeFormat};
use crate::types::Address;

/// A decoded executable image.
///
/// All addresses are in the image's final address space: [`LoadedImage::rebase`]
/// must run before entrypoint resolution, since entrypoints are expressed in
/// the rebased space.
#[derive(Debug, Clone)]
pub struct LoadedImage
{
    /// File the image was decoded from
    pub path: PathBuf,
    /// Container format, detected or overridden
    pub format: ExeFormat,
    /// CPU, detected or overridden
    pub cpu: Cpu,
    /// Load base address
    pub base: Address,
    /// Declared entry address, if the format carries one
    pub entry: Option<Address>,
    /// Defined symbols, demangled name -> address
    symbols: Vec<(String, Address)>,
    /// Exported symbols, name -> address
    exports: Vec<(String, Address)>,
    /// Raw image size in bytes
    pub size: u64,
}

impl LoadedImage
{
    /// Decode the file at `path`.
    ///
    /// `format_override` and `cpu_override` come from the registry lookups of
    /// `--exe` and `--cpu`. With no override the signature decides, falling
    /// back to shellcode; with an override the file must actually be that
    /// format.
    ///
    /// ## Errors
    ///
    /// [`VantageError::DecodeFailure`] when the file cannot be read, the
    /// detected format contradicts an explicit override, or the architecture
    /// is not in the CPU registry.
    pub fn decode_file(path: &Path, cpu_override: Option<Cpu>, format_override: Option<ExeFormat>) -> Result<Self>
    {
        let bytes = fs::read(path).map_err(|err| VantageError::DecodeFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        if format_override == Some(ExeFormat::Shellcode) {
            return Ok(Self::raw(path, &bytes, cpu_override.unwrap_or(Cpu::host())));
        }

        match object::File::parse(&*bytes) {
            Ok(file) => {
                let detected = container_format(&file, path)?;
                if let Some(wanted) = format_override {
                    if wanted != detected {
                        return Err(VantageError::DecodeFailure {
                            path: path.to_path_buf(),
                            reason: format!("file is {detected}, not the requested {wanted}"),
                        });
                    }
                }

                let cpu = match cpu_override {
                    Some(cpu) => cpu,
                    None => detect_cpu(&file, path)?,
                };

                let base = file.segments().map(|seg| seg.address()).min().unwrap_or(0);
                let entry = match file.entry() {
                    0 => None,
                    addr => Some(Address::new(addr)),
                };

                let mut symbols: Vec<(String, Address)> = file
                    .symbols()
                    .chain(file.dynamic_symbols())
                    .filter(|sym| sym.is_definition())
                    .filter_map(|sym| {
                        let name = sym.name().ok()?;
                        if name.is_empty() {
                            return None;
                        }
                        Some((
                            rustc_demangle::demangle(name).to_string(),
                            Address::new(sym.address()),
                        ))
                    })
                    .collect();
                symbols.sort();
                symbols.dedup();

                let exports = file
                    .exports()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|exp| {
                        (
                            String::from_utf8_lossy(exp.name()).into_owned(),
                            Address::new(exp.address()),
                        )
                    })
                    .collect();

                debug!(path = %path.display(), format = %detected, %cpu, "decoded executable");

                Ok(Self {
                    path: path.to_path_buf(),
                    format: detected,
                    cpu,
                    base: Address::new(base),
                    entry,
                    symbols,
                    exports,
                    size: bytes.len() as u64,
                })
            }
            Err(err) => {
                if format_override.is_some() {
                    return Err(VantageError::DecodeFailure {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    });
                }
                // No recognizable signature: raw shellcode under the given
                // or default CPU.
                debug!(path = %path.display(), "no executable signature, loading as shellcode");
                Ok(Self::raw(path, &bytes, cpu_override.unwrap_or(Cpu::host())))
            }
        }
    }

    /// Build a flat shellcode image: base 0, entry at the first byte.
    fn raw(path: &Path, bytes: &[u8], cpu: Cpu) -> Self
    {
        Self {
            path: path.to_path_buf(),
            format: ExeFormat::Shellcode,
            cpu,
            base: Address::ZERO,
            entry: Some(Address::ZERO),
            symbols: Vec::new(),
            exports: Vec::new(),
            size: bytes.len() as u64,
        }
    }

    /// Relocate the image to `new_base`, shifting entry, symbols, and
    /// exports by the same delta.
    pub fn rebase(&mut self, new_base: Address)
    {
        let delta = new_base.value().wrapping_sub(self.base.value());
        if delta == 0 {
            return;
        }

        self.base = new_base;
        self.entry = self.entry.map(|addr| addr + delta);
        for (_, addr) in self.symbols.iter_mut().chain(self.exports.iter_mut()) {
            *addr = *addr + delta;
        }
    }

    /// Resolve a symbol or export name to an address.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Address>
    {
        self.symbols
            .iter()
            .chain(self.exports.iter())
            .find(|(sym, _)| sym == name)
            .map(|&(_, addr)| addr)
    }

    /// Defined symbols, demangled.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, Address)>
    {
        self.symbols.iter().map(|(name, addr)| (name.as_str(), *addr))
    }

    /// Exported symbols.
    pub fn exports(&self) -> impl Iterator<Item = (&str, Address)>
    {
        self.exports.iter().map(|(name, addr)| (name.as_str(), *addr))
    }
}

fn container_format(file: &object::File<'_>, path: &Path) -> Result<ExeFormat>
{
    match file.format() {
        object::BinaryFormat::Elf => Ok(ExeFormat::Elf),
        object::BinaryFormat::Pe | object::BinaryFormat::Coff => Ok(ExeFormat::Pe),
        object::BinaryFormat::MachO => Ok(ExeFormat::MachO),
        other => Err(VantageError::DecodeFailure {
            path: path.to_path_buf(),
            reason: format!("unsupported container format {other:?}"),
        }),
    }
}

fn detect_cpu(file: &object::File<'_>, path: &Path) -> Result<Cpu>
{
    match file.architecture() {
        object::Architecture::I386 => Ok(Cpu::X86),
        object::Architecture::X86_64 => Ok(Cpu::X86_64),
        object::Architecture::Arm => Ok(Cpu::Arm),
        object::Architecture::Aarch64 => Ok(Cpu::Arm64),
        object::Architecture::Mips => Ok(Cpu::Mips),
        object::Architecture::Riscv64 => Ok(Cpu::RiscV64),
        other => Err(VantageError::DecodeFailure {
            path: path.to_path_buf(),
            reason: format!("unsupported architecture {other:?}"),
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests
{
    use std::io::Write;

    use super::*;

    /// Minimal ELF64 x86_64 header: enough for signature detection, no
    /// program or section tables.
    pub(crate) fn tiny_elf(entry: u64) -> Vec<u8>
    {
        let mut bytes = vec![0u8; 64];
        bytes[0..4].copy_from_slice(b"\x7fELF");
        bytes[4] = 2; // ELFCLASS64
        bytes[5] = 1; // little endian
        bytes[6] = 1; // EV_CURRENT
        bytes[16] = 2; // ET_EXEC
        bytes[18] = 62; // EM_X86_64
        bytes[20] = 1; // e_version
        bytes[24..32].copy_from_slice(&entry.to_le_bytes());
        bytes[52] = 64; // e_ehsize
        bytes
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf
    {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_elf_autodetect()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.bin", &tiny_elf(0x40_1000));

        let image = LoadedImage::decode_file(&path, None, None).unwrap();
        assert_eq!(image.format, ExeFormat::Elf);
        assert_eq!(image.cpu, Cpu::X86_64);
        assert_eq!(image.entry, Some(Address::new(0x40_1000)));
    }

    #[test]
    fn test_shellcode_fallback()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "sc.bin", &[0x90, 0x90, 0xc3]);

        let image = LoadedImage::decode_file(&path, Some(Cpu::X86), None).unwrap();
        assert_eq!(image.format, ExeFormat::Shellcode);
        assert_eq!(image.cpu, Cpu::X86);
        assert_eq!(image.base, Address::ZERO);
        assert_eq!(image.entry, Some(Address::ZERO));
        assert_eq!(image.size, 3);
    }

    #[test]
    fn test_format_override_mismatch_fails()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.bin", &tiny_elf(0x1000));

        let err = LoadedImage::decode_file(&path, None, Some(ExeFormat::Pe)).unwrap_err();
        assert!(matches!(err, VantageError::DecodeFailure { .. }));
    }

    #[test]
    fn test_explicit_shellcode_override_skips_detection()
    {
        let dir = tempfile::tempdir().unwrap();
        // A real ELF forced to decode as raw bytes.
        let path = write_temp(&dir, "a.bin", &tiny_elf(0x1000));

        let image = LoadedImage::decode_file(&path, None, Some(ExeFormat::Shellcode)).unwrap();
        assert_eq!(image.format, ExeFormat::Shellcode);
        assert_eq!(image.entry, Some(Address::ZERO));
    }

    #[test]
    fn test_missing_file_is_decode_failure()
    {
        let err = LoadedImage::decode_file(Path::new("/nonexistent/prog"), None, None).unwrap_err();
        assert!(matches!(err, VantageError::DecodeFailure { .. }));
    }

    #[test]
    fn test_rebase_shifts_entry()
    {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.bin", &tiny_elf(0x40));

        let mut image = LoadedImage::decode_file(&path, None, None).unwrap();
        image.rebase(Address::new(0x10_0000));
        assert_eq!(image.base, Address::new(0x10_0000));
        assert_eq!(image.entry, Some(Address::new(0x10_0040)));
    }
}
