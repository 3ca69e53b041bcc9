//! # Analysis State
//!
//! The per-session analysis state every backend engine carries: the loaded
//! image (if any), label and comment annotations, queued disassembly roots,
//! and the view cursor.
//!
//! The actual instruction decoding is done by the disassembler collaborator;
//! this state is what the launcher, the session replay, and the window all
//! read and mutate. It is owned by exactly one engine and passed `&mut`
//! through the pipeline stages: nothing here is shared or locked.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Result, VantageError};
use crate::image::LoadedImage;
use crate::types::Address;

/// A queued disassembly request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DasmRoot
{
    /// Resolved address, if the target was an address or a known label
    pub addr: Option<Address>,
    /// Label name still pending resolution by the disassembler
    pub label: Option<String>,
    /// Whether the fast-and-shallow pass was requested
    pub fast: bool,
}

/// Mutable analysis state shared by all engine variants.
#[derive(Debug, Default)]
pub struct Analysis
{
    image: Option<LoadedImage>,
    labels: BTreeMap<Address, String>,
    comments: BTreeMap<Address, String>,
    roots: Vec<DasmRoot>,
    cursor: Option<Address>,
    header_prototypes: Vec<String>,
    /// Backtrace memory read/write accesses (`--no-data-trace` clears this)
    pub backtrace_data: bool,
    /// Emit backtrace debug output
    pub debug_backtrace: bool,
    /// Run a decompilation pass once disassembly finishes
    pub decompile: bool,
}

impl Analysis
{
    /// Fresh analysis over a decoded image.
    ///
    /// The image's symbol table seeds the label map.
    #[must_use]
    pub fn with_image(image: LoadedImage) -> Self
    {
        let mut labels = BTreeMap::new();
        for (name, addr) in image.symbols().chain(image.exports()) {
            labels.entry(addr).or_insert_with(|| name.to_string());
        }

        Self {
            image: Some(image),
            labels,
            backtrace_data: true,
            ..Self::default()
        }
    }

    /// Fresh analysis with no backing image (remote and live targets).
    #[must_use]
    pub fn empty() -> Self
    {
        Self {
            backtrace_data: true,
            ..Self::default()
        }
    }

    /// The decoded image, if this analysis has one.
    #[must_use]
    pub fn image(&self) -> Option<&LoadedImage>
    {
        self.image.as_ref()
    }

    /// Current view cursor.
    #[must_use]
    pub fn cursor(&self) -> Option<Address>
    {
        self.cursor
    }

    /// Move the view cursor.
    pub fn focus(&mut self, addr: Address)
    {
        self.cursor = Some(addr);
    }

    /// Resolve a label to an address: renames and map entries first, then
    /// the image symbol table.
    #[must_use]
    pub fn resolve_label(&self, name: &str) -> Option<Address>
    {
        self.labels
            .iter()
            .find(|(_, label)| label.as_str() == name)
            .map(|(&addr, _)| addr)
            .or_else(|| self.image.as_ref().and_then(|image| image.resolve(name)))
    }

    /// Label at an address, if any.
    #[must_use]
    pub fn label_at(&self, addr: Address) -> Option<&str>
    {
        self.labels.get(&addr).map(String::as_str)
    }

    /// Rename (or create) the label at an address.
    pub fn rename_label(&mut self, addr: Address, name: &str)
    {
        self.labels.insert(addr, name.to_string());
    }

    /// Attach a comment to an address.
    pub fn set_comment(&mut self, addr: Address, text: &str)
    {
        self.comments.insert(addr, text.to_string());
    }

    /// Comment at an address, if any.
    #[must_use]
    pub fn comment_at(&self, addr: Address) -> Option<&str>
    {
        self.comments.get(&addr).map(String::as_str)
    }

    /// All labels, address-ordered.
    pub fn labels(&self) -> impl Iterator<Item = (Address, &str)>
    {
        self.labels.iter().map(|(&addr, name)| (addr, name.as_str()))
    }

    /// All comments, address-ordered.
    pub fn comments(&self) -> impl Iterator<Item = (Address, &str)>
    {
        self.comments.iter().map(|(&addr, text)| (addr, text.as_str()))
    }

    /// Queue a disassembly root at a resolved address.
    pub fn push_root(&mut self, addr: Address, fast: bool)
    {
        self.roots.push(DasmRoot {
            addr: Some(addr),
            label: None,
            fast,
        });
    }

    /// Queue a disassembly root on a label the disassembler resolves later.
    pub fn push_pending_root(&mut self, label: &str, fast: bool)
    {
        self.roots.push(DasmRoot {
            addr: None,
            label: Some(label.to_string()),
            fast,
        });
    }

    /// Queued disassembly roots, in request order.
    #[must_use]
    pub fn roots(&self) -> &[DasmRoot]
    {
        &self.roots
    }

    /// Function prototypes collected from header files.
    #[must_use]
    pub fn prototypes(&self) -> &[String]
    {
        &self.header_prototypes
    }

    /// Load a map file: one `addr name` association per line, `#` comments
    /// and blank lines skipped.
    ///
    /// ## Errors
    ///
    /// Map files are curated inputs; any unreadable or malformed line is a
    /// fatal [`VantageError::ArtifactLoad`].
    pub fn load_map(&mut self, path: &Path) -> Result<()>
    {
        let text = fs::read_to_string(path).map_err(|err| VantageError::ArtifactLoad {
            kind: "map file",
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut loaded = 0usize;
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let malformed = |reason: String| VantageError::ArtifactLoad {
                kind: "map file",
                path: path.to_path_buf(),
                reason: format!("line {}: {reason}", idx + 1),
            };

            let mut parts = line.split_whitespace();
            let addr_tok = parts.next().ok_or_else(|| malformed("missing address".into()))?;
            let name = parts.next().ok_or_else(|| malformed("missing name".into()))?;

            let raw = addr_tok.strip_prefix("0x").unwrap_or(addr_tok);
            let addr = u64::from_str_radix(raw, 16)
                .map_err(|_| malformed(format!("bad address `{addr_tok}`")))?;

            self.labels.insert(Address::new(addr), name.to_string());
            loaded += 1;
        }

        info!(path = %path.display(), labels = loaded, "loaded map file");
        Ok(())
    }

    /// Read a C header file and record its function prototypes.
    ///
    /// The header syntax proper belongs to the prototype-parser collaborator;
    /// here we collect the declaration names so the engine knows which
    /// external functions have known signatures.
    ///
    /// ## Errors
    ///
    /// Header files are curated inputs; an unreadable file is a fatal
    /// [`VantageError::ArtifactLoad`].
    pub fn parse_header(&mut self, path: &Path) -> Result<()>
    {
        let text = fs::read_to_string(path).map_err(|err| VantageError::ArtifactLoad {
            kind: "header file",
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        for line in text.lines() {
            let line = line.trim();
            let Some(open) = line.find('(') else { continue };
            if !line.ends_with(");") {
                continue;
            }
            if let Some(name) = line[..open].split_whitespace().last() {
                let name = name.trim_start_matches('*');
                if !name.is_empty() {
                    self.header_prototypes.push(name.to_string());
                }
            }
        }

        debug!(path = %path.display(), prototypes = self.header_prototypes.len(), "parsed header file");
        Ok(())
    }
}
