//! Cross-reference identifiers of package documents.
//!
//! Four global spaces (`dmd`, `amd`, `file`, `log`) number the top-level
//! sections with eight-digit ordinals. Entries nested inside an amdSec use a
//! separate two-digit ordinal that restarts in every amdSec, e.g.
//! `amd00000002-event01`.

use std::fmt;

use crate::config::{validate_id, ID_WIDTH, LOCAL_ORDINAL_MAX};
use crate::error::{MetsError, Result};

/// One of the four global ID spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdSpace {
    Dmd,
    Amd,
    File,
    Log,
}

impl IdSpace {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            IdSpace::Dmd => "dmd",
            IdSpace::Amd => "amd",
            IdSpace::File => "file",
            IdSpace::Log => "log",
        }
    }

    /// Render an ordinal in this space.
    ///
    /// # Examples
    /// ```
    /// use sip_mets::ids::IdSpace;
    ///
    /// assert_eq!(IdSpace::File.format(1), "file00000001");
    /// ```
    #[must_use]
    pub fn format(self, ordinal: u64) -> String {
        format!("{}{ordinal:0width$}", self.prefix(), width = ID_WIDTH)
    }
}

/// Kind of an entry nested inside an amdSec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalKind {
    Object,
    Event,
    Agent,
    Rights,
}

impl LocalKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LocalKind::Object => "object",
            LocalKind::Event => "event",
            LocalKind::Agent => "agent",
            LocalKind::Rights => "rights",
        }
    }

    /// Value used in the PREMIS identifier of the entry, e.g. `event02`.
    #[must_use]
    pub fn value(self, ordinal: u32) -> String {
        format!("{}{ordinal:02}", self.as_str())
    }
}

impl fmt::Display for LocalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ID of an entry nested in an amdSec: `<base>-<kind><NN>`.
///
/// # Examples
/// ```
/// use sip_mets::ids::{local_id, LocalKind};
///
/// assert_eq!(local_id("amd00000002", LocalKind::Event, 1).unwrap(), "amd00000002-event01");
/// assert!(local_id("amd00000002", LocalKind::Event, 100).is_err());
/// ```
pub fn local_id(base: &str, kind: LocalKind, ordinal: u32) -> Result<String> {
    if ordinal > LOCAL_ORDINAL_MAX {
        return Err(MetsError::OrdinalOverflow {
            amd_id: base.to_string(),
            kind: kind.to_string(),
            max: LOCAL_ORDINAL_MAX,
        });
    }
    Ok(format!("{base}-{}", kind.value(ordinal)))
}

/// Base amdSec ID of a nested entry ID (`amd00000002-object01` → `amd00000002`).
#[must_use]
pub fn base_id(local: &str) -> &str {
    local.split_once('-').map_or(local, |(base, _)| base)
}

/// Counters for the four global ID spaces of one document.
///
/// Each assembly owns its own allocator, so concurrent submissions never
/// share numbering state. Ordinals start at 1 and only move forward.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    dmd: u64,
    amd: u64,
    file: u64,
    log: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next ordinal in `space`.
    pub fn next(&mut self, space: IdSpace) -> Result<u64> {
        let counter = match space {
            IdSpace::Dmd => &mut self.dmd,
            IdSpace::Amd => &mut self.amd,
            IdSpace::File => &mut self.file,
            IdSpace::Log => &mut self.log,
        };
        let next = *counter + 1;
        validate_id(space.prefix(), next)?;
        *counter = next;
        Ok(next)
    }

    /// Allocate an amdSec ordinal together with its paired file ordinal.
    ///
    /// Both are checked before either counter moves, so a failure leaves the
    /// allocator untouched.
    ///
    /// # Returns
    /// `(amd, file)` ordinals
    pub fn next_file_pair(&mut self) -> Result<(u64, u64)> {
        let amd = self.amd + 1;
        let file = self.file + 1;
        validate_id(IdSpace::Amd.prefix(), amd)?;
        validate_id(IdSpace::File.prefix(), file)?;
        self.amd = amd;
        self.file = file;
        Ok((amd, file))
    }

    /// Last ordinal handed out in `space` (0 when none).
    #[must_use]
    pub fn current(&self, space: IdSpace) -> u64 {
        match space {
            IdSpace::Dmd => self.dmd,
            IdSpace::Amd => self.amd,
            IdSpace::File => self.file,
            IdSpace::Log => self.log,
        }
    }
}
