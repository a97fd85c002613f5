//! sip-mets - Assemble and amend METS/PREMIS archival package documents.
//!
//! This crate builds the METS document describing a digitised submission
//! (descriptive metadata references, rights, PREMIS provenance for every
//! content file, file groups and the logical structure) and amends such
//! documents afterwards with the results of format identification and
//! characterisation tools.
//!
//! # Example
//!
//! ```
//! use sip_mets::{Ark, ContentFile, PackageAssembler, SequentialMinter, Submission};
//!
//! let submission = Submission {
//!     collection: "audio".into(),
//!     agent_name: "sip-mets".into(),
//!     acquisition_note: "Received from donor".into(),
//!     submission_id: Ark::from("ark:/81055/sub1"),
//!     document_id: Ark::from("ark:/81055/doc1"),
//!     donor: "Jane Donor".into(),
//!     primary_files: vec![ContentFile::new("f1", "/data", "track.wav")
//!         .with_size(1000)
//!         .with_hash("SHA256", "abc123")],
//!     associated_files: vec![],
//! };
//!
//! let minter = SequentialMinter::new("ark");
//! let package = PackageAssembler::new(&minter).assemble(&submission).unwrap();
//! assert!(package.document.element_by_id("file00000001").is_some());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, validation and minter configuration
//! - [`types`]: Core data types (Ark, ContentFile, InventoryEntry, ...)
//! - [`error`]: Error types and Result alias
//! - [`namespace`]: XML namespace registry
//! - [`xml`]: Document arena, serializer and parser
//! - [`ids`]: Cross-reference ID spaces and allocation
//! - [`mime`]: MIME types and division types
//! - [`builders`]: Element builders for METS, PREMIS and rights sections
//! - [`http`]: HTTP client for the minting service
//! - [`minter`]: Identifier minting
//! - [`assembler`]: Package assembly
//! - [`amend`]: Amendment with new PREMIS agents and events
//! - [`query`]: Search primitives and document readers
//! - [`inventory`]: File inventory extraction
//! - [`cli`]: Command-line interface

pub mod amend;
pub mod assembler;
pub mod builders;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod ids;
pub mod inventory;
pub mod mime;
pub mod minter;
pub mod namespace;
pub mod query;
pub mod types;
pub mod xml;

// Re-export main entry points
pub use amend::{amend_file, amend_inventory, Amendment, AmendmentOutcome};
pub use assembler::{AssembledPackage, PackageAssembler, Submission};
pub use inventory::inventory;

// Re-export commonly used items
pub use config::MinterConfig;
pub use error::{MetsError, Result};
pub use minter::{HttpMinter, IdentifierMinter, SequentialMinter};
pub use types::{Ark, ContentFile, InventoryEntry};
