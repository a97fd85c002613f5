//! Command-line interface for package assembly and amendment.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::amend::{amend_file, amend_inventory, Amendment, AmendmentOutcome};
use crate::assembler::{PackageAssembler, Submission};
use crate::config::MinterConfig;
use crate::error::Result;
use crate::inventory::{inventory, ORIGINAL_GROUP};
use crate::minter::{HttpMinter, IdentifierMinter, SequentialMinter};
use crate::xml::{parse_document, to_string, Document};

/// Prefix of identifiers handed out by `--offline` assembly.
const OFFLINE_ARK_PREFIX: &str = "ark:/99999/offline-";

/// sip-mets - Assemble and amend METS/PREMIS package documents.
#[derive(Parser)]
#[command(name = "sip-mets")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble a package document from a submission manifest.
    Assemble {
        /// Submission manifest (YAML)
        manifest: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minter configuration (YAML); defaults to ARK_MINTER_* variables
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use local sequential identifiers instead of the minting service
        #[arg(long)]
        offline: bool,
    },

    /// Record a format identification run (DROID) in a package document.
    AmendFormat {
        /// Package document to amend
        document: PathBuf,

        /// amdSec to amend (default: every file of the Original group)
        #[arg(long)]
        amd_id: Option<String>,

        /// DROID version
        #[arg(long)]
        tool_version: String,

        /// DROID signature file name
        #[arg(long)]
        signature_file: String,

        /// Output file (default: amend in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record a characterisation run (MediaInfo) in a package document.
    AmendCharacterization {
        /// Package document to amend
        document: PathBuf,

        /// amdSec to amend (default: every file of the Original group)
        #[arg(long)]
        amd_id: Option<String>,

        /// MediaInfo version
        #[arg(long)]
        tool_version: String,

        /// Output file (default: amend in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the file inventory of a package document as YAML.
    Inventory {
        /// Package document to read
        document: PathBuf,

        /// USE of the file group to list
        #[arg(long = "use", default_value = ORIGINAL_GROUP)]
        use_label: String,

        /// Read file details from the linked PREMIS objects
        #[arg(long)]
        linked: bool,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Assemble {
            manifest,
            output,
            config,
            offline,
        } => assemble_command(&manifest, output.as_deref(), config.as_deref(), offline),
        Commands::AmendFormat {
            document,
            amd_id,
            tool_version,
            signature_file,
            output,
        } => amend_command(
            &document,
            amd_id.as_deref(),
            &Amendment::format_identification(&tool_version, &signature_file),
            output.as_deref(),
        ),
        Commands::AmendCharacterization {
            document,
            amd_id,
            tool_version,
            output,
        } => amend_command(
            &document,
            amd_id.as_deref(),
            &Amendment::characterization(&tool_version),
            output.as_deref(),
        ),
        Commands::Inventory {
            document,
            use_label,
            linked,
        } => inventory_command(&document, &use_label, linked),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_document(path: &Path) -> Result<Document> {
    let xml = std::fs::read_to_string(path)?;
    parse_document(&xml)
}

/// Execute the assemble command.
fn assemble_command(
    manifest: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    offline: bool,
) -> Result<()> {
    let submission = Submission::from_yaml_file(manifest)?;

    let minter: Box<dyn IdentifierMinter> = if offline {
        Box::new(SequentialMinter::new(OFFLINE_ARK_PREFIX))
    } else {
        let config = match config {
            Some(path) => MinterConfig::from_yaml_file(path)?,
            None => MinterConfig::from_env()?,
        };
        Box::new(HttpMinter::new(config)?)
    };

    let Some(output) = output else {
        let package = PackageAssembler::new(minter.as_ref()).assemble(&submission)?;
        print!("{}", to_string(&package.document)?);
        return Ok(());
    };

    println!(
        "{} {} ({} primary, {} associated)",
        style("Assembling").bold(),
        style(&submission.submission_id).cyan(),
        submission.primary_files.len(),
        submission.associated_files.len()
    );

    let pb = spinner("Minting identifiers and building document...");
    let package = match PackageAssembler::new(minter.as_ref()).assemble(&submission) {
        Ok(package) => package,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    let xml = match to_string(&package.document) {
        Ok(xml) => xml,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    std::fs::write(output, xml)?;

    println!("  Recording: {}", style(&package.recording_root).green());
    println!("  Rights: {}", package.rights_id);
    println!();
    println!("{} {}", style("Saved to:").green().bold(), output.display());

    Ok(())
}

/// Execute one of the amendment commands.
fn amend_command(
    document: &Path,
    amd_id: Option<&str>,
    amendment: &Amendment,
    output: Option<&Path>,
) -> Result<()> {
    let mut doc = load_document(document)?;

    let outcomes: Vec<AmendmentOutcome> = match amd_id {
        Some(amd_id) => vec![amend_file(&mut doc, amd_id, amendment)?],
        None => {
            let files = inventory(&doc, ORIGINAL_GROUP, false)?;
            amend_inventory(&mut doc, files.values(), amendment)?
        }
    };

    let target = output.unwrap_or(document);
    std::fs::write(target, to_string(&doc)?)?;

    for outcome in &outcomes {
        println!(
            "{} {} ({})",
            style("Amended").bold(),
            style(&outcome.amd_id).cyan(),
            outcome.file_id
        );
        for id in outcome.new_ids() {
            println!("  + {}", style(id).green());
        }
    }
    println!();
    println!("{} {}", style("Saved to:").green().bold(), target.display());

    Ok(())
}

/// Execute the inventory command.
fn inventory_command(document: &Path, use_label: &str, linked: bool) -> Result<()> {
    let doc = load_document(document)?;
    let entries = inventory(&doc, use_label, linked)?;
    print!("{}", serde_yaml_ng::to_string(&entries)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_assemble() {
        let cli = Cli::parse_from(["sip-mets", "assemble", "submission.yaml", "--offline"]);

        let Commands::Assemble {
            manifest,
            output,
            config,
            offline,
        } = cli.command
        else {
            panic!("expected assemble command");
        };
        assert_eq!(manifest, PathBuf::from("submission.yaml"));
        assert!(output.is_none());
        assert!(config.is_none());
        assert!(offline);
    }

    #[test]
    fn test_cli_parse_amend_format() {
        let cli = Cli::parse_from([
            "sip-mets",
            "amend-format",
            "mets.xml",
            "--amd-id",
            "amd00000002",
            "--tool-version",
            "6.7",
            "--signature-file",
            "DROID_SignatureFile_V119.xml",
        ]);

        let Commands::AmendFormat {
            amd_id,
            tool_version,
            signature_file,
            output,
            ..
        } = cli.command
        else {
            panic!("expected amend-format command");
        };
        assert_eq!(amd_id.as_deref(), Some("amd00000002"));
        assert_eq!(tool_version, "6.7");
        assert_eq!(signature_file, "DROID_SignatureFile_V119.xml");
        assert!(output.is_none());
    }

    #[test]
    fn test_cli_parse_inventory_defaults() {
        let cli = Cli::parse_from(["sip-mets", "inventory", "mets.xml"]);

        let Commands::Inventory { use_label, linked, .. } = cli.command else {
            panic!("expected inventory command");
        };
        assert_eq!(use_label, "Original");
        assert!(!linked);
    }

    #[test]
    fn test_cli_requires_tool_version() {
        let result = Cli::try_parse_from(["sip-mets", "amend-characterization", "mets.xml"]);
        assert!(result.is_err());
    }
}
