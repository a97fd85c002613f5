//! Amendment of existing package documents.
//!
//! Tools that run after ingest (format identification, characterisation)
//! record their work as new PREMIS agents and events inside the amdSec of
//! each file they looked at. An amendment never renumbers or rewrites what
//! is already there: it finds the amdSec by its base ID, picks the next free
//! two-digit agent and event ordinals, adds the new `digiprovMD` entries and
//! appends their IDs to the file's ADMID.
//!
//! All IDs and elements are prepared before the document is touched, so a
//! failed amendment leaves the document as it was.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::builders::{
    create_md_section, create_premis_agent, create_premis_event, MdSection, MdSectionKind, MdWrapInfo,
    PremisAgentInfo, PremisEventInfo,
};
use crate::config::EVENT_DATE_FORMAT;
use crate::error::{MetsError, Result};
use crate::ids::{base_id, local_id, LocalKind};
use crate::query::{find_attribute_by_name, find_elements_by_name};
use crate::types::InventoryEntry;
use crate::xml::{Document, Element, NodeId, QName};

/// Nested entry ID: `<base>-<kind><NN>`.
#[allow(clippy::expect_used)] // Static regex pattern is known to be valid
static LOCAL_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>.+)-(?P<kind>[a-z]+)(?P<ordinal>\d+)$").expect("valid regex")
});

const FORMAT_TOOL: &str = "DROID";
const CHARACTERIZATION_TOOL: &str = "MediaInfo";
const AGENT_TYPE: &str = "software";
const IDENTIFIER_TYPE: &str = "local";
const OUTCOME_SUCCESS: &str = "success";

/// Progress of a single file amendment, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Located,
    OrdinalComputed,
    Injected,
    BackreferenceUpdated,
}

/// An event to record, linked to agents of the same amendment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendmentEvent {
    pub event_type: String,
    pub outcome: String,
    /// Indices into the amendment's agents; the first is the primary link.
    pub agents: Vec<usize>,
}

/// Agents and events to add to every amended file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amendment {
    /// Agent names, e.g. `DROID;6.7`.
    pub agents: Vec<String>,
    pub events: Vec<AmendmentEvent>,
    /// Event date-time, already formatted.
    pub date_time: String,
}

impl Amendment {
    /// Empty amendment dated now.
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            events: Vec::new(),
            date_time: Utc::now().format(EVENT_DATE_FORMAT).to_string(),
        }
    }

    pub fn with_agent(mut self, name: impl Into<String>) -> Self {
        self.agents.push(name.into());
        self
    }

    pub fn with_event(mut self, event_type: impl Into<String>, agents: Vec<usize>) -> Self {
        self.events.push(AmendmentEvent {
            event_type: event_type.into(),
            outcome: OUTCOME_SUCCESS.to_string(),
            agents,
        });
        self
    }

    pub fn with_date_time(mut self, date_time: DateTime<Utc>) -> Self {
        self.date_time = date_time.format(EVENT_DATE_FORMAT).to_string();
        self
    }

    /// Format identification: the tool and its signature file as two
    /// agents, one event linking both.
    ///
    /// # Examples
    /// ```
    /// use sip_mets::amend::Amendment;
    ///
    /// let amendment = Amendment::format_identification("6.7", "DROID_SignatureFile_V119.xml");
    /// assert_eq!(amendment.agents, vec!["DROID;6.7", "DROID;DROID_SignatureFile_V119.xml"]);
    /// assert_eq!(amendment.events[0].event_type, "format identification");
    /// ```
    pub fn format_identification(tool_version: &str, signature_file: &str) -> Self {
        Self::new()
            .with_agent(format!("{FORMAT_TOOL};{tool_version}"))
            .with_agent(format!("{FORMAT_TOOL};{signature_file}"))
            .with_event("format identification", vec![0, 1])
    }

    /// Characterisation: one agent, a characterisation event and a profile
    /// validation event, both linking it.
    pub fn characterization(tool_version: &str) -> Self {
        Self::new()
            .with_agent(format!("{CHARACTERIZATION_TOOL};{tool_version}"))
            .with_event("characterisation", vec![0])
            .with_event("profile validation", vec![0])
    }
}

impl Default for Amendment {
    fn default() -> Self {
        Self::new()
    }
}

/// IDs created by amending one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmendmentOutcome {
    pub amd_id: String,
    pub file_id: String,
    /// New agent entry IDs, e.g. `amd00000002-agent01`.
    pub agent_ids: Vec<String>,
    /// New event entry IDs, e.g. `amd00000002-event02`.
    pub event_ids: Vec<String>,
}

impl AmendmentOutcome {
    /// All new IDs in the order they were appended to the ADMID.
    pub fn new_ids(&self) -> impl Iterator<Item = &str> {
        self.agent_ids.iter().chain(&self.event_ids).map(String::as_str)
    }
}

/// Next free ordinal of `kind` among the `digiprovMD` children of an amdSec.
///
/// Ordinals are scanned, not counted, so gaps left by removed entries are
/// never reused.
///
/// # Returns
/// `max + 1`, or `1` when the amdSec has no entry of that kind
pub fn next_local_ordinal(doc: &Document, amd_sec: NodeId, kind: LocalKind) -> u32 {
    let base = doc.attribute(amd_sec, "ID").unwrap_or_default();
    doc.children(amd_sec)
        .iter()
        .filter(|child| doc.local_name(**child) == MdSectionKind::DigiprovMd.element_name())
        .filter_map(|child| doc.attribute(*child, "ID"))
        .filter_map(|id| LOCAL_ID_PATTERN.captures(id))
        .filter(|caps| &caps["base"] == base && &caps["kind"] == kind.as_str())
        .filter_map(|caps| caps["ordinal"].parse::<u32>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

/// The file element whose ADMID references `amd_id`.
fn file_for_amd_sec(doc: &Document, amd_id: &str) -> Option<NodeId> {
    find_elements_by_name(doc, doc.root(), "file").into_iter().find(|file| {
        doc.attribute(*file, "ADMID")
            .is_some_and(|adm| adm.split_whitespace().any(|token| base_id(token) == amd_id))
    })
}

fn locate(doc: &Document, amd_id: &str) -> Result<(NodeId, NodeId)> {
    let file = file_for_amd_sec(doc, amd_id);
    let amd_sec = doc
        .element_by_id(amd_id)
        .filter(|id| doc.local_name(*id) == "amdSec");

    match (amd_sec, file) {
        (Some(amd_sec), Some(file)) => Ok((amd_sec, file)),
        (None, file) => {
            let location = file
                .and_then(|f| find_attribute_by_name(doc, f, "href"))
                .map_or_else(|| "(unreferenced)".to_string(), |(_, href)| href.to_string());
            tracing::warn!(amd_id, location = %location, "amdSec not found");
            Err(MetsError::AmdSecNotFound {
                amd_id: amd_id.to_string(),
                location,
            })
        }
        (Some(_), None) => Err(MetsError::FileNotFound {
            amd_id: amd_id.to_string(),
        }),
    }
}

fn digiprov(id: String, md_type: &str, payload: Element) -> Result<Element> {
    create_md_section(&MdSection {
        kind: MdSectionKind::DigiprovMd,
        id,
        wrap: Some(MdWrapInfo::wrapping(md_type, payload)),
    })
}

/// Amend the file described by amdSec `amd_id`.
///
/// # Errors
/// The amdSec or its file is missing, an ordinal would pass 99, or an event
/// links an agent the amendment does not define. The document is unchanged
/// on error.
pub fn amend_file(doc: &mut Document, amd_id: &str, amendment: &Amendment) -> Result<AmendmentOutcome> {
    let (amd_sec, file) = locate(doc, amd_id)?;
    tracing::debug!(amd_id, stage = ?Stage::Located, "Amending file");

    let first_agent = next_local_ordinal(doc, amd_sec, LocalKind::Agent);
    let first_event = next_local_ordinal(doc, amd_sec, LocalKind::Event);
    let agent_ordinals: Vec<u32> = (first_agent..).take(amendment.agents.len()).collect();
    let event_ordinals: Vec<u32> = (first_event..).take(amendment.events.len()).collect();

    let agent_ids = agent_ordinals
        .iter()
        .map(|n| local_id(amd_id, LocalKind::Agent, *n))
        .collect::<Result<Vec<_>>>()?;
    let event_ids = event_ordinals
        .iter()
        .map(|n| local_id(amd_id, LocalKind::Event, *n))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(amd_id, first_agent, first_event, stage = ?Stage::OrdinalComputed, "Ordinals computed");

    let mut sections = Vec::with_capacity(agent_ids.len() + event_ids.len());
    for ((name, id), ordinal) in amendment.agents.iter().zip(&agent_ids).zip(&agent_ordinals) {
        let agent = create_premis_agent(&PremisAgentInfo {
            identifier_type: IDENTIFIER_TYPE.to_string(),
            identifier_value: LocalKind::Agent.value(*ordinal),
            name: name.clone(),
            agent_type: AGENT_TYPE.to_string(),
        })?;
        sections.push(digiprov(id.clone(), "PREMIS:AGENT", agent)?);
    }
    for ((event, id), ordinal) in amendment.events.iter().zip(&event_ids).zip(&event_ordinals) {
        let linking_agents = event
            .agents
            .iter()
            .map(|index| {
                agent_ordinals
                    .get(*index)
                    .map(|n| (IDENTIFIER_TYPE.to_string(), LocalKind::Agent.value(*n)))
                    .ok_or_else(|| MetsError::missing(format!("agent {index}"), format!("event '{}'", event.event_type)))
            })
            .collect::<Result<Vec<_>>>()?;
        let premis_event = create_premis_event(&PremisEventInfo {
            identifier_type: IDENTIFIER_TYPE.to_string(),
            identifier_value: LocalKind::Event.value(*ordinal),
            event_type: event.event_type.clone(),
            date_time: amendment.date_time.clone(),
            outcome: event.outcome.clone(),
            outcome_detail_note: None,
            linking_agents,
        })?;
        sections.push(digiprov(id.clone(), "PREMIS:EVENT", premis_event)?);
    }

    for section in sections {
        doc.append(amd_sec, section);
    }
    tracing::debug!(amd_id, stage = ?Stage::Injected, "Entries added");

    let outcome = AmendmentOutcome {
        amd_id: amd_id.to_string(),
        file_id: doc.attribute(file, "ID").unwrap_or_default().to_string(),
        agent_ids,
        event_ids,
    };

    let mut adm_id = doc.attribute(file, "ADMID").unwrap_or_default().to_string();
    for id in outcome.new_ids() {
        adm_id.push(' ');
        adm_id.push_str(id);
    }
    doc.set_attribute(file, QName::unqualified("ADMID"), adm_id);
    tracing::debug!(amd_id, file_id = %outcome.file_id, stage = ?Stage::BackreferenceUpdated, "ADMID extended");

    Ok(outcome)
}

/// Amend every file of an inventory.
///
/// Files are amended on a working copy that replaces `doc` only when all of
/// them succeed.
pub fn amend_inventory<'a>(
    doc: &mut Document,
    entries: impl IntoIterator<Item = &'a InventoryEntry>,
    amendment: &Amendment,
) -> Result<Vec<AmendmentOutcome>> {
    let mut working = doc.clone();
    let outcomes = entries
        .into_iter()
        .map(|entry| amend_file(&mut working, entry.amd_base_id(), amendment))
        .collect::<Result<Vec<_>>>()?;

    *doc = working;
    tracing::info!(files = outcomes.len(), "Amendment applied");
    Ok(outcomes)
}
