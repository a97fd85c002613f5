//! Builders for PREMIS objects, events and agents.

use crate::config::validate_required;
use crate::error::Result;
use crate::namespace::Namespace;
use crate::xml::Element;

/// PREMIS object describing one content file.
#[derive(Debug, Clone)]
pub struct PremisObjectInfo {
    /// `xsi:type` of the object, e.g. `premis:file`.
    pub object_type: String,
    pub identifier_type: String,
    pub identifier_value: String,
    pub composition_level: String,
    pub message_digest_algorithm: String,
    pub message_digest: String,
    pub size: Option<u64>,
    pub format_name: String,
    pub original_name: String,
}

/// PREMIS event.
#[derive(Debug, Clone)]
pub struct PremisEventInfo {
    pub identifier_type: String,
    pub identifier_value: String,
    pub event_type: String,
    pub date_time: String,
    pub outcome: String,
    pub outcome_detail_note: Option<String>,
    /// `(type, value)` of each linked agent, primary link first.
    pub linking_agents: Vec<(String, String)>,
}

/// PREMIS agent.
#[derive(Debug, Clone)]
pub struct PremisAgentInfo {
    pub identifier_type: String,
    pub identifier_value: String,
    pub name: String,
    pub agent_type: String,
}

fn premis(local: &str) -> Element {
    Element::new(Namespace::Premis, local)
}

fn premis_text(local: &str, text: &str) -> Element {
    premis(local).text(text)
}

/// Build a `premis:object`.
///
/// Fixity is only written when both digest and algorithm are known.
pub fn create_premis_object(info: &PremisObjectInfo) -> Result<Element> {
    validate_required(&info.object_type, "object_type", "premis:object")?;
    validate_required(&info.identifier_type, "identifier_type", "premis:object")?;
    validate_required(&info.identifier_value, "identifier_value", "premis:object")?;
    validate_required(&info.format_name, "format_name", "premis:object")?;

    let mut characteristics =
        premis("objectCharacteristics").child(premis_text("compositionLevel", &info.composition_level));
    if !info.message_digest_algorithm.is_empty() && !info.message_digest.is_empty() {
        characteristics = characteristics.child(
            premis("fixity")
                .child(premis_text("messageDigestAlgorithm", &info.message_digest_algorithm))
                .child(premis_text("messageDigest", &info.message_digest)),
        );
    }
    if let Some(size) = info.size {
        characteristics = characteristics.child(premis_text("size", &size.to_string()));
    }
    characteristics = characteristics.child(
        premis("format").child(premis("formatDesignation").child(premis_text("formatName", &info.format_name))),
    );

    let mut object = premis("object")
        .ns_attr(Namespace::Xsi, "type", info.object_type.as_str())
        .child(
            premis("objectIdentifier")
                .child(premis_text("objectIdentifierType", &info.identifier_type))
                .child(premis_text("objectIdentifierValue", &info.identifier_value)),
        )
        .child(characteristics);
    if !info.original_name.is_empty() {
        object = object.child(premis_text("originalName", &info.original_name));
    }
    Ok(object)
}

/// Build a `premis:event`.
pub fn create_premis_event(info: &PremisEventInfo) -> Result<Element> {
    validate_required(&info.identifier_type, "identifier_type", "premis:event")?;
    validate_required(&info.identifier_value, "identifier_value", "premis:event")?;
    validate_required(&info.event_type, "event_type", "premis:event")?;
    validate_required(&info.date_time, "date_time", "premis:event")?;
    validate_required(&info.outcome, "outcome", "premis:event")?;

    let mut outcome = premis("eventOutcomeInformation").child(premis_text("eventOutcome", &info.outcome));
    if let Some(note) = info.outcome_detail_note.as_deref() {
        validate_required(note, "outcome_detail_note", "premis:event")?;
        outcome = outcome.child(premis("eventOutcomeDetail").child(premis_text("eventOutcomeDetailNote", note)));
    }

    let mut event = premis("event")
        .child(
            premis("eventIdentifier")
                .child(premis_text("eventIdentifierType", &info.identifier_type))
                .child(premis_text("eventIdentifierValue", &info.identifier_value)),
        )
        .child(premis_text("eventType", &info.event_type))
        .child(premis_text("eventDateTime", &info.date_time))
        .child(outcome);

    for (agent_type, agent_value) in &info.linking_agents {
        validate_required(agent_type, "linking_agent_type", "premis:event")?;
        validate_required(agent_value, "linking_agent_value", "premis:event")?;
        event = event.child(
            premis("linkingAgentIdentifier")
                .child(premis_text("linkingAgentIdentifierType", agent_type))
                .child(premis_text("linkingAgentIdentifierValue", agent_value)),
        );
    }
    Ok(event)
}

/// Build a `premis:agent`.
pub fn create_premis_agent(info: &PremisAgentInfo) -> Result<Element> {
    validate_required(&info.identifier_type, "identifier_type", "premis:agent")?;
    validate_required(&info.identifier_value, "identifier_value", "premis:agent")?;
    validate_required(&info.name, "name", "premis:agent")?;
    validate_required(&info.agent_type, "agent_type", "premis:agent")?;

    Ok(premis("agent")
        .child(
            premis("agentIdentifier")
                .child(premis_text("agentIdentifierType", &info.identifier_type))
                .child(premis_text("agentIdentifierValue", &info.identifier_value)),
        )
        .child(premis_text("agentName", &info.name))
        .child(premis_text("agentType", &info.agent_type)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetsError;
    use pretty_assertions::assert_eq;

    fn object_info() -> PremisObjectInfo {
        PremisObjectInfo {
            object_type: "premis:file".into(),
            identifier_type: "ARK".into(),
            identifier_value: "f1".into(),
            composition_level: "0".into(),
            message_digest_algorithm: "SHA256".into(),
            message_digest: "abc123".into(),
            size: Some(1000),
            format_name: "audio/x-wav".into(),
            original_name: "/data/track.wav".into(),
        }
    }

    fn child_names(element: &Element) -> Vec<&str> {
        element.children.iter().map(|c| c.name.local_name()).collect()
    }

    #[test]
    fn test_object_layout() {
        let object = create_premis_object(&object_info()).unwrap();

        assert_eq!(object.attribute("type"), Some("premis:file"));
        assert_eq!(
            child_names(&object),
            vec!["objectIdentifier", "objectCharacteristics", "originalName"]
        );
        let characteristics = object.find("objectCharacteristics").unwrap();
        assert_eq!(
            child_names(characteristics),
            vec!["compositionLevel", "fixity", "size", "format"]
        );
    }

    #[test]
    fn test_object_without_digest_skips_fixity() {
        let info = PremisObjectInfo {
            message_digest: String::new(),
            ..object_info()
        };
        let object = create_premis_object(&info).unwrap();
        let characteristics = object.find("objectCharacteristics").unwrap();
        assert!(characteristics.find("fixity").is_none());
    }

    #[test]
    fn test_event_with_detail_and_two_agents() {
        let event = create_premis_event(&PremisEventInfo {
            identifier_type: "local".into(),
            identifier_value: "event02".into(),
            event_type: "format identification".into(),
            date_time: "2024-03-01T12:00:00".into(),
            outcome: "success".into(),
            outcome_detail_note: None,
            linking_agents: vec![
                ("local".into(), "agent01".into()),
                ("local".into(), "agent02".into()),
            ],
        })
        .unwrap();

        assert_eq!(
            child_names(&event),
            vec![
                "eventIdentifier",
                "eventType",
                "eventDateTime",
                "eventOutcomeInformation",
                "linkingAgentIdentifier",
                "linkingAgentIdentifier",
            ]
        );
    }

    #[test]
    fn test_event_rejects_blank_detail_note() {
        let err = create_premis_event(&PremisEventInfo {
            identifier_type: "local".into(),
            identifier_value: "event01".into(),
            event_type: "Acquisition".into(),
            date_time: "2024-03-01T12:00:00".into(),
            outcome: "Success".into(),
            outcome_detail_note: Some(String::new()),
            linking_agents: vec![],
        })
        .unwrap_err();
        assert!(matches!(err, MetsError::MissingField { ref field, .. } if field == "outcome_detail_note"));
    }

    #[test]
    fn test_agent() {
        let agent = create_premis_agent(&PremisAgentInfo {
            identifier_type: "local".into(),
            identifier_value: "agent01".into(),
            name: "DROID;6.7".into(),
            agent_type: "software".into(),
        })
        .unwrap();
        assert_eq!(
            agent.find("agentName").unwrap().text.as_deref(),
            Some("DROID;6.7")
        );
    }
}
