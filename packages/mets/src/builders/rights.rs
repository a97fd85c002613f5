//! Builder for the ODRL rights policy of a submission.

use crate::config::{
    validate_required, ODRL_INHERIT_FROM, ODRL_POLICY_TYPE, ODRL_SCHEMA_LOCATION, RIGHTS_PROVENANCE,
    RIGHTS_STATEMENT,
};
use crate::error::Result;
use crate::namespace::Namespace;
use crate::types::Ark;
use crate::xml::Element;

/// Rights policy parameters.
#[derive(Debug, Clone)]
pub struct RightsPolicyInfo {
    /// Submission identifier the policy applies to.
    pub uid: Ark,
    /// Donor recorded as contributor.
    pub donor: String,
}

/// Build the `odrl:Policy` element wrapped by the rights section.
pub fn create_rights_policy(info: &RightsPolicyInfo) -> Result<Element> {
    validate_required(info.uid.as_str(), "uid", "odrl:Policy")?;
    validate_required(&info.donor, "donor", "odrl:Policy")?;

    Ok(Element::new(Namespace::Odrl, "Policy")
        .attr("type", ODRL_POLICY_TYPE)
        .attr("uid", info.uid.as_str())
        .attr("inheritFrom", ODRL_INHERIT_FROM)
        .ns_attr(Namespace::Xsi, "schemaLocation", ODRL_SCHEMA_LOCATION)
        .child(
            Element::new(Namespace::Dc, "rights")
                .attr("id", "attribution")
                .text(RIGHTS_STATEMENT),
        )
        .child(Element::new(Namespace::Dc, "contributor").text(info.donor.as_str()))
        .child(Element::new(Namespace::Dc, "provenance").text(RIGHTS_PROVENANCE)))
}
