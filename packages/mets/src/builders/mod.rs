//! Element builders.
//!
//! Pure functions from a parameter struct to a detached element:
//!
//! - [`mets`]: header, dmdSec, amdSec, mdWrap, file, fileGrp, structMap, div, fptr
//! - [`premis`]: PREMIS object, event and agent
//! - [`rights`]: ODRL rights policy

pub mod mets;
pub mod premis;
pub mod rights;

pub use mets::{
    create_amd_sec, create_div, create_dmd_sec, create_file, create_file_group,
    create_file_pointer, create_header, create_md_section, create_md_wrap, create_mets_root,
    create_struct_map, AmdSecInfo, DivInfo, DmdSecInfo, FileGrpInfo, FileInfo, HeaderInfo,
    MdSection, MdSectionKind, MdWrapInfo, MetsRootInfo, TimeRange,
};
pub use premis::{
    create_premis_agent, create_premis_event, create_premis_object, PremisAgentInfo,
    PremisEventInfo, PremisObjectInfo,
};
pub use rights::{create_rights_policy, RightsPolicyInfo};
