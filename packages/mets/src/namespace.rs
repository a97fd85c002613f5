//! Registry of the XML namespaces used in package documents.

/// A namespace known to the builders and the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Mets,
    Premis,
    Mods,
    XLink,
    Odrl,
    Dc,
    Xsi,
    Marc,
}

impl Namespace {
    /// All known namespaces, in root declaration order.
    pub const ALL: [Namespace; 8] = [
        Namespace::Mets,
        Namespace::Premis,
        Namespace::Mods,
        Namespace::XLink,
        Namespace::Xsi,
        Namespace::Odrl,
        Namespace::Dc,
        Namespace::Marc,
    ];

    #[must_use]
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Mets => "http://www.loc.gov/METS/",
            Namespace::Premis => "info:lc/xmlns/premis-v2",
            Namespace::Mods => "http://www.loc.gov/mods/v3",
            Namespace::XLink => "http://www.w3.org/1999/xlink",
            Namespace::Odrl => "http://www.w3.org/ns/odrl/2/",
            Namespace::Dc => "http://purl.org/dc/terms/",
            Namespace::Xsi => "http://www.w3.org/2001/XMLSchema-instance",
            Namespace::Marc => "http://www.loc.gov/MARC21/slim",
        }
    }

    /// Conventional prefix used when serializing.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Mets => "mets",
            Namespace::Premis => "premis",
            Namespace::Mods => "mods",
            Namespace::XLink => "xlink",
            Namespace::Odrl => "odrl",
            Namespace::Dc => "dc",
            Namespace::Xsi => "xsi",
            Namespace::Marc => "marc",
        }
    }

    /// Look up a known namespace by URI.
    ///
    /// # Examples
    /// ```
    /// use sip_mets::namespace::Namespace;
    ///
    /// assert_eq!(Namespace::from_uri("http://www.loc.gov/METS/"), Some(Namespace::Mets));
    /// assert_eq!(Namespace::from_uri("urn:example"), None);
    /// ```
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.uri() == uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_are_unique() {
        let mut prefixes: Vec<_> = Namespace::ALL.iter().map(|ns| ns.prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), Namespace::ALL.len());
    }

    #[test]
    fn test_uri_round_trip() {
        for ns in Namespace::ALL {
            assert_eq!(Namespace::from_uri(ns.uri()), Some(ns));
        }
    }
}
