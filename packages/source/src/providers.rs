//! Catalogue of question providers known to ExamTopics.

/// A provider whose discussions can be scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    /// URL slug used in discussion paths (e.g. `"amazon"`).
    pub id: &'static str,
    /// Display name.
    pub label: &'static str,
}

/// Every provider offered in pickers and the providers endpoint.
pub const PROVIDERS: &[Provider] = &[
    Provider {
        id: "amazon",
        label: "Amazon",
    },
    Provider {
        id: "microsoft",
        label: "Microsoft",
    },
    Provider {
        id: "google",
        label: "Google",
    },
    Provider {
        id: "cisco",
        label: "Cisco",
    },
    Provider {
        id: "comptia",
        label: "CompTIA",
    },
    Provider {
        id: "isaca",
        label: "ISACA",
    },
    Provider {
        id: "isc2",
        label: "ISC2",
    },
    Provider {
        id: "oracle",
        label: "Oracle",
    },
    Provider {
        id: "salesforce",
        label: "Salesforce",
    },
    Provider {
        id: "vmware",
        label: "VMware",
    },
    Provider {
        id: "fortinet",
        label: "Fortinet",
    },
    Provider {
        id: "juniper",
        label: "Juniper Networks",
    },
    Provider {
        id: "palo-alto-networks",
        label: "Palo Alto Networks",
    },
    Provider {
        id: "servicenow",
        label: "ServiceNow",
    },
    Provider {
        id: "databricks",
        label: "Databricks",
    },
];

/// Looks up a provider by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<&str> = PROVIDERS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PROVIDERS.len());
    }

    #[test]
    fn finds_known_provider() {
        assert_eq!(find("amazon").map(|p| p.label), Some("Amazon"));
        assert!(find("nope").is_none());
    }
}
