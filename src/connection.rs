//! Static metadata a host UI uses to render the connection form.

use serde::Serialize;

use crate::config::REQUIRED_FIELDS;

pub const CONNECTION_TYPE: &str = "Gitea";

const BUNDLED_ICON: &str = include_str!("../assets/icon.svg");

const FALLBACK_ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10" fill="#609926"/><path fill="#fff" d="M6 12h12v2H6z"/></svg>"##;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionData {
    pub connection_type: &'static str,
    pub fields: Vec<&'static str>,
}

pub fn connection_data() -> ConnectionData {
    ConnectionData {
        connection_type: CONNECTION_TYPE,
        fields: REQUIRED_FIELDS.to_vec(),
    }
}

/// SVG icon for the data source.
pub fn icon() -> &'static str {
    if BUNDLED_ICON.trim().is_empty() {
        FALLBACK_ICON
    } else {
        BUNDLED_ICON.trim_end()
    }
}
