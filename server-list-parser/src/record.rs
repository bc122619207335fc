//! A single advertised server.

use serde::Serialize;

use crate::element::Attributes;
use crate::error::MalformedEntry;

/// Port used when a server entry does not advertise one.
pub const DEFAULT_PORT: u16 = 64738;

/// One server from the feed. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRecord {
    /// Display name
    pub name: String,
    /// Host name or IP address
    pub address: String,
    pub port: u16,
    /// Web page advertised by the operator
    pub url: Option<String>,
    /// Free-form region, e.g. a state or city
    pub region: Option<String>,
    /// Country name as published by the feed (not localized)
    pub country: Option<String>,
    pub continent_code: String,
    pub country_code: String,
    /// Server presents a CA-signed certificate
    pub ca: bool,
}

impl ServerRecord {
    /// Build a record from `<server>` attributes.
    ///
    /// `continent_code` and `country_code` come from the enclosing scope (or
    /// the entry's own attributes for flat feeds) and are resolved by the
    /// caller.
    pub fn from_attributes(
        attrs: &Attributes,
        continent_code: &str,
        country_code: &str,
    ) -> Result<Self, MalformedEntry> {
        let name = attrs
            .get("name")
            .ok_or(MalformedEntry::MissingAttribute("name"))?;
        let address = attrs
            .get_any(&["ip", "address", "host"])
            .ok_or(MalformedEntry::MissingAttribute("ip"))?;

        let port = match attrs.get("port") {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| MalformedEntry::InvalidPort(raw.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
            port,
            url: attrs.get("url").map(str::to_string),
            region: attrs.get("region").map(str::to_string),
            country: attrs.get("country").map(str::to_string),
            continent_code: continent_code.to_string(),
            country_code: country_code.to_string(),
            ca: matches!(attrs.get("ca"), Some("1") | Some("true")),
        })
    }

    /// `host:port` form suitable for a connect dialog.
    pub fn endpoint(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}
