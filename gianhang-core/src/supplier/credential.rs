//! Parser for the supplier's delimited credential format.
//!
//! Each purchased unit arrives as one raw `|`-separated line, typically
//! `account|password|email|...`. Parsing is best-effort: a malformed line
//! still yields a record so one bad unit never blocks delivery of the rest.

use serde::{Deserialize, Serialize};

/// A delivered account credential, embedded in an order's delivery info.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub user: String,
    pub pass: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Parse one raw credential line.
///
/// The first two segments are taken as account and password; the email is
/// the first remaining segment that looks like an address. Never fails.
pub fn parse_credential(raw: &str) -> Credential {
    let mut segments = raw.split('|').map(str::trim);
    let user = segments.next().unwrap_or_default().to_owned();
    let pass = segments.next().unwrap_or_default().to_owned();
    let email = segments
        .find(|segment| segment.contains('@'))
        .map(str::to_owned);
    Credential { user, pass, email }
}
