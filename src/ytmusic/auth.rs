use std::collections::BTreeMap;

use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::error::MigrationError;

pub const YTMUSIC_ORIGIN: &str = "https://music.youtube.com";

/// Headers that describe the browser's transport rather than the session.
const IGNORED_HEADERS: [&str; 5] = [
    "host",
    "content-length",
    "accept-encoding",
    "content-encoding",
    "connection",
];

/// Cookie names carrying the SAPISID, in order of preference.
const SAPISID_COOKIES: [&str; 2] = ["__Secure-3PAPISID", "SAPISID"];

/// Request headers copied from a logged-in YouTube Music browser session.
///
/// Names are stored lower-cased. A valid set always contains a cookie with a
/// SAPISID, which the per-request authorization hash is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserHeaders {
    headers: BTreeMap<String, String>,
}

impl BrowserHeaders {
    /// Parses a `browser.json` style object of header names to values.
    pub fn from_json(json: &str) -> Result<Self, MigrationError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(MigrationError::InvalidCredentials(
                "browser.json must be a JSON object of headers".to_string(),
            ));
        };

        Self::from_pairs(
            map.into_iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k, v.to_string()))),
        )
    }

    /// Parses raw `Name: value` lines as copied from the browser's network
    /// inspector. HTTP/2 pseudo-headers and lines without a colon are ignored.
    pub fn from_raw(text: &str) -> Result<Self, MigrationError> {
        Self::from_pairs(text.lines().filter_map(|line| {
            let line = line.trim();
            if line.starts_with(':') {
                return None;
            }
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        }))
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>) -> Result<Self, MigrationError> {
        let headers: BTreeMap<String, String> = pairs
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .filter(|(k, _)| !k.is_empty() && !IGNORED_HEADERS.contains(&k.as_str()))
            .collect();

        let parsed = BrowserHeaders { headers };
        if parsed.sapisid().is_none() {
            return Err(MigrationError::InvalidCredentials(
                "cookie header without SAPISID".to_string(),
            ));
        }
        Ok(parsed)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn sapisid(&self) -> Option<String> {
        let cookie = self.get("cookie")?;
        let cookies: BTreeMap<&str, &str> = cookie
            .split(';')
            .filter_map(|part| part.trim().split_once('='))
            .collect();

        SAPISID_COOKIES
            .iter()
            .find_map(|name| cookies.get(name))
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    }

    pub fn to_json(&self) -> Result<String, MigrationError> {
        Ok(serde_json::to_string_pretty(&self.headers)?)
    }
}

/// The `authorization` header value YouTube Music expects from a browser
/// session at unix time `timestamp`.
pub fn sapisid_hash(sapisid: &str, origin: &str, timestamp: i64) -> String {
    let digest = Sha1::digest(format!("{} {} {}", timestamp, sapisid, origin).as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("SAPISIDHASH {}_{}", timestamp, hex)
}
