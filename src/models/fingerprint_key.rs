//! Naming rules for fingerprint objects.
//!
//! Fingerprints live under a slash-terminated folder and are named after the
//! identifier (usually a BAM URL) they were computed from. Older objects hold
//! the identifier as bare hex (`folder/<hex>`); current ones hold it
//! percent-encoded with a suffix (`folder/<percent-encoded>.somalier`). A
//! hex name never contains `%`, which is how the two are told apart.

use crate::errors::DecodeError;
use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Suffix appended to every percent-encoded fingerprint key.
pub const FINGERPRINT_SUFFIX: &str = ".somalier";

/// User metadata field carrying the original creation time.
pub const CREATED_METADATA_KEY: &str = "fingerprint-created";

/// Everything except ASCII alphanumerics and `-._~` is escaped, `/` included.
const KEY_ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A key with its folder prefix stripped, classified by encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateKey<'a> {
    /// Legacy hex-encoded name, still to be migrated.
    Hex(&'a str),
    /// Already percent-encoded; left alone.
    PercentEncoded(&'a str),
}

impl<'a> CandidateKey<'a> {
    /// Strip `folder` from `key` and classify the remainder.
    pub fn classify(folder: &str, key: &'a str) -> Result<Self, DecodeError> {
        let name = strip_folder(folder, key)?;
        if name.contains('%') {
            Ok(Self::PercentEncoded(name))
        } else {
            Ok(Self::Hex(name))
        }
    }
}

fn strip_folder<'a>(folder: &str, key: &'a str) -> Result<&'a str, DecodeError> {
    key.strip_prefix(folder)
        .ok_or_else(|| DecodeError::OutsideFolder {
            folder: folder.to_string(),
            key: key.to_string(),
        })
}

/// Decode a hex name into the identifier text it encodes.
pub fn decode_hex_identifier(name: &str) -> Result<String, DecodeError> {
    let bytes = hex::decode(name).map_err(|source| DecodeError::InvalidHex {
        key: name.to_string(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|source| DecodeError::InvalidUtf8 {
        key: name.to_string(),
        source,
    })
}

/// Percent-encode an identifier for use as a single key segment.
pub fn percent_encode_identifier(identifier: &str) -> String {
    utf8_percent_encode(identifier, KEY_ESCAPE_SET).to_string()
}

/// Build `folder + percentEncode(identifier) + ".somalier"`.
pub fn destination_key(folder: &str, identifier: &str) -> String {
    format!(
        "{}{}{}",
        folder,
        percent_encode_identifier(identifier),
        FINGERPRINT_SUFFIX
    )
}

/// ISO-8601 in UTC with a `Z` designator. Fractional seconds are printed
/// (as microseconds) only when present.
pub fn format_created(timestamp: &DateTime<Utc>) -> String {
    let precision = if timestamp.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    timestamp.to_rfc3339_opts(precision, true)
}

/// Recover the identifier a fingerprint key was named after, accepting both
/// the legacy hex and the percent-encoded naming.
///
/// A name that needed no escaping carries no `%`, but it still ends with the
/// suffix, which a hex name never can.
pub fn identifier_from_key(folder: &str, key: &str) -> Result<String, DecodeError> {
    let name = strip_folder(folder, key)?;
    if !name.contains('%') && !name.ends_with(FINGERPRINT_SUFFIX) {
        return decode_hex_identifier(name);
    }

    let decoded = percent_decode_str(name)
        .decode_utf8()
        .map_err(|_| DecodeError::InvalidPercentEncoding {
            key: key.to_string(),
        })?;

    decoded
        .strip_suffix(FINGERPRINT_SUFFIX)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::MissingSuffix {
            key: key.to_string(),
            suffix: FINGERPRINT_SUFFIX,
        })
}
