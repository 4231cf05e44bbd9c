//! # Share Codec
//!
//! Moves a bowler profile between devices as a URL-safe token:
//!
//! ```text
//! Bowler -> JSON -> percent-encode (encodeURIComponent set) -> base64
//! ```
//!
//! Tokens are written with the URL-safe base64 alphabet and no padding.
//! Decoding also accepts standard base64 with padding, and repairs `+`
//! characters that a URL query parser turned into spaces, so links made by
//! the StrikePath web app import too.
//!
//! A decoded bowler always gets a new id. Every other field, including the
//! last-used target and breakpoint, comes through unchanged.
//!
//! ## Example
//!
//! ```rust
//! use lane_core::bowler::{Bowler, BowlerProfile};
//! use lane_core::share::{decode_bowler, encode_bowler};
//!
//! let bowler = Bowler::new(BowlerProfile { name: "Jess".into(), ..Default::default() }).unwrap();
//! let token = encode_bowler(&bowler).unwrap();
//! let copy = decode_bowler(&token).unwrap();
//!
//! assert_eq!(copy.profile, bowler.profile);
//! assert_ne!(copy.id, bowler.id);
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use tracing::debug;

use crate::bowler::{Bowler, BowlerProfile, DriftDirection, Handedness};
use crate::errors::{CalcError, CalcResult};

/// Query parameter that carries the token in a share link
pub const SHARE_PARAM: &str = "share";

/// Characters `encodeURIComponent` leaves alone, everything else is escaped
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Wire shape of a shared bowler. Every field is optional here so a missing
/// one can be reported by name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SharePayload {
    name: Option<String>,
    handedness: Option<Handedness>,
    drift: Option<i64>,
    drift_direction: Option<DriftDirection>,
    lay_down_distance: Option<i32>,
    last_target: Option<i32>,
    last_breakpoint: Option<i32>,
}

impl SharePayload {
    fn into_bowler(self) -> CalcResult<Bowler> {
        let drift = self.drift.ok_or_else(|| CalcError::missing_field("drift"))?;
        let drift = u32::try_from(drift).map_err(|_| {
            CalcError::invalid_input("drift", drift.to_string(), "Drift cannot be negative")
        })?;

        let profile = BowlerProfile {
            name: self.name.ok_or_else(|| CalcError::missing_field("name"))?,
            handedness: self
                .handedness
                .ok_or_else(|| CalcError::missing_field("handedness"))?,
            drift,
            drift_direction: self
                .drift_direction
                .ok_or_else(|| CalcError::missing_field("driftDirection"))?,
            lay_down_distance: self
                .lay_down_distance
                .ok_or_else(|| CalcError::missing_field("layDownDistance"))?,
        };

        let mut bowler = Bowler::new(profile)?;
        bowler.last_target = self.last_target;
        bowler.last_breakpoint = self.last_breakpoint;
        Ok(bowler)
    }
}

/// Encode a bowler as a share token.
pub fn encode_bowler(bowler: &Bowler) -> CalcResult<String> {
    let json = serde_json::to_string(bowler).map_err(|e| CalcError::serialization(e.to_string()))?;
    let escaped = utf8_percent_encode(&json, URI_COMPONENT).to_string();
    Ok(URL_SAFE_NO_PAD.encode(escaped.as_bytes()))
}

/// Decode a share token into a bowler with a newly generated id.
///
/// # Errors
///
/// * `ShareDecodeError` - not base64, not percent-encoded UTF-8, or not JSON
/// * `InvalidInput` - a required field is missing, drift or lay-down distance is out
///   of range, or the name is blank
pub fn decode_bowler(token: &str) -> CalcResult<Bowler> {
    let normalized: String = token
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            ' ' | '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| CalcError::share_decode(format!("invalid base64: {}", e)))?;
    let escaped = String::from_utf8(bytes)
        .map_err(|e| CalcError::share_decode(format!("invalid text: {}", e)))?;
    let json = percent_decode_str(&escaped)
        .decode_utf8()
        .map_err(|e| CalcError::share_decode(format!("invalid percent-encoding: {}", e)))?;

    let payload: SharePayload = serde_json::from_str(&json)
        .map_err(|e| CalcError::share_decode(format!("invalid profile JSON: {}", e)))?;

    let bowler = payload.into_bowler()?;
    debug!(name = bowler.name(), "decoded shared bowler");
    Ok(bowler)
}

/// Build a share link: `{base_url}?share={token}`.
pub fn share_url(base_url: &str, bowler: &Bowler) -> CalcResult<String> {
    let token = encode_bowler(bowler)?;
    let base = base_url.trim();
    let separator = if base.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}{}={}", base, separator, SHARE_PARAM, token))
}

/// Pull the token out of a share link.
///
/// Input without a `share` query parameter is taken to be a bare token.
pub fn token_from_url(input: &str) -> String {
    let input = input.trim();
    let without_fragment = input.split('#').next().unwrap_or(input);

    if let Some((_, query)) = without_fragment.split_once('?') {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                if key == SHARE_PARAM {
                    return percent_decode_str(value).decode_utf8_lossy().into_owned();
                }
            }
        }
    }

    input.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn sample_bowler() -> Bowler {
        let mut bowler = Bowler::new(BowlerProfile {
            name: "Zoë \"Lefty\" O'Neil & co".to_string(),
            handedness: Handedness::Left,
            drift: 4,
            drift_direction: DriftDirection::Right,
            lay_down_distance: -2,
        })
        .unwrap();
        bowler.last_target = Some(17);
        bowler.last_breakpoint = Some(6);
        bowler
    }

    /// Token the way the web app builds it: btoa(encodeURIComponent(json))
    fn web_app_token(json: &str) -> String {
        let escaped = utf8_percent_encode(json, URI_COMPONENT).to_string();
        STANDARD.encode(escaped.as_bytes())
    }

    #[test]
    fn test_roundtrip_keeps_everything_but_id() {
        let bowler = sample_bowler();
        let token = encode_bowler(&bowler).unwrap();
        let decoded = decode_bowler(&token).unwrap();

        assert_ne!(decoded.id, bowler.id);
        assert_eq!(decoded.profile, bowler.profile);
        assert_eq!(decoded.last_target, bowler.last_target);
        assert_eq!(decoded.last_breakpoint, bowler.last_breakpoint);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = encode_bowler(&sample_bowler()).unwrap();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_percent_encoding_matches_uri_component() {
        let escaped = utf8_percent_encode("a b&c=d'(e)*~!ë", URI_COMPONENT).to_string();
        assert_eq!(escaped, "a%20b%26c%3Dd'(e)*~!%C3%AB");
    }

    #[test]
    fn test_decode_web_app_token() {
        let json = r#"{"id":"not-a-uuid","name":"Pat","handedness":"Right","drift":2,"driftDirection":"Left","layDownDistance":6,"lastTarget":22,"lastBreakpoint":9}"#;
        let token = web_app_token(json);

        let bowler = decode_bowler(&token).unwrap();
        assert_eq!(bowler.name(), "Pat");
        assert_eq!(bowler.profile.drift_direction, DriftDirection::Left);
        assert_eq!(bowler.last_target, Some(22));
        assert_eq!(bowler.last_breakpoint, Some(9));
    }

    #[test]
    fn test_decode_repairs_spaces_from_query_parsing() {
        let json = r#"{"name":"Pat","handedness":"Right","drift":2,"driftDirection":"Left","layDownDistance":6}"#;
        let token = web_app_token(json).replace('+', " ");
        assert!(decode_bowler(&token).is_ok());
    }

    #[test]
    fn test_decode_without_last_inputs() {
        let json = r#"{"name":"Pat","handedness":"Left","drift":0,"driftDirection":"None","layDownDistance":5}"#;
        let bowler = decode_bowler(&web_app_token(json)).unwrap();
        assert_eq!(bowler.last_target, None);
        assert_eq!(bowler.target_or_default(), 20);
        assert_eq!(bowler.breakpoint_or_default(), 10);
    }

    #[test]
    fn test_decode_missing_field() {
        let json = r#"{"name":"Pat","handedness":"Right","drift":2,"layDownDistance":6}"#;
        let err = decode_bowler(&web_app_token(json)).unwrap_err();
        assert_eq!(
            err,
            CalcError::InvalidInput {
                field: "driftDirection".to_string(),
                value: "<missing>".to_string(),
                reason: "Required field is missing".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_negative_drift() {
        let json = r#"{"name":"Pat","handedness":"Right","drift":-1,"driftDirection":"Left","layDownDistance":6}"#;
        let err = decode_bowler(&web_app_token(json)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_decode_rejects_out_of_range_constants() {
        let json = r#"{"name":"Pat","handedness":"Right","drift":4000000000,"driftDirection":"Right","layDownDistance":6}"#;
        let err = decode_bowler(&web_app_token(json)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let json = r#"{"name":"Pat","handedness":"Right","drift":2,"driftDirection":"Right","layDownDistance":2147483647}"#;
        let err = decode_bowler(&web_app_token(json)).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_decode_garbage() {
        assert_eq!(decode_bowler("%%%").unwrap_err().error_code(), "SHARE_DECODE_ERROR");
        let not_json = URL_SAFE_NO_PAD.encode("hello");
        assert_eq!(decode_bowler(&not_json).unwrap_err().error_code(), "SHARE_DECODE_ERROR");
    }

    #[test]
    fn test_share_url_and_back() {
        let bowler = sample_bowler();
        let url = share_url("https://strikepath.app/", &bowler).unwrap();
        assert!(url.starts_with("https://strikepath.app/?share="));

        let token = token_from_url(&url);
        let decoded = decode_bowler(&token).unwrap();
        assert_eq!(decoded.profile, bowler.profile);
    }

    #[test]
    fn test_share_url_with_existing_query() {
        let url = share_url("https://example.com/app?lang=en", &sample_bowler()).unwrap();
        assert!(url.contains("?lang=en&share="));
        assert!(!token_from_url(&url).contains("lang"));
    }

    #[test]
    fn test_token_from_url_passthrough() {
        assert_eq!(token_from_url("  abc123  "), "abc123");
        assert_eq!(token_from_url("https://x.io/?a=1&share=tok#top"), "tok");
        assert_eq!(token_from_url("https://x.io/?share=ab%2Bcd"), "ab+cd");
    }
}
