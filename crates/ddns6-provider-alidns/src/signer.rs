//! Alidns RPC request signing (signature version 1.0)
//!
//! 1. Add the common parameters to the action's parameters
//! 2. Sort by key, percent-encode keys and values (RFC 3986), join `k=v` with `&`
//! 3. String to sign: `GET&%2F&` + percent-encoded canonical query
//! 4. Signature: base64(HMAC-SHA1(secret + "&", string to sign))
//!
//! API Reference: https://help.aliyun.com/document_detail/29747.html

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ddns6_core::{Error, Result};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
use std::collections::BTreeMap;

/// Alidns API version
pub const API_VERSION: &str = "2015-01-09";

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const SIGNATURE_VERSION: &str = "1.0";

/// Everything except RFC 3986 unreserved characters gets encoded
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a value the way the signature algorithm expects
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, RFC3986).to_string()
}

/// Build the canonical query string from sorted parameters
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the string to sign for `method` and a canonical query
pub fn string_to_sign(method: &str, canonical_query: &str) -> String {
    format!(
        "{}&{}&{}",
        method,
        percent_encode("/"),
        percent_encode(canonical_query)
    )
}

/// Sign `string_to_sign` with the access key secret
pub fn sign(string_to_sign: &str, access_key_secret: &str) -> Result<String> {
    let key = format!("{}&", access_key_secret);
    let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
        .map_err(|e| Error::config(format!("Invalid signing key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// One RPC call, before signing
#[derive(Debug, Clone)]
pub struct RpcRequest {
    action: &'static str,
    params: BTreeMap<String, String>,
}

impl RpcRequest {
    /// Start a request for `action` (e.g. `DescribeDomainRecords`)
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            params: BTreeMap::new(),
        }
    }

    /// Add an action parameter
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// The action name
    pub fn action(&self) -> &'static str {
        self.action
    }

    /// The action parameters (without common parameters)
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Produce the signed query string
    ///
    /// # Parameters
    ///
    /// - `timestamp`: UTC time as `%Y-%m-%dT%H:%M:%SZ`
    /// - `nonce`: unique per request, guards against replay
    pub fn signed_query(
        &self,
        access_key_id: &str,
        access_key_secret: &str,
        timestamp: &str,
        nonce: &str,
    ) -> Result<String> {
        let mut params = self.params.clone();
        params.insert("Action".to_string(), self.action.to_string());
        params.insert("Format".to_string(), "JSON".to_string());
        params.insert("Version".to_string(), API_VERSION.to_string());
        params.insert("AccessKeyId".to_string(), access_key_id.to_string());
        params.insert("SignatureMethod".to_string(), SIGNATURE_METHOD.to_string());
        params.insert("SignatureVersion".to_string(), SIGNATURE_VERSION.to_string());
        params.insert("SignatureNonce".to_string(), nonce.to_string());
        params.insert("Timestamp".to_string(), timestamp.to_string());

        let canonical = canonical_query(&params);
        let signature = sign(&string_to_sign("GET", &canonical), access_key_secret)?;

        Ok(format!("{}&Signature={}", canonical, percent_encode(&signature)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documented_example() -> BTreeMap<String, String> {
        [
            ("AccessKeyId", "testid"),
            ("Action", "DescribeRegions"),
            ("Format", "XML"),
            ("SignatureMethod", "HMAC-SHA1"),
            ("SignatureNonce", "3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf"),
            ("SignatureVersion", "1.0"),
            ("Timestamp", "2016-02-23T12:46:24Z"),
            ("Version", "2014-05-26"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_percent_encode_rfc3986() {
        assert_eq!(percent_encode("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(percent_encode("a b"), "a%20b");
        assert_eq!(percent_encode("a*b"), "a%2Ab");
        assert_eq!(percent_encode("2001:db8::1"), "2001%3Adb8%3A%3A1");
        assert_eq!(percent_encode("/"), "%2F");
    }

    #[test]
    fn test_string_to_sign_matches_documented_example() {
        let canonical = canonical_query(&documented_example());
        assert_eq!(
            string_to_sign("GET", &canonical),
            "GET&%2F&AccessKeyId%3Dtestid%26Action%3DDescribeRegions%26Format%3DXML\
             %26SignatureMethod%3DHMAC-SHA1%26SignatureNonce%3D3ee8c1b8-83d3-44af-a94f-4e0ad82fd6cf\
             %26SignatureVersion%3D1.0%26Timestamp%3D2016-02-23T12%253A46%253A24Z%26Version%3D2014-05-26"
        );
    }

    #[test]
    fn test_signature_matches_documented_example() {
        let canonical = canonical_query(&documented_example());
        let signature = sign(&string_to_sign("GET", &canonical), "testsecret").unwrap();
        assert_eq!(signature, "OLeaidS1JvxuMvnyHOwuJ+uX5qY=");
    }

    #[test]
    fn test_signed_query_contains_common_params() {
        let query = RpcRequest::new("DescribeDomainRecords")
            .param("DomainName", "example.com")
            .signed_query("id", "secret", "2024-01-01T00:00:00Z", "nonce-1")
            .unwrap();

        assert!(query.starts_with("AccessKeyId=id&Action=DescribeDomainRecords&DomainName=example.com"));
        assert!(query.contains("&Format=JSON&"));
        assert!(query.contains("&Version=2015-01-09"));
        assert!(query.contains("&Timestamp=2024-01-01T00%3A00%3A00Z"));
        assert!(query.contains("&SignatureNonce=nonce-1"));
        assert!(!query.contains("secret"));

        let signature = query.rsplit("&Signature=").next().unwrap();
        assert!(!signature.is_empty());
        assert!(!signature.contains('+') && !signature.contains('='));
    }
}
