//! AWS Signature Version 4 request signing

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::RelayError;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host;x-amz-date";
const CONTENT_TYPE: &str = "application/json";

type HmacSha256 = Hmac<Sha256>;

/// What gets signed, apart from the body and the clock
pub struct SigningParams<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
}

/// Compute HMAC-SHA256.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Hex-encode bytes.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// SHA-256 hash and hex-encode.
fn sha256_hex(data: &[u8]) -> String {
    hex_encode(&Sha256::digest(data))
}

/// Sign a JSON request, returning the headers to send with it.
///
/// Signs `content-type`, `host` and `x-amz-date`; the host includes the port
/// when the URL has a non-default one.
pub fn sign_request(
    params: &SigningParams<'_>,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<Vec<(String, String)>, RelayError> {
    let url = reqwest::Url::parse(params.url)
        .map_err(|e| RelayError::Config(format!("invalid endpoint URL {}: {}", params.url, e)))?;
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(RelayError::Config(format!(
                "endpoint URL has no host: {}",
                params.url
            )))
        }
    };

    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(body);

    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-amz-date:{}\n",
        CONTENT_TYPE, host, amz_date
    );
    let canonical_request = [
        params.method,
        url.path(),
        url.query().unwrap_or(""),
        &canonical_headers,
        SIGNED_HEADERS,
        &payload_hash,
    ]
    .join("\n");

    let credential_scope = format!(
        "{}/{}/{}/aws4_request",
        date_stamp, params.region, params.service
    );
    let string_to_sign = [
        ALGORITHM,
        &amz_date,
        &credential_scope,
        &sha256_hex(canonical_request.as_bytes()),
    ]
    .join("\n");

    let k_date = hmac_sha256(
        format!("AWS4{}", params.secret_access_key).as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, params.region.as_bytes());
    let k_service = hmac_sha256(&k_region, params.service.as_bytes());
    let k_signing = hmac_sha256(&k_service, b"aws4_request");
    let signature = hex_encode(&hmac_sha256(&k_signing, string_to_sign.as_bytes()));

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, params.access_key_id, credential_scope, SIGNED_HEADERS, signature
    );

    Ok(vec![
        ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
        ("X-Amz-Date".to_string(), amz_date),
        ("Authorization".to_string(), authorization),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn params(url: &str) -> SigningParams<'_> {
        SigningParams {
            method: "POST",
            url,
            service: "ses",
            region: "us-east-1",
            access_key_id: "AKIDEXAMPLE",
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
        }
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> &'a str {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_sha256_hex_of_empty_body() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_known_signature() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let headers = sign_request(
            &params("https://email.us-east-1.amazonaws.com/v2/email/outbound-emails"),
            b"{}",
            now,
        )
        .unwrap();

        assert_eq!(header(&headers, "X-Amz-Date"), "20240501T123000Z");
        assert_eq!(header(&headers, "Content-Type"), "application/json");
        assert_eq!(
            header(&headers, "Authorization"),
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240501/us-east-1/ses/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=15059fc68976799dc070c5e418a5b0b114c4b2b2c5ed85a822787edad5cd72ac"
        );
    }

    #[test]
    fn test_signature_depends_on_body_and_host_port() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let auth = |url: &str, body: &[u8]| {
            let headers = sign_request(&params(url), body, now).unwrap();
            header(&headers, "Authorization").to_string()
        };

        let base = auth("https://email.us-east-1.amazonaws.com/v2/email/outbound-emails", b"{}");
        let other_body = auth("https://email.us-east-1.amazonaws.com/v2/email/outbound-emails", b"{\"a\":1}");
        let with_port = auth("http://127.0.0.1:8080/v2/email/outbound-emails", b"{}");

        assert_ne!(base, other_body);
        assert_ne!(base, with_port);
    }

    #[test]
    fn test_invalid_url() {
        let now = Utc::now();
        let err = sign_request(&params("not a url"), b"", now).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
