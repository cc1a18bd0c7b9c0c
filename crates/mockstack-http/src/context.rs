//! Per-request context handed to service handlers.
//!
//! Signatures are never verified. The SigV4 `Authorization` header is only
//! read to learn which access key the caller used and which service and
//! region they addressed.
//!
//! ```text
//! Authorization: AWS4-HMAC-SHA256 Credential=AKID/20240101/us-east-1/sts/aws4_request, SignedHeaders=..., Signature=...
//! ```

/// An action name supplied out-of-band, overriding header/parameter resolution.
///
/// Insert it into the request's extensions to bypass `X-Amz-Target` or
/// `Action` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitAction(pub String);

/// The credential scope of a SigV4-signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    pub access_key_id: String,
    pub date: String,
    pub region: String,
    pub service: String,
}

/// Parse the credential scope out of an `Authorization` header, if present.
#[must_use]
pub fn credential_scope(headers: &http::HeaderMap) -> Option<CredentialScope> {
    let auth = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let rest = auth.strip_prefix("AWS4-HMAC-SHA256")?;
    let credential = rest
        .split(',')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("Credential="))?;

    // AKID/date/region/service/aws4_request
    let parts: Vec<&str> = credential.splitn(5, '/').collect();
    if parts.len() != 5 || parts[4] != "aws4_request" {
        return None;
    }
    Some(CredentialScope {
        access_key_id: parts[0].to_owned(),
        date: parts[1].to_owned(),
        region: parts[2].to_owned(),
        service: parts[3].to_owned(),
    })
}

/// Context for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Request ID echoed in headers and XML envelopes.
    pub request_id: String,
    /// Access key ID the caller signed with.
    pub access_key_id: Option<String>,
    /// Region from the credential scope.
    pub region: Option<String>,
}

impl RequestContext {
    /// A context with a fresh request ID and no caller identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: mockstack_core::ids::request_id(),
            access_key_id: None,
            region: None,
        }
    }

    /// A context with a fresh request ID and identity taken from the headers.
    #[must_use]
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let scope = credential_scope(headers);
        Self {
            request_id: mockstack_core::ids::request_id(),
            access_key_id: scope.as_ref().map(|s| s.access_key_id.clone()),
            region: scope.map(|s| s.region),
        }
    }

    /// Set the caller's access key.
    #[must_use]
    pub fn with_access_key(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
