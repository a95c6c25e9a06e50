//! Session renewal against the credential-issuing endpoint
//!
//! One operation: exchange the stored renewal credential for a fresh access
//! credential (and possibly a rotated renewal credential). The caller is the
//! refresh coordinator; it passes the un-intercepted HTTP client so a renewal
//! call can never recurse into the renewal flow.
//!
//! The endpoint answers with the access credential under `accessToken` or
//! `access_token` and, optionally, a rotated renewal credential under
//! `refreshToken` or `refresh_token`. A 2xx response without an access
//! credential counts as a renewal failure.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::Token;

/// Request body for the renewal endpoint.
#[derive(Debug, Serialize)]
struct RenewalRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

/// Raw renewal response. Both camelCase and snake_case key spellings are
/// accepted; the endpoint has used both across server versions.
#[derive(Debug, Deserialize)]
pub struct RenewalResponse {
    #[serde(default, alias = "accessToken", alias = "access_token")]
    pub access: Option<Token>,
    #[serde(default, alias = "refreshToken", alias = "refresh_token")]
    pub renewal: Option<Token>,
}

/// A successful renewal outcome: the new access credential, plus the rotated
/// renewal credential when the endpoint issued one.
#[derive(Debug)]
pub struct RenewedCredentials {
    pub access: Token,
    pub renewal: Option<Token>,
}

/// Exchange a renewal credential for fresh session credentials.
///
/// 401/403 mean the renewal credential itself was rejected. Other
/// non-success statuses and malformed bodies are renewal failures; the
/// caller treats every error here the same way (episode failure), the
/// variants exist for logging.
pub async fn renew_session(
    client: &reqwest::Client,
    renew_url: &str,
    renewal: &Token,
) -> Result<RenewedCredentials> {
    let response = client
        .post(renew_url)
        .json(&RenewalRequest {
            refresh_token: renewal.expose(),
        })
        .send()
        .await
        .map_err(|e| Error::Http(format!("renewal request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 401/403 means the renewal credential is revoked or invalid
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "renewal credential rejected ({status}): {body}"
            )));
        }

        return Err(Error::Renewal(format!(
            "renewal endpoint returned {status}: {body}"
        )));
    }

    let parsed = response
        .json::<RenewalResponse>()
        .await
        .map_err(|e| Error::Renewal(format!("invalid renewal response: {e}")))?;

    let access = parsed
        .access
        .ok_or_else(|| Error::Renewal("renewal response carried no access credential".into()))?;

    Ok(RenewedCredentials {
        access,
        renewal: parsed.renewal,
    })
}
