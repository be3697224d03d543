//! Explicit request context.

use crate::error::{DeskError, DeskResult};
use crate::OrganizationId;
use serde::{Deserialize, Serialize};

/// Who is asking, passed into every backend client instead of living in
/// global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub organization_id: OrganizationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

impl SessionContext {
    /// Build a context, requiring at least one non-blank credential.
    pub fn new(
        organization_id: OrganizationId,
        api_key: Option<String>,
        jwt: Option<String>,
    ) -> DeskResult<Self> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let jwt = jwt.filter(|token| !token.trim().is_empty());
        if api_key.is_none() && jwt.is_none() {
            return Err(DeskError::InvalidValue {
                field: "auth",
                reason: "api_key or jwt is required".to_string(),
            });
        }
        Ok(Self {
            organization_id,
            api_key,
            jwt,
        })
    }

    /// Header name/value pairs identifying this session.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("x-organization-id", self.organization_id.to_string())];
        if let Some(key) = &self.api_key {
            headers.push(("x-api-key", key.clone()));
        }
        if let Some(token) = &self.jwt {
            headers.push(("authorization", format!("Bearer {}", token)));
        }
        headers
    }
}
