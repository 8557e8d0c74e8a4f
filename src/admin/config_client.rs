//! Config sync client — typed wrappers over the backend's `/admin/config`
//! endpoints.
//!
//! Request builders and response parsers are plain functions so the admin
//! panel can run them around its own `fetch`; [`ConfigClient`] glues them to
//! a [`Transport`] for callers that have a synchronous one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::admin::transport::{ApiRequest, ApiResponse, ConfigSyncError, Method, Transport};

const CONFIG_PATH: &str = "/admin/config";
const REFERRALS_PATH: &str = "/admin/config/referrals";

/// One key/value economy setting. The value is whatever JSON the backend
/// stores; the client does not interpret it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Rewards paid out when an invited player joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralConfig {
    pub inviter_reward: u64,
    pub invitee_reward: u64,
    #[serde(default)]
    pub premium_inviter_reward: u64,
    #[serde(default)]
    pub premium_invitee_reward: u64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Partial update: only fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReferralConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inviter_reward: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitee_reward: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_inviter_reward: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_invitee_reward: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Request builders ───────────────────────────────────────────────

pub fn get_configs_request() -> ApiRequest {
    ApiRequest {
        method: Method::Get,
        path: CONFIG_PATH.to_string(),
        body: None,
    }
}

pub fn get_referral_config_request() -> ApiRequest {
    ApiRequest {
        method: Method::Get,
        path: REFERRALS_PATH.to_string(),
        body: None,
    }
}

pub fn update_referral_config_request(
    update: &UpdateReferralConfigRequest,
) -> Result<ApiRequest, ConfigSyncError> {
    Ok(ApiRequest {
        method: Method::Put,
        path: REFERRALS_PATH.to_string(),
        body: Some(encode_body(update)?),
    })
}

pub fn update_config_request(
    key: &str,
    update: &UpdateConfigRequest,
) -> Result<ApiRequest, ConfigSyncError> {
    Ok(ApiRequest {
        method: Method::Put,
        path: format!("{}/{}", CONFIG_PATH, encode_path_segment(key)),
        body: Some(encode_body(update)?),
    })
}

// ── Response parsing ───────────────────────────────────────────────

/// Turn a raw response into `T`, surfacing non-2xx statuses verbatim.
pub fn parse_response<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, ConfigSyncError> {
    if !response.is_success() {
        return Err(ConfigSyncError::Status {
            status: response.status,
            body: response.body.clone(),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| ConfigSyncError::Decode(e.to_string()))
}

fn encode_body<T: Serialize>(body: &T) -> Result<String, ConfigSyncError> {
    serde_json::to_string(body).map_err(|e| ConfigSyncError::Encode(e.to_string()))
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

// ── Client ─────────────────────────────────────────────────────────

pub struct ConfigClient<T> {
    transport: T,
}

impl<T: Transport> ConfigClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn get_configs(&self) -> Result<Vec<ConfigItem>, ConfigSyncError> {
        self.call(&get_configs_request())
    }

    pub fn get_referral_config(&self) -> Result<ReferralConfig, ConfigSyncError> {
        self.call(&get_referral_config_request())
    }

    pub fn update_referral_config(
        &self,
        update: &UpdateReferralConfigRequest,
    ) -> Result<ReferralConfig, ConfigSyncError> {
        self.call(&update_referral_config_request(update)?)
    }

    pub fn update_config(
        &self,
        key: &str,
        update: &UpdateConfigRequest,
    ) -> Result<ConfigItem, ConfigSyncError> {
        self.call(&update_config_request(key, update)?)
    }

    fn call<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R, ConfigSyncError> {
        log::debug!("{} {}", request.method.as_str(), request.path);
        let response = self.transport.send(request)?;
        parse_response(&response).inspect_err(|e| {
            log::warn!("{} {} failed: {}", request.method.as_str(), request.path, e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Records requests and answers from a queue of canned responses.
    #[derive(Default)]
    struct StubTransport {
        sent: RefCell<Vec<ApiRequest>>,
        replies: RefCell<VecDeque<Result<ApiResponse, ConfigSyncError>>>,
    }

    impl StubTransport {
        fn reply(self, status: u16, body: &str) -> Self {
            self.replies.borrow_mut().push_back(Ok(ApiResponse {
                status,
                body: body.to_string(),
            }));
            self
        }

        fn fail(self, msg: &str) -> Self {
            self.replies
                .borrow_mut()
                .push_back(Err(ConfigSyncError::Transport(msg.to_string())));
            self
        }
    }

    impl Transport for StubTransport {
        fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ConfigSyncError> {
            self.sent.borrow_mut().push(request.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ConfigSyncError::Transport("no reply queued".into())))
        }
    }

    #[test]
    fn get_configs_lists_items() {
        let stub = StubTransport::default().reply(
            200,
            r#"[{"key":"spin_cost","value":10},{"key":"banner","value":"hi","description":"top text"}]"#,
        );
        let client = ConfigClient::new(&stub);
        let items = client.get_configs().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, "spin_cost");
        assert_eq!(items[0].value, serde_json::json!(10));
        assert_eq!(items[1].description.as_deref(), Some("top text"));

        let sent = stub.sent.borrow();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].path, "/admin/config");
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn referral_config_get_and_update() {
        let stub = StubTransport::default()
            .reply(200, r#"{"inviterReward":500,"inviteeReward":100}"#)
            .reply(
                200,
                r#"{"inviterReward":750,"inviteeReward":100,"premiumInviterReward":0,"premiumInviteeReward":0,"enabled":false}"#,
            );
        let client = ConfigClient::new(&stub);

        let cfg = client.get_referral_config().unwrap();
        assert_eq!(cfg.inviter_reward, 500);
        assert!(cfg.enabled);

        let update = UpdateReferralConfigRequest {
            inviter_reward: Some(750),
            enabled: Some(false),
            ..Default::default()
        };
        let updated = client.update_referral_config(&update).unwrap();
        assert_eq!(updated.inviter_reward, 750);
        assert!(!updated.enabled);

        let sent = stub.sent.borrow();
        assert_eq!(sent[1].method, Method::Put);
        assert_eq!(sent[1].path, "/admin/config/referrals");
        assert_eq!(
            sent[1].body.as_deref(),
            Some(r#"{"inviterReward":750,"enabled":false}"#)
        );
    }

    #[test]
    fn update_config_encodes_key_into_path() {
        let stub =
            StubTransport::default().reply(200, r#"{"key":"daily bonus/x","value":{"coins":5}}"#);
        let client = ConfigClient::new(&stub);
        let item = client
            .update_config(
                "daily bonus/x",
                &UpdateConfigRequest {
                    value: serde_json::json!({"coins": 5}),
                    description: None,
                },
            )
            .unwrap();
        assert_eq!(item.value["coins"], 5);
        assert_eq!(stub.sent.borrow()[0].path, "/admin/config/daily%20bonus%2Fx");
    }

    #[test]
    fn http_errors_surface_status_and_body() {
        let stub = StubTransport::default().reply(403, "forbidden");
        let client = ConfigClient::new(&stub);
        assert_eq!(
            client.get_configs(),
            Err(ConfigSyncError::Status {
                status: 403,
                body: "forbidden".into()
            })
        );
    }

    #[test]
    fn transport_and_decode_failures_propagate() {
        let stub = StubTransport::default()
            .fail("offline")
            .reply(200, "not json");
        let client = ConfigClient::new(&stub);
        assert_eq!(
            client.get_referral_config(),
            Err(ConfigSyncError::Transport("offline".into()))
        );
        assert!(matches!(
            client.get_referral_config(),
            Err(ConfigSyncError::Decode(_))
        ));
    }

    #[test]
    fn path_segment_encoding() {
        assert_eq!(encode_path_segment("spin_cost"), "spin_cost");
        assert_eq!(encode_path_segment("a b"), "a%20b");
        assert_eq!(encode_path_segment("ü"), "%C3%BC");
    }
}
