//! # Actions Wire Format
//!
//! Serde types for the Solana Actions protocol: the discovery document a
//! client renders as a form, the POST body carrying the signer's account,
//! and the response wrapping the unsigned transaction.
//!
//! The discovery document for the transfer action is built here too. It is
//! a pure function of the icon URL; nothing in it depends on state, so two
//! calls with the same origin produce byte-identical JSON.

use serde::{Deserialize, Serialize};

use crate::config::{ACTION_PATH, ACTION_VERSION, MAINNET_BLOCKCHAIN_ID};
use crate::transaction::types::Currency;

/// Headers every Actions response carries, wallet clients refuse to render
/// without them. `X-Action-Version` and `X-Blockchain-Ids` are added by
/// [`action_headers`].
pub const ACTIONS_CORS_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET,POST,PUT,OPTIONS"),
    (
        "access-control-allow-headers",
        "Content-Type, Authorization, Content-Encoding, Accept-Encoding, X-Accept-Action-Version, X-Accept-Blockchain-Ids",
    ),
    (
        "access-control-expose-headers",
        "X-Action-Version, X-Blockchain-Ids",
    ),
];

/// CORS headers plus the action version and chain id headers.
pub fn action_headers() -> Vec<(&'static str, &'static str)> {
    let mut headers = ACTIONS_CORS_HEADERS.to_vec();
    headers.push(("x-action-version", ACTION_VERSION));
    headers.push(("x-blockchain-ids", MAINNET_BLOCKCHAIN_ID));
    headers
}

// ---------------------------------------------------------------------------
// GET
// ---------------------------------------------------------------------------

/// Discovery document returned by `GET` (and `OPTIONS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGetResponse {
    /// Always `"action"` here.
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub actions: Vec<LinkedAction>,
}

/// One button/form the client renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAction {
    /// Request type marker, `"post"` for this action.
    #[serde(rename = "type")]
    pub kind: String,
    /// Templated URL; `{name}` placeholders are filled from parameters.
    pub href: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ActionParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub label: String,
    /// Input type: `text`, `number`, `radio`, ...
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ActionParameterOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParameterOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

/// Builds the discovery document for the multi-token transfer action.
///
/// The currency choices are generated from [`Currency::ALL`], so the form
/// can never offer a symbol the builder does not accept. SOL is preselected.
pub fn transfer_action(icon: impl Into<String>) -> ActionGetResponse {
    let options = Currency::ALL
        .iter()
        .map(|c| ActionParameterOption {
            label: c.symbol().to_string(),
            value: c.symbol().to_string(),
            selected: c.is_native(),
        })
        .collect();

    ActionGetResponse {
        kind: "action".to_string(),
        icon: icon.into(),
        title: "Transfer Multiple Tokens".to_string(),
        description:
            "Easily transfer multiple tokens including SOL, USDC, BONK, and SEND using this feature."
                .to_string(),
        label: "Multi-Token Transfer".to_string(),
        disabled: false,
        links: Some(Links {
            actions: vec![LinkedAction {
                kind: "post".to_string(),
                href: format!(
                    "{ACTION_PATH}?walletAddress={{walletAddress}}&amount={{amount}}&token={{token}}&cluster={{cluster}}"
                ),
                label: "Transfer Tokens".to_string(),
                parameters: vec![
                    ActionParameter {
                        name: "token".to_string(),
                        label: "Choose token".to_string(),
                        kind: "radio".to_string(),
                        required: false,
                        options,
                    },
                    ActionParameter {
                        name: "walletAddress".to_string(),
                        label: "Recipient Wallet Address".to_string(),
                        kind: "text".to_string(),
                        required: true,
                        options: Vec::new(),
                    },
                    ActionParameter {
                        name: "amount".to_string(),
                        label: "Amount to Transfer".to_string(),
                        kind: "number".to_string(),
                        required: true,
                        options: Vec::new(),
                    },
                ],
            }],
        }),
    }
}

// ---------------------------------------------------------------------------
// POST
// ---------------------------------------------------------------------------

/// Body of the `POST`: the wallet's own address, which becomes sender and
/// fee payer. Kept as a raw string so parse failures surface as a typed
/// rejection instead of a generic body error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPostRequest {
    pub account: String,
}

/// Successful `POST` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPostResponse {
    /// Always `"transaction"` here.
    #[serde(rename = "type")]
    pub kind: String,
    /// Base64 wire bytes of the unsigned transaction.
    pub transaction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionPostResponse {
    pub fn transaction(transaction: String, message: impl Into<String>) -> Self {
        Self {
            kind: "transaction".to_string(),
            transaction,
            message: Some(message.into()),
        }
    }
}

/// Error body, shown to the user by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// actions.json
// ---------------------------------------------------------------------------

/// `/actions.json` at the domain root: maps website paths to action APIs so
/// clients can unfurl links to the site itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsJson {
    pub rules: Vec<ActionRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRule {
    pub path_pattern: String,
    pub api_path: String,
}

/// Rules: every `/api/actions/**` path is itself an action, and the site
/// root unfurls to the transfer action.
pub fn actions_json() -> ActionsJson {
    ActionsJson {
        rules: vec![
            ActionRule {
                path_pattern: "/".to_string(),
                api_path: ACTION_PATH.to_string(),
            },
            ActionRule {
                path_pattern: "/api/actions/**".to_string(),
                api_path: "/api/actions/**".to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_lists_every_currency_once() {
        let meta = transfer_action("https://example.com/logo.png");
        let links = meta.links.unwrap();
        let token = &links.actions[0].parameters[0];
        assert_eq!(token.name, "token");
        let values: Vec<&str> = token.options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["SOL", "USDC", "SEND", "BONK"]);
        let selected: Vec<&str> = token
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(selected, vec!["SOL"]);
    }

    #[test]
    fn metadata_href_template() {
        let meta = transfer_action("icon");
        let action = &meta.links.unwrap().actions[0];
        assert_eq!(
            action.href,
            "/api/actions/transfer-multi-token?walletAddress={walletAddress}&amount={amount}&token={token}&cluster={cluster}"
        );
        assert_eq!(action.kind, "post");
    }

    #[test]
    fn metadata_json_shape() {
        let json = serde_json::to_value(transfer_action("https://x.test/logo.png")).unwrap();
        assert_eq!(json["type"], "action");
        assert_eq!(json["icon"], "https://x.test/logo.png");
        assert_eq!(json["disabled"], false);
        let params = &json["links"]["actions"][0]["parameters"];
        assert_eq!(params[1]["name"], "walletAddress");
        assert_eq!(params[1]["required"], true);
        assert_eq!(params[2]["type"], "number");
        // Free-text fields carry no options array.
        assert!(params[1].get("options").is_none());
    }

    #[test]
    fn metadata_is_deterministic() {
        let a = serde_json::to_vec(&transfer_action("i")).unwrap();
        let b = serde_json::to_vec(&transfer_action("i")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn post_response_shape() {
        let resp = ActionPostResponse::transaction("AQID".into(), "Send 1 SOL to x");
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["type"], "transaction");
        assert_eq!(json["transaction"], "AQID");
        assert_eq!(json["message"], "Send 1 SOL to x");
    }

    #[test]
    fn action_headers_include_version_and_chain() {
        let headers = action_headers();
        assert!(headers.iter().any(|(k, _)| *k == "x-action-version"));
        assert!(headers
            .iter()
            .any(|(k, v)| *k == "access-control-allow-origin" && *v == "*"));
    }

    #[test]
    fn actions_json_uses_camel_case() {
        let json = serde_json::to_value(actions_json()).unwrap();
        assert_eq!(json["rules"][0]["pathPattern"], "/");
        assert_eq!(json["rules"][0]["apiPath"], ACTION_PATH);
    }
}
