//! Wire types shared with the MPC signing service.

use serde::{Deserialize, Serialize};

/// A pending sign request as returned by the signing service.
///
/// Field names are PascalCase on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignRequest {
    /// Opaque request key, echoed back on approval
    #[serde(default)]
    pub key: String,
    /// Requesting account
    #[serde(default)]
    pub account: String,
    #[serde(default, rename = "GroupID")]
    pub group_id: String,
    #[serde(default)]
    pub mode: String,
    /// Hashes awaiting signature; exactly one for a fee withdrawal
    #[serde(default)]
    pub msg_hash: Vec<String>,
    /// Context strings describing what is being signed
    #[serde(default)]
    pub msg_context: Vec<String>,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub pub_key: String,
    #[serde(default)]
    pub thres_hold: String,
    /// Submission time in milliseconds since the epoch, as a decimal string
    #[serde(default)]
    pub time_stamp: String,
}

impl SignRequest {
    /// Numeric submission time, `None` when the field is absent or garbage.
    pub fn timestamp_millis(&self) -> Option<u64> {
        self.time_stamp.parse().ok()
    }
}

/// Outcome of reviewing one sign request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether to co-sign the request
    pub agree: bool,
    /// Request is not this guard's to answer; nothing is submitted
    pub ignore: bool,
    /// Audit reason, empty on agreement
    pub reason: String,
}

impl Verdict {
    pub fn agree() -> Self {
        Self {
            agree: true,
            ignore: false,
            reason: String::new(),
        }
    }

    pub fn disagree(reason: impl Into<String>) -> Self {
        Self {
            agree: false,
            ignore: false,
            reason: reason.into(),
        }
    }

    pub fn ignore(reason: impl Into<String>) -> Self {
        Self {
            agree: false,
            ignore: true,
            reason: reason.into(),
        }
    }

    /// Wire form of the decision.
    pub fn accept_result(&self) -> &'static str {
        if self.agree {
            "AGREE"
        } else {
            "DISAGREE"
        }
    }
}
