//! The reconstruction payload handed to serialisation pipelines.

use crate::capture::CapturedCall;
use crate::error::SerializableError;
use crate::value::{Args, Kwargs};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Snapshot of a captured call under the conventional `args`/`kwargs` keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionState {
    #[serde(default)]
    pub args: Args,

    #[serde(default)]
    pub kwargs: Kwargs,
}

impl ReconstructionState {
    pub fn new(args: Args, kwargs: Kwargs) -> Self {
        Self { args, kwargs }
    }

    /// SHA-256 over the canonical JSON encoding.
    ///
    /// Keyword order never affects the digest; positional order does.
    pub fn digest(&self) -> Result<StateDigest, SerializableError> {
        let bytes = serde_json::to_vec(self)?;
        let hash = Sha256::digest(&bytes);
        Ok(StateDigest(format!("{hash:x}")))
    }
}

impl From<CapturedCall> for ReconstructionState {
    fn from(call: CapturedCall) -> Self {
        Self::new(call.positional, call.keyword)
    }
}

impl From<ReconstructionState> for CapturedCall {
    fn from(state: ReconstructionState) -> Self {
        CapturedCall::new(state.args, state.kwargs)
    }
}

/// Content digest of a [`ReconstructionState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateDigest(pub String);

impl fmt::Display for StateDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: serde_json::Value) -> ReconstructionState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn conventional_keys() {
        let s = state(json!({"args": [1], "kwargs": {"b": 2}}));
        assert_eq!(s.args, vec![json!(1)]);
        insta::assert_json_snapshot!(s, @r###"
        {
          "args": [
            1
          ],
          "kwargs": {
            "b": 2
          }
        }
        "###);
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let s = state(json!({}));
        assert_eq!(s, ReconstructionState::default());
    }

    #[test]
    fn digest_ignores_keyword_order_only() {
        let a = state(json!({"args": [1, 2], "kwargs": {"x": 1, "y": 2}}));
        let b = state(json!({"args": [1, 2], "kwargs": {"y": 2, "x": 1}}));
        let c = state(json!({"args": [2, 1], "kwargs": {"x": 1, "y": 2}}));
        assert_eq!(a.digest().unwrap(), b.digest().unwrap());
        assert_ne!(a.digest().unwrap(), c.digest().unwrap());
        assert_eq!(a.digest().unwrap().to_string().len(), 64);
    }
}
