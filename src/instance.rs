use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::WorkflowError;

const MAX_INSTANCE_LEN: usize = 128;
const STATE_RECORD: &str = "state";

/// Identifies one run of the workflow inside a shared store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Result<Self, WorkflowError> {
        let id = id.into();
        let invalid = |reason: &str| WorkflowError::InvalidInstance {
            id: id.clone(),
            reason: reason.to_string(),
        };

        if id.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if id.len() > MAX_INSTANCE_LEN {
            return Err(invalid("longer than 128 bytes"));
        }
        if id.contains('/') || id.contains('\0') {
            return Err(invalid("must not contain '/' or NUL"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key holding this instance's current state.
    pub fn state_key(&self) -> String {
        format!("{}/{}", self.0, STATE_RECORD)
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InstanceId {
    type Error = WorkflowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstanceId> for String {
    fn from(value: InstanceId) -> Self {
        value.0
    }
}

impl std::str::FromStr for InstanceId {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
