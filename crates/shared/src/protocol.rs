use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header marking the contact POST as a programmatic request.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Reply body of the contact endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactReply {
    pub success: bool,
}

impl ContactReply {
    /// Reads any JSON document as a reply. Only a literal `"success": true` counts as success;
    /// truthy non-booleans such as `1` or `"yes"` are rejections, since the field is a boolean.
    pub fn from_value(value: &Value) -> Self {
        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        Self { success }
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }
}
