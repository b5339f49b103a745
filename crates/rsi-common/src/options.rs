//! Inference options: the names of the well-known framework symbols.
//!
//! The defaults are the ASP.NET Core MVC names. A host targeting a different
//! framework (or a test building a synthetic type system) overrides them
//! field by field; every field is optional in the JSON form.

use serde::{Deserialize, Serialize};

/// Fully qualified name of the response-wrapper capability type.
pub const DEFAULT_WRAPPER_TYPE: &str = "Microsoft.AspNetCore.Mvc.IActionResult";

/// Fully qualified name of the capability that exposes a status property.
pub const DEFAULT_STATUS_CODE_WRAPPER_TYPE: &str =
    "Microsoft.AspNetCore.Mvc.Infrastructure.IStatusCodeActionResult";

/// Fully qualified name of the default-status annotation type.
pub const DEFAULT_DEFAULT_STATUS_ATTRIBUTE: &str =
    "Microsoft.AspNetCore.Mvc.Infrastructure.DefaultStatusCodeAttribute";

/// Name of the status property on the status-code wrapper capability.
pub const DEFAULT_STATUS_PROPERTY: &str = "StatusCode";

/// Simple name of the annotation marking a status-code parameter/property.
pub const DEFAULT_STATUS_CODE_ROLE_ATTRIBUTE: &str = "ActionResultStatusCodeAttribute";

/// Simple name of the annotation marking a payload parameter/property.
pub const DEFAULT_OBJECT_VALUE_ROLE_ATTRIBUTE: &str = "ActionResultObjectValueAttribute";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceOptions {
    /// Metadata name of the response-wrapper capability type.
    pub wrapper_type: String,
    /// Metadata name of the type declaring the status property.
    pub status_code_wrapper_type: String,
    /// Metadata name of the default-status annotation type.
    pub default_status_attribute: String,
    /// Member name of the status property.
    pub status_property: String,
    /// Attribute class name of the status-code role annotation.
    pub status_code_role_attribute: String,
    /// Attribute class name of the object-value role annotation.
    pub object_value_role_attribute: String,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            wrapper_type: DEFAULT_WRAPPER_TYPE.to_string(),
            status_code_wrapper_type: DEFAULT_STATUS_CODE_WRAPPER_TYPE.to_string(),
            default_status_attribute: DEFAULT_DEFAULT_STATUS_ATTRIBUTE.to_string(),
            status_property: DEFAULT_STATUS_PROPERTY.to_string(),
            status_code_role_attribute: DEFAULT_STATUS_CODE_ROLE_ATTRIBUTE.to_string(),
            object_value_role_attribute: DEFAULT_OBJECT_VALUE_ROLE_ATTRIBUTE.to_string(),
        }
    }
}

impl InferenceOptions {
    /// Parse options from a JSON document. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
