//! Normalized capability model
//!
//! Registry-ready shapes. Serialization here is the registry wire
//! contract: the registry validates inputs strictly, so only the
//! documented fields per capability kind may appear.

use serde::Serialize;

/// Access level of a device property.
///
/// Serialized as the registry's GraphQL `Access` enum values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Access {
    Read,
    Write,
    #[serde(rename = "READWRITE")]
    ReadWrite,
}

/// One registry capability input.
///
/// Serializes as a single-key object (`{"binary": {...}}` etc.), the
/// registry's workaround for GraphQL's missing input unions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Binary(BinaryCapability),
    Numeric(NumericCapability),
    Enum(EnumCapability),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryCapability {
    pub property: String,
    pub access: Access,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericCapability {
    pub property: String,
    pub access: Access,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumCapability {
    pub property: String,
    pub access: Access,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub values: Vec<String>,
}

/// Registry-ready device, the `CreateDeviceInputDevice` input object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_source: Option<String>,
    pub capabilities: Vec<Capability>,
}

/// Per-device normalization failure.
///
/// Scoped to a single device: the reconciler excludes the device from the
/// cycle's registration batch and carries on with the rest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// The vendor access bitmask does not resolve through the fixed table.
    #[error("access code {0} is not implemented in the registry schema")]
    UnknownAccessCode(u8),
    /// Leaf kind with no registry-side capability input.
    #[error("capability kind \"{0}\" is not implemented in the registry schema")]
    UnsupportedKind(&'static str),
    /// Device marked supported but published without a definition block.
    #[error("device is marked supported but carries no definition")]
    MissingDefinition,
}
