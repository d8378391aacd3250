//! Zigbee2MQTT bridge wire types
//!
//! ## Responsibilities
//!
//! - Decode `{root_topic}/bridge/devices` snapshot payloads
//! - Model the vendor capability tree (`exposes`) as a closed sum type
//! - Preserve the raw device shape for store records
//!
//! Vendor fields not modeled here are dropped at deserialization; the
//! registry input is built from `capability::normalize_device`, never from
//! these structs directly.

use serde::{Deserialize, Serialize};

/// One entry of the bridge device snapshot.
///
/// `definition` is only published for supported devices; the coordinator
/// and unrecognized hardware carry `supported: false` and a null
/// definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeDevice {
    /// Stable hardware address, unique per physical device.
    pub ieee_address: String,
    pub friendly_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_source: Option<String>,
    #[serde(default)]
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<DeviceDefinition>,
}

/// Vendor definition block of a supported device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub exposes: Vec<Expose>,
}

/// One node of the vendor capability tree.
///
/// `light` and `switch` are wrapper nodes: they bundle several addressable
/// sub-properties under `features` and are never registered themselves.
/// Everything else is a leaf. Expose types the vendor may add in future
/// firmware decode as `Unknown` instead of failing the whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Expose {
    Binary {
        property: String,
        access: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Numeric {
        property: String,
        access: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value_max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Enum {
        property: String,
        access: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        values: Vec<String>,
    },
    Text {
        property: String,
        access: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Composite {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property: Option<String>,
        #[serde(default)]
        features: Vec<Expose>,
    },
    Light {
        #[serde(default)]
        features: Vec<Expose>,
    },
    Switch {
        #[serde(default)]
        features: Vec<Expose>,
    },
    #[serde(other)]
    Unknown,
}

impl Expose {
    /// Wire name of this node's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expose::Binary { .. } => "binary",
            Expose::Numeric { .. } => "numeric",
            Expose::Enum { .. } => "enum",
            Expose::Text { .. } => "text",
            Expose::Composite { .. } => "composite",
            Expose::Light { .. } => "light",
            Expose::Switch { .. } => "switch",
            Expose::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_deserialization() {
        // Trimmed-down capture of a real bridge/devices publish: the
        // coordinator entry plus one supported bulb, with vendor fields
        // this crate does not model.
        let json = r#"[
            {
                "ieee_address": "0x00124b0021cb4b8e",
                "friendly_name": "Coordinator",
                "type": "Coordinator",
                "network_address": 0,
                "supported": false,
                "definition": null
            },
            {
                "ieee_address": "0x847127fffe8c3f44",
                "friendly_name": "hallway_bulb",
                "power_source": "Mains (single phase)",
                "interview_completed": true,
                "supported": true,
                "definition": {
                    "description": "Smart bulb E27",
                    "vendor": "Acme",
                    "exposes": [
                        {
                            "type": "light",
                            "features": [
                                {
                                    "type": "binary",
                                    "property": "state",
                                    "access": 7,
                                    "value_on": "ON",
                                    "value_off": "OFF"
                                },
                                {
                                    "type": "numeric",
                                    "property": "brightness",
                                    "access": 7,
                                    "value_min": 0,
                                    "value_max": 254
                                }
                            ]
                        },
                        {
                            "type": "enum",
                            "property": "effect",
                            "access": 2,
                            "values": ["blink", "okay"]
                        }
                    ]
                }
            }
        ]"#;

        let devices: Vec<BridgeDevice> = serde_json::from_str(json).unwrap();
        assert_eq!(devices.len(), 2);

        assert!(!devices[0].supported);
        assert!(devices[0].definition.is_none());
        assert!(devices[0].power_source.is_none());

        let bulb = &devices[1];
        assert!(bulb.supported);
        assert_eq!(bulb.ieee_address, "0x847127fffe8c3f44");
        assert_eq!(bulb.power_source.as_deref(), Some("Mains (single phase)"));

        let definition = bulb.definition.as_ref().unwrap();
        assert_eq!(definition.description.as_deref(), Some("Smart bulb E27"));
        assert_eq!(definition.exposes.len(), 2);

        match &definition.exposes[0] {
            Expose::Light { features } => {
                assert_eq!(features.len(), 2);
                assert_eq!(features[0].kind(), "binary");
                assert_eq!(features[1].kind(), "numeric");
            }
            other => panic!("expected light wrapper, got {}", other.kind()),
        }
        match &definition.exposes[1] {
            Expose::Enum { property, access, values, .. } => {
                assert_eq!(property, "effect");
                assert_eq!(*access, 2);
                assert_eq!(values, &["blink".to_string(), "okay".to_string()]);
            }
            other => panic!("expected enum leaf, got {}", other.kind()),
        }
    }

    #[test]
    fn test_unmodeled_expose_kind_decodes_as_unknown() {
        let json = r#"{"type": "climate", "features": [], "property": "hvac"}"#;
        let expose: Expose = serde_json::from_str(json).unwrap();
        assert_eq!(expose, Expose::Unknown);
    }

    #[test]
    fn test_numeric_bounds_are_optional() {
        let json = r#"{"type": "numeric", "property": "linkquality", "access": 1}"#;
        let expose: Expose = serde_json::from_str(json).unwrap();
        match expose {
            Expose::Numeric { value_min, value_max, unit, .. } => {
                assert!(value_min.is_none());
                assert!(value_max.is_none());
                assert!(unit.is_none());
            }
            other => panic!("expected numeric leaf, got {}", other.kind()),
        }
    }
}
