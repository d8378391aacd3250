//! Capability tree flattening

use super::types::{
    Access, BinaryCapability, Capability, DeviceInput, EnumCapability, NormalizeError,
    NumericCapability,
};
use crate::bridge::{BridgeDevice, Expose};

/// Resolve a vendor access bitmask.
///
/// The table is fixed: `1 -> Read`, `2 -> Write`, `7 -> ReadWrite`. Any
/// other code fails naming the offending value; a silent default would
/// register a device with the wrong access contract.
pub fn map_access(code: u8) -> Result<Access, NormalizeError> {
    match code {
        1 => Ok(Access::Read),
        2 => Ok(Access::Write),
        7 => Ok(Access::ReadWrite),
        other => Err(NormalizeError::UnknownAccessCode(other)),
    }
}

/// Flatten a capability tree into registry inputs.
///
/// Depth-first and order-preserving: a wrapper's children are emitted in
/// input order, in place of the wrapper; the wrapper itself never reaches
/// the output.
pub fn normalize_exposes(exposes: &[Expose]) -> Result<Vec<Capability>, NormalizeError> {
    let mut capabilities = Vec::new();
    for expose in exposes {
        flatten_expose(expose, &mut capabilities)?;
    }
    Ok(capabilities)
}

fn flatten_expose(expose: &Expose, out: &mut Vec<Capability>) -> Result<(), NormalizeError> {
    match expose {
        Expose::Light { features } | Expose::Switch { features } => {
            for feature in features {
                flatten_expose(feature, out)?;
            }
            Ok(())
        }
        Expose::Binary {
            property,
            access,
            description,
        } => {
            out.push(Capability::Binary(BinaryCapability {
                property: property.clone(),
                access: map_access(*access)?,
                description: description.clone(),
            }));
            Ok(())
        }
        Expose::Numeric {
            property,
            access,
            description,
            value_min,
            value_max,
            unit,
        } => {
            out.push(Capability::Numeric(NumericCapability {
                property: property.clone(),
                access: map_access(*access)?,
                description: description.clone(),
                min: *value_min,
                max: *value_max,
                unit: unit.clone(),
            }));
            Ok(())
        }
        Expose::Enum {
            property,
            access,
            description,
            values,
        } => {
            out.push(Capability::Enum(EnumCapability {
                property: property.clone(),
                access: map_access(*access)?,
                description: description.clone(),
                values: values.clone(),
            }));
            Ok(())
        }
        Expose::Text { .. } | Expose::Composite { .. } | Expose::Unknown => {
            Err(NormalizeError::UnsupportedKind(expose.kind()))
        }
    }
}

/// Build the registry input for one supported device.
pub fn normalize_device(device: &BridgeDevice) -> Result<DeviceInput, NormalizeError> {
    let definition = device
        .definition
        .as_ref()
        .ok_or(NormalizeError::MissingDefinition)?;

    Ok(DeviceInput {
        name: device.friendly_name.clone(),
        description: definition.description.clone(),
        power_source: device.power_source.clone(),
        capabilities: normalize_exposes(&definition.exposes)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::DeviceDefinition;
    use serde_json::json;

    fn binary(property: &str, access: u8) -> Expose {
        Expose::Binary {
            property: property.to_string(),
            access,
            description: None,
        }
    }

    fn numeric(property: &str, access: u8, min: f64, max: f64, unit: &str) -> Expose {
        Expose::Numeric {
            property: property.to_string(),
            access,
            description: None,
            value_min: Some(min),
            value_max: Some(max),
            unit: Some(unit.to_string()),
        }
    }

    fn property_of(capability: &Capability) -> &str {
        match capability {
            Capability::Binary(c) => &c.property,
            Capability::Numeric(c) => &c.property,
            Capability::Enum(c) => &c.property,
        }
    }

    #[test]
    fn test_access_table_is_exhaustive() {
        assert_eq!(map_access(1).unwrap(), Access::Read);
        assert_eq!(map_access(2).unwrap(), Access::Write);
        assert_eq!(map_access(7).unwrap(), Access::ReadWrite);

        for code in [0u8, 3, 4, 5, 6, 8, 42, 255] {
            assert_eq!(map_access(code), Err(NormalizeError::UnknownAccessCode(code)));
        }
    }

    #[test]
    fn test_light_wrapper_is_flattened_away() {
        let exposes = vec![Expose::Light {
            features: vec![numeric("brightness", 7, 0.0, 100.0, "%")],
        }];

        let capabilities = normalize_exposes(&exposes).unwrap();
        assert_eq!(capabilities.len(), 1);
        match &capabilities[0] {
            Capability::Numeric(c) => {
                assert_eq!(c.property, "brightness");
                assert_eq!(c.access, Access::ReadWrite);
                assert_eq!(c.min, Some(0.0));
                assert_eq!(c.max, Some(100.0));
                assert_eq!(c.unit.as_deref(), Some("%"));
            }
            other => panic!("expected numeric capability, got {:?}", other),
        }

        // The wrapper must be absent from the registered payload.
        let wire = serde_json::to_string(&capabilities).unwrap();
        assert!(!wire.contains("light"));
        assert!(!wire.contains("features"));
    }

    #[test]
    fn test_wrapper_with_n_leaves_yields_n_capabilities() {
        let exposes = vec![Expose::Switch {
            features: vec![binary("state_l1", 7), binary("state_l2", 7), binary("state_l3", 7)],
        }];

        let capabilities = normalize_exposes(&exposes).unwrap();
        assert_eq!(capabilities.len(), 3);
        assert!(capabilities
            .iter()
            .all(|c| matches!(c, Capability::Binary(_))));
    }

    #[test]
    fn test_flatten_preserves_depth_first_order() {
        let exposes = vec![
            binary("state", 7),
            Expose::Light {
                features: vec![
                    numeric("brightness", 7, 0.0, 254.0, ""),
                    Expose::Enum {
                        property: "effect".to_string(),
                        access: 2,
                        description: None,
                        values: vec!["blink".to_string()],
                    },
                ],
            },
            Expose::Switch {
                features: vec![binary("child_lock", 2)],
            },
        ];

        let capabilities = normalize_exposes(&exposes).unwrap();
        let order: Vec<&str> = capabilities.iter().map(property_of).collect();
        assert_eq!(order, vec!["state", "brightness", "effect", "child_lock"]);
    }

    #[test]
    fn test_nested_wrappers_flatten_recursively() {
        let exposes = vec![Expose::Light {
            features: vec![Expose::Switch {
                features: vec![binary("state", 7)],
            }],
        }];

        let capabilities = normalize_exposes(&exposes).unwrap();
        assert_eq!(capabilities.len(), 1);
        assert_eq!(property_of(&capabilities[0]), "state");
    }

    #[test]
    fn test_unknown_access_code_fails_device() {
        let exposes = vec![binary("state", 7), binary("broken", 5)];
        assert_eq!(
            normalize_exposes(&exposes),
            Err(NormalizeError::UnknownAccessCode(5))
        );
    }

    #[test]
    fn test_text_leaf_fails_device() {
        let exposes = vec![Expose::Text {
            property: "inserted".to_string(),
            access: 1,
            description: None,
        }];
        assert_eq!(
            normalize_exposes(&exposes),
            Err(NormalizeError::UnsupportedKind("text"))
        );
    }

    #[test]
    fn test_composite_leaf_fails_device() {
        let exposes = vec![Expose::Composite {
            property: Some("color".to_string()),
            features: vec![numeric("hue", 7, 0.0, 360.0, "deg")],
        }];
        assert_eq!(
            normalize_exposes(&exposes),
            Err(NormalizeError::UnsupportedKind("composite"))
        );
    }

    #[test]
    fn test_normalize_device_forwards_identity_fields() {
        let device = BridgeDevice {
            ieee_address: "0x00158d0001a2b3c4".to_string(),
            friendly_name: "desk_plug".to_string(),
            power_source: Some("Mains (single phase)".to_string()),
            supported: true,
            definition: Some(DeviceDefinition {
                description: Some("Smart plug".to_string()),
                exposes: vec![binary("state", 7)],
            }),
        };

        let input = normalize_device(&device).unwrap();
        assert_eq!(input.name, "desk_plug");
        assert_eq!(input.description.as_deref(), Some("Smart plug"));
        assert_eq!(input.power_source.as_deref(), Some("Mains (single phase)"));
        assert_eq!(input.capabilities.len(), 1);
    }

    #[test]
    fn test_normalize_device_without_definition() {
        let device = BridgeDevice {
            ieee_address: "0x00158d0001a2b3c4".to_string(),
            friendly_name: "mystery".to_string(),
            power_source: None,
            supported: true,
            definition: None,
        };

        assert_eq!(
            normalize_device(&device),
            Err(NormalizeError::MissingDefinition)
        );
    }

    #[test]
    fn test_capability_wire_shape() {
        let capability = Capability::Numeric(NumericCapability {
            property: "brightness".to_string(),
            access: Access::ReadWrite,
            description: None,
            min: Some(0.0),
            max: Some(254.0),
            unit: None,
        });

        // Single-key object, SCREAMING access value, absent fields dropped:
        // the registry rejects unexpected or mistyped fields.
        assert_eq!(
            serde_json::to_value(&capability).unwrap(),
            json!({
                "numeric": {
                    "property": "brightness",
                    "access": "READWRITE",
                    "min": 0.0,
                    "max": 254.0
                }
            })
        );

        let input = DeviceInput {
            name: "desk_plug".to_string(),
            description: None,
            power_source: Some("Battery".to_string()),
            capabilities: vec![],
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({
                "name": "desk_plug",
                "powerSource": "Battery",
                "capabilities": []
            })
        );
    }
}
