#![forbid(unsafe_code)]

//! Per-instance effect configuration.
//!
//! An [`EffectConfig`] describes one text or pointer effect: how far it
//! reaches, the falloff shape, the sign convention, and any overridden
//! parameter ranges. Unspecified ranges fall back to the polarity defaults.
//!
//! Configuration can be read from JSON (`serde_json`) and adjusted by
//! environment overrides through [`EffectConfig::apply_env_with`], which takes
//! a lookup closure so callers and tests never touch the process environment
//! directly.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `FLOWSTACK_EFFECT_RADIUS` | Pixel radius (pointer) or viewport fraction (focus) |
//! | `FLOWSTACK_FALLOFF` | `linear`, `gaussian`, or `exponential` |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::Falloff;
use crate::progress::{
    DEFAULT_POINTER_RADIUS, DEFAULT_VIEWPORT_FRACTION, PointerDistanceNormalizer,
    ViewportCenterNormalizer,
};
use crate::visual::{EffectProfile, Param, ParamRange, Polarity};

pub const ENV_EFFECT_RADIUS: &str = "FLOWSTACK_EFFECT_RADIUS";
pub const ENV_FALLOFF: &str = "FLOWSTACK_FALLOFF";

/// Reach of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectRadius {
    /// Fixed radius in CSS pixels.
    Pixels(f64),
    /// Fraction of the viewport height.
    ViewportFraction(f64),
}

impl EffectRadius {
    fn value(self) -> f64 {
        match self {
            Self::Pixels(v) | Self::ViewportFraction(v) => v,
        }
    }

    fn with_value(self, v: f64) -> Self {
        match self {
            Self::Pixels(_) => Self::Pixels(v),
            Self::ViewportFraction(_) => Self::ViewportFraction(v),
        }
    }
}

/// Configuration for one effect instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub effect_radius: EffectRadius,
    #[serde(default)]
    pub falloff: Falloff,
    pub polarity: Polarity,
    #[serde(default)]
    pub parameter_ranges: BTreeMap<Param, ParamRange>,
}

impl EffectConfig {
    /// Viewport-center text defaults.
    #[must_use]
    pub fn focus() -> Self {
        Self {
            effect_radius: EffectRadius::ViewportFraction(DEFAULT_VIEWPORT_FRACTION),
            falloff: Falloff::Linear,
            polarity: Polarity::Focus,
            parameter_ranges: BTreeMap::new(),
        }
    }

    /// Pointer-contact glyph defaults.
    #[must_use]
    pub fn contact() -> Self {
        Self {
            effect_radius: EffectRadius::Pixels(DEFAULT_POINTER_RADIUS),
            falloff: Falloff::Linear,
            polarity: Polarity::Contact,
            parameter_ranges: BTreeMap::new(),
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// Returns the first violation on failure; use [`validate`](Self::validate)
    /// for the full list.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::new("effect_config", json.trim(), e.to_string()))?;
        config
            .validate()
            .map_err(|mut errors| errors.swap_remove(0))?;
        Ok(config)
    }

    /// Apply environment overrides read through `get`.
    ///
    /// Unparseable values are reported and leave the field unchanged.
    pub fn apply_env_with<F>(&mut self, mut get: F) -> Vec<ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        if let Some(raw) = get(ENV_EFFECT_RADIUS) {
            match raw.trim().parse::<f64>() {
                Ok(v) => self.effect_radius = self.effect_radius.with_value(v),
                Err(_) => errors.push(ConfigError::new(
                    ENV_EFFECT_RADIUS,
                    raw,
                    "expected a number",
                )),
            }
        }
        if let Some(raw) = get(ENV_FALLOFF) {
            match Falloff::from_name(&raw) {
                Some(falloff) => self.falloff = falloff,
                None => errors.push(ConfigError::new(
                    ENV_FALLOFF,
                    raw,
                    "expected linear, gaussian, or exponential",
                )),
            }
        }
        #[cfg(feature = "tracing")]
        for error in &errors {
            crate::warn!(%error, "ignored effect override");
        }
        errors
    }

    /// Check every constraint and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        let radius = self.effect_radius.value();
        if !radius.is_finite() || radius <= 0.0 {
            errors.push(ConfigError::new(
                "effect_radius",
                radius.to_string(),
                "must be a positive finite number",
            ));
        }
        for (param, range) in &self.parameter_ranges {
            if !range.from.is_finite() || !range.to.is_finite() {
                errors.push(ConfigError::new(
                    param.name(),
                    format!("{}..{}", range.from, range.to),
                    "range endpoints must be finite",
                ));
            }
        }
        for (param, range) in &self.parameter_ranges {
            let bounded = match param {
                Param::Blur => range.from >= 0.0 && range.to >= 0.0,
                Param::Opacity => {
                    (0.0..=1.0).contains(&range.from) && (0.0..=1.0).contains(&range.to)
                }
                Param::Scale | Param::Brightness => range.from >= 0.0 && range.to >= 0.0,
                Param::TranslateY | Param::RotateX => true,
            };
            if !bounded {
                errors.push(ConfigError::new(
                    param.name(),
                    format!("{}..{}", range.from, range.to),
                    "range leaves the parameter's valid domain",
                ));
            }
        }
        for violation in self.profile().polarity_violations() {
            errors.push(ConfigError::new(
                violation.param.name(),
                format!("{}..{}", violation.range.from, violation.range.to),
                format!(
                    "{:?} polarity expects {}",
                    self.polarity, violation.expected
                ),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Interpolation profile with overrides applied.
    pub fn profile(&self) -> EffectProfile {
        self.parameter_ranges
            .iter()
            .fold(EffectProfile::new(self.polarity), |profile, (&p, &r)| {
                profile.with_range(p, r)
            })
    }

    /// Viewport-center normalizer for this configuration.
    ///
    /// A pixel radius is converted with `reference_height`.
    pub fn viewport_normalizer(&self, reference_height: f64) -> ViewportCenterNormalizer {
        let range_fraction = match self.effect_radius {
            EffectRadius::ViewportFraction(f) => f,
            EffectRadius::Pixels(px) if reference_height > 0.0 => px / reference_height,
            EffectRadius::Pixels(_) => DEFAULT_VIEWPORT_FRACTION,
        };
        ViewportCenterNormalizer {
            range_fraction,
            falloff: self.falloff,
        }
    }

    /// Pointer-distance normalizer for this configuration.
    ///
    /// A viewport fraction is converted with `reference_height`.
    pub fn pointer_normalizer(&self, reference_height: f64) -> PointerDistanceNormalizer {
        let radius = match self.effect_radius {
            EffectRadius::Pixels(px) => px,
            EffectRadius::ViewportFraction(f) => f * reference_height,
        };
        PointerDistanceNormalizer {
            radius,
            falloff: self.falloff,
        }
    }
}

/// Configuration error with field context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    pub fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Progress;
    use std::collections::HashMap;

    #[test]
    fn defaults_validate() {
        assert_eq!(EffectConfig::focus().validate(), Ok(()));
        assert_eq!(EffectConfig::contact().validate(), Ok(()));
    }

    #[test]
    fn json_with_overrides() {
        let json = r#"{
            "effect_radius": { "pixels": 240 },
            "falloff": "gaussian",
            "polarity": "contact",
            "parameter_ranges": { "blur": { "from": 8, "to": 0 } }
        }"#;
        let config = EffectConfig::from_json(json).expect("valid config");
        assert_eq!(config.effect_radius, EffectRadius::Pixels(240.0));
        assert_eq!(config.falloff, Falloff::Gaussian);
        let near = config.profile().synthesize(Progress::FOCUSED);
        assert_eq!(near.blur, 8.0);
        // Untouched ranges keep the contact defaults.
        assert_eq!(near.opacity, 0.5);
    }

    #[test]
    fn falloff_defaults_to_linear() {
        let json = r#"{ "effect_radius": { "viewport_fraction": 0.5 }, "polarity": "focus" }"#;
        let config = EffectConfig::from_json(json).expect("valid config");
        assert_eq!(config.falloff, Falloff::Linear);
        assert!(config.parameter_ranges.is_empty());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = EffectConfig::from_json("{ nope").unwrap_err();
        assert_eq!(err.field, "effect_config");
    }

    #[test]
    fn validation_collects_every_violation() {
        let mut config = EffectConfig::focus();
        config.effect_radius = EffectRadius::ViewportFraction(0.0);
        config
            .parameter_ranges
            .insert(Param::Opacity, ParamRange::new(1.0, 1.5));
        config
            .parameter_ranges
            .insert(Param::Scale, ParamRange::new(0.9, 1.1));
        let errors = config.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["effect_radius", "opacity", "scale"]);
    }

    #[test]
    fn env_overrides_apply_and_report() {
        let env: HashMap<&str, &str> =
            [(ENV_EFFECT_RADIUS, "120"), (ENV_FALLOFF, "wobbly")].into();
        let mut config = EffectConfig::contact();
        let errors = config.apply_env_with(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.effect_radius, EffectRadius::Pixels(120.0));
        assert_eq!(config.falloff, Falloff::Linear);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, ENV_FALLOFF);
        assert_eq!(
            errors[0].to_string(),
            "FLOWSTACK_FALLOFF=wobbly (expected linear, gaussian, or exponential)"
        );
    }

    #[test]
    fn normalizers_convert_radius_kinds() {
        let focus = EffectConfig::focus();
        assert_eq!(focus.viewport_normalizer(1000.0).range_fraction, 0.55);
        assert_eq!(focus.pointer_normalizer(1000.0).radius, 550.0);
        let contact = EffectConfig::contact();
        assert_eq!(contact.pointer_normalizer(1000.0).radius, 300.0);
        assert_eq!(contact.viewport_normalizer(1000.0).range_fraction, 0.3);
    }
}
