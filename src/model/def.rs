//! Lenient JSON-facing shapes.
//!
//! Every field is optional and every array element is parsed independently, so one malformed
//! entry never rejects the whole document. The sanitizer turns these into the validated
//! model.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number that may arrive as a JSON number or a numeric string; anything else reads as absent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Num(pub(crate) Option<f64>);

impl<'de> Deserialize<'de> for Num {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(Self(v.filter(|v| v.is_finite())))
    }
}

/// Flag that may arrive as a bool, `0`/`1`, or `"true"`/`"false"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flag(pub(crate) Option<bool>);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = match Value::deserialize(deserializer)? {
            Value::Bool(b) => Some(b),
            Value::Number(n) => n.as_f64().map(|v| v != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        Ok(Self(v))
    }
}

/// Identifier that may arrive as a string or a number.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Ident(pub(crate) Option<String>);

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = match Value::deserialize(deserializer)? {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        Ok(Self(v))
    }
}

/// Any value that failed to parse as `T` reads as `None`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Lenient<T>(pub(crate) Option<T>);

impl<T> Default for Lenient<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<'de, T> Deserialize<'de> for Lenient<T>
where
    T: serde::de::DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(deserializer)?;
        Ok(Self(serde_json::from_value(v).ok()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct CellDef {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl<'de> Deserialize<'de> for CellDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([Num; 2]),
            Obj { x: Num, y: Num },
        }

        let (x, y) = match Repr::deserialize(deserializer)? {
            Repr::Arr([x, y]) => (x, y),
            Repr::Obj { x, y } => (x, y),
        };
        match (x.0, y.0) {
            (Some(x), Some(y)) => Ok(Self { x, y }),
            _ => Err(serde::de::Error::custom("cell needs finite x and y")),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ProjectDef {
    pub(crate) grid: Lenient<GridDef>,
    pub(crate) style: Lenient<StyleDef>,
    pub(crate) palette: Vec<Lenient<String>>,
    pub(crate) settings: Lenient<SettingsDef>,
    pub(crate) frames: Vec<Lenient<FrameDef>>,
    pub(crate) auto_connections: Vec<Lenient<AutoConnectionDef>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GridDef {
    pub(crate) size: Num,
    pub(crate) spacing_px: Num,
    pub(crate) margin_px: Num,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StyleDef {
    pub(crate) dot_radius_px: Num,
    pub(crate) line_width_px: Num,
    pub(crate) pen_tip_radius_px: Num,
    pub(crate) background: Lenient<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SettingsDef {
    #[serde(alias = "loop")]
    pub(crate) loop_playback: Flag,
    pub(crate) fade_in_dots: Flag,
    pub(crate) fade_out_dots: Flag,
    pub(crate) fade_in_connections: Flag,
    pub(crate) fade_out_connections: Flag,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FrameDef {
    pub(crate) id: Ident,
    pub(crate) dots: Vec<Lenient<DotDef>>,
    pub(crate) connections: Vec<Lenient<ConnectionDef>>,
    pub(crate) groups: Vec<Lenient<GroupDef>>,
    pub(crate) duration_ms: Num,
    pub(crate) easing: Lenient<String>,
    pub(crate) fade_in_ms: Num,
    pub(crate) fade_out_ms: Num,
    pub(crate) stagger_ms: Num,
    pub(crate) connection_duration_ms: Num,
    pub(crate) connection_stagger_ms: Num,
    pub(crate) connection_fade_out_ms: Num,
    pub(crate) color_transition_ms: Num,
    pub(crate) color_transition_easing: Lenient<String>,
    pub(crate) animate_dots: Flag,
    pub(crate) animate_connections: Flag,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DotDef {
    pub(crate) id: Ident,
    pub(crate) x: Num,
    pub(crate) y: Num,
    pub(crate) color: Num,
    pub(crate) fade_in_ms: Num,
    pub(crate) fade_out_ms: Num,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectionDef {
    pub(crate) id: Ident,
    pub(crate) from: Ident,
    pub(crate) to: Ident,
    pub(crate) color: Num,
    pub(crate) order: Num,
    pub(crate) duration_ms: Num,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GroupDef {
    pub(crate) id: Ident,
    pub(crate) dot_ids: Vec<Ident>,
    pub(crate) connection_ids: Vec<Ident>,
    pub(crate) overrides: Lenient<GroupOverridesDef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GroupOverridesDef {
    pub(crate) fade_in_ms: Num,
    pub(crate) fade_out_ms: Num,
    pub(crate) connection_duration_ms: Num,
    pub(crate) connection_stagger_ms: Num,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AutoConnectionDef {
    pub(crate) id: Ident,
    pub(crate) start: Lenient<CellDef>,
    pub(crate) end: Lenient<CellDef>,
    pub(crate) color: Num,
    pub(crate) trace_in_ms: Num,
    pub(crate) trace_in_direction: Lenient<String>,
    pub(crate) stay_ms: Num,
    pub(crate) trace_out_ms: Num,
    pub(crate) trace_out_direction: Lenient<String>,
    pub(crate) start_time_ms: Num,
}
