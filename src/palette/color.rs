use std::collections::HashMap;

use crate::foundation::core::Rgba8;

/// Ordered list of authoring color strings referenced by integer index.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Palette {
    /// Raw color strings in palette order.
    pub entries: Vec<String>,
}

impl Palette {
    /// Build a palette from color strings.
    pub fn new<S: Into<String>>(entries: impl IntoIterator<Item = S>) -> Self {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Memoizes palette string parsing for one render session.
///
/// Lookups never fail: an out-of-range index or an unparseable entry resolves to
/// [`Rgba8::FALLBACK`].
#[derive(Debug, Default)]
pub struct ColorCache {
    parsed: HashMap<String, Option<Rgba8>>,
}

impl ColorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a palette index.
    pub fn resolve(&mut self, palette: &Palette, index: usize) -> Rgba8 {
        match palette.entries.get(index) {
            Some(raw) => self.parse(raw).unwrap_or(Rgba8::FALLBACK),
            None => Rgba8::FALLBACK,
        }
    }

    /// Parse one color string, memoized.
    pub fn parse(&mut self, raw: &str) -> Option<Rgba8> {
        if let Some(hit) = self.parsed.get(raw) {
            return *hit;
        }
        let parsed = parse_color(raw);
        if parsed.is_none() {
            tracing::trace!(color = raw, "unparseable palette color");
        }
        self.parsed.insert(raw.to_owned(), parsed);
        parsed
    }

    /// Number of distinct strings parsed so far.
    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    /// Whether nothing has been parsed yet.
    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }
}

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()/rgba()` or `hsl()/hsla()`.
pub fn parse_color(raw: &str) -> Option<Rgba8> {
    let s = raw.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
        return parse_rgb_args(&args);
    }
    if let Some(args) = function_args(&lower, "hsla").or_else(|| function_args(&lower, "hsl")) {
        return parse_hsl_args(&args);
    }
    parse_hex(s)
}

fn function_args(s: &str, name: &str) -> Option<Vec<String>> {
    let inner = s.strip_prefix(name)?.trim_start().strip_prefix('(')?;
    let inner = inner.strip_suffix(')')?;
    Some(
        inner
            .split([',', '/', ' '])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    match hex.len() {
        3 => Some(Rgba8::rgba(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(Rgba8::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba8::rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Rgba8::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_channel(part: &str) -> Option<u8> {
    let v = if let Some(pct) = part.strip_suffix('%') {
        pct.parse::<f64>().ok()? * 2.55
    } else {
        part.parse::<f64>().ok()?
    };
    v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(part: Option<&String>) -> Option<u8> {
    let Some(part) = part else {
        return Some(255);
    };
    let v = if let Some(pct) = part.strip_suffix('%') {
        pct.parse::<f64>().ok()? / 100.0
    } else {
        part.parse::<f64>().ok()?
    };
    v.is_finite()
        .then(|| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_rgb_args(args: &[String]) -> Option<Rgba8> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    Some(Rgba8::rgba(
        parse_channel(&args[0])?,
        parse_channel(&args[1])?,
        parse_channel(&args[2])?,
        parse_alpha(args.get(3))?,
    ))
}

fn parse_hsl_args(args: &[String]) -> Option<Rgba8> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }
    let h = args[0].trim_end_matches("deg").parse::<f64>().ok()?;
    let s = args[1].trim_end_matches('%').parse::<f64>().ok()? / 100.0;
    let l = args[2].trim_end_matches('%').parse::<f64>().ok()? / 100.0;
    if !(h.is_finite() && s.is_finite() && l.is_finite()) {
        return None;
    }
    let [r, g, b] = hsl_to_rgb(h, s, l);
    let to_u8 = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Some(Rgba8::rgba(to_u8(r), to_u8(g), to_u8(b), parse_alpha(args.get(3))?))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return [l, l, l];
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    [
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/palette/color.rs"]
mod tests;
