//! CSS color and gradient parsing.

use crate::error::{Error, Result};
use image::Rgba;

/// Fully transparent black.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

const NAMED: &[(&str, [u8; 3])] = &[
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
];

/// Parse a CSS color.
///
/// Returns `Ok(None)` for keywords that carry no color of their own
/// (`currentColor`, `inherit`, unknown names) and an
/// [`Error::UnsupportedColor`] for color functions other than `rgb()`/`rgba()`.
pub fn parse_color(value: &str) -> Result<Option<Rgba<u8>>> {
    let value = value.trim().to_ascii_lowercase();
    if value.is_empty() || value == "currentcolor" || value == "inherit" || value == "none" {
        return Ok(None);
    }
    if value == "transparent" {
        return Ok(Some(TRANSPARENT));
    }
    if let Some(hex) = value.strip_prefix('#') {
        return Ok(parse_hex(hex));
    }
    if let Some(open) = value.find('(') {
        let name = &value[..open];
        let args = value[open + 1..].trim_end_matches(')');
        return match name {
            "rgb" | "rgba" => Ok(parse_rgb_args(args)),
            _ => Err(Error::UnsupportedColor(name.to_string())),
        };
    }
    Ok(NAMED
        .iter()
        .find(|(n, _)| *n == value)
        .map(|(_, [r, g, b])| Rgba([*r, *g, *b, 255])))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 | 4 => {
            let r = digit(0)?;
            let g = digit(1)?;
            let b = digit(2)?;
            let a = if hex.len() == 4 { digit(3)? } else { 15 };
            Some(Rgba([r * 17, g * 17, b * 17, a * 17]))
        }
        6 | 8 => {
            let a = if hex.len() == 8 { pair(6)? } else { 255 };
            Some(Rgba([pair(0)?, pair(2)?, pair(4)?, a]))
        }
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<Rgba<u8>> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok().map(|v| (v * 2.55).round().clamp(0.0, 255.0) as u8),
            None => p.parse::<f32>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8),
        }
    };
    let alpha = match parts.get(3) {
        Some(p) => match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok()? / 100.0,
            None => p.parse::<f32>().ok()?,
        },
        None => 1.0,
    };
    Some(Rgba([
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
    ]))
}

/// A linear gradient with evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    /// Unit-free direction vector in box space (`(0, 1)` is top to bottom)
    pub direction: (f32, f32),
    pub stops: Vec<Rgba<u8>>,
}

impl LinearGradient {
    /// Color at position `t` in `0.0..=1.0`.
    pub fn at(&self, t: f32) -> Rgba<u8> {
        match self.stops.len() {
            0 => TRANSPARENT,
            1 => self.stops[0],
            n => {
                let t = t.clamp(0.0, 1.0) * (n - 1) as f32;
                let i = (t.floor() as usize).min(n - 2);
                let f = t - i as f32;
                let (a, b) = (self.stops[i].0, self.stops[i + 1].0);
                let mix = |k: usize| (a[k] as f32 + (b[k] as f32 - a[k] as f32) * f).round() as u8;
                Rgba([mix(0), mix(1), mix(2), mix(3)])
            }
        }
    }
}

/// Split on `sep` outside parentheses.
pub fn split_top_level(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(value[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(value[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Parse `linear-gradient(...)`. Other images yield `Ok(None)`.
pub fn parse_gradient(value: &str) -> Result<Option<LinearGradient>> {
    let value = value.trim();
    let Some(args) = value
        .strip_prefix("linear-gradient(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return Ok(None);
    };

    let mut parts = split_top_level(args, ',');
    let mut direction = (0.0, 1.0);
    if let Some(first) = parts.first() {
        if let Some(side) = first.strip_prefix("to ") {
            let (mut dx, mut dy) = (0.0f32, 0.0f32);
            for word in side.split_whitespace() {
                match word {
                    "top" => dy = -1.0,
                    "bottom" => dy = 1.0,
                    "left" => dx = -1.0,
                    "right" => dx = 1.0,
                    _ => {}
                }
            }
            direction = (dx, dy);
            parts.remove(0);
        } else if let Some(deg) = first.strip_suffix("deg").and_then(|d| d.trim().parse::<f32>().ok()) {
            let rad = deg.to_radians();
            direction = (rad.sin(), -rad.cos());
            parts.remove(0);
        }
    }

    let mut stops = Vec::with_capacity(parts.len());
    for part in parts {
        // Drop an explicit stop position such as `50%`
        let color = match split_top_level(part, ' ').as_slice() {
            [color, ..] => *color,
            [] => continue,
        };
        if let Some(c) = parse_color(color)? {
            stops.push(c);
        }
    }
    Ok(Some(LinearGradient { direction, stops }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_color("#fff").unwrap(), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_color("#1e40af").unwrap(), Some(Rgba([0x1e, 0x40, 0xaf, 255])));
        assert_eq!(parse_color("#60a5fa20").unwrap(), Some(Rgba([0x60, 0xa5, 0xfa, 0x20])));
        assert_eq!(parse_color("#12").unwrap(), None);
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(parse_color("rgb(0 0 0 / 0.5)").unwrap(), Some(Rgba([0, 0, 0, 128])));
        assert_eq!(parse_color("rgba(255, 0, 0, 1)").unwrap(), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(parse_color("white").unwrap(), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_color("currentColor").unwrap(), None);
    }

    #[test]
    fn test_oklch_unsupported() {
        let err = parse_color("oklch(54.6% 0.245 262.881)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attempting to parse an unsupported color function 'oklch'"
        );
    }

    #[test]
    fn test_gradient() {
        let g = parse_gradient("linear-gradient(to bottom, #000000, #ffffff)")
            .unwrap()
            .unwrap();
        assert_eq!(g.direction, (0.0, 1.0));
        assert_eq!(g.at(0.0), Rgba([0, 0, 0, 255]));
        assert_eq!(g.at(1.0), Rgba([255, 255, 255, 255]));
        assert_eq!(g.at(0.5), Rgba([128, 128, 128, 255]));
        assert!(parse_gradient("url(a.png)").unwrap().is_none());
        assert!(parse_gradient("linear-gradient(to right, oklch(1 0 0), #fff)").is_err());
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("to bottom, rgb(1, 2, 3), #fff", ','),
            vec!["to bottom", "rgb(1, 2, 3)", "#fff"]
        );
    }
}
