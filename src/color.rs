//! Pixel color type shared by the attribute store, canvas and renderer.

/// A single BGRA pixel with straight (non premultiplied) alpha.
///
/// The field order matches the in-memory layout of the renderer's pixel
/// buffer, so a `&[Color]` can be handed to a host expecting BGRA8 rows.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Build an opaque color from `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// The packed `0xAARRGGBB` value (little-endian BGRA in memory).
    pub const fn to_bgra_u32(self) -> u32 {
        u32::from_le_bytes([self.b, self.g, self.r, self.a])
    }

    pub const fn from_bgra_u32(value: u32) -> Self {
        let [b, g, r, a] = value.to_le_bytes();
        Self { b, g, r, a }
    }

    /// Same color with the alpha channel scaled by `opacity` (0.0..=1.0).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = opacity.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * opacity).round() as u8,
            ..self
        }
    }

    /// Composite `src` over this pixel (source-over, straight alpha).
    ///
    /// A fully opaque source replaces the destination; a fully transparent
    /// source leaves it untouched.
    pub fn blend(&mut self, src: Color) {
        match src.a {
            0 => {}
            255 => *self = src,
            _ => {
                let sa = src.a as f32 / 255.0;
                let da = self.a as f32 / 255.0;
                let out_a = sa + da * (1.0 - sa);
                let mix = |s: u8, d: u8| -> u8 {
                    ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
                        .round()
                        .clamp(0.0, 255.0) as u8
                };
                self.b = mix(src.b, self.b);
                self.g = mix(src.g, self.g);
                self.r = mix(src.r, self.r);
                self.a = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    /// Parse a CSS/SVG color value.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` (alpha in 0..=1), basic named colors, and
    /// `none`/`transparent`.
    pub fn parse(value: &str) -> Option<Color> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(args);
        }
        named_color(&lower)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    // from_str_radix alone would also take a leading '+'.
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(
            nibble(0)? * 17,
            nibble(1)? * 17,
            nibble(2)? * 17,
        )),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_function(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |s: &str| -> Option<u8> {
        if let Some(pct) = s.strip_suffix('%') {
            let v: f32 = pct.trim().parse().ok()?;
            Some((v.clamp(0.0, 100.0) * 2.55).round() as u8)
        } else {
            let v: f32 = s.parse().ok()?;
            Some(v.clamp(0.0, 255.0).round() as u8)
        }
    };
    match parts.as_slice() {
        [r, g, b] => Some(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha: f32 = a.parse().ok()?;
            Some(Color::rgba(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "none" | "transparent" => Color::TRANSPARENT,
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::from_hex(0xFF0000),
        "green" => Color::from_hex(0x008000),
        "lime" => Color::from_hex(0x00FF00),
        "blue" => Color::from_hex(0x0000FF),
        "yellow" => Color::from_hex(0xFFFF00),
        "cyan" | "aqua" => Color::from_hex(0x00FFFF),
        "magenta" | "fuchsia" => Color::from_hex(0xFF00FF),
        "gray" | "grey" => Color::from_hex(0x808080),
        "silver" => Color::from_hex(0xC0C0C0),
        "maroon" => Color::from_hex(0x800000),
        "olive" => Color::from_hex(0x808000),
        "navy" => Color::from_hex(0x000080),
        "purple" => Color::from_hex(0x800080),
        "teal" => Color::from_hex(0x008080),
        "orange" => Color::from_hex(0xFFA500),
        _ => return None,
    };
    Some(color)
}
