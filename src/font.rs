//! Glyph atlases for [`Renderer::draw_string`](crate::renderer::Renderer::draw_string).
//!
//! A font is an 8-bit coverage atlas plus per-character glyph metrics. The
//! renderer only sees the [`Font`] trait; [`BitmapFont`] is the bundled
//! implementation, either assembled by hand or rasterized from system fonts
//! with cosmic-text.

use std::collections::BTreeMap;

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent, Weight,
};

/// Placement of one character inside a font's atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    /// Top-left corner of the glyph in the atlas (inclusive).
    pub min: [i32; 2],
    /// Bottom-right corner of the glyph in the atlas (exclusive).
    pub max: [i32; 2],
    /// Horizontal offset from the pen position to the bitmap's left edge.
    pub left: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    pub top: i32,
    /// Pen movement after drawing this glyph.
    pub advance: [i32; 2],
}

impl Glyph {
    pub fn width(&self) -> i32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> i32 {
        self.max[1] - self.min[1]
    }
}

pub trait Font {
    fn glyph(&self, ch: char) -> Option<&Glyph>;
    /// Coverage atlas, `map_width()` bytes per row.
    fn glyph_map(&self) -> &[u8];
    fn map_width(&self) -> usize;
}

/// Font family specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    /// Sans-serif font (default system sans-serif)
    #[default]
    SansSerif,
    /// Serif font (default system serif)
    Serif,
    /// Monospace font (default system monospace)
    Monospace,
    /// Custom font by name
    Name(String),
}

impl FontFamily {
    /// Convert to cosmic-text Family type for rendering.
    pub fn to_cosmic(&self) -> Family<'_> {
        match self {
            FontFamily::SansSerif => Family::SansSerif,
            FontFamily::Serif => Family::Serif,
            FontFamily::Monospace => Family::Monospace,
            FontFamily::Name(name) => Family::Name(name),
        }
    }
}

/// Font weight on a 100-900 scale, matching CSS font-weight values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const LIGHT: Self = Self(300);
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);

    pub fn to_cosmic(self) -> Weight {
        Weight(self.0)
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// A coverage atlas with a glyph table.
#[derive(Debug, Clone, Default)]
pub struct BitmapFont {
    glyphs: BTreeMap<char, Glyph>,
    glyph_map: Vec<u8>,
    map_width: usize,
}

impl BitmapFont {
    /// Assemble a font from an atlas and its glyph table.
    ///
    /// Glyphs whose bounds fall outside the atlas are dropped.
    pub fn new(
        glyph_map: Vec<u8>,
        map_width: usize,
        glyphs: impl IntoIterator<Item = (char, Glyph)>,
    ) -> Self {
        let map_height = if map_width == 0 {
            0
        } else {
            glyph_map.len() / map_width
        };
        let glyphs = glyphs
            .into_iter()
            .filter(|(ch, g)| {
                let fits = g.min[0] >= 0
                    && g.min[1] >= 0
                    && g.min[0] <= g.max[0]
                    && g.min[1] <= g.max[1]
                    && g.max[0] as usize <= map_width
                    && g.max[1] as usize <= map_height;
                if !fits {
                    log::warn!("Glyph {ch:?} lies outside the {map_width}x{map_height} atlas");
                }
                fits
            })
            .collect();
        Self {
            glyphs,
            glyph_map,
            map_width,
        }
    }

    /// Rasterize `chars` from the system fonts into a single-row atlas.
    ///
    /// Characters the font system cannot shape get an empty glyph that
    /// still advances the pen.
    pub fn rasterize(
        family: &FontFamily,
        weight: FontWeight,
        size: f32,
        chars: impl IntoIterator<Item = char>,
    ) -> Self {
        let mut font_system = FontSystem::new();
        let mut swash_cache = SwashCache::new();
        let attrs = Attrs::new()
            .family(family.to_cosmic())
            .weight(weight.to_cosmic());

        struct Raster {
            ch: char,
            width: usize,
            height: usize,
            coverage: Vec<u8>,
            left: i32,
            top: i32,
            advance: i32,
        }

        let mut rasters = Vec::new();
        for ch in chars {
            let metrics = Metrics::new(size, size * 1.2);
            let mut buffer = Buffer::new(&mut font_system, metrics);
            buffer.set_text(
                &mut font_system,
                &ch.to_string(),
                &attrs,
                Shaping::Advanced,
                None,
            );
            buffer.shape_until_scroll(&mut font_system, true);

            let Some(layout_glyph) = buffer
                .layout_runs()
                .flat_map(|run| run.glyphs.iter())
                .next()
                .cloned()
            else {
                log::debug!("No glyph for {ch:?}");
                continue;
            };

            let advance = layout_glyph.w.round() as i32;
            let physical = layout_glyph.physical((0.0, 0.0), 1.0);
            let image = swash_cache.get_image_uncached(&mut font_system, physical.cache_key);

            let raster = match image {
                Some(image) => {
                    let width = image.placement.width as usize;
                    let height = image.placement.height as usize;
                    let coverage = match image.content {
                        SwashContent::Mask => image.data,
                        SwashContent::Color => image.data.chunks_exact(4).map(|p| p[3]).collect(),
                        SwashContent::SubpixelMask => image
                            .data
                            .chunks_exact(4)
                            .map(|p| ((p[0] as u16 + p[1] as u16 + p[2] as u16) / 3) as u8)
                            .collect(),
                    };
                    Raster {
                        ch,
                        width,
                        height,
                        coverage,
                        left: image.placement.left + physical.x,
                        top: image.placement.top,
                        advance,
                    }
                }
                None => Raster {
                    ch,
                    width: 0,
                    height: 0,
                    coverage: Vec::new(),
                    left: 0,
                    top: 0,
                    advance,
                },
            };
            rasters.push(raster);
        }

        // Pack left to right with one column of padding.
        let map_width: usize = rasters.iter().map(|r| r.width + 1).sum::<usize>().max(1);
        let map_height = rasters.iter().map(|r| r.height).max().unwrap_or(0);
        let mut glyph_map = vec![0u8; map_width * map_height];
        let mut glyphs = Vec::with_capacity(rasters.len());
        let mut x = 0usize;

        for mut raster in rasters {
            if raster.coverage.len() < raster.width * raster.height {
                log::warn!("Truncated bitmap for {:?}", raster.ch);
                raster.width = 0;
                raster.height = 0;
            }
            for row in 0..raster.height {
                let src = &raster.coverage[row * raster.width..][..raster.width];
                let dst = row * map_width + x;
                glyph_map[dst..dst + raster.width].copy_from_slice(src);
            }
            glyphs.push((
                raster.ch,
                Glyph {
                    min: [x as i32, 0],
                    max: [(x + raster.width) as i32, raster.height as i32],
                    left: raster.left,
                    top: raster.top,
                    advance: [raster.advance, 0],
                },
            ));
            x += raster.width + 1;
        }

        log::debug!(
            "Rasterized {} glyphs into a {map_width}x{map_height} atlas",
            glyphs.len()
        );
        Self::new(glyph_map, map_width, glyphs)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Width in pixels `text` occupies when drawn with this font.
    pub fn measure(&self, text: &str) -> i32 {
        text.chars()
            .filter_map(|ch| self.glyph(ch))
            .map(|g| g.advance[0])
            .sum()
    }
}

impl Font for BitmapFont {
    fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    fn glyph_map(&self) -> &[u8] {
        &self.glyph_map
    }

    fn map_width(&self) -> usize {
        self.map_width
    }
}
