use serde::{Deserialize, Serialize};

use crate::geometry::Position;

/// Number of atlas slots a cell may reference.
pub const TILEMAP_COUNT: u32 = 4;

/// 8-bit RGBA tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const RED: Color = Color::rgb(220, 50, 47);
    pub const GREEN: Color = Color::rgb(133, 153, 0);
    pub const BLUE: Color = Color::rgb(38, 139, 210);
    pub const YELLOW: Color = Color::rgb(181, 137, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Linear blend towards `other`; `t` is clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Shader-side effect applied to a cell. Id 0 is reserved for "none".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualEffect {
    Blink,
    Pulse,
    Wave,
    Shake,
    FadeIn,
}

impl VisualEffect {
    pub fn id(self) -> u32 {
        match self {
            VisualEffect::Blink => 1,
            VisualEffect::Pulse => 2,
            VisualEffect::Wave => 3,
            VisualEffect::Shake => 4,
            VisualEffect::FadeIn => 5,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(VisualEffect::Blink),
            2 => Some(VisualEffect::Pulse),
            3 => Some(VisualEffect::Wave),
            4 => Some(VisualEffect::Shake),
            5 => Some(VisualEffect::FadeIn),
            _ => None,
        }
    }
}

/// One cell's renderable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCell {
    pub tile_index: u32,
    pub tilemap_id: u32,
    pub color: Color,
    pub effect: Option<VisualEffect>,
    pub animated: bool,
}

impl TileCell {
    /// Transparent cell on tilemap 0; what cleared surfaces hold.
    pub const BLANK: TileCell = TileCell {
        tile_index: 0,
        tilemap_id: 0,
        color: Color::TRANSPARENT,
        effect: None,
        animated: false,
    };

    pub const fn new(tile_index: u32, tilemap_id: u32, color: Color) -> Self {
        Self {
            tile_index,
            tilemap_id,
            color,
            effect: None,
            animated: false,
        }
    }

    pub fn with_effect(mut self, effect: VisualEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.color.a == 0
    }

    /// GPU layout of this cell drawn at grid position `at`.
    pub fn pack(&self, at: Position) -> PackedCell {
        PackedCell {
            position: [at.x as f32, at.y as f32],
            tile_index: self.tile_index,
            tilemap_id: self.tilemap_id,
            color: self.color.to_f32(),
            effect: self.effect.map(VisualEffect::id).unwrap_or(0),
            flags: if self.animated { PackedCell::FLAG_ANIMATED } else { 0 },
        }
    }
}

impl Default for TileCell {
    fn default() -> Self {
        TileCell::BLANK
    }
}

/// Per-instance layout copied verbatim into a surface's GPU buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PackedCell {
    pub position: [f32; 2], // grid units
    pub tile_index: u32,
    pub tilemap_id: u32,
    pub color: [f32; 4],
    pub effect: u32,
    pub flags: u32,
}

impl PackedCell {
    pub const FLAG_ANIMATED: u32 = 1;
    pub const STRIDE: u64 = std::mem::size_of::<PackedCell>() as u64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_carries_effect_and_flags() {
        let cell = TileCell::new(42, 1, Color::RED)
            .with_effect(VisualEffect::Wave)
            .with_animated(true);
        let packed = cell.pack(Position::new(3, 7));
        assert_eq!(packed.position, [3.0, 7.0]);
        assert_eq!(packed.tile_index, 42);
        assert_eq!(packed.tilemap_id, 1);
        assert_eq!(packed.effect, VisualEffect::Wave.id());
        assert_eq!(packed.flags & PackedCell::FLAG_ANIMATED, 1);
    }

    #[test]
    fn effect_ids_round_trip_and_zero_is_none() {
        for fx in [
            VisualEffect::Blink,
            VisualEffect::Pulse,
            VisualEffect::Wave,
            VisualEffect::Shake,
            VisualEffect::FadeIn,
        ] {
            assert_eq!(VisualEffect::from_id(fx.id()), Some(fx));
        }
        assert_eq!(VisualEffect::from_id(0), None);
    }

    #[test]
    fn packed_cell_is_tightly_sized() {
        assert_eq!(PackedCell::STRIDE, 40);
    }

    #[test]
    fn color_lerp_clamps() {
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 2.0), Color::WHITE);
        assert_eq!(Color::BLACK.lerp(Color::WHITE, -1.0), Color::BLACK);
    }
}
