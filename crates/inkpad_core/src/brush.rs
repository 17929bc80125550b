//! Brush styling record
//!
//! A `Brush` is copied into every [`Node`](crate::Node) when the gesture
//! starts. Opacity and miter are clamped to `0.0..=1.0` on every write, so
//! the fields are private and only reachable through setters.
//!
//! # Persisted layout
//!
//! Brushes serialize through [`BrushRecord`]:
//!
//! ```json
//! {
//!   "strokeColor": [255, 0, 0, 1.0],
//!   "fillColor": [0, 0, 255, 0.5],
//!   "thickness": 5.0,
//!   "opacity": 1.0,
//!   "miter": 1.0,
//!   "shape": 1,
//!   "join": 1,
//!   "texture": { "data": "<base64 rgba>", "width": 8, "height": 8 },
//!   "textureSize": { "width": 16.0, "height": 16.0 }
//! }
//! ```
//!
//! Every field is optional when decoding. Missing or malformed fields take
//! the [`Brush::default`] values one by one, so a bad `thickness` does not
//! cost the stored color. A document that is not a JSON object decodes to the
//! default brush.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{Color, Size};
use crate::pixels::{PixelBuffer, PixelRecord};

/// Smallest thickness a brush accepts
pub const MIN_THICKNESS: f32 = 0.1;

/// Thickness of the default brush
pub const DEFAULT_THICKNESS: f32 = 5.0;

// ─────────────────────────────────────────────────────────────────────────────
// Stroke Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat cap at the endpoint
    Butt,
    /// Rounded cap extending past the endpoint
    #[default]
    Round,
    /// Square cap extending past the endpoint
    Square,
}

impl LineCap {
    /// Integer code used by the persisted layout
    pub const fn code(self) -> i64 {
        match self {
            LineCap::Butt => 0,
            LineCap::Round => 1,
            LineCap::Square => 2,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LineCap::Butt),
            1 => Some(LineCap::Round),
            2 => Some(LineCap::Square),
            _ => None,
        }
    }
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Miter join (sharp corner)
    Miter,
    /// Round join
    #[default]
    Round,
    /// Bevel join (flat corner)
    Bevel,
}

impl LineJoin {
    /// Integer code used by the persisted layout
    pub const fn code(self) -> i64 {
        match self {
            LineJoin::Miter => 0,
            LineJoin::Round => 1,
            LineJoin::Bevel => 2,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LineJoin::Miter),
            1 => Some(LineJoin::Round),
            2 => Some(LineJoin::Bevel),
            _ => None,
        }
    }
}

/// Repeating image used to fill or stroke with a pattern
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Pattern pixels
    pub image: PixelBuffer,
    /// Logical size of one pattern tile
    pub size: Size,
}

impl Texture {
    /// Texture whose tile size is the image's natural size
    pub fn new(image: PixelBuffer) -> Self {
        let size = image.size();
        Self { image, size }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Brush
// ─────────────────────────────────────────────────────────────────────────────

/// Styling applied to a node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BrushRecord", into = "BrushRecord")]
pub struct Brush {
    stroke_color: Color,
    fill_color: Option<Color>,
    thickness: f32,
    opacity: f32,
    miter: f32,
    cap: LineCap,
    join: LineJoin,
    texture: Option<Texture>,
    is_eraser: bool,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            fill_color: None,
            thickness: DEFAULT_THICKNESS,
            opacity: 1.0,
            miter: 1.0,
            cap: LineCap::Round,
            join: LineJoin::Round,
            texture: None,
            is_eraser: false,
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(0.0, 1.0)
}

impl Brush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke_color
    }

    pub fn fill_color(&self) -> Option<Color> {
        self.fill_color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn miter(&self) -> f32 {
        self.miter
    }

    pub fn cap(&self) -> LineCap {
        self.cap
    }

    pub fn join(&self) -> LineJoin {
        self.join
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn is_eraser(&self) -> bool {
        self.is_eraser
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color.clamped();
    }

    pub fn set_fill_color(&mut self, color: Option<Color>) {
        self.fill_color = color.map(Color::clamped);
    }

    /// Set the line width; non-positive or non-finite values become
    /// [`MIN_THICKNESS`]
    pub fn set_thickness(&mut self, thickness: f32) {
        self.thickness = if thickness.is_finite() {
            thickness.max(MIN_THICKNESS)
        } else {
            MIN_THICKNESS
        };
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_unit(opacity);
    }

    pub fn set_miter(&mut self, miter: f32) {
        self.miter = clamp_unit(miter);
    }

    pub fn set_cap(&mut self, cap: LineCap) {
        self.cap = cap;
    }

    pub fn set_join(&mut self, join: LineJoin) {
        self.join = join;
    }

    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.texture = texture;
    }

    pub fn set_eraser(&mut self, is_eraser: bool) {
        self.is_eraser = is_eraser;
    }

    pub fn with_stroke_color(mut self, color: Color) -> Self {
        self.set_stroke_color(color);
        self
    }

    pub fn with_fill_color(mut self, color: Color) -> Self {
        self.set_fill_color(Some(color));
        self
    }

    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.set_thickness(thickness);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn with_miter(mut self, miter: f32) -> Self {
        self.set_miter(miter);
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn eraser(mut self) -> Self {
        self.is_eraser = true;
        self
    }

    /// Encode into the persisted JSON layout
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode from the persisted JSON layout, never failing
    pub fn decode(data: &str) -> Brush {
        Self::decode_bytes(data.as_bytes())
    }

    /// Decode from raw bytes
    ///
    /// Bytes that are not JSON yield the default brush. Inside a JSON object
    /// each unreadable field falls back to its default on its own.
    pub fn decode_bytes(data: &[u8]) -> Brush {
        match serde_json::from_slice::<Value>(data) {
            Ok(value) => BrushRecord::from_value(&value).into(),
            Err(e) => {
                tracing::warn!("brush record unreadable, using defaults: {}", e);
                Brush::default()
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Persisted Layout
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted brush fields
///
/// Colors are `[r, g, b, a]` with RGB on a 0–255 scale and alpha on 0–1.
/// `shape` and `join` hold [`LineCap::code`] and [`LineJoin::code`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrushRecord {
    pub stroke_color: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<[f32; 4]>,
    pub thickness: f32,
    pub opacity: f32,
    pub miter: f32,
    pub shape: i64,
    pub join: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<PixelRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture_size: Option<Size>,
}

impl Default for BrushRecord {
    fn default() -> Self {
        Brush::default().into()
    }
}

impl BrushRecord {
    /// Read each field on its own, keeping the default for any that is
    /// missing or unreadable
    pub fn from_value(value: &Value) -> Self {
        let mut record = Self::default();
        let Some(object) = value.as_object() else {
            tracing::warn!("brush record is not an object, using defaults");
            return record;
        };

        if let Some(color) = field(object, "strokeColor") {
            record.stroke_color = color;
        }
        if let Some(color) = field(object, "fillColor") {
            record.fill_color = color;
        }
        if let Some(thickness) = field(object, "thickness") {
            record.thickness = thickness;
        }
        if let Some(opacity) = field(object, "opacity") {
            record.opacity = opacity;
        }
        if let Some(miter) = field(object, "miter") {
            record.miter = miter;
        }
        if let Some(shape) = field(object, "shape") {
            record.shape = shape;
        }
        if let Some(join) = field(object, "join") {
            record.join = join;
        }
        if let Some(texture) = field(object, "texture") {
            record.texture = texture;
        }
        if let Some(size) = field(object, "textureSize") {
            record.texture_size = size;
        }
        record
    }
}

impl<'de> Deserialize<'de> for BrushRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn field<T: DeserializeOwned>(object: &Map<String, Value>, key: &str) -> Option<T> {
    let value = object.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("brush field `{}` unreadable, using default: {}", key, e);
            None
        }
    }
}

fn color_to_channels(color: Color) -> [f32; 4] {
    [color.r * 255.0, color.g * 255.0, color.b * 255.0, color.a]
}

fn channels_to_color(channels: [f32; 4]) -> Color {
    Color::rgba(
        channels[0] / 255.0,
        channels[1] / 255.0,
        channels[2] / 255.0,
        channels[3],
    )
}

impl From<Brush> for BrushRecord {
    fn from(brush: Brush) -> Self {
        let (texture, texture_size) = match brush.texture {
            Some(texture) => (Some(PixelRecord::from(texture.image)), Some(texture.size)),
            None => (None, None),
        };
        Self {
            stroke_color: color_to_channels(brush.stroke_color),
            fill_color: brush.fill_color.map(color_to_channels),
            thickness: brush.thickness,
            opacity: brush.opacity,
            miter: brush.miter,
            shape: brush.cap.code(),
            join: brush.join.code(),
            texture,
            texture_size,
        }
    }
}

impl From<BrushRecord> for Brush {
    fn from(record: BrushRecord) -> Self {
        let mut brush = Brush::default();
        brush.set_stroke_color(channels_to_color(record.stroke_color));
        brush.set_fill_color(record.fill_color.map(channels_to_color));
        brush.set_thickness(record.thickness);
        brush.set_opacity(record.opacity);
        brush.set_miter(record.miter);
        brush.set_cap(LineCap::from_code(record.shape).unwrap_or_default());
        brush.set_join(LineJoin::from_code(record.join).unwrap_or_default());

        if let Some(texture) = record.texture {
            match PixelBuffer::try_from(texture) {
                Ok(image) => {
                    let size = record.texture_size.unwrap_or_else(|| image.size());
                    brush.set_texture(Some(Texture { image, size }));
                }
                Err(e) => tracing::warn!("dropping unreadable brush texture: {}", e),
            }
        }
        brush
    }
}
