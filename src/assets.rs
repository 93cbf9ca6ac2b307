use std::io;
use std::path::PathBuf;

use glam::Vec2;
use image::RgbaImage;

use crate::error::AssetError;
use crate::present::{SpriteId, SpriteSizes};

/// Optional font file that overrides the default bubble font.
pub const FONT_FILE: &str = "font.ttf";

/// Somewhere to read raw asset bytes from.
pub trait AssetSource {
    /// Read the named asset. A missing asset is [`AssetError::Missing`].
    fn read(&self, name: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reads assets from files in one directory.
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        std::fs::read(self.root.join(name)).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => AssetError::Missing {
                name: name.to_owned(),
            },
            _ => AssetError::Io {
                name: name.to_owned(),
                source,
            },
        })
    }
}

const WALK_A_PNG: &[u8] = include_bytes!("../assets/walk1.png");
const WALK_B_PNG: &[u8] = include_bytes!("../assets/walk2.png");
const WALK_C_PNG: &[u8] = include_bytes!("../assets/walk3.png");
const BUBBLE_PNG: &[u8] = include_bytes!("../assets/bubble.png");

/// Sprites compiled into the binary. No font is bundled.
pub struct EmbeddedAssets;

impl AssetSource for EmbeddedAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>, AssetError> {
        let bytes = match name {
            n if n == SpriteId::WalkA.file_name() => WALK_A_PNG,
            n if n == SpriteId::WalkB.file_name() => WALK_B_PNG,
            n if n == SpriteId::WalkC.file_name() => WALK_C_PNG,
            n if n == SpriteId::Bubble.file_name() => BUBBLE_PNG,
            _ => {
                return Err(AssetError::Missing {
                    name: name.to_owned(),
                })
            }
        };
        Ok(bytes.to_vec())
    }
}

/// Decoded sprites and font bytes, loaded once at startup.
pub struct SpriteSet {
    walk: [RgbaImage; 3],
    bubble: RgbaImage,
    pub font: Option<Vec<u8>>,
}

impl SpriteSet {
    pub fn load(source: &dyn AssetSource) -> Result<Self, AssetError> {
        let set = Self {
            walk: [
                decode(source, SpriteId::WalkA)?,
                decode(source, SpriteId::WalkB)?,
                decode(source, SpriteId::WalkC)?,
            ],
            bubble: decode(source, SpriteId::Bubble)?,
            font: load_font(source)?,
        };

        log::info!(
            "Loaded sprites: walker {}x{}, bubble {}x{}, font: {}",
            set.walk[0].width(),
            set.walk[0].height(),
            set.bubble.width(),
            set.bubble.height(),
            if set.font.is_some() { FONT_FILE } else { "default" },
        );
        Ok(set)
    }

    pub fn image(&self, id: SpriteId) -> &RgbaImage {
        match id {
            SpriteId::WalkA => &self.walk[0],
            SpriteId::WalkB => &self.walk[1],
            SpriteId::WalkC => &self.walk[2],
            SpriteId::Bubble => &self.bubble,
        }
    }

    pub fn sizes(&self) -> SpriteSizes {
        let size = |img: &RgbaImage| Vec2::new(img.width() as f32, img.height() as f32);
        SpriteSizes {
            walk: [
                size(&self.walk[0]),
                size(&self.walk[1]),
                size(&self.walk[2]),
            ],
            bubble: size(&self.bubble),
        }
    }
}

fn decode(source: &dyn AssetSource, id: SpriteId) -> Result<RgbaImage, AssetError> {
    let name = id.file_name();
    let bytes = source.read(name)?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        name: name.to_owned(),
        source,
    })?;
    Ok(image.to_rgba8())
}

fn load_font(source: &dyn AssetSource) -> Result<Option<Vec<u8>>, AssetError> {
    let bytes = match source.read(FONT_FILE) {
        Ok(bytes) => bytes,
        Err(AssetError::Missing { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };
    if !is_font(&bytes) {
        return Err(AssetError::Font {
            name: FONT_FILE.to_owned(),
        });
    }
    Ok(Some(bytes))
}

/// sfnt version tags: TrueType, OpenType/CFF, Apple TrueType, collection.
fn is_font(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}
