//! Fixed material catalogs offered by the selection panel.

use crate::color::ColorValue;

/// A texture the user can apply, identified by its web-style asset path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureOption {
    pub display_name: String,
    pub asset_path: String,
}

/// A flat color the user can apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorOption {
    pub display_name: String,
    pub color_value: ColorValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MaterialOption {
    Texture(TextureOption),
    Color(ColorOption),
}

impl MaterialOption {
    pub fn display_name(&self) -> &str {
        match self {
            MaterialOption::Texture(t) => &t.display_name,
            MaterialOption::Color(c) => &c.display_name,
        }
    }
}

impl TextureOption {
    pub fn new(display_name: impl Into<String>, asset_path: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            asset_path: asset_path.into(),
        }
    }
}

impl ColorOption {
    pub fn new(display_name: impl Into<String>, color_value: ColorValue) -> Self {
        Self {
            display_name: display_name.into(),
            color_value,
        }
    }
}

/// The two ordered catalogs. Built once at startup and only read afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    textures: Vec<TextureOption>,
    colors: Vec<ColorOption>,
}

impl Catalog {
    pub fn new(textures: Vec<TextureOption>, colors: Vec<ColorOption>) -> Self {
        Self { textures, colors }
    }

    #[inline]
    pub fn textures(&self) -> &[TextureOption] {
        &self.textures
    }

    #[inline]
    pub fn colors(&self) -> &[ColorOption] {
        &self.colors
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(
            vec![
                TextureOption::new("Leather", "/assets/leather-texture.jpg"),
                TextureOption::new("Denim", "/assets/denim-texture.jpg"),
                TextureOption::new("Canvas", "/assets/canvas-texture.jpg"),
                TextureOption::new("Suede", "/assets/suede-texture.jpg"),
            ],
            vec![
                ColorOption::new("Red", ColorValue::from_hex(0xFF0000)),
                ColorOption::new("Blue", ColorValue::from_hex(0x0000FF)),
                ColorOption::new("Green", ColorValue::from_hex(0x00FF00)),
                ColorOption::new("Black", ColorValue::from_hex(0x000000)),
                ColorOption::new("White", ColorValue::from_hex(0xFFFFFF)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_catalog_entries_are_unique() {
        let catalog = Catalog::default();
        let paths: HashSet<_> = catalog.textures().iter().map(|t| &t.asset_path).collect();
        let colors: HashSet<_> = catalog.colors().iter().map(|c| c.color_value).collect();
        assert_eq!(paths.len(), catalog.textures().len());
        assert_eq!(colors.len(), catalog.colors().len());
    }
}
