//! What the model's surfaces currently show.

use crate::color::ColorValue;

/// Texture, flat color, or neither. Mutually exclusive by construction.
///
/// `I` is the loaded image type; the core never looks inside it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Appearance<I> {
    #[default]
    Neutral,
    Textured { path: String, image: I },
    Tinted(ColorValue),
}

impl<I> Appearance<I> {
    /// Asset path of the active texture, if any.
    pub fn active_texture(&self) -> Option<&str> {
        match self {
            Appearance::Textured { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn active_image(&self) -> Option<&I> {
        match self {
            Appearance::Textured { image, .. } => Some(image),
            _ => None,
        }
    }

    pub fn active_color(&self) -> Option<ColorValue> {
        match self {
            Appearance::Tinted(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Appearance::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_follow_variant() {
        let tinted: Appearance<()> = Appearance::Tinted(ColorValue::from_hex(0xFF0000));
        assert_eq!(tinted.active_color(), Some(ColorValue::rgb(255, 0, 0)));
        assert!(tinted.active_texture().is_none());

        let textured = Appearance::Textured {
            path: "/assets/leather-texture.jpg".to_string(),
            image: 7u8,
        };
        assert_eq!(textured.active_texture(), Some("/assets/leather-texture.jpg"));
        assert_eq!(textured.active_image(), Some(&7));
        assert!(textured.active_color().is_none());

        assert!(Appearance::<()>::default().is_neutral());
    }
}
