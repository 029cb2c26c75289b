//! Maps an appearance onto per-surface material parameters.
//!
//! The renderer keeps one [`SurfaceMaterial`] per mesh surface and rebinds all
//! of them through [`bind_all`] whenever the appearance revision changes.

use crate::appearance::Appearance;

/// Base color used when neither a texture nor a color is selected (linear).
pub const NEUTRAL_BASE_COLOR: [f32; 4] = [0.6, 0.6, 0.6, 1.0];

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Which image a surface samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    /// 1x1 white; the base color alone decides the shade.
    Default,
    /// A loaded texture, keyed by asset path.
    Image(String),
}

/// Final color = sample(texture) * base_color.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaterial {
    pub base_color: [f32; 4],
    pub texture: TextureSlot,
}

impl SurfaceMaterial {
    pub fn neutral() -> Self {
        Self {
            base_color: NEUTRAL_BASE_COLOR,
            texture: TextureSlot::Default,
        }
    }

    pub fn for_appearance<I>(appearance: &Appearance<I>) -> Self {
        match appearance {
            Appearance::Neutral => Self::neutral(),
            Appearance::Textured { path, .. } => Self {
                base_color: WHITE,
                texture: TextureSlot::Image(path.clone()),
            },
            Appearance::Tinted(color) => Self {
                base_color: color.to_linear_rgba(),
                texture: TextureSlot::Default,
            },
        }
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Apply one appearance uniformly to every surface.
pub fn bind_all<I>(surfaces: &mut [SurfaceMaterial], appearance: &Appearance<I>) {
    let material = SurfaceMaterial::for_appearance(appearance);
    for surface in surfaces.iter_mut() {
        surface.clone_from(&material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorValue;

    #[test]
    fn neutral_on_every_surface_at_startup() {
        let mut surfaces = vec![SurfaceMaterial::default(); 3];
        bind_all(&mut surfaces, &Appearance::<()>::Neutral);
        assert!(surfaces.iter().all(|s| *s == SurfaceMaterial::neutral()));
    }

    #[test]
    fn texture_reaches_all_surfaces_without_tint() {
        let mut surfaces = vec![SurfaceMaterial::default(); 4];
        bind_all(
            &mut surfaces,
            &Appearance::Textured {
                path: "/assets/leather-texture.jpg".to_string(),
                image: (),
            },
        );
        for s in &surfaces {
            assert_eq!(s.base_color, WHITE);
            assert_eq!(
                s.texture,
                TextureSlot::Image("/assets/leather-texture.jpg".to_string())
            );
        }
    }

    #[test]
    fn color_replaces_texture_on_all_surfaces() {
        let mut surfaces = vec![
            SurfaceMaterial {
                base_color: WHITE,
                texture: TextureSlot::Image("/assets/denim-texture.jpg".to_string()),
            };
            2
        ];
        let red = ColorValue::from_hex(0xFF0000);
        bind_all(&mut surfaces, &Appearance::<()>::Tinted(red));
        for s in &surfaces {
            assert_eq!(s.texture, TextureSlot::Default);
            assert_eq!(s.base_color, red.to_linear_rgba());
        }
    }
}
