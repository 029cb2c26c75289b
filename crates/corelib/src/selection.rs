//! Selection panel logic: event forwarding and highlight matching.
//! Drawing lives in the platform layer; this module stays UI-toolkit free.

use crate::appearance::Appearance;
use crate::catalog::{Catalog, ColorOption, MaterialOption, TextureOption};
use crate::viewport::{LoadStatus, TextureLoader, ViewportController};

/// Which affordance is drawn as active. Indices point into the catalogs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Highlight {
    Texture(usize),
    Color(usize),
}

pub struct SelectionPanel {
    catalog: Catalog,
}

impl SelectionPanel {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn on_texture_chosen<L: TextureLoader>(
        &self,
        option: &TextureOption,
        controller: &mut ViewportController<L>,
    ) {
        controller.select_texture(&option.asset_path);
    }

    pub fn on_color_chosen<L: TextureLoader>(
        &self,
        option: &ColorOption,
        controller: &mut ViewportController<L>,
    ) {
        controller.select_color(option.color_value);
    }

    pub fn on_chosen<L: TextureLoader>(
        &self,
        option: &MaterialOption,
        controller: &mut ViewportController<L>,
    ) {
        match option {
            MaterialOption::Texture(t) => self.on_texture_chosen(t, controller),
            MaterialOption::Color(c) => self.on_color_chosen(c, controller),
        }
    }

    /// The single affordance matching the current appearance, if any.
    pub fn highlight<I>(&self, appearance: &Appearance<I>) -> Option<Highlight> {
        if let Some(path) = appearance.active_texture() {
            return self
                .catalog
                .textures()
                .iter()
                .position(|t| t.asset_path == path)
                .map(Highlight::Texture);
        }
        if let Some(color) = appearance.active_color() {
            return self
                .catalog
                .colors()
                .iter()
                .position(|c| c.color_value == color)
                .map(Highlight::Color);
        }
        None
    }

    pub fn is_texture_highlighted<I>(&self, index: usize, appearance: &Appearance<I>) -> bool {
        self.highlight(appearance) == Some(Highlight::Texture(index))
    }

    pub fn is_color_highlighted<I>(&self, index: usize, appearance: &Appearance<I>) -> bool {
        self.highlight(appearance) == Some(Highlight::Color(index))
    }

    #[inline]
    pub fn loading_indicator_visible(status: LoadStatus) -> bool {
        status == LoadStatus::Loading
    }
}

impl Default for SelectionPanel {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}
