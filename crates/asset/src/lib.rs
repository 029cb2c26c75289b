//! Asset loading (model, textures) for the configurator.
//! The OBJ loader splits objects/groups into surfaces; textures decode on a
//! background thread through [`loader::ThreadedTextureLoader`].

pub mod loader;
pub mod mesh;
pub mod model;
pub mod obj;
pub mod paths;
pub mod texture;

pub use loader::ThreadedTextureLoader;
pub use model::{ModelData, SurfaceData};
pub use paths::AssetRoot;
pub use texture::TextureData;
