// Copyright @yucwang 2021

use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;

use std::fmt;

#[derive(Debug)]
pub enum RenderError {
    MissingCamera(usize),
    EmptyFilm,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MissingCamera(id) => write!(f, "scene has no camera with index {}", id),
            RenderError::EmptyFilm => write!(f, "camera film has zero size"),
        }
    }
}

impl std::error::Error for RenderError {}

pub trait Renderer {
    /// Renders through one of the scene's cameras; the developed film is
    /// also left in that camera's bitmap.
    fn render(&self, scene: &mut Scene) -> Result<Bitmap, RenderError>;
}
