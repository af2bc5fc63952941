// Copyright @yucwang 2023

pub mod rectangle;
pub mod sphere;
pub mod triangle;
pub mod triangle_mesh;
