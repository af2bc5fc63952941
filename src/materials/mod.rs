// Copyright @yucwang 2023

pub mod emissive;
pub mod lambertian_diffuse;
pub mod phong;
