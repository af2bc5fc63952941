/* Copyright 2020 @Yuchen Wong */

pub type Float = f32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;
pub type Vector4f = nalgebra::Vector4<Float>;
pub type Matrix4f = nalgebra::Matrix4<Float>;

// Offset used when spawning rays from a surface, per unit of coordinate
// magnitude (see `ray::surface_offset`).
pub const EPSILON: Float = 1e-4;
// Tolerance of the shadow-ray distance comparison.
pub const SHADOW_EPSILON: Float = 1e-3;
pub const PDF_EPSILON: Float = 1e-8;

pub const PI: Float = 3.14159265359;
pub const INV_PI: Float = 0.31830988618;
pub const INV_2PI: Float = 0.15915494309;

pub const FLOAT_MAX: Float = std::f32::MAX;
pub const FLOAT_MIN: Float = std::f32::MIN;
