// Copyright @yucwang 2021

pub mod bvh;
pub mod integrator;
pub mod interaction;
pub mod light_sampler;
pub mod material;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod scene_loader;
pub mod sensor;
pub mod shape;
