// Copyright @yucwang 2021

pub mod core;
pub mod integrators;
pub mod io;
pub mod materials;
pub mod math;
pub mod renderers;
pub mod sensors;
pub mod shapes;
