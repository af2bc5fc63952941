/* Copyright 2020 @Yuchen Wong */

pub mod exr_utils;
pub mod image_utils;
pub mod obj_utils;
