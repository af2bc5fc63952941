// Copyright @yucwang 2026

use crate::core::interaction::SurfaceSampleRecord;
use crate::core::sampler::Sampler;
use crate::core::scene::SceneObject;
use crate::math::constants::Float;

use std::fmt;
use std::str::FromStr;

/// Density reported with a light sample.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LightPdfMode {
    /// `1 / area` of the emitter that was picked. Exact for a single light;
    /// with several lights the selection probability is left out.
    #[default]
    PerEmitter,
    /// `1 / total emissive area`, the joint density of picking an emitter
    /// by area and a point on it uniformly.
    TotalArea,
}

impl FromStr for LightPdfMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "per-emitter" => Ok(LightPdfMode::PerEmitter),
            "total-area" => Ok(LightPdfMode::TotalArea),
            other => Err(format!("unknown light pdf mode '{}', expected per-emitter or total-area", other)),
        }
    }
}

impl fmt::Display for LightPdfMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightPdfMode::PerEmitter => write!(f, "per-emitter"),
            LightPdfMode::TotalArea => write!(f, "total-area"),
        }
    }
}

/// Picks one emissive object with probability proportional to its area.
/// Emitters are kept in scene object order.
#[derive(Debug, Clone, Default)]
pub struct AreaLightSampler {
    emitters: Vec<usize>,
    cdf: Vec<Float>,
}

impl AreaLightSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_emitter(&mut self, object_index: usize, area: Float) {
        let total = self.total_area() + area.max(0.0);
        self.emitters.push(object_index);
        self.cdf.push(total);
    }

    pub fn total_area(&self) -> Float {
        self.cdf.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn emitters(&self) -> &[usize] {
        &self.emitters
    }

    /// Draws one 1D number to choose the emitter and one 2D number for the
    /// point on it. `None` when there is nothing to sample.
    pub fn sample(&self,
                  objects: &[SceneObject],
                  sampler: &mut dyn Sampler,
                  mode: LightPdfMode) -> Option<SurfaceSampleRecord> {
        let last = self.emitters.len().checked_sub(1)?;
        let total_area = self.total_area();

        let u = sampler.next_1d() * total_area;
        let slot = self.cdf.iter().position(|&c| u <= c).unwrap_or(last);
        let object_index = self.emitters[slot];
        let object = objects.get(object_index)?;

        let mut record = object.shape.sample(&sampler.next_2d());
        if mode == LightPdfMode::TotalArea {
            record.set_pdf(if total_area > 0.0 { 1.0 / total_area } else { 0.0 });
        }

        let le = object.material.emission();
        Some(record.map_intersection(|its| {
            its.with_le(le)
               .with_material(object.material.clone())
               .with_object_index(Some(object_index))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_pdf_mode_parsing() {
        assert_eq!("per-emitter".parse::<LightPdfMode>(), Ok(LightPdfMode::PerEmitter));
        assert_eq!("Total_Area".parse::<LightPdfMode>(), Ok(LightPdfMode::TotalArea));
        assert!("uniform".parse::<LightPdfMode>().is_err());
        assert_eq!(LightPdfMode::TotalArea.to_string(), "total-area");
    }

    #[test]
    fn test_cumulative_areas() {
        let mut lights = AreaLightSampler::new();
        assert!(lights.is_empty());
        lights.add_emitter(3, 1.0);
        lights.add_emitter(5, 3.0);
        assert_eq!(lights.len(), 2);
        assert_eq!(lights.total_area(), 4.0);
        assert_eq!(lights.emitters(), &[3, 5]);
    }
}
