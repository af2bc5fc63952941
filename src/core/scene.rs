// Copyright @yucwang 2026

use crate::core::bvh::{ BVH, SplitMethod };
use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::light_sampler::{ AreaLightSampler, LightPdfMode };
use crate::core::material::Material;
use crate::core::sampler::Sampler;
use crate::core::sensor::Sensor;
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use std::sync::Arc;

pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<dyn Material>,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn new(shape: Arc<dyn Shape>, material: Arc<dyn Material>) -> Self {
        Self { shape, material, name: None }
    }

    pub fn with_name(mut self, name: String) -> Self {
        self.name = Some(name);
        self
    }

    pub fn has_emit(&self) -> bool {
        self.material.has_emission()
    }

    pub fn area(&self) -> Float {
        self.shape.surface_area()
    }
}

/// Objects, cameras and the structures built over them. Immutable while
/// rendering.
pub struct Scene {
    objects: Vec<SceneObject>,
    sensors: Vec<Box<dyn Sensor>>,
    lights: AreaLightSampler,
    scene_bounds: AABB,
    bvh: Option<BVH>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            sensors: Vec::new(),
            lights: AreaLightSampler::new(),
            scene_bounds: AABB::default(),
            bvh: None,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) {
        if object.has_emit() {
            self.lights.add_emitter(self.objects.len(), object.area());
        }
        self.scene_bounds.expand_by_aabb(&object.shape.bounding_box());
        self.objects.push(object);
        self.bvh = None;
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &AreaLightSampler {
        &self.lights
    }

    pub fn emitter_area(&self) -> Float {
        self.lights.total_area()
    }

    pub fn scene_bounds(&self) -> &AABB {
        &self.scene_bounds
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn sensors(&self) -> &[Box<dyn Sensor>] {
        &self.sensors
    }

    pub fn add_sensor(&mut self, sensor: Box<dyn Sensor>) {
        self.sensors.push(sensor);
    }

    pub fn camera(&self, camera_id: usize) -> Option<&dyn Sensor> {
        self.sensors.get(camera_id).map(|s| s.as_ref())
    }

    pub fn take_sensor(&mut self, camera_id: usize) -> Option<Box<dyn Sensor>> {
        if camera_id < self.sensors.len() {
            Some(self.sensors.remove(camera_id))
        } else {
            None
        }
    }

    pub fn insert_sensor(&mut self, camera_id: usize, sensor: Box<dyn Sensor>) {
        if camera_id <= self.sensors.len() {
            self.sensors.insert(camera_id, sensor);
        } else {
            self.sensors.push(sensor);
        }
    }

    pub fn build_bvh(&mut self) {
        self.build_bvh_with(SplitMethod::default());
    }

    pub fn build_bvh_with(&mut self, split_method: SplitMethod) {
        let prim_bounds = self.objects.iter().map(|o| o.shape.bounding_box()).collect();
        self.bvh = Some(BVH::new(prim_bounds, split_method));
        log::info!("Scene: {} objects, {} emitters, emissive area {:.4}",
                   self.objects.len(), self.lights.len(), self.lights.total_area());
    }

    fn decorate(&self, idx: usize, hit: SurfaceIntersection) -> SurfaceIntersection {
        let object = &self.objects[idx];
        hit.with_le(object.material.emission())
           .with_material(object.material.clone())
           .with_object_index(Some(idx))
    }

    /// Nearest hit along the ray. Falls back to a linear scan until
    /// `build_bvh` has been called.
    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let bvh = match &self.bvh {
            Some(bvh) => bvh,
            None => return self.trace(ray),
        };

        bvh.ray_intersection(ray, |prim_idx, r| {
            self.objects[prim_idx].shape.ray_intersection(r).map(|h| {
                let t = h.t();
                (h, t)
            })
        }).map(|(idx, hit)| self.decorate(idx, hit))
    }

    /// Linear scan over every object.
    pub fn trace(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let mut ray = *ray;
        let mut closest = None;
        for (idx, object) in self.objects.iter().enumerate() {
            if let Some(hit) = object.shape.ray_intersection(&ray) {
                if ray.update(hit.t()) {
                    closest = Some((idx, hit));
                }
            }
        }
        closest.map(|(idx, hit)| self.decorate(idx, hit))
    }

    /// Whether any surface lies within the ray segment.
    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        match &self.bvh {
            Some(bvh) => bvh.ray_intersection_t(ray, |prim_idx, r| {
                self.objects[prim_idx].shape.ray_intersection_t(r)
            }),
            None => self.objects.iter().any(|o| o.shape.ray_intersection_t(ray)),
        }
    }

    /// One point on the emissive surfaces, see `AreaLightSampler::sample`.
    pub fn sample_light(&self, sampler: &mut dyn Sampler, mode: LightPdfMode) -> Option<SurfaceSampleRecord> {
        self.lights.sample(&self.objects, sampler, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::materials::emissive::EmissiveMaterial;
    use crate::materials::lambertian_diffuse::LambertianDiffuse;
    use crate::math::bitmap::Bitmap;
    use crate::math::constants::{ Vector2f, Vector3f };
    use crate::math::spectrum::RGBSpectrum;
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use rand::SeedableRng;

    fn diffuse() -> Arc<dyn Material> {
        Arc::new(LambertianDiffuse::new(RGBSpectrum::splat(0.5)))
    }

    fn light(radiance: Float) -> Arc<dyn Material> {
        Arc::new(EmissiveMaterial::new(diffuse(), RGBSpectrum::splat(radiance)))
    }

    fn square(center: Vector3f, half: Float) -> Arc<dyn Shape> {
        let to_world = Transform::scale(&Vector3f::new(half, half, 1.0))
            .then(&Transform::translate(&center));
        Arc::new(Rectangle::new(to_world))
    }

    #[test]
    fn test_nearest_hit_and_material() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, -5.0), 1.0), diffuse()));
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, -2.0), 1.0), light(4.0)));
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, -10.0), 1.0), diffuse()));

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        for built in [false, true] {
            if built {
                scene.build_bvh();
            }
            let hit = scene.ray_intersection(&ray).expect("expected intersection");
            assert!((hit.t() - 2.0).abs() < 1e-5);
            assert_eq!(hit.object_index(), Some(1));
            assert_eq!(hit.le(), RGBSpectrum::splat(4.0));
            assert!(hit.material().map_or(false, |m| m.has_emission()));
        }

        let miss = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(scene.ray_intersection(&miss).is_none());
        assert!(!scene.ray_intersection_t(&miss));
    }

    #[test]
    fn test_bvh_agrees_with_linear_scan() {
        let mut scene = Scene::new();
        for i in 0..6 {
            for j in 0..6 {
                let c = Vector3f::new(i as Float * 1.5 - 4.0, j as Float * 1.5 - 4.0, -3.0 - (i + j) as Float * 0.5);
                scene.add_object(SceneObject::new(Arc::new(Sphere::new(c, 0.6)), diffuse()));
            }
        }
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, -12.0), 20.0), diffuse()));
        scene.build_bvh_with(SplitMethod::Naive);

        let mut rng = LcgRng::seed_from_u64(11);
        for _ in 0..200 {
            let u = rng.next_2d();
            let d = Vector3f::new(u.x - 0.5, u.y - 0.5, -1.0);
            let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 2.0), d, None, None);
            let fast = scene.ray_intersection(&ray);
            let slow = scene.trace(&ray);
            assert_eq!(fast.as_ref().map(|h| h.object_index()), slow.as_ref().map(|h| h.object_index()));
            if let (Some(a), Some(b)) = (fast, slow) {
                assert!((a.t() - b.t()).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_shadow_segment_stops_short() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, 0.0), 1.0), diffuse()));
        scene.build_bvh();

        let (to_surface, dist) = Ray3f::spawn_to(Vector3f::new(0.0, 0.0, 3.0), Vector3f::zeros());
        assert!((dist - 3.0).abs() < 1e-6);
        assert!(!scene.ray_intersection_t(&to_surface));

        let (through, _) = Ray3f::spawn_to(Vector3f::new(0.0, 0.0, 3.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(scene.ray_intersection_t(&through));
    }

    #[test]
    fn test_no_self_hit_on_large_scene() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(square(Vector3f::zeros(), 555.0), diffuse()));
        scene.build_bvh();

        let eye = Vector3f::new(100.0, -200.0, 800.0);
        for i in 0..10 {
            for j in 0..10 {
                let target = Vector3f::new(i as Float * 97.0 - 450.0, j as Float * 89.0 - 420.0, 0.0);
                let hit = scene.ray_intersection(&Ray3f::new(eye, target - eye, None, None))
                    .expect("plane hit");
                // Leaves the plane at a grazing angle on the side it was hit from.
                let grazing = Ray3f::spawn(hit.p(), Vector3f::new(1.0, 0.3, 0.2));
                assert!(!scene.ray_intersection_t(&grazing), "self hit at {:?}", hit.p());
            }
        }
    }

    #[test]
    fn test_single_emitter_pdf_is_inverse_area() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, 0.0), 5.0), diffuse()));
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, 4.0), 0.25), light(8.0)));
        scene.build_bvh();
        let area = scene.objects()[1].area();
        assert_eq!(scene.emitter_area(), area);

        let mut rng = LcgRng::seed_from_u64(5);
        for _ in 0..100 {
            let record = scene.sample_light(&mut rng, LightPdfMode::PerEmitter).expect("light sample");
            assert_eq!(record.pdf(), 1.0 / area);
            let its = record.intersection();
            assert_eq!(its.object_index(), Some(1));
            assert_eq!(its.le(), RGBSpectrum::splat(8.0));
            assert!((its.p().z - 4.0).abs() < 1e-5);
            assert!(its.p().x.abs() <= 0.25 + 1e-5 && its.p().y.abs() <= 0.25 + 1e-5);
        }
    }

    #[test]
    fn test_no_emitter_no_sample() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(square(Vector3f::zeros(), 1.0), diffuse()));
        let mut rng = LcgRng::seed_from_u64(1);
        assert!(scene.sample_light(&mut rng, LightPdfMode::PerEmitter).is_none());
        assert!(scene.sample_light(&mut rng, LightPdfMode::TotalArea).is_none());
    }

    #[test]
    fn test_multi_emitter_selection_by_area() {
        let mut scene = Scene::new();
        scene.add_object(SceneObject::new(square(Vector3f::new(-3.0, 0.0, 0.0), 0.5), light(1.0)));
        scene.add_object(SceneObject::new(square(Vector3f::new(0.0, 0.0, 0.0), 2.0), diffuse()));
        scene.add_object(SceneObject::new(square(Vector3f::new(3.0, 0.0, 0.0), 1.0), light(1.0)));
        let small = scene.objects()[0].area();
        let large = scene.objects()[2].area();
        let total = small + large;
        assert!((scene.emitter_area() - 5.0).abs() < 1e-5);

        let mut rng = LcgRng::seed_from_u64(99);
        let n = 20_000;
        let mut large_hits = 0usize;
        for _ in 0..n {
            let record = scene.sample_light(&mut rng, LightPdfMode::PerEmitter).expect("light sample");
            match record.intersection().object_index() {
                Some(0) => assert_eq!(record.pdf(), 1.0 / small),
                Some(2) => {
                    assert_eq!(record.pdf(), 1.0 / large);
                    large_hits += 1;
                }
                other => panic!("sampled a non-emitter: {:?}", other),
            }
        }
        let freq = large_hits as Float / n as Float;
        assert!((freq - large / total).abs() < 0.02, "frequency {}", freq);

        let record = scene.sample_light(&mut rng, LightPdfMode::TotalArea).expect("light sample");
        assert_eq!(record.pdf(), 1.0 / scene.emitter_area());
    }

    struct TestSensor {
        bitmap: Bitmap,
    }

    impl Sensor for TestSensor {
        fn sample_ray(&self, _u: &Vector2f) -> Ray3f {
            Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None)
        }

        fn bitmap(&self) -> &Bitmap {
            &self.bitmap
        }

        fn bitmap_mut(&mut self) -> &mut Bitmap {
            &mut self.bitmap
        }
    }

    #[test]
    fn test_scene_camera_access() {
        let mut scene = Scene::new();
        assert!(scene.camera(0).is_none());

        scene.add_sensor(Box::new(TestSensor { bitmap: Bitmap::new(2, 2) }));
        scene.add_sensor(Box::new(TestSensor { bitmap: Bitmap::new(3, 3) }));
        assert!(scene.camera(1).is_some());
        assert!(scene.camera(2).is_none());

        let sensor = scene.take_sensor(0).expect("sensor");
        assert_eq!(scene.sensors().len(), 1);
        scene.insert_sensor(0, sensor);
        assert_eq!(scene.camera(0).map(|s| s.bitmap().width()), Some(2));
    }
}
