// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::light_sampler::LightPdfMode;
use crate::core::material::Material;
use crate::core::scene::{Scene, SceneObject};
use crate::core::shape::Shape;
use crate::io::obj_utils::ObjLoadError;
use crate::materials::emissive::EmissiveMaterial;
use crate::materials::lambertian_diffuse::LambertianDiffuse;
use crate::materials::phong::Phong;
use crate::math::constants::{Float, Matrix4f, Vector3f};
use crate::math::spectrum::RGBSpectrum;
use crate::math::transform::Transform;
use crate::sensors::perspective::PerspectiveCamera;
use crate::shapes::rectangle::Rectangle;
use crate::shapes::sphere::Sphere;
use crate::shapes::triangle_mesh::TriangleMesh;

const DEFAULT_FILM_SIZE: usize = 512;
const DEFAULT_FOV: Float = 40.0;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    Parse(String),
    MissingField(String),
    UnknownReference(String),
    Obj(ObjLoadError),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<quick_xml::Error> for SceneLoadError {
    fn from(err: quick_xml::Error) -> Self {
        SceneLoadError::Xml(err)
    }
}

impl From<ObjLoadError> for SceneLoadError {
    fn from(err: ObjLoadError) -> Self {
        SceneLoadError::Obj(err)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "io error: {}", err),
            SceneLoadError::Xml(err) => write!(f, "xml error: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "missing field: {}", field),
            SceneLoadError::UnknownReference(id) => write!(f, "unknown reference: {}", id),
            SceneLoadError::Obj(err) => write!(f, "mesh error: {}", err),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Render settings found in the scene file. Unset fields fall back to the
/// command line or to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSettings {
    pub rr_probability: Option<Float>,
    pub max_depth: Option<u32>,
    pub light_pdf: Option<LightPdfMode>,
    pub samples_per_pixel: Option<u32>,
}

pub struct SceneLoadResult {
    pub scene: Scene,
    pub settings: RenderSettings,
}

pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene: {}", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    load_scene_from_str(&xml, base_dir)
}

/// Parses a scene document; relative mesh paths resolve against `base_dir`.
pub fn load_scene_from_str(xml: &str, base_dir: &Path) -> Result<SceneLoadResult, SceneLoadError> {
    let root = parse_document(xml)?;
    if root.tag != "scene" {
        return Err(SceneLoadError::Parse(format!("root element is <{}>, expected <scene>", root.tag)));
    }

    let mut loader = Loader {
        defaults: HashMap::new(),
        bsdfs: HashMap::new(),
        base_dir,
    };
    for node in root.children_named("default") {
        let name = node.raw_attr("name").ok_or_else(|| missing("default.name"))?;
        let value = node.raw_attr("value").ok_or_else(|| missing("default.value"))?;
        loader.defaults.insert(name.to_string(), value.to_string());
    }

    let mut scene = Scene::new();
    let mut settings = RenderSettings::default();
    for node in &root.children {
        match node.tag.as_str() {
            "default" => {}
            "integrator" => loader.integrator(node, &mut settings)?,
            "sensor" => {
                let (camera, spp) = loader.sensor(node)?;
                log::debug!("{}", crate::core::sensor::Sensor::describe(&camera));
                scene.add_sensor(Box::new(camera));
                if settings.samples_per_pixel.is_none() {
                    settings.samples_per_pixel = spp;
                }
            }
            "bsdf" => {
                let id = loader.attr(node, "id").ok_or_else(|| missing("bsdf.id"))?;
                let bsdf = loader.bsdf(node)?;
                log::debug!("Material '{}': {}", id, bsdf.name());
                loader.bsdfs.insert(id, bsdf);
            }
            "shape" => scene.add_object(loader.shape(node)?),
            other => log::warn!("Ignoring unsupported element <{}>", other),
        }
    }

    scene.build_bvh();
    Ok(SceneLoadResult { scene, settings })
}

fn missing(field: &str) -> SceneLoadError {
    SceneLoadError::MissingField(field.to_string())
}

#[derive(Debug, Default)]
struct XmlNode {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn from_start(e: &BytesStart) -> Result<Self, SceneLoadError> {
        let mut node = XmlNode {
            tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            ..XmlNode::default()
        };
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            node.attrs.push((key, attr.unescape_value()?.into_owned()));
        }
        Ok(node)
    }

    fn raw_attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    fn child_named(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.tag == tag)
    }
}

fn parse_document(xml: &str) -> Result<XmlNode, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut stack = vec![XmlNode::default()];

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(XmlNode::from_start(&e)?),
            Event::Empty(e) => {
                let node = XmlNode::from_start(&e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| SceneLoadError::Parse("unbalanced end tag".to_string()))?;
                let parent = stack.last_mut().ok_or_else(|| SceneLoadError::Parse("unbalanced end tag".to_string()))?;
                parent.children.push(node);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let mut document = match stack.pop() {
        Some(document) if stack.is_empty() => document,
        _ => return Err(SceneLoadError::Parse("unclosed element".to_string())),
    };
    if document.children.len() != 1 {
        return Err(SceneLoadError::Parse("expected exactly one root element".to_string()));
    }
    Ok(document.children.remove(0))
}

struct Loader<'a> {
    defaults: HashMap<String, String>,
    bsdfs: HashMap<String, Arc<dyn Material>>,
    base_dir: &'a Path,
}

impl<'a> Loader<'a> {
    /// Substitutes `$name` with the matching `<default>`. The name runs over
    /// every identifier character after `$`; unknown names are kept as written.
    fn resolve(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..len];
            match self.defaults.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[len..];
        }
        out.push_str(rest);
        out
    }

    fn attr(&self, node: &XmlNode, key: &str) -> Option<String> {
        node.raw_attr(key).map(|v| self.resolve(v))
    }

    /// Value of a child property such as `<float name="fov" value="40"/>`.
    fn property(&self, node: &XmlNode, name: &str) -> Option<String> {
        node.children.iter()
            .find(|c| c.raw_attr("name") == Some(name) && c.raw_attr("value").is_some())
            .and_then(|c| self.attr(c, "value"))
    }

    fn float(&self, node: &XmlNode, name: &str) -> Result<Option<Float>, SceneLoadError> {
        self.property(node, name).map(|v| parse_float(&v)).transpose()
    }

    fn integer(&self, node: &XmlNode, name: &str) -> Result<Option<i64>, SceneLoadError> {
        self.property(node, name)
            .map(|v| v.trim().parse::<i64>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", v))))
            .transpose()
    }

    fn rgb(&self, node: &XmlNode, name: &str) -> Result<Option<RGBSpectrum>, SceneLoadError> {
        self.property(node, name).map(|v| parse_rgb(&v)).transpose()
    }

    fn integrator(&self, node: &XmlNode, settings: &mut RenderSettings) -> Result<(), SceneLoadError> {
        let kind = self.attr(node, "type").unwrap_or_default();
        if kind != "path" {
            return Err(SceneLoadError::Parse(format!("unsupported integrator: {}", kind)));
        }

        settings.rr_probability = self.float(node, "rr_probability")?;
        settings.max_depth = self.integer(node, "max_depth")?
            .filter(|&d| d >= 0)
            .map(|d| d as u32);
        settings.light_pdf = self.property(node, "light_pdf")
            .map(|v| v.parse::<LightPdfMode>().map_err(SceneLoadError::Parse))
            .transpose()?;
        Ok(())
    }

    fn sensor(&self, node: &XmlNode) -> Result<(PerspectiveCamera, Option<u32>), SceneLoadError> {
        let kind = self.attr(node, "type").unwrap_or_default();
        if kind != "perspective" {
            return Err(SceneLoadError::Parse(format!("unsupported sensor: {}", kind)));
        }

        let fov = self.float(node, "fov")?.unwrap_or(DEFAULT_FOV);
        let lookat = node.child_named("transform")
            .and_then(|t| t.child_named("lookat"))
            .ok_or_else(|| missing("sensor.transform.lookat"))?;
        let origin = parse_vec3(&self.attr(lookat, "origin").ok_or_else(|| missing("lookat.origin"))?)?;
        let target = parse_vec3(&self.attr(lookat, "target").ok_or_else(|| missing("lookat.target"))?)?;
        let up = match self.attr(lookat, "up") {
            Some(up) => parse_vec3(&up)?,
            None => Vector3f::new(0.0, 1.0, 0.0),
        };

        let (mut width, mut height) = (DEFAULT_FILM_SIZE, DEFAULT_FILM_SIZE);
        if let Some(film) = node.child_named("film") {
            width = self.integer(film, "width")?.map_or(width, |w| w.max(1) as usize);
            height = self.integer(film, "height")?.map_or(height, |h| h.max(1) as usize);
        }
        let spp = match node.child_named("sampler") {
            Some(sampler) => self.integer(sampler, "sample_count")?.map(|s| s.max(1) as u32),
            None => None,
        };

        Ok((PerspectiveCamera::new(origin, target, up, fov, width, height), spp))
    }

    fn bsdf(&self, node: &XmlNode) -> Result<Arc<dyn Material>, SceneLoadError> {
        let kind = self.attr(node, "type").unwrap_or_default();
        match kind.as_str() {
            "diffuse" => {
                let albedo = self.rgb(node, "reflectance")?.unwrap_or(RGBSpectrum::splat(0.5));
                Ok(Arc::new(LambertianDiffuse::new(albedo)))
            }
            "phong" => {
                let kd = self.rgb(node, "diffuse_reflectance")?.unwrap_or(RGBSpectrum::splat(0.5));
                let ks = self.rgb(node, "specular_reflectance")?.unwrap_or(RGBSpectrum::splat(0.2));
                let exponent = self.float(node, "exponent")?.unwrap_or(30.0);
                Ok(Arc::new(Phong::new(kd, ks, exponent)))
            }
            other => Err(SceneLoadError::Parse(format!("unsupported bsdf: {}", other))),
        }
    }

    fn shape_material(&self, node: &XmlNode) -> Result<Arc<dyn Material>, SceneLoadError> {
        if let Some(reference) = node.child_named("ref") {
            let id = self.attr(reference, "id").ok_or_else(|| missing("ref.id"))?;
            return self.bsdfs.get(&id).cloned().ok_or(SceneLoadError::UnknownReference(id));
        }
        match node.child_named("bsdf") {
            Some(bsdf) => self.bsdf(bsdf),
            None => Ok(Arc::new(LambertianDiffuse::new(RGBSpectrum::splat(0.5)))),
        }
    }

    fn to_world(&self, node: &XmlNode) -> Result<Transform, SceneLoadError> {
        let transform = match node.children_named("transform")
            .find(|t| t.raw_attr("name").map_or(true, |n| n == "to_world")) {
            Some(transform) => transform,
            None => return Ok(Transform::default()),
        };

        let mut result = Transform::default();
        for step in &transform.children {
            let next = match step.tag.as_str() {
                "translate" => Transform::translate(&self.xyz(step, 0.0)?),
                "scale" => Transform::scale(&self.xyz(step, 1.0)?),
                "rotate" => {
                    let angle = parse_float(&self.attr(step, "angle").ok_or_else(|| missing("rotate.angle"))?)?;
                    Transform::rotate(&self.xyz(step, 0.0)?, angle)
                }
                "matrix" => {
                    let values = self.attr(step, "value").ok_or_else(|| missing("matrix.value"))?;
                    Transform::new(parse_matrix(&values)?)
                }
                other => return Err(SceneLoadError::Parse(format!("unsupported transform step: {}", other))),
            };
            result = result.then(&next);
        }
        Ok(result)
    }

    /// `value="s"` or `value="x, y, z"`, else separate `x`/`y`/`z` attributes.
    fn xyz(&self, node: &XmlNode, fill: Float) -> Result<Vector3f, SceneLoadError> {
        if let Some(value) = self.attr(node, "value") {
            let parts = parse_floats(&value)?;
            return match parts.as_slice() {
                [s] => Ok(Vector3f::new(*s, *s, *s)),
                [x, y, z] => Ok(Vector3f::new(*x, *y, *z)),
                _ => Err(SceneLoadError::Parse(format!("expected 1 or 3 values: {}", value))),
            };
        }
        let axis = |key: &str| -> Result<Float, SceneLoadError> {
            self.attr(node, key).map_or(Ok(fill), |v| parse_float(&v))
        };
        Ok(Vector3f::new(axis("x")?, axis("y")?, axis("z")?))
    }

    fn shape(&self, node: &XmlNode) -> Result<SceneObject, SceneLoadError> {
        let kind = self.attr(node, "type").unwrap_or_default();
        let to_world = self.to_world(node)?;

        let shape: Arc<dyn Shape> = match kind.as_str() {
            "obj" => {
                let filename = self.property(node, "filename").ok_or_else(|| missing("shape.filename"))?;
                Arc::new(TriangleMesh::from_obj(self.base_dir.join(filename), &to_world)?)
            }
            "rectangle" => Arc::new(Rectangle::new(to_world)),
            "sphere" => {
                let center = match self.property(node, "center") {
                    Some(c) => parse_vec3(&c)?,
                    None => Vector3f::zeros(),
                };
                let radius = self.float(node, "radius")?.unwrap_or(1.0);
                let scale = uniform_scale(&to_world)
                    .ok_or_else(|| SceneLoadError::Parse("sphere transform must scale uniformly".to_string()))?;
                Arc::new(Sphere::new(to_world.apply_point(center), radius * scale))
            }
            other => return Err(SceneLoadError::Parse(format!("unsupported shape: {}", other))),
        };

        let mut material = self.shape_material(node)?;
        if let Some(emitter) = node.child_named("emitter") {
            let kind = self.attr(emitter, "type").unwrap_or_default();
            if kind != "area" {
                return Err(SceneLoadError::Parse(format!("unsupported emitter: {}", kind)));
            }
            let radiance = self.rgb(emitter, "radiance")?.ok_or_else(|| missing("emitter.radiance"))?;
            material = Arc::new(EmissiveMaterial::new(material, radiance));
        }

        let mut object = SceneObject::new(shape, material);
        if let Some(id) = self.attr(node, "id") {
            object = object.with_name(id);
        }
        Ok(object)
    }
}

/// Common length of the transformed unit axes, `None` when they differ.
fn uniform_scale(transform: &Transform) -> Option<Float> {
    let sx = transform.apply_vector(Vector3f::new(1.0, 0.0, 0.0)).norm();
    let sy = transform.apply_vector(Vector3f::new(0.0, 1.0, 0.0)).norm();
    let sz = transform.apply_vector(Vector3f::new(0.0, 0.0, 1.0)).norm();
    let max = sx.max(sy).max(sz);
    let min = sx.min(sy).min(sz);
    if max - min <= 1e-4 * max {
        Some(sx)
    } else {
        None
    }
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_floats(value: &str) -> Result<Vec<Float>, SceneLoadError> {
    value.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(parse_float)
        .collect()
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    match parse_floats(value)?.as_slice() {
        [x, y, z] => Ok(Vector3f::new(*x, *y, *z)),
        _ => Err(SceneLoadError::Parse(format!("invalid vec3: {}", value))),
    }
}

fn parse_rgb(value: &str) -> Result<RGBSpectrum, SceneLoadError> {
    match parse_floats(value)?.as_slice() {
        [v] => Ok(RGBSpectrum::splat(*v)),
        [r, g, b] => Ok(RGBSpectrum::new(*r, *g, *b)),
        _ => Err(SceneLoadError::Parse(format!("invalid rgb: {}", value))),
    }
}

/// Sixteen numbers in row-major order.
fn parse_matrix(value: &str) -> Result<Matrix4f, SceneLoadError> {
    let values = parse_floats(value)?;
    if values.len() != 16 {
        return Err(SceneLoadError::Parse(format!("matrix needs 16 values, got {}", values.len())));
    }
    Ok(Matrix4f::from_row_slice(&values))
}
