// Copyright @yucwang 2023

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use wavefront_obj::{obj, ParseError};

#[derive(Debug)]
pub enum ObjLoadError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(ParseError),
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

impl fmt::Display for ObjLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjLoadError::Io { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            ObjLoadError::Parse(err) => write!(f, "obj parse error on line {}: {}", err.line_number, err.message),
        }
    }
}

impl std::error::Error for ObjLoadError {}

/// Parses OBJ text; polygons with more than three corners become triangle fans.
pub fn load_obj_from_str(input: &str) -> Result<obj::ObjSet, ObjLoadError> {
    Ok(obj::parse(fan_triangulate(input))?)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ObjLoadError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .map_err(|source| ObjLoadError::Io { path: path.to_path_buf(), source })?;
    log::info!("Loading mesh: {}", path.display());
    load_obj_from_str(&data)
}

fn fan_triangulate(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() == Some("f") {
            let corners: Vec<&str> = parts.collect();
            if corners.len() > 3 {
                for pair in corners[1..].windows(2) {
                    out.push_str(&format!("f {} {} {}\n", corners[0], pair[0], pair[1]));
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
