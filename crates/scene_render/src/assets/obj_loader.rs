//! OBJ file loader for 3D models

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::render::{Mesh, Vertex};

/// OBJ parsing failures
#[derive(Error, Debug)]
pub enum ObjError {
    /// IO error while reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A numeric field could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// The file is structurally invalid
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// Loader for Wavefront OBJ geometry
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return a triangle mesh
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ObjError> {
        let file = File::open(path)?;
        Self::read_obj(BufReader::new(file))
    }

    /// Parse OBJ data from a string (used by tests and inline assets)
    pub fn parse_str(source: &str) -> Result<Mesh, ObjError> {
        Self::read_obj(Cursor::new(source))
    }

    fn read_obj<R: BufRead>(reader: R) -> Result<Mesh, ObjError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts[0] {
                "v" => {
                    if parts.len() < 4 {
                        return Err(ObjError::InvalidFormat("short vertex record".to_string()));
                    }
                    positions.push(parse_triple(&parts[1..4], "vertex")?);
                }
                "vn" => {
                    if parts.len() < 4 {
                        return Err(ObjError::InvalidFormat("short normal record".to_string()));
                    }
                    normals.push(parse_triple(&parts[1..4], "normal")?);
                }
                "f" => {
                    if parts.len() < 4 {
                        return Err(ObjError::InvalidFormat(
                            "face with fewer than 3 vertices".to_string(),
                        ));
                    }

                    let mut face: Vec<u32> = Vec::with_capacity(parts.len() - 1);
                    for corner in &parts[1..] {
                        let refs: Vec<&str> = corner.split('/').collect();

                        let pos_idx: usize = refs[0]
                            .parse::<usize>()
                            .map_err(|_| {
                                ObjError::ParseError("invalid position index".to_string())
                            })?
                            .checked_sub(1)
                            .ok_or_else(|| {
                                ObjError::InvalidFormat("zero position index".to_string())
                            })?;

                        let normal_idx = refs
                            .get(2)
                            .filter(|s| !s.is_empty())
                            .and_then(|s| s.parse::<usize>().ok())
                            .map(|i| i - 1);

                        let position = *positions.get(pos_idx).ok_or_else(|| {
                            ObjError::InvalidFormat("position index out of bounds".to_string())
                        })?;
                        let normal = normal_idx
                            .and_then(|i| normals.get(i))
                            .copied()
                            .unwrap_or([0.0, 1.0, 0.0]);

                        face.push(vertices.len() as u32);
                        vertices.push(Vertex { position, normal });
                    }

                    // Fan triangulation
                    for i in 1..face.len() - 1 {
                        indices.push(face[0]);
                        indices.push(face[i]);
                        indices.push(face[i + 1]);
                    }
                }
                _ => {
                    // Ignore other commands
                }
            }
        }

        if vertices.is_empty() {
            return Err(ObjError::InvalidFormat(
                "no vertices found in OBJ file".to_string(),
            ));
        }

        let mut mesh = Mesh::new(vertices, indices);
        if normals.is_empty() {
            recompute_flat_normals(&mut mesh);
        }
        Ok(mesh)
    }
}

fn parse_triple(fields: &[&str], what: &str) -> Result<[f32; 3], ObjError> {
    let mut out = [0.0; 3];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field
            .parse()
            .map_err(|_| ObjError::ParseError(format!("invalid {what} component")))?;
    }
    Ok(out)
}

/// Assign each triangle's plane normal to its vertices
fn recompute_flat_normals(mesh: &mut Mesh) {
    for tri in mesh.indices.chunks_exact(3) {
        let a = Vec3::from(mesh.vertices[tri[0] as usize].position);
        let b = Vec3::from(mesh.vertices[tri[1] as usize].position);
        let c = Vec3::from(mesh.vertices[tri[2] as usize].position);
        let normal = (b - a).cross(&(c - a));
        if normal.norm() == 0.0 {
            continue;
        }
        let n = normal.normalize();
        for &i in tri {
            mesh.vertices[i as usize].normal = [n.x, n.y, n.z];
        }
    }
}
