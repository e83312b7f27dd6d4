//! Wavefront OBJ support.
//!
//! Only geometry is read: `v` records give positions and `f` records give
//! polygons of any valence. Face tokens may carry texture and normal
//! references (`7/3/1`, `7//1`); only the position index is used. Negative
//! indices count back from the most recent vertex. Every other record
//! (`vt`, `vn`, groups, materials, ...) is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_polygons, HalfEdgeMesh, MeshIndex};

/// Polygon soup as read from an OBJ file.
type Soup = (Vec<Point3<f64>>, Vec<Vec<usize>>);

/// Load a mesh from an OBJ file.
///
/// ```no_run
/// use subsurf::io::obj;
/// use subsurf::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (vertices, faces) = parse(BufReader::new(file), path)?;
    log::debug!(
        "Read {} vertices and {} faces from {}",
        vertices.len(),
        faces.len(),
        path.display()
    );
    build_from_polygons(&vertices, &faces)
}

/// Read a mesh from OBJ data.
pub fn read<R: Read, I: MeshIndex>(reader: R) -> Result<HalfEdgeMesh<I>> {
    let (vertices, faces) = parse(BufReader::new(reader), Path::new("<stream>"))?;
    build_from_polygons(&vertices, &faces)
}

/// Save a mesh to an OBJ file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let save_error = |message: String| MeshError::SaveError {
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| save_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer).map_err(|e| match e {
        MeshError::Io(e) => save_error(e.to_string()),
        other => other,
    })?;
    writer.flush().map_err(|e| save_error(e.to_string()))?;

    log::debug!("Saved {} faces to {}", mesh.num_faces(), path.display());
    Ok(())
}

/// Write a mesh as OBJ data.
///
/// Faces list their corners from the face's side half-edge, so reading the
/// output back reproduces the same vertex and face order.
pub fn write<W: Write, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, mut writer: W) -> Result<()> {
    writeln!(
        writer,
        "# {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    )?;

    for v in mesh.vertex_ids() {
        let p = mesh.position(v);
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }

    for f in mesh.face_ids() {
        write!(writer, "f")?;
        for v in mesh.face_vertices(f) {
            write!(writer, " {}", v.index() + 1)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn parse<R: BufRead>(reader: R, path: &Path) -> Result<Soup> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    let error = |line_number: usize, message: String| MeshError::LoadError {
        path: path.to_path_buf(),
        message: format!("line {}: {}", line_number, message),
    };

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = i + 1;
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    let token = tokens
                        .next()
                        .ok_or_else(|| error(line_number, "vertex needs 3 coordinates".into()))?;
                    *c = token.parse::<f64>().map_err(|e| {
                        error(line_number, format!("invalid coordinate '{}': {}", token, e))
                    })?;
                }
                vertices.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let mut face = Vec::new();
                for token in tokens {
                    let index = resolve_index(token, vertices.len())
                        .ok_or_else(|| error(line_number, format!("invalid vertex reference '{}'", token)))?;
                    face.push(index);
                }
                faces.push(face);
            }
            _ => {}
        }
    }

    Ok((vertices, faces))
}

/// Zero-based position index of a face token, if it refers to a read vertex.
fn resolve_index(token: &str, num_vertices: usize) -> Option<usize> {
    let position = token.split('/').next()?;
    let index: isize = position.parse().ok()?;

    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        num_vertices as isize + index
    } else {
        return None;
    };

    (0..num_vertices as isize)
        .contains(&resolved)
        .then_some(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{primitives, VertexId};

    const QUADS: &str = "\
# two quads sharing an edge
o strip
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
v 2 0 0
v 2 1 0
f 1/1/1 2/1/1 3/1/1 4/1/1
f 2//1 -2 -1 3
";

    #[test]
    fn test_read_polygons() {
        let mesh: HalfEdgeMesh = read(QUADS.as_bytes()).unwrap();
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.num_boundary_halfedges(), 6);
        assert_eq!(*mesh.position(VertexId::new(5)), Point3::new(2.0, 1.0, 0.0));
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index("1", 3), Some(0));
        assert_eq!(resolve_index("3/2/1", 3), Some(2));
        assert_eq!(resolve_index("-1", 3), Some(2));
        assert_eq!(resolve_index("-3//4", 3), Some(0));
        assert_eq!(resolve_index("0", 3), None);
        assert_eq!(resolve_index("4", 3), None);
        assert_eq!(resolve_index("-4", 3), None);
        assert_eq!(resolve_index("x", 3), None);
    }

    #[test]
    fn test_write_then_read() {
        let cube: HalfEdgeMesh = primitives::cube().unwrap();
        let mut buffer = Vec::new();
        write(&cube, &mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.contains("f 1 4 3 2"));

        let copy: HalfEdgeMesh = read(buffer.as_slice()).unwrap();
        assert_eq!(copy.num_vertices(), 8);
        assert_eq!(copy.num_faces(), 6);
        for v in cube.vertex_ids() {
            assert_eq!(cube.position(v), copy.position(v));
        }
    }

    #[test]
    fn test_errors_name_the_line() {
        let result: Result<HalfEdgeMesh> = read("v 0 0 0\nv 1 0\n".as_bytes());
        match result {
            Err(MeshError::LoadError { message, .. }) => assert!(message.starts_with("line 2")),
            other => panic!("expected load error, got {:?}", other),
        }

        let result: Result<HalfEdgeMesh> = read("v 0 0 0\nv 1 0 0\nf 1 2 3\n".as_bytes());
        assert!(matches!(result, Err(MeshError::LoadError { .. })));
    }

    #[test]
    fn test_topology_errors_pass_through() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 1 2 4\n";
        let result: Result<HalfEdgeMesh> = read(text.as_bytes());
        assert!(matches!(result, Err(MeshError::InconsistentOrientation { .. })));

        let result: Result<HalfEdgeMesh> = read("v 0 0 0\n".as_bytes());
        assert!(matches!(result, Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("subsurf-obj-{}.obj", std::process::id()));
        let grid: HalfEdgeMesh = primitives::quad_grid(3, 2).unwrap();

        save(&grid, &path).unwrap();
        let loaded: HalfEdgeMesh = load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_faces(), 6);
        assert_eq!(loaded.num_boundary_halfedges(), 10);
    }

    #[test]
    fn test_save_reports_path() {
        let path = std::env::temp_dir()
            .join(format!("subsurf-missing-{}", std::process::id()))
            .join("out.obj");
        let grid: HalfEdgeMesh = primitives::quad_grid(1, 1).unwrap();

        match save(&grid, &path) {
            Err(MeshError::SaveError { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("expected SaveError, got {:?}", other),
        }
    }
}
