//! Export functions for convex hulls

use crate::types::ConvexHull3D;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export a convex hull to OBJ format.
///
/// Writes vertices (v), per-face normals (vn), and faces (f). Faces are
/// emitted as-is, so merged polygonal faces become polygonal OBJ faces.
pub fn export_obj<P: AsRef<Path>>(hull: &ConvexHull3D, path: P) -> crate::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "# Convex Hull OBJ Export")?;
    writeln!(file, "# Vertices: {}", hull.num_vertices())?;
    writeln!(file, "# Faces: {}", hull.num_faces())?;
    writeln!(file)?;

    for vertex in hull.vertices() {
        writeln!(file, "v {} {} {}", vertex.x, vertex.y, vertex.z)?;
    }

    writeln!(file)?;

    for face in hull.faces() {
        let normal = hull.face_normal(face);
        writeln!(file, "vn {} {} {}", normal.x, normal.y, normal.z)?;
    }

    writeln!(file)?;

    // OBJ uses 1-based indexing
    for (i, face) in hull.faces().iter().enumerate() {
        let corners: Vec<String> = face
            .iter()
            .map(|&v| format!("{}//{}", v + 1, i + 1))
            .collect();
        writeln!(file, "f {}", corners.join(" "))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    #[test]
    fn test_export_obj_tetrahedron() {
        let hull = ConvexHull3D::build(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ])
        .unwrap();

        let path = std::env::temp_dir().join("quickhull3d_export_test.obj");
        export_obj(&hull, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(contents.lines().filter(|l| l.starts_with("vn ")).count(), 4);
        assert_eq!(contents.lines().filter(|l| l.starts_with("f ")).count(), 4);
        std::fs::remove_file(&path).unwrap();
    }
}
