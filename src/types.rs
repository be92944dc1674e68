//! Core value types: 3-vectors and the computed hull

use crate::DOUBLE_PREC;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 3D vector / point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Get a single element; 0, 1, and 2 correspond to x, y, and z
    pub fn get(&self, i: usize) -> f64 {
        match i {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("Vec3 element index out of range: {i}"),
        }
    }

    /// Dot product with another vector
    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product with another vector
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Add another vector
    pub fn add(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Subtract another vector
    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// Scale by a scalar
    pub fn scale(&self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// The 2-norm
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// The square of the 2-norm
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Distance to another point
    pub fn distance(&self, other: &Vec3) -> f64 {
        self.sub(other).norm()
    }

    /// Squared distance to another point
    pub fn distance_squared(&self, other: &Vec3) -> f64 {
        self.sub(other).norm_squared()
    }

    /// Normalize to unit length.
    ///
    /// A no-op when the squared length is already within 2·ε of 1, so that
    /// renormalizing an (almost) unit vector does not accumulate drift.
    pub fn normalize(&self) -> Vec3 {
        let len_sqr = self.norm_squared();
        let err = len_sqr - 1.0;
        if err > 2.0 * DOUBLE_PREC || err < -(2.0 * DOUBLE_PREC) {
            self.scale(1.0 / len_sqr.sqrt())
        } else {
            *self
        }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.x, self.y, self.z)
    }
}

/// The result of a convex hull computation.
///
/// Faces are convex polygons given as counter-clockwise lists of indices
/// into the original input points. Merged faces may carry more than three
/// indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvexHull3D {
    /// Original input points
    vertices: Vec<Vec3>,
    /// Hull faces, each a counter-clockwise index ring
    faces: Vec<Vec<usize>>,
}

impl ConvexHull3D {
    /// Build a convex hull from a set of points
    pub fn build(points: &[Vec3]) -> crate::Result<Self> {
        let mut hull = crate::QuickHull3D::from_points(points)?;
        hull.build_hull()?;
        Ok(Self {
            vertices: points.to_vec(),
            faces: hull.get_faces(),
        })
    }

    /// Get the input points
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Get the faces
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Get the number of faces
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of input points
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Outward unit normal of one face
    pub fn face_normal(&self, face: &[usize]) -> Vec3 {
        let p0 = &self.vertices[face[0]];
        let mut normal = Vec3::default();
        for k in 1..face.len() - 1 {
            let e1 = self.vertices[face[k]].sub(p0);
            let e2 = self.vertices[face[k + 1]].sub(p0);
            normal = normal.add(&e1.cross(&e2));
        }
        normal.normalize()
    }

    /// Compute the volume of the convex hull
    pub fn volume(&self) -> f64 {
        let mut volume = 0.0;

        for face in &self.faces {
            let v0 = &self.vertices[face[0]];
            for k in 1..face.len() - 1 {
                let v1 = &self.vertices[face[k]];
                let v2 = &self.vertices[face[k + 1]];

                // Signed volume of the tetrahedron formed by the origin
                // and one fan triangle of the face
                volume += v0.dot(&v1.cross(v2)) / 6.0;
            }
        }

        volume.abs()
    }

    /// Compute the surface area of the convex hull
    pub fn surface_area(&self) -> f64 {
        let mut area = 0.0;

        for face in &self.faces {
            let v0 = &self.vertices[face[0]];
            for k in 1..face.len() - 1 {
                let e1 = self.vertices[face[k]].sub(v0);
                let e2 = self.vertices[face[k + 1]].sub(v0);
                area += e1.cross(&e2).norm() / 2.0;
            }
        }

        area
    }
}
