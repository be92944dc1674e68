//! Test data for convex hull tests
//!
//! Point-cloud generators used by the test suite: random boxes, balls,
//! clipped cubes (which put many points on shared planes), grids, and
//! deliberately degenerate clouds.

use crate::types::Vec3;
use crate::{DOUBLE_PREC, QuickHull3D};
use rand::Rng;

/// Scale applied to tolerance-sized noise when injecting degeneracies
const EPS_SCALE: f64 = 2.0;

/// Dimensionality of a degenerate point cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateKind {
    Coincident,
    Colinear,
    Coplanar,
}

/// What kind of near-hull degeneracy [`add_degeneracy`] injects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegeneracyType {
    /// Extra points near random hull edges
    Edge,
    /// Extra points near hull vertices (every other face) and edges
    Vertex,
}

fn random_vec(rng: &mut impl Rng, lower: f64, upper: f64) -> Vec3 {
    let range = upper - lower;
    Vec3::new(
        rng.random::<f64>() * range + lower,
        rng.random::<f64>() * range + lower,
        rng.random::<f64>() * range + lower,
    )
}

fn randomly_perturb(rng: &mut impl Rng, pnt: &mut Vec3, tol: f64) {
    pnt.x += tol * (rng.random::<f64>() - 0.5);
    pnt.y += tol * (rng.random::<f64>() - 0.5);
    pnt.z += tol * (rng.random::<f64>() - 0.5);
}

fn push_point(coords: &mut Vec<f64>, pnt: &Vec3) {
    coords.extend([pnt.x, pnt.y, pnt.z]);
}

/// Coordinates for `num` points whose x, y, and z values are randomly
/// chosen between -range and range
pub fn random_points(num: usize, range: f64) -> Vec<f64> {
    let mut rng = rand::rng();
    let mut coords = Vec::with_capacity(num * 3);
    for _ in 0..num {
        for _ in 0..3 {
            coords.push(2.0 * range * (rng.random::<f64>() - 0.5));
        }
    }
    coords
}

/// Coordinates for `num` random points lying within a sphere of the given
/// radius, by rejection sampling
pub fn random_spherical_points(num: usize, radius: f64) -> Vec<f64> {
    let mut rng = rand::rng();
    let mut coords = Vec::with_capacity(num * 3);
    let mut count = 0;
    while count < num {
        let pnt = random_vec(&mut rng, -radius, radius);
        if pnt.norm() <= radius {
            push_point(&mut coords, &pnt);
            count += 1;
        }
    }
    coords
}

/// Coordinates for `num` points randomly chosen within -range..range and
/// then clipped to a maximum absolute value.
///
/// The clipping pushes many points onto the surface of a cube, which is
/// useful for creating degenerate convex hull situations.
pub fn random_cubed_points(num: usize, range: f64, max: f64) -> Vec<f64> {
    let mut rng = rand::rng();
    let mut coords = Vec::with_capacity(num * 3);
    for _ in 0..num {
        for _ in 0..3 {
            let x = 2.0 * range * (rng.random::<f64>() - 0.5);
            coords.push(x.clamp(-max, max));
        }
    }
    coords
}

/// Randomly shuffled coordinates for a cubic grid of `grid_size` points per
/// axis, `width` across
pub fn random_grid_points(grid_size: usize, width: f64) -> Vec<f64> {
    // any given coordinate indexed by i has value
    // (i/(grid_size-1) - 0.5)*width
    let mut coords = Vec::with_capacity(grid_size * grid_size * grid_size * 3);
    for i in 0..grid_size {
        for j in 0..grid_size {
            for k in 0..grid_size {
                coords.push((i as f64 / (grid_size - 1) as f64 - 0.5) * width);
                coords.push((j as f64 / (grid_size - 1) as f64 - 0.5) * width);
                coords.push((k as f64 / (grid_size - 1) as f64 - 0.5) * width);
            }
        }
    }
    shuffle_coords(&mut coords);
    coords
}

/// Coordinates for `num` randomly chosen points that are degenerate with
/// respect to the given dimensionality, perturbed by machine-epsilon-scale
/// noise
pub fn random_degenerate_points(num: usize, kind: DegenerateKind) -> Vec<f64> {
    let mut rng = rand::rng();
    let mut coords = Vec::with_capacity(num * 3);
    let base = random_vec(&mut rng, -1.0, 1.0);
    let tol = DOUBLE_PREC;

    match kind {
        DegenerateKind::Coincident => {
            for _ in 0..num {
                let mut pnt = base;
                randomly_perturb(&mut rng, &mut pnt, tol);
                push_point(&mut coords, &pnt);
            }
        }
        DegenerateKind::Colinear => {
            let u = random_vec(&mut rng, -1.0, 1.0).normalize();
            for _ in 0..num {
                let a = 2.0 * (rng.random::<f64>() - 0.5);
                let mut pnt = u.scale(a).add(&base);
                randomly_perturb(&mut rng, &mut pnt, tol);
                push_point(&mut coords, &pnt);
            }
        }
        DegenerateKind::Coplanar => {
            let nrm = random_vec(&mut rng, -1.0, 1.0).normalize();
            for _ in 0..num {
                // compute a random point and project it to the plane
                let mut pnt = random_vec(&mut rng, -1.0, 1.0);
                let perp = nrm.scale(pnt.dot(&nrm));
                pnt = pnt.sub(&perp).add(&base);
                randomly_perturb(&mut rng, &mut pnt, tol);
                push_point(&mut coords, &pnt);
            }
        }
    }
    coords
}

/// Augment a point cloud with one extra point per hull face, lying on (or
/// tolerance-close to) an edge or vertex of the built hull
pub fn add_degeneracy(kind: DegeneracyType, coords: &[f64], hull: &QuickHull3D) -> Vec<f64> {
    let mut rng = rand::rng();
    let faces = hull.get_faces();
    let mut numv = coords.len() / 3;
    let mut coordsx = vec![0.0; coords.len() + faces.len() * 3];
    coordsx[..coords.len()].copy_from_slice(coords);
    let eps = hull.distance_tolerance();

    for (i, face) in faces.iter().enumerate() {
        // random point on an edge
        let mut lam = [0.0; 3];
        lam[0] = rng.random::<f64>();
        lam[1] = 1.0 - lam[0];
        if kind == DegeneracyType::Vertex && i % 2 == 0 {
            lam = [1.0, 0.0, 0.0];
        }
        for j in 0..3 {
            let vtxi = face[j];
            for k in 0..3 {
                coordsx[numv * 3 + k] += lam[j] * coords[vtxi * 3 + k]
                    + EPS_SCALE * eps * (rng.random::<f64>() - 0.5);
            }
        }
        numv += 1;
    }
    shuffle_coords(&mut coordsx);
    coordsx
}

/// Shuffle whole points within an interleaved coordinate array
pub fn shuffle_coords(coords: &mut [f64]) {
    let mut rng = rand::rng();
    let num = coords.len() / 3;
    for _ in 0..num {
        let i1 = rng.random_range(0..num);
        let i2 = rng.random_range(0..num);
        for k in 0..3 {
            coords.swap(i1 * 3 + k, i2 * 3 + k);
        }
    }
}

/// Rigidly rotate an interleaved coordinate array by roll, pitch, and yaw
/// (radians)
pub fn rotate_coords(xyz: &[f64], roll: f64, pitch: f64, yaw: f64) -> Vec<f64> {
    let (sroll, croll) = roll.sin_cos();
    let (spitch, cpitch) = pitch.sin_cos();
    let (syaw, cyaw) = yaw.sin_cos();

    let m00 = croll * cpitch;
    let m10 = sroll * cpitch;
    let m20 = -spitch;
    let m01 = croll * spitch * syaw - sroll * cyaw;
    let m11 = sroll * spitch * syaw + croll * cyaw;
    let m21 = cpitch * syaw;
    let m02 = croll * spitch * cyaw + sroll * syaw;
    let m12 = sroll * spitch * cyaw - croll * syaw;
    let m22 = cpitch * cyaw;

    let mut res = vec![0.0; xyz.len()];
    for i in (0..xyz.len()).step_by(3) {
        res[i] = m00 * xyz[i] + m01 * xyz[i + 1] + m02 * xyz[i + 2];
        res[i + 1] = m10 * xyz[i] + m11 * xyz[i + 1] + m12 * xyz[i + 2];
        res[i + 2] = m20 * xyz[i] + m21 * xyz[i + 1] + m22 * xyz[i + 2];
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_points_range() {
        let coords = random_points(100, 2.0);
        assert_eq!(coords.len(), 300);
        assert!(coords.iter().all(|c| c.abs() <= 2.0));
    }

    #[test]
    fn test_random_spherical_points_in_ball() {
        let coords = random_spherical_points(50, 1.5);
        assert_eq!(coords.len(), 150);
        for p in coords.chunks_exact(3) {
            let pnt = Vec3::new(p[0], p[1], p[2]);
            assert!(pnt.norm() <= 1.5);
        }
    }

    #[test]
    fn test_random_cubed_points_clipped() {
        let coords = random_cubed_points(200, 1.0, 0.5);
        assert!(coords.iter().all(|c| c.abs() <= 0.5));
        // clipping should land a fair number of coordinates on the faces
        let clipped = coords.iter().filter(|c| c.abs() == 0.5).count();
        assert!(clipped > 0);
    }

    #[test]
    fn test_grid_points_count() {
        let coords = random_grid_points(4, 4.0);
        assert_eq!(coords.len(), 4 * 4 * 4 * 3);
        assert!(coords.iter().all(|c| c.abs() <= 2.0 + 1e-12));
    }

    #[test]
    fn test_degenerate_points_are_flat() {
        let coords = random_degenerate_points(10, DegenerateKind::Coincident);
        assert_eq!(coords.len(), 30);
        let spread_x = coords
            .chunks_exact(3)
            .map(|p| p[0])
            .fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        assert!(spread_x.1 - spread_x.0 < 1e-12);
    }

    #[test]
    fn test_rotate_coords_preserves_norm() {
        let coords = random_points(20, 1.0);
        let rotated = rotate_coords(&coords, 0.3, -0.7, 1.1);
        for (p, q) in coords.chunks_exact(3).zip(rotated.chunks_exact(3)) {
            let n0 = Vec3::new(p[0], p[1], p[2]).norm();
            let n1 = Vec3::new(q[0], q[1], q[2]).norm();
            assert!((n0 - n1).abs() < 1e-12);
        }
    }
}
