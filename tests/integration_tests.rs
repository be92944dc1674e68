//! Integration tests for convex hull computation
//!
//! Covers the end-to-end scenarios: explicit small hulls, random and
//! degenerate point clouds, rotation invariance, and self-consistency of
//! the emitted faces.

use quickhull3d::testdata::{self, DegeneracyType, DegenerateKind};
use quickhull3d::{ConvexHull3D, QuickHull3D, Vec3};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Rotate a face ring so its smallest index comes first, for comparisons
/// that ignore the (arbitrary) starting edge
fn canonical(face: &[usize]) -> Vec<usize> {
    let pos = face
        .iter()
        .enumerate()
        .min_by_key(|&(_, &v)| v)
        .map(|(i, _)| i)
        .unwrap();
    let mut out = Vec::with_capacity(face.len());
    out.extend_from_slice(&face[pos..]);
    out.extend_from_slice(&face[..pos]);
    out
}

fn canonical_face_set(faces: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut set: Vec<Vec<usize>> = faces.iter().map(|f| canonical(f)).collect();
    set.sort();
    set
}

/// Build, verify, then rebuild with injected near-hull degeneracies and
/// verify again
fn single_test(coords: &[f64]) {
    let mut hull = QuickHull3D::new(coords).unwrap();
    hull.build_hull().unwrap();

    let mut diag = String::new();
    assert!(hull.check(Some(&mut diag)), "check failed:\n{diag}");

    let coordsx = testdata::add_degeneracy(DegeneracyType::Vertex, coords, &hull);
    let mut xhull = QuickHull3D::new(&coordsx).unwrap();
    xhull.build_hull().unwrap();

    let mut diag = String::new();
    assert!(
        xhull.check(Some(&mut diag)),
        "check failed after degeneracy injection:\n{diag}"
    );
}

/// Run `single_test` on the cloud and on rotated copies of it
fn run_test(coords: &[f64]) {
    let rpy_list: [[f64; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [10.0, 20.0, 30.0],
        [-45.0, 60.0, 91.0],
        [125.0, 67.0, 81.0],
    ];
    single_test(coords);
    for rpy in rpy_list {
        let rotated = testdata::rotate_coords(
            coords,
            rpy[0].to_radians(),
            rpy[1].to_radians(),
            rpy[2].to_radians(),
        );
        single_test(&rotated);
    }
}

fn assert_euler_formula(faces: &[Vec<usize>]) {
    let mut vertices: Vec<usize> = faces.iter().flatten().copied().collect();
    vertices.sort_unstable();
    vertices.dedup();
    let v = vertices.len() as i64;
    let e: i64 = faces.iter().map(|f| f.len() as i64).sum::<i64>() / 2;
    let f = faces.len() as i64;
    assert_eq!(v - e + f, 2, "Euler's formula violated: V={v} E={e} F={f}");
}

const SCENARIO_A: [f64; 21] = [
    0.0, 0.0, 0.0, //
    1.0, 0.5, 0.0, //
    2.0, 0.0, 0.0, //
    0.5, 0.5, 0.5, //
    0.0, 0.0, 2.0, //
    0.1, 0.2, 0.3, //
    0.0, 2.0, 0.0,
];

const SCENARIO_B: [f64; 33] = [
    21.0, 0.0, 0.0, //
    0.0, 21.0, 0.0, //
    0.0, 0.0, 0.0, //
    18.0, 2.0, 6.0, //
    1.0, 18.0, 5.0, //
    2.0, 1.0, 3.0, //
    14.0, 3.0, 10.0, //
    4.0, 14.0, 14.0, //
    3.0, 4.0, 10.0, //
    10.0, 6.0, 12.0, //
    5.0, 10.0, 15.0,
];

#[test]
fn test_scenario_seven_points() {
    init_logging();
    let mut hull = QuickHull3D::new(&SCENARIO_A).unwrap();
    hull.build_hull().unwrap();

    let faces = hull.get_faces();
    assert_eq!(faces.len(), 4);
    let expected = [vec![2, 4, 0], vec![6, 2, 0], vec![6, 0, 4], vec![6, 4, 2]];
    assert_eq!(canonical_face_set(&faces), canonical_face_set(&expected));
    assert!(hull.check(None));
}

#[test]
fn test_scenario_eleven_points() {
    init_logging();
    let mut hull = QuickHull3D::new(&SCENARIO_B).unwrap();
    hull.build_hull().unwrap();

    let faces = hull.get_faces();
    assert!(!faces.is_empty());
    for face in &faces {
        assert!(face.len() >= 3);
    }
    let mut diag = String::new();
    assert!(hull.check(Some(&mut diag)), "check failed:\n{diag}");
    assert_euler_formula(&faces);
}

#[test]
fn test_coincident_cloud_fails() {
    init_logging();
    for _ in 0..10 {
        let coords = testdata::random_degenerate_points(10, DegenerateKind::Coincident);
        let mut hull = QuickHull3D::new(&coords).unwrap();
        let msg = hull.build_hull().unwrap_err().to_string();
        // epsilon-scale noise can occasionally push the cloud past the
        // spread threshold, in which case it classifies as colinear
        assert!(
            msg == "Input points appear to be coincident"
                || msg == "Input points appear to be colinear",
            "unexpected message: {msg}"
        );
    }
}

#[test]
fn test_colinear_cloud_fails() {
    init_logging();
    for _ in 0..10 {
        let coords = testdata::random_degenerate_points(10, DegenerateKind::Colinear);
        let mut hull = QuickHull3D::new(&coords).unwrap();
        let msg = hull.build_hull().unwrap_err().to_string();
        assert_eq!(msg, "Input points appear to be colinear");
    }
}

#[test]
fn test_coplanar_cloud_fails() {
    init_logging();
    for _ in 0..10 {
        let coords = testdata::random_degenerate_points(10, DegenerateKind::Coplanar);
        let mut hull = QuickHull3D::new(&coords).unwrap();
        let msg = hull.build_hull().unwrap_err().to_string();
        assert_eq!(msg, "Input points appear to be coplanar");
    }
}

#[test]
fn test_random_clouds() {
    init_logging();
    for n in (20..200).step_by(10) {
        run_test(&testdata::random_points(n, 1.0));
    }
}

#[test]
fn test_spherical_clouds() {
    init_logging();
    for n in (20..200).step_by(10) {
        run_test(&testdata::random_spherical_points(n, 1.0));
    }
}

#[test]
fn test_cubed_clouds() {
    init_logging();
    for n in (20..200).step_by(10) {
        run_test(&testdata::random_cubed_points(n, 1.0, 0.5));
    }
}

#[test]
fn test_grid_clouds() {
    init_logging();
    for n in 2..=10 {
        run_test(&testdata::random_grid_points(n, 4.0));
    }
}

#[test]
fn test_cube_corners_merge_to_six_quads() {
    init_logging();
    // the 2x2x2 grid is exactly the corners of a cube, shuffled; all four
    // corners of each side are coplanar and must merge
    let coords = testdata::random_grid_points(2, 4.0);
    let mut hull = QuickHull3D::new(&coords).unwrap();
    hull.build_hull().unwrap();

    let faces = hull.get_faces();
    assert_eq!(faces.len(), 6);
    for face in &faces {
        assert_eq!(face.len(), 4);
    }
    assert!(hull.check(None));
    assert_euler_formula(&faces);
}

#[test]
fn test_degenerate_cloud_repeated() {
    init_logging();
    // cube-clipped cloud plus points injected onto hull edges and vertices
    for _ in 0..100 {
        let coords = testdata::random_cubed_points(100, 1.0, 0.5);
        single_test(&coords);
    }
}

#[test]
fn test_rotation_is_combinatorially_invariant() {
    init_logging();
    let mut hull = QuickHull3D::new(&SCENARIO_B).unwrap();
    hull.build_hull().unwrap();
    let baseline = canonical_face_set(&hull.get_faces());

    let rpy_list: [[f64; 3]; 3] = [
        [10.0, 20.0, 30.0],
        [-45.0, 60.0, 91.0],
        [125.0, 67.0, 81.0],
    ];
    for rpy in rpy_list {
        let rotated = testdata::rotate_coords(
            &SCENARIO_B,
            rpy[0].to_radians(),
            rpy[1].to_radians(),
            rpy[2].to_radians(),
        );
        let mut rhull = QuickHull3D::new(&rotated).unwrap();
        rhull.build_hull().unwrap();
        assert_eq!(canonical_face_set(&rhull.get_faces()), baseline);
    }
}

#[test]
fn test_hull_of_hull_is_identical() {
    init_logging();
    let mut hull = QuickHull3D::new(&SCENARIO_B).unwrap();
    hull.build_hull().unwrap();
    let faces = hull.get_faces();

    // rebuild from the hull vertices only
    let mut hull_verts: Vec<usize> = faces.iter().flatten().copied().collect();
    hull_verts.sort_unstable();
    hull_verts.dedup();

    let mut sub_coords = Vec::with_capacity(hull_verts.len() * 3);
    for &v in &hull_verts {
        sub_coords.extend_from_slice(&SCENARIO_B[v * 3..v * 3 + 3]);
    }
    let mut sub_hull = QuickHull3D::new(&sub_coords).unwrap();
    sub_hull.build_hull().unwrap();

    // map sub-hull indices back to the original input
    let remapped: Vec<Vec<usize>> = sub_hull
        .get_faces()
        .iter()
        .map(|f| f.iter().map(|&i| hull_verts[i]).collect())
        .collect();
    assert_eq!(canonical_face_set(&remapped), canonical_face_set(&faces));
}

#[test]
fn test_euler_formula_on_random_hulls() {
    init_logging();
    for n in [50, 100, 250] {
        let coords = testdata::random_spherical_points(n, 1.0);
        let mut hull = QuickHull3D::new(&coords).unwrap();
        hull.build_hull().unwrap();
        assert_euler_formula(&hull.get_faces());
    }
    for n in [3, 5] {
        let coords = testdata::random_grid_points(n, 4.0);
        let mut hull = QuickHull3D::new(&coords).unwrap();
        hull.build_hull().unwrap();
        assert_euler_formula(&hull.get_faces());
    }
}

#[test]
fn test_convex_hull_3d_wrapper() {
    init_logging();
    let points: Vec<Vec3> = SCENARIO_A
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();
    let hull = ConvexHull3D::build(&points).unwrap();

    assert_eq!(hull.num_faces(), 4);
    assert_eq!(hull.num_vertices(), 7);
    assert!(hull.volume() > 0.0);
    assert!(hull.surface_area() > 0.0);
}
