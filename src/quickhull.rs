//! Quickhull driver
//!
//! Builds the hull by repeated point insertion: pick the claimed point
//! furthest above its face, walk the region of faces visible from it to
//! find the horizon, erect a cone of new triangles over the horizon, then
//! merge away edges that are not clearly convex. Merging is what keeps the
//! output robust under floating-point imprecision; it follows the qhull
//! approach of comparing each neighbor's centroid against the face plane
//! within a distance tolerance.

use crate::mesh::{Mark, Mesh, VertexList};
use crate::types::Vec3;
use crate::{ConvexHullError, DOUBLE_PREC, Result};
use std::fmt::{self, Write as _};

/// Which convexity test drives a merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeType {
    /// Merge only when the edge is non-convex as seen from the larger face
    NonConvexWrtLargerFace,
    /// Merge when the edge is non-convex as seen from either face
    NonConvex,
}

/// Computes the convex hull of a set of three dimensional points.
///
/// Faces whose shared edges are not clearly convex are merged, so emitted
/// faces may be convex polygons instead of triangles. All decisions go
/// through a single [distance tolerance](Self::distance_tolerance), normally
/// computed from the input coordinate magnitudes but settable explicitly.
///
/// Degenerate input (coincident, colinear, or coplanar within tolerance)
/// makes [`build_hull`](Self::build_hull) fail; no partial hull is produced.
#[derive(Debug)]
pub struct QuickHull3D {
    mesh: Mesh,
    /// Ids of faces on the hull; non-VISIBLE entries are filtered out at
    /// the end of the build
    faces: Vec<usize>,
    claimed: VertexList,
    unclaimed: VertexList,
    /// Per axis, the input vertex with the greatest / smallest coordinate
    max_vtxs: [usize; 3],
    min_vtxs: [usize; 3],
    tolerance: f64,
    explicit_tolerance: f64,
    debug: bool,
}

impl QuickHull3D {
    /// Requests that the distance tolerance be computed automatically from
    /// the input point data (the default).
    pub const AUTOMATIC_TOLERANCE: f64 = -1.0;

    /// Create a hull builder from interleaved x,y,z coordinates.
    ///
    /// Fails if the coordinate count is not a multiple of three or fewer
    /// than four points are given.
    pub fn new(coords: &[f64]) -> Result<Self> {
        if coords.len() % 3 != 0 {
            return Err(ConvexHullError::MalformedCoordinates(coords.len()));
        }
        let num_points = coords.len() / 3;
        if num_points < 4 {
            return Err(ConvexHullError::InsufficientVertices);
        }
        let mut mesh = Mesh::new();
        for i in 0..num_points {
            mesh.add_vertex(
                i,
                Vec3::new(coords[i * 3], coords[i * 3 + 1], coords[i * 3 + 2]),
            );
        }
        Ok(Self::with_mesh(mesh))
    }

    /// Create a hull builder from a point slice
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        if points.len() < 4 {
            return Err(ConvexHullError::InsufficientVertices);
        }
        let mut mesh = Mesh::new();
        for (i, p) in points.iter().enumerate() {
            mesh.add_vertex(i, *p);
        }
        Ok(Self::with_mesh(mesh))
    }

    fn with_mesh(mesh: Mesh) -> Self {
        Self {
            mesh,
            faces: Vec::new(),
            claimed: VertexList::new(),
            unclaimed: VertexList::new(),
            max_vtxs: [0; 3],
            min_vtxs: [0; 3],
            tolerance: 0.0,
            explicit_tolerance: Self::AUTOMATIC_TOLERANCE,
            debug: false,
        }
    }

    /// Returns true if debug diagnostics are enabled
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Enables verbose diagnostics through `log::debug!`
    pub fn set_debug(&mut self, enable: bool) {
        self.debug = enable;
    }

    /// The distance tolerance used for the most recently computed hull
    pub fn distance_tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The explicit distance tolerance, or [`Self::AUTOMATIC_TOLERANCE`]
    pub fn explicit_distance_tolerance(&self) -> f64 {
        self.explicit_tolerance
    }

    /// Set an explicit distance tolerance for convexity tests.
    /// [`Self::AUTOMATIC_TOLERANCE`] restores the automatic computation.
    pub fn set_explicit_distance_tolerance(&mut self, tol: f64) {
        self.explicit_tolerance = tol;
    }

    fn num_points(&self) -> usize {
        self.mesh.verts.len()
    }

    /// Build the hull.
    ///
    /// Fails with the coincident / colinear / coplanar errors when the
    /// initial simplex cannot be formed within tolerance.
    pub fn build_hull(&mut self) -> Result<()> {
        let mut cnt = 0;
        self.compute_max_and_min();
        self.create_initial_simplex()?;
        while let Some((eye_vtx, eye_face)) = self.next_point_to_add() {
            self.add_point_to_hull(eye_vtx, eye_face)?;
            cnt += 1;
            if self.debug {
                log::debug!("iteration {cnt} done");
            }
        }
        let mesh = &self.mesh;
        self.faces.retain(|&f| mesh.faces[f].mark == Mark::Visible);
        if self.debug {
            log::debug!("hull done");
        }
        Ok(())
    }

    /// The hull faces, one counter-clockwise ring of 0-based original-input
    /// indices per face. Merged faces may carry more than three indices.
    pub fn get_faces(&self) -> Vec<Vec<usize>> {
        self.faces
            .iter()
            .map(|&f| self.mesh.face_indices(f))
            .collect()
    }

    fn compute_max_and_min(&mut self) {
        let mut max = self.mesh.verts[0].pnt;
        let mut min = max;
        self.max_vtxs = [0; 3];
        self.min_vtxs = [0; 3];
        for i in 1..self.num_points() {
            let pnt = self.mesh.verts[i].pnt;
            if pnt.x > max.x {
                max.x = pnt.x;
                self.max_vtxs[0] = i;
            } else if pnt.x < min.x {
                min.x = pnt.x;
                self.min_vtxs[0] = i;
            }
            if pnt.y > max.y {
                max.y = pnt.y;
                self.max_vtxs[1] = i;
            } else if pnt.y < min.y {
                min.y = pnt.y;
                self.min_vtxs[1] = i;
            }
            if pnt.z > max.z {
                max.z = pnt.z;
                self.max_vtxs[2] = i;
            } else if pnt.z < min.z {
                min.z = pnt.z;
                self.min_vtxs[2] = i;
            }
        }
        // the tolerance formula follows qhull: machine precision scaled by
        // the coordinate magnitudes of the input
        if self.explicit_tolerance == Self::AUTOMATIC_TOLERANCE {
            self.tolerance = 3.0
                * DOUBLE_PREC
                * (max.x.abs().max(min.x.abs())
                    + max.y.abs().max(min.y.abs())
                    + max.z.abs().max(min.z.abs()));
        } else {
            self.tolerance = self.explicit_tolerance;
        }
    }

    /// Creates the initial simplex from which the hull will be built
    fn create_initial_simplex(&mut self) -> Result<()> {
        let mut max = 0.0;
        let mut imax = 0;
        for i in 0..3 {
            let diff = self.mesh.verts[self.max_vtxs[i]].pnt.get(i)
                - self.mesh.verts[self.min_vtxs[i]].pnt.get(i);
            if diff > max {
                max = diff;
                imax = i;
            }
        }
        if max <= self.tolerance {
            return Err(ConvexHullError::CoincidentPoints);
        }

        let mut vtx = [0usize; 4];
        // first two vertices: those with the greatest one dimensional
        // separation
        vtx[0] = self.max_vtxs[imax];
        vtx[1] = self.min_vtxs[imax];

        // third vertex: the one farthest from the line through vtx0, vtx1
        let p0 = self.mesh.verts[vtx[0]].pnt;
        let u01 = self.mesh.verts[vtx[1]].pnt.sub(&p0).normalize();
        let mut nrml = Vec3::default();
        let mut max_sqr = 0.0;
        for i in 0..self.num_points() {
            let diff02 = self.mesh.verts[i].pnt.sub(&p0);
            let xprod = u01.cross(&diff02);
            let len_sqr = xprod.norm_squared();
            if len_sqr > max_sqr && i != vtx[0] && i != vtx[1] {
                max_sqr = len_sqr;
                vtx[2] = i;
                nrml = xprod;
            }
        }
        if max_sqr.sqrt() <= 100.0 * self.tolerance {
            return Err(ConvexHullError::ColinearPoints);
        }
        // re-orthogonalize against u01, in case vtx2 is close to the line
        let mut nrml = nrml.normalize();
        nrml = nrml.sub(&u01.scale(nrml.dot(&u01))).normalize();

        // fourth vertex: the one farthest from the plane through the others
        let mut max_dist = 0.0;
        let d0 = self.mesh.verts[vtx[2]].pnt.dot(&nrml);
        for i in 0..self.num_points() {
            let dist = (self.mesh.verts[i].pnt.dot(&nrml) - d0).abs();
            if dist > max_dist && i != vtx[0] && i != vtx[1] && i != vtx[2] {
                max_dist = dist;
                vtx[3] = i;
            }
        }
        if max_dist.abs() <= 100.0 * self.tolerance {
            return Err(ConvexHullError::CoplanarPoints);
        }

        if self.debug {
            log::debug!("initial vertices:");
            for &v in &vtx {
                log::debug!("{}: {}", self.mesh.verts[v].index, self.mesh.verts[v].pnt);
            }
        }

        let mut tris = [0usize; 4];
        if self.mesh.verts[vtx[3]].pnt.dot(&nrml) - d0 < 0.0 {
            tris[0] = self.mesh.create_triangle(vtx[0], vtx[1], vtx[2], 0.0);
            tris[1] = self.mesh.create_triangle(vtx[3], vtx[1], vtx[0], 0.0);
            tris[2] = self.mesh.create_triangle(vtx[3], vtx[2], vtx[1], 0.0);
            tris[3] = self.mesh.create_triangle(vtx[3], vtx[0], vtx[2], 0.0);
            for i in 0..3 {
                let k = (i + 1) % 3;
                let a = self.mesh.get_edge(tris[i + 1], 1);
                let b = self.mesh.get_edge(tris[k + 1], 0);
                self.mesh.set_opposite(a, b);
                let c = self.mesh.get_edge(tris[i + 1], 2);
                let d = self.mesh.get_edge(tris[0], k as i32);
                self.mesh.set_opposite(c, d);
            }
        } else {
            tris[0] = self.mesh.create_triangle(vtx[0], vtx[2], vtx[1], 0.0);
            tris[1] = self.mesh.create_triangle(vtx[3], vtx[0], vtx[1], 0.0);
            tris[2] = self.mesh.create_triangle(vtx[3], vtx[1], vtx[2], 0.0);
            tris[3] = self.mesh.create_triangle(vtx[3], vtx[2], vtx[0], 0.0);
            for i in 0..3 {
                let k = (i + 1) % 3;
                let a = self.mesh.get_edge(tris[i + 1], 0);
                let b = self.mesh.get_edge(tris[k + 1], 1);
                self.mesh.set_opposite(a, b);
                let c = self.mesh.get_edge(tris[i + 1], 2);
                let d = self.mesh.get_edge(tris[0], ((3 - i) % 3) as i32);
                self.mesh.set_opposite(c, d);
            }
        }
        self.faces.extend_from_slice(&tris);

        // claim each remaining point by the face it is furthest above
        for i in 0..self.num_points() {
            if vtx.contains(&i) {
                continue;
            }
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &t in &tris {
                let dist = self.mesh.distance_to_plane(t, &self.mesh.verts[i].pnt);
                if dist > max_dist {
                    max_face = Some(t);
                    max_dist = dist;
                }
            }
            if let Some(face) = max_face {
                self.add_point_to_face(i, face);
            }
        }
        Ok(())
    }

    fn add_point_to_face(&mut self, vtx: usize, face: usize) {
        self.mesh.verts[vtx].face = Some(face);
        match self.mesh.faces[face].outside {
            None => self.claimed.add(&mut self.mesh.verts, vtx),
            Some(outside) => self
                .claimed
                .insert_before(&mut self.mesh.verts, vtx, outside),
        }
        self.mesh.faces[face].outside = Some(vtx);
    }

    fn remove_point_from_face(&mut self, vtx: usize, face: usize) {
        if self.mesh.faces[face].outside == Some(vtx) {
            self.mesh.faces[face].outside = match self.mesh.verts[vtx].next {
                Some(n) if self.mesh.verts[n].face == Some(face) => Some(n),
                _ => None,
            };
        }
        self.claimed.delete(&mut self.mesh.verts, vtx);
    }

    /// Detach a face's whole outside segment from the claimed list and
    /// return the head of the detached chain
    fn remove_all_points_from_face(&mut self, face: usize) -> Option<usize> {
        let head = self.mesh.faces[face].outside?;
        let mut end = head;
        while let Some(n) = self.mesh.verts[end].next {
            if self.mesh.verts[n].face != Some(face) {
                break;
            }
            end = n;
        }
        self.claimed.delete_span(&mut self.mesh.verts, head, end);
        self.mesh.verts[end].next = None;
        Some(head)
    }

    /// Release a doomed face's outside points: into `absorbing` when they
    /// are still above its plane, otherwise into the unclaimed list
    fn delete_face_points(&mut self, face: usize, absorbing: Option<usize>) {
        let Some(head) = self.remove_all_points_from_face(face) else {
            return;
        };
        match absorbing {
            None => self.unclaimed.add_all(&mut self.mesh.verts, head),
            Some(absorbing) => {
                let mut vtx_next = Some(head);
                while let Some(vtx) = vtx_next {
                    vtx_next = self.mesh.verts[vtx].next;
                    let dist = self
                        .mesh
                        .distance_to_plane(absorbing, &self.mesh.verts[vtx].pnt);
                    if dist > self.tolerance {
                        self.add_point_to_face(vtx, absorbing);
                    } else {
                        self.unclaimed.add(&mut self.mesh.verts, vtx);
                    }
                }
            }
        }
    }

    /// The next eye: the claimed point furthest above its face, together
    /// with that face
    fn next_point_to_add(&self) -> Option<(usize, usize)> {
        let first = self.claimed.first()?;
        let eye_face = self.mesh.verts[first].face?;
        let mut eye_vtx = None;
        let mut max_dist = 0.0;
        let mut vtx = self.mesh.faces[eye_face].outside;
        while let Some(v) = vtx {
            if self.mesh.verts[v].face != Some(eye_face) {
                break;
            }
            let dist = self.mesh.distance_to_plane(eye_face, &self.mesh.verts[v].pnt);
            if dist > max_dist {
                max_dist = dist;
                eye_vtx = Some(v);
            }
            vtx = self.mesh.verts[v].next;
        }
        eye_vtx.map(|v| (v, eye_face))
    }

    fn add_point_to_hull(&mut self, eye_vtx: usize, eye_face: usize) -> Result<()> {
        let mut horizon: Vec<usize> = Vec::with_capacity(16);
        self.unclaimed.clear();
        if self.debug {
            log::debug!(
                "adding point {} which is {} above face {}",
                self.mesh.verts[eye_vtx].index,
                self.mesh
                    .distance_to_plane(eye_face, &self.mesh.verts[eye_vtx].pnt),
                self.mesh.face_string(eye_face)
            );
        }
        self.remove_point_from_face(eye_vtx, eye_face);
        let eye_pnt = self.mesh.verts[eye_vtx].pnt;
        self.calculate_horizon(&eye_pnt, eye_face, &mut horizon);
        let new_faces = self.add_new_faces(eye_vtx, &horizon);

        // first merge pass: merge faces which are non-convex as determined
        // by the larger face
        for &face in &new_faces {
            if self.mesh.faces[face].mark == Mark::Visible {
                while self.do_adjacent_merge(face, MergeType::NonConvexWrtLargerFace)? {}
            }
        }
        // second merge pass: merge faces which are non-convex wrt either face
        for &face in &new_faces {
            if self.mesh.faces[face].mark == Mark::NonConvex {
                self.mesh.faces[face].mark = Mark::Visible;
                while self.do_adjacent_merge(face, MergeType::NonConvex)? {}
            }
        }
        self.resolve_unclaimed_points(&new_faces);
        Ok(())
    }

    /// Walk the region of faces visible from the eye, releasing their
    /// outside points and collecting the boundary edges.
    ///
    /// The walk crosses each edge whose neighbor is also visible, following
    /// the ring counter-clockwise from the entry edge, so the horizon comes
    /// out ordered counter-clockwise around the visible region. An explicit
    /// stack replaces recursion; the frame order reproduces the recursive
    /// walk exactly.
    fn calculate_horizon(&mut self, eye_pnt: &Vec3, face: usize, horizon: &mut Vec<usize>) {
        struct Frame {
            /// Entry edge of this face's ring; the walk stops back at it
            edge0: usize,
            /// Next edge of the ring to examine
            cur: usize,
            done: bool,
        }

        self.delete_face_points(face, None);
        self.mesh.faces[face].mark = Mark::Deleted;
        if self.debug {
            log::debug!("  visiting face {}", self.mesh.face_string(face));
        }

        let root = self.mesh.get_edge(face, 0);
        let mut stack = vec![Frame {
            edge0: root,
            cur: root,
            done: false,
        }];
        while let Some(frame) = stack.last_mut() {
            if frame.done {
                stack.pop();
                continue;
            }
            let edge = frame.cur;
            let edge0 = frame.edge0;
            // advance the cursor now; a descent resumes here afterwards
            let next = self.mesh.edges[edge].next;
            if next == edge0 {
                frame.done = true;
            } else {
                frame.cur = next;
            }

            let opp_face = self.mesh.opposite_face(edge);
            if self.mesh.faces[opp_face].mark == Mark::Visible {
                if self.mesh.distance_to_plane(opp_face, eye_pnt) > self.tolerance {
                    // neighbor is visible too: cross into it
                    self.delete_face_points(opp_face, None);
                    self.mesh.faces[opp_face].mark = Mark::Deleted;
                    if self.debug {
                        log::debug!("  visiting face {}", self.mesh.face_string(opp_face));
                    }
                    let child_edge0 = self.mesh.edges[edge].opposite;
                    let child_cur = self.mesh.edges[child_edge0].next;
                    stack.push(Frame {
                        edge0: child_edge0,
                        cur: child_cur,
                        done: false,
                    });
                } else {
                    horizon.push(edge);
                    if self.debug {
                        log::debug!("  adding horizon edge {}", self.mesh.edge_string(edge));
                    }
                }
            }
        }
    }

    /// Erect one triangle of the cone over a horizon edge; returns the new
    /// face's side edge (head at the eye vertex)
    fn add_adjoining_face(&mut self, eye_vtx: usize, he: usize) -> usize {
        let tail = self.mesh.tail(he);
        let head = self.mesh.edges[he].head;
        let face = self.mesh.create_triangle(eye_vtx, tail, head, 0.0);
        self.faces.push(face);

        let he_opp = self.mesh.edges[he].opposite;
        let base = self.mesh.get_edge(face, -1);
        self.mesh.set_opposite(base, he_opp);
        self.mesh.get_edge(face, 0)
    }

    /// Build the cone of new faces over the horizon, stitching consecutive
    /// side edges and closing the loop between first and last
    fn add_new_faces(&mut self, eye_vtx: usize, horizon: &[usize]) -> Vec<usize> {
        let mut new_faces = Vec::with_capacity(horizon.len());
        let mut hedge_side_begin = None;
        let mut hedge_side_prev: Option<usize> = None;
        for &horizon_he in horizon {
            let hedge_side = self.add_adjoining_face(eye_vtx, horizon_he);
            if self.debug {
                log::debug!(
                    "new face: {}",
                    self.mesh.face_string(self.mesh.edges[hedge_side].face)
                );
            }
            match hedge_side_prev {
                Some(prev) => {
                    let next = self.mesh.edges[hedge_side].next;
                    self.mesh.set_opposite(next, prev);
                }
                None => hedge_side_begin = Some(hedge_side),
            }
            new_faces.push(self.mesh.edges[hedge_side].face);
            hedge_side_prev = Some(hedge_side);
        }
        if let (Some(begin), Some(prev)) = (hedge_side_begin, hedge_side_prev) {
            let next = self.mesh.edges[begin].next;
            self.mesh.set_opposite(next, prev);
        }
        new_faces
    }

    /// Try to merge `face` with a neighbor across one of its edges.
    ///
    /// Returns true when a merge happened, in which case the caller re-walks
    /// the face from its anchor edge since the ring has changed.
    fn do_adjacent_merge(&mut self, face: usize, merge_type: MergeType) -> Result<bool> {
        let he0 = self.mesh.faces[face].he0;
        let mut hedge = he0;
        let mut convex = true;
        loop {
            let opp_face = self.mesh.opposite_face(hedge);
            let opposite = self.mesh.edges[hedge].opposite;
            let mut merge = false;
            match merge_type {
                MergeType::NonConvex => {
                    // merge faces if they are definitively non-convex
                    if self.mesh.opp_face_distance(hedge) > -self.tolerance
                        || self.mesh.opp_face_distance(opposite) > -self.tolerance
                    {
                        merge = true;
                    }
                }
                MergeType::NonConvexWrtLargerFace => {
                    // merge faces if they are parallel or non-convex wrt the
                    // larger face; otherwise mark the face non-convex for
                    // the second pass
                    if self.mesh.faces[face].area > self.mesh.faces[opp_face].area {
                        if self.mesh.opp_face_distance(hedge) > -self.tolerance {
                            merge = true;
                        } else if self.mesh.opp_face_distance(opposite) > -self.tolerance {
                            convex = false;
                        }
                    } else if self.mesh.opp_face_distance(opposite) > -self.tolerance {
                        merge = true;
                    } else if self.mesh.opp_face_distance(hedge) > -self.tolerance {
                        convex = false;
                    }
                }
            }
            if merge {
                if self.debug {
                    log::debug!(
                        "  merging {} and {}",
                        self.mesh.face_string(face),
                        self.mesh.face_string(opp_face)
                    );
                }
                let mut discarded = Vec::new();
                self.mesh.merge_adjacent_face(hedge, &mut discarded)?;
                for discarded_face in discarded {
                    self.delete_face_points(discarded_face, Some(face));
                }
                if self.debug {
                    log::debug!("  result: {}", self.mesh.face_string(face));
                }
                return Ok(true);
            }
            hedge = self.mesh.edges[hedge].next;
            if hedge == he0 {
                break;
            }
        }
        if !convex {
            self.mesh.faces[face].mark = Mark::NonConvex;
        }
        Ok(false)
    }

    /// Re-distribute the points orphaned by this iteration over the new
    /// faces; points above no new face are interior now and get dropped
    fn resolve_unclaimed_points(&mut self, new_faces: &[usize]) {
        let mut vtx_next = self.unclaimed.first();
        while let Some(vtx) = vtx_next {
            vtx_next = self.mesh.verts[vtx].next;
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &new_face in new_faces {
                if self.mesh.faces[new_face].mark == Mark::Visible {
                    let dist = self
                        .mesh
                        .distance_to_plane(new_face, &self.mesh.verts[vtx].pnt);
                    if dist > max_dist {
                        max_dist = dist;
                        max_face = Some(new_face);
                    }
                    if max_dist > 1000.0 * self.tolerance {
                        break;
                    }
                }
            }
            match max_face {
                Some(face) => {
                    self.add_point_to_face(vtx, face);
                    if self.debug {
                        log::debug!(
                            "point {} claimed by face {}",
                            self.mesh.verts[vtx].index,
                            self.mesh.face_string(face)
                        );
                    }
                }
                None => {
                    if self.debug {
                        log::debug!("point {} discarded", self.mesh.verts[vtx].index);
                    }
                }
            }
        }
    }

    /// Checks the correctness of the hull using the distance tolerance of
    /// the most recent build.
    ///
    /// Verifies the half-edge invariants of every visible face, that every
    /// edge is convex within tolerance, and that every input point lies
    /// within `10·tol` of the hull. Never fails hard: on the first
    /// violation a one-line diagnostic goes to `diag` (when given) and the
    /// result is false.
    pub fn check(&self, mut diag: Option<&mut dyn fmt::Write>) -> bool {
        let tol = self.tolerance;
        if !self.check_faces(tol, &mut diag) {
            return false;
        }
        // check point inclusion
        let point_tol = 10.0 * tol;
        for vertex in &self.mesh.verts {
            for &face in &self.faces {
                if self.mesh.faces[face].mark == Mark::Visible {
                    let dist = self.mesh.distance_to_plane(face, &vertex.pnt);
                    if dist > point_tol {
                        diag_line(
                            &mut diag,
                            format_args!(
                                "Point {} {} above face {}",
                                vertex.pnt,
                                dist,
                                self.mesh.face_string(face)
                            ),
                        );
                        return false;
                    }
                }
            }
        }
        true
    }

    fn check_faces(&self, tol: f64, diag: &mut Option<&mut dyn fmt::Write>) -> bool {
        for &face in &self.faces {
            if self.mesh.faces[face].mark == Mark::Visible
                && !self.check_face_convexity(face, tol, diag)
            {
                return false;
            }
        }
        true
    }

    fn check_face_convexity(
        &self,
        face: usize,
        tol: f64,
        diag: &mut Option<&mut dyn fmt::Write>,
    ) -> bool {
        if let Err(err) = self.mesh.check_consistency(face) {
            diag_line(diag, format_args!("{err}"));
            return false;
        }
        let he0 = self.mesh.faces[face].he0;
        let mut he = he0;
        loop {
            // make sure edge is convex
            let dist = self.mesh.opp_face_distance(he);
            if dist > tol {
                diag_line(
                    diag,
                    format_args!(
                        "Edge {} non-convex by {}",
                        self.mesh.edge_string(he),
                        dist
                    ),
                );
                return false;
            }
            let opposite = self.mesh.edges[he].opposite;
            let dist = self.mesh.opp_face_distance(opposite);
            if dist > tol {
                diag_line(
                    diag,
                    format_args!(
                        "Opposite edge {} non-convex by {}",
                        self.mesh.edge_string(opposite),
                        dist
                    ),
                );
                return false;
            }
            let next = self.mesh.edges[he].next;
            if self.mesh.opposite_face(next) == self.mesh.opposite_face(he) {
                diag_line(
                    diag,
                    format_args!(
                        "Redundant vertex {} in face {}",
                        self.mesh.verts[self.mesh.edges[he].head].index,
                        self.mesh.face_string(face)
                    ),
                );
                return false;
            }
            he = next;
            if he == he0 {
                break;
            }
        }
        true
    }
}

fn diag_line(diag: &mut Option<&mut dyn fmt::Write>, args: fmt::Arguments<'_>) {
    if let Some(w) = diag.as_deref_mut() {
        let _ = w.write_fmt(args);
        let _ = w.write_char('\n');
    }
}
