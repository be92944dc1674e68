//! Half-edge mesh for the evolving hull
//!
//! The mesh owns three id-indexed arenas (vertices, half-edges, faces);
//! `next`/`prev`/`opposite`/`face` are indices into them, which keeps the
//! cyclic pointer graph free of ownership cycles. Faces are deleted by
//! mark only; the driver filters them out at the end of the build.

use crate::types::Vec3;
use crate::{ConvexHullError, Result};

/// Sentinel for a half-edge slot that is transiently unpaired.
pub(crate) const INVALID: usize = usize::MAX;

/// Face state during hull construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    Visible,
    NonConvex,
    Deleted,
}

/// A vertex of the hull, as well as an input point it was formed from.
///
/// `prev`/`next` thread the vertex through whichever claim list currently
/// holds it; `face` is the face that claims it as an outside point.
#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub pnt: Vec3,
    /// Back index into the original input
    pub index: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    pub face: Option<usize>,
}

/// One of the half-edges that surround each face in counter-clockwise
/// order. The edge points to its `head` vertex; the tail is `prev`'s head.
#[derive(Debug, Clone)]
pub(crate) struct HalfEdge {
    /// Head vertex id
    pub head: usize,
    /// Face to the left of this half-edge
    pub face: usize,
    /// Next edge counter-clockwise around `face`
    pub next: usize,
    /// Previous edge (clockwise) around `face`
    pub prev: usize,
    /// Paired half-edge on the adjacent face; INVALID while unpaired
    pub opposite: usize,
}

/// A face of the evolving hull: its anchor edge plus cached plane data.
#[derive(Debug, Clone)]
pub(crate) struct Face {
    pub he0: usize,
    pub normal: Vec3,
    pub centroid: Vec3,
    pub area: f64,
    pub plane_offset: f64,
    pub num_verts: usize,
    pub mark: Mark,
    /// First vertex of this face's outside segment in the claimed list
    pub outside: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct Mesh {
    pub verts: Vec<Vertex>,
    pub edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, index: usize, pnt: Vec3) -> usize {
        self.verts.push(Vertex {
            pnt,
            index,
            prev: None,
            next: None,
            face: None,
        });
        self.verts.len() - 1
    }

    /// Tail vertex of a half-edge
    pub fn tail(&self, he: usize) -> usize {
        self.edges[self.edges[he].prev].head
    }

    /// Face on the other side of a half-edge
    pub fn opposite_face(&self, he: usize) -> usize {
        self.edges[self.edges[he].opposite].face
    }

    /// Pair two half-edges across their shared undirected edge
    pub fn set_opposite(&mut self, he: usize, opp: usize) {
        self.edges[he].opposite = opp;
        self.edges[opp].opposite = he;
    }

    pub fn edge_length_squared(&self, he: usize) -> f64 {
        let head = &self.verts[self.edges[he].head].pnt;
        let tail = &self.verts[self.tail(he)].pnt;
        head.distance_squared(tail)
    }

    /// Identify a half-edge by the input indices of its tail and head,
    /// for diagnostics
    pub fn edge_string(&self, he: usize) -> String {
        format!(
            "{}-{}",
            self.verts[self.tail(he)].index,
            self.verts[self.edges[he].head].index
        )
    }

    /// Identify a face by its vertex indices, for diagnostics
    pub fn face_string(&self, face: usize) -> String {
        let indices: Vec<String> = self
            .face_indices(face)
            .iter()
            .map(|i| i.to_string())
            .collect();
        indices.join("-")
    }

    /// Collect the input indices around a face, counter-clockwise from its
    /// anchor edge
    pub fn face_indices(&self, face: usize) -> Vec<usize> {
        let he0 = self.faces[face].he0;
        let mut indices = Vec::with_capacity(self.faces[face].num_verts);
        let mut he = he0;
        loop {
            indices.push(self.verts[self.edges[he].head].index);
            he = self.edges[he].next;
            if he == he0 {
                break;
            }
        }
        indices
    }

    /// Walk from the anchor edge: non-negative `i` advances forward,
    /// negative `i` walks backward (so -1 is the anchor's predecessor)
    pub fn get_edge(&self, face: usize, mut i: i32) -> usize {
        let mut he = self.faces[face].he0;
        while i > 0 {
            he = self.edges[he].next;
            i -= 1;
        }
        while i < 0 {
            he = self.edges[he].prev;
            i += 1;
        }
        he
    }

    /// Build a triangular face over three vertices, wiring its edge ring.
    ///
    /// A positive `min_area` enables the thin-face normal stabilization of
    /// `compute_normal_and_centroid`.
    pub fn create_triangle(&mut self, v0: usize, v1: usize, v2: usize, min_area: f64) -> usize {
        let face = self.faces.len();
        self.faces.push(Face {
            he0: INVALID,
            normal: Vec3::default(),
            centroid: Vec3::default(),
            area: 0.0,
            plane_offset: 0.0,
            num_verts: 0,
            mark: Mark::Visible,
            outside: None,
        });

        let base = self.edges.len();
        let (he0, he1, he2) = (base, base + 1, base + 2);
        for (v, prev, next) in [(v0, he2, he1), (v1, he0, he2), (v2, he1, he0)] {
            self.edges.push(HalfEdge {
                head: v,
                face,
                next,
                prev,
                opposite: INVALID,
            });
        }
        self.faces[face].he0 = he0;
        self.compute_normal_and_centroid(face, min_area);
        face
    }

    /// Signed distance from a point to the face plane; positive is outside
    pub fn distance_to_plane(&self, face: usize, p: &Vec3) -> f64 {
        self.faces[face].normal.dot(p) - self.faces[face].plane_offset
    }

    /// Perpendicular distance from the neighbor's centroid to this edge's
    /// face plane. Clearly negative means the edge is convex.
    pub fn opp_face_distance(&self, he: usize) -> f64 {
        let opp_centroid = self.faces[self.opposite_face(he)].centroid;
        self.distance_to_plane(self.edges[he].face, &opp_centroid)
    }

    fn compute_normal(&mut self, face: usize, min_area: f64) {
        let he0 = self.faces[face].he0;
        let he1 = self.edges[he0].next;
        let mut he2 = self.edges[he1].next;

        let p0 = self.verts[self.edges[he0].head].pnt;
        let mut d2 = self.verts[self.edges[he1].head].pnt.sub(&p0);
        let mut normal = Vec3::default();
        let mut num_verts = 2;

        // running sum of fan-triangle cross products from the anchor vertex
        while he2 != he0 {
            let d1 = d2;
            d2 = self.verts[self.edges[he2].head].pnt.sub(&p0);
            normal = normal.add(&d1.cross(&d2));
            he2 = self.edges[he2].next;
            num_verts += 1;
        }

        let cross_norm = normal.norm();
        self.faces[face].num_verts = num_verts;
        self.faces[face].area = cross_norm / 2.0;
        self.faces[face].normal = normal.scale(1.0 / cross_norm);

        if self.faces[face].area < min_area {
            // thin face: the normal is dominated by rounding error along the
            // longest edge, so remove the component parallel to it
            let mut hedge_max = he0;
            let mut len_sqr_max = 0.0;
            let mut hedge = he0;
            loop {
                let len_sqr = self.edge_length_squared(hedge);
                if len_sqr > len_sqr_max {
                    hedge_max = hedge;
                    len_sqr_max = len_sqr;
                }
                hedge = self.edges[hedge].next;
                if hedge == he0 {
                    break;
                }
            }

            let p2 = self.verts[self.edges[hedge_max].head].pnt;
            let p1 = self.verts[self.tail(hedge_max)].pnt;
            let u = p2.sub(&p1).scale(1.0 / len_sqr_max.sqrt());
            let dot = self.faces[face].normal.dot(&u);
            let adjusted = self.faces[face].normal.sub(&u.scale(dot));
            self.faces[face].normal = adjusted.normalize();
        }
    }

    fn compute_centroid(&self, face: usize) -> Vec3 {
        let he0 = self.faces[face].he0;
        let mut centroid = Vec3::default();
        let mut he = he0;
        loop {
            centroid = centroid.add(&self.verts[self.edges[he].head].pnt);
            he = self.edges[he].next;
            if he == he0 {
                break;
            }
        }
        centroid.scale(1.0 / self.faces[face].num_verts as f64)
    }

    pub fn compute_normal_and_centroid(&mut self, face: usize, min_area: f64) {
        self.compute_normal(face, min_area);
        let centroid = self.compute_centroid(face);
        self.faces[face].centroid = centroid;
        self.faces[face].plane_offset = self.faces[face].normal.dot(&centroid);
    }

    /// Absorb the face across `hedge_adj` into `hedge_adj`'s face.
    ///
    /// Splices the two edge rings into one polygonal ring, then removes any
    /// redundant vertices the splice produced (a vertex whose two incident
    /// edges share the same opposite face), which may absorb further faces.
    /// Every absorbed face is marked DELETED and pushed onto `discarded`.
    pub fn merge_adjacent_face(
        &mut self,
        hedge_adj: usize,
        discarded: &mut Vec<usize>,
    ) -> Result<()> {
        let face = self.edges[hedge_adj].face;
        let min_area = self.faces[face].area;

        let hedge_opp = self.edges[hedge_adj].opposite;
        let opp_face = self.edges[hedge_opp].face;
        discarded.push(opp_face);
        self.faces[opp_face].mark = Mark::Deleted;

        let mut hedge_adj_prev = self.edges[hedge_adj].prev;
        let mut hedge_adj_next = self.edges[hedge_adj].next;
        let mut hedge_opp_prev = self.edges[hedge_opp].prev;
        let mut hedge_opp_next = self.edges[hedge_opp].next;

        // widen the shared run: the faces may already share more than one edge
        while self.opposite_face(hedge_adj_prev) == opp_face {
            hedge_adj_prev = self.edges[hedge_adj_prev].prev;
            hedge_opp_next = self.edges[hedge_opp_next].next;
        }
        while self.opposite_face(hedge_adj_next) == opp_face {
            hedge_opp_prev = self.edges[hedge_opp_prev].prev;
            hedge_adj_next = self.edges[hedge_adj_next].next;
        }

        let stop = self.edges[hedge_opp_prev].next;
        let mut hedge = hedge_opp_next;
        while hedge != stop {
            self.edges[hedge].face = face;
            hedge = self.edges[hedge].next;
        }

        if hedge_adj == self.faces[face].he0 {
            self.faces[face].he0 = hedge_adj_next;
        }

        // handle the half edges at the head
        if let Some(df) = self.connect_half_edges(face, hedge_opp_prev, hedge_adj_next) {
            discarded.push(df);
        }
        // handle the half edges at the tail
        if let Some(df) = self.connect_half_edges(face, hedge_adj_prev, hedge_opp_next) {
            discarded.push(df);
        }

        self.compute_normal_and_centroid(face, min_area);
        self.check_consistency(face)?;
        Ok(())
    }

    /// Join two runs of the merged ring. When the junction vertex is
    /// redundant, splice past it; a triangular neighbor collapses entirely
    /// and is returned for deletion.
    fn connect_half_edges(&mut self, face: usize, hedge_prev: usize, hedge: usize) -> Option<usize> {
        let mut discarded_face = None;

        if self.opposite_face(hedge_prev) == self.opposite_face(hedge) {
            // redundant vertex between hedge_prev and hedge
            let opp_face = self.opposite_face(hedge);
            let hedge_opp;

            if hedge_prev == self.faces[face].he0 {
                self.faces[face].he0 = hedge;
            }
            if self.faces[opp_face].num_verts == 3 {
                // the neighbor drops to two edges and disappears
                hedge_opp = self.edges[self.edges[self.edges[hedge].opposite].prev].opposite;
                self.faces[opp_face].mark = Mark::Deleted;
                discarded_face = Some(opp_face);
            } else {
                hedge_opp = self.edges[self.edges[hedge].opposite].next;
                if self.faces[opp_face].he0 == self.edges[hedge_opp].prev {
                    self.faces[opp_face].he0 = hedge_opp;
                }
                let new_prev = self.edges[self.edges[hedge_opp].prev].prev;
                self.edges[hedge_opp].prev = new_prev;
                self.edges[new_prev].next = hedge_opp;
            }

            let hp_prev = self.edges[hedge_prev].prev;
            self.edges[hedge].prev = hp_prev;
            self.edges[hp_prev].next = hedge;
            self.set_opposite(hedge, hedge_opp);

            // opp_face's ring changed, so its cached plane is stale
            self.compute_normal_and_centroid(opp_face, 0.0);
        } else {
            self.edges[hedge_prev].next = hedge;
            self.edges[hedge].prev = hedge_prev;
        }
        discarded_face
    }

    /// Verify the ring invariants of one face
    pub fn check_consistency(&self, face: usize) -> Result<()> {
        let topology = |msg: String| Err(ConvexHullError::Topology(msg));

        if self.faces[face].num_verts < 3 {
            return topology(format!("degenerate face: {}", self.face_string(face)));
        }
        let he0 = self.faces[face].he0;
        let mut hedge = he0;
        let mut num_verts = 0;
        loop {
            let hedge_opp = self.edges[hedge].opposite;
            if hedge_opp == INVALID {
                return topology(format!(
                    "face {}: unreflected half edge {}",
                    self.face_string(face),
                    self.edge_string(hedge)
                ));
            }
            if self.edges[hedge_opp].opposite != hedge {
                return topology(format!(
                    "face {}: half edge {} not paired back by its opposite {}",
                    self.face_string(face),
                    self.edge_string(hedge),
                    self.edge_string(hedge_opp)
                ));
            }
            if self.edges[hedge_opp].head != self.tail(hedge)
                || self.edges[hedge].head != self.tail(hedge_opp)
            {
                return topology(format!(
                    "face {}: half edge {} reflected by {}",
                    self.face_string(face),
                    self.edge_string(hedge),
                    self.edge_string(hedge_opp)
                ));
            }
            let opp_face = self.edges[hedge_opp].face;
            if opp_face == face {
                return topology(format!(
                    "face {}: opposite face of half edge {} is itself",
                    self.face_string(face),
                    self.edge_string(hedge)
                ));
            }
            if self.faces[opp_face].mark == Mark::Deleted {
                return topology(format!(
                    "face {}: opposite face {} not on hull",
                    self.face_string(face),
                    self.face_string(opp_face)
                ));
            }
            if self.edges[self.edges[hedge].next].prev != hedge
                || self.edges[self.edges[hedge].prev].next != hedge
            {
                return topology(format!(
                    "face {}: half edge {} has broken next/prev links",
                    self.face_string(face),
                    self.edge_string(hedge)
                ));
            }
            num_verts += 1;
            hedge = self.edges[hedge].next;
            if hedge == he0 {
                break;
            }
        }
        if num_verts != self.faces[face].num_verts {
            return topology(format!(
                "face {}: ring has {} edges but numVerts is {}",
                self.face_string(face),
                num_verts,
                self.faces[face].num_verts
            ));
        }
        Ok(())
    }
}

/// A doubly-linked list of vertices threaded through the vertex arena's
/// `prev`/`next` fields. The claimed list keeps each face's outside points
/// contiguous; the unclaimed list has no grouping.
#[derive(Debug, Default)]
pub(crate) struct VertexList {
    head: Option<usize>,
    tail: Option<usize>,
}

impl VertexList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.head = None;
        self.tail = None;
    }

    pub fn first(&self) -> Option<usize> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Append a vertex at the tail
    pub fn add(&mut self, verts: &mut [Vertex], vtx: usize) {
        match self.tail {
            None => self.head = Some(vtx),
            Some(t) => verts[t].next = Some(vtx),
        }
        verts[vtx].prev = self.tail;
        verts[vtx].next = None;
        self.tail = Some(vtx);
    }

    /// Splice an external chain (starting at `vtx`) onto the tail
    pub fn add_all(&mut self, verts: &mut [Vertex], vtx: usize) {
        match self.tail {
            None => self.head = Some(vtx),
            Some(t) => verts[t].next = Some(vtx),
        }
        verts[vtx].prev = self.tail;
        let mut last = vtx;
        while let Some(nxt) = verts[last].next {
            last = nxt;
        }
        self.tail = Some(last);
    }

    /// Insert `vtx` immediately before `next`
    pub fn insert_before(&mut self, verts: &mut [Vertex], vtx: usize, next: usize) {
        verts[vtx].prev = verts[next].prev;
        match verts[next].prev {
            None => self.head = Some(vtx),
            Some(p) => verts[p].next = Some(vtx),
        }
        verts[vtx].next = Some(next);
        verts[next].prev = Some(vtx);
    }

    /// Unlink one vertex
    pub fn delete(&mut self, verts: &mut [Vertex], vtx: usize) {
        match verts[vtx].prev {
            None => self.head = verts[vtx].next,
            Some(p) => verts[p].next = verts[vtx].next,
        }
        match verts[vtx].next {
            None => self.tail = verts[vtx].prev,
            Some(n) => verts[n].prev = verts[vtx].prev,
        }
    }

    /// Unlink the inclusive contiguous segment from `vtx1` to `vtx2`
    pub fn delete_span(&mut self, verts: &mut [Vertex], vtx1: usize, vtx2: usize) {
        match verts[vtx1].prev {
            None => self.head = verts[vtx2].next,
            Some(p) => verts[p].next = verts[vtx2].next,
        }
        match verts[vtx2].next {
            None => self.tail = verts[vtx1].prev,
            Some(n) => verts[n].prev = verts[vtx1].prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with_points(points: &[Vec3]) -> Mesh {
        let mut mesh = Mesh::new();
        for (i, p) in points.iter().enumerate() {
            mesh.add_vertex(i, *p);
        }
        mesh
    }

    #[test]
    fn test_create_triangle_plane() {
        let mut mesh = mesh_with_points(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ]);
        let f = mesh.create_triangle(0, 1, 2, 0.0);

        assert_eq!(mesh.faces[f].num_verts, 3);
        assert!((mesh.faces[f].area - 2.0).abs() < 1e-12);
        let n = mesh.faces[f].normal;
        assert!((n.z - 1.0).abs() < 1e-12);
        assert!((mesh.distance_to_plane(f, &Vec3::new(0.5, 0.5, 3.0)) - 3.0).abs() < 1e-12);
        assert!(mesh.distance_to_plane(f, &Vec3::new(0.5, 0.5, -1.0)) < 0.0);
        assert_eq!(mesh.face_indices(f), vec![0, 1, 2]);
    }

    #[test]
    fn test_get_edge_signed_indexing() {
        let mut mesh = mesh_with_points(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let f = mesh.create_triangle(0, 1, 2, 0.0);
        let he0 = mesh.faces[f].he0;

        assert_eq!(mesh.get_edge(f, 0), he0);
        assert_eq!(mesh.get_edge(f, 3), he0);
        assert_eq!(mesh.get_edge(f, -1), mesh.edges[he0].prev);
        assert_eq!(mesh.get_edge(f, -3), he0);
        assert_eq!(mesh.get_edge(f, 1), mesh.edges[he0].next);
    }

    #[test]
    fn test_ring_closure() {
        let mut mesh = mesh_with_points(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let f = mesh.create_triangle(0, 1, 2, 0.0);
        let he0 = mesh.faces[f].he0;
        let mut he = he0;
        for _ in 0..3 {
            assert_eq!(mesh.edges[mesh.edges[he].next].prev, he);
            assert_eq!(mesh.edges[mesh.edges[he].prev].next, he);
            assert_ne!(mesh.edges[he].head, mesh.tail(he));
            he = mesh.edges[he].next;
        }
        assert_eq!(he, he0);
    }

    #[test]
    fn test_vertex_list_add_and_delete() {
        let mut mesh = mesh_with_points(&[Vec3::default(); 5]);
        let mut list = VertexList::new();
        assert!(list.is_empty());

        for v in 0..4 {
            list.add(&mut mesh.verts, v);
        }
        assert_eq!(list.first(), Some(0));
        assert_eq!(mesh.verts[0].next, Some(1));
        assert_eq!(mesh.verts[3].next, None);

        list.delete(&mut mesh.verts, 0);
        assert_eq!(list.first(), Some(1));
        assert_eq!(mesh.verts[1].prev, None);

        list.delete_span(&mut mesh.verts, 2, 3);
        assert_eq!(mesh.verts[1].next, None);
        assert_eq!(list.first(), Some(1));

        list.delete(&mut mesh.verts, 1);
        assert!(list.is_empty());
    }

    #[test]
    fn test_vertex_list_insert_before() {
        let mut mesh = mesh_with_points(&[Vec3::default(); 4]);
        let mut list = VertexList::new();
        list.add(&mut mesh.verts, 0);
        list.add(&mut mesh.verts, 1);

        list.insert_before(&mut mesh.verts, 2, 0);
        assert_eq!(list.first(), Some(2));
        assert_eq!(mesh.verts[2].next, Some(0));

        list.insert_before(&mut mesh.verts, 3, 1);
        assert_eq!(mesh.verts[0].next, Some(3));
        assert_eq!(mesh.verts[3].next, Some(1));
        assert_eq!(mesh.verts[1].prev, Some(3));
    }

    #[test]
    fn test_vertex_list_add_all_chain() {
        let mut mesh = mesh_with_points(&[Vec3::default(); 5]);
        let mut list = VertexList::new();
        list.add(&mut mesh.verts, 0);

        // detached chain 2 -> 3 -> 4
        mesh.verts[2].next = Some(3);
        mesh.verts[3].prev = Some(2);
        mesh.verts[3].next = Some(4);
        mesh.verts[4].prev = Some(3);
        mesh.verts[4].next = None;

        list.add_all(&mut mesh.verts, 2);
        assert_eq!(mesh.verts[0].next, Some(2));
        assert_eq!(mesh.verts[2].prev, Some(0));

        // tail must now be the end of the spliced chain
        list.add(&mut mesh.verts, 1);
        assert_eq!(mesh.verts[4].next, Some(1));
    }
}
