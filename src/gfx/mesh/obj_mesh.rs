//! Wavefront OBJ mesh parsing and preparation
//!
//! Parses the line-oriented OBJ text format into indexed attribute lists,
//! normalizes meshes to a consistent in-scene size, and flattens faces into
//! dense per-triangle vertex streams ready for GPU upload.

use thiserror::Error;

/// Errors raised while preparing mesh geometry
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Mesh has no vertices to normalize.")]
    NoVertices,
}

/// Axis-aligned bounding box over a mesh's positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// One polygon face as parsed: indices into the mesh attribute lists.
///
/// `tex_coords`/`normals` stay empty when the face carried no `vt`/`vn`
/// indices; otherwise they run parallel to `positions`.
#[derive(Debug, Default, Clone)]
struct Face {
    positions: Vec<usize>,
    tex_coords: Vec<usize>,
    normals: Vec<usize>,
}

/// Flattened, non-indexed vertex streams for one mesh
///
/// Positions are always present (possibly empty); texture coordinates and
/// normals are `None` when the faces never supplied them, so the renderer can
/// skip binding attributes the mesh does not have.
#[derive(Debug, Clone)]
pub struct VertexBuffers {
    /// 3 floats per vertex
    pub positions: Vec<f32>,
    /// 2 floats per vertex
    pub tex_coords: Option<Vec<f32>>,
    /// 3 floats per vertex
    pub normals: Option<Vec<f32>>,
}

impl VertexBuffers {
    /// Number of triangle vertices in the position stream
    pub fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }
}

/// An indexed polygon mesh loaded from OBJ text
#[derive(Debug, Default, Clone)]
pub struct ObjMesh {
    /// Vertex positions (`v` lines)
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates (`vt` lines)
    pub tex_coords: Vec<[f32; 2]>,
    /// Surface normals (`vn` lines)
    pub normals: Vec<[f32; 3]>,
    faces: Vec<Face>,
}

impl ObjMesh {
    /// Parse OBJ text into an indexed mesh
    ///
    /// Recognizes `v`, `vt`, `vn` and `f` lines; everything else (comments,
    /// groups, material statements) is ignored. Face lines hold
    /// whitespace-separated `pos[/tex][/norm]` index groups. Indices are
    /// 1-based; negative indices count back from the end of the list *as it
    /// stands when the face line is read*, not from the final totals.
    /// Malformed lines are dropped silently.
    pub fn parse(text: &str) -> Self {
        let mut mesh = ObjMesh::default();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(marker) = tokens.next() else {
                continue;
            };
            match marker {
                "v" => {
                    if let Some(p) = parse_floats_3(&mut tokens) {
                        mesh.positions.push(p);
                    }
                }
                "vt" => {
                    if let Some(t) = parse_floats_2(&mut tokens) {
                        mesh.tex_coords.push(t);
                    }
                }
                "vn" => {
                    if let Some(n) = parse_floats_3(&mut tokens) {
                        mesh.normals.push(n);
                    }
                }
                "f" => {
                    if let Some(face) = mesh.parse_face(tokens) {
                        mesh.faces.push(face);
                    }
                }
                _ => {}
            }
        }

        mesh
    }

    /// Parse one face line's index groups against the current list lengths
    fn parse_face<'a>(&self, groups: impl Iterator<Item = &'a str>) -> Option<Face> {
        let mut face = Face::default();

        for group in groups {
            let mut ids = group.split('/');

            let pos = resolve_index(ids.next()?, self.positions.len())?;
            face.positions.push(pos);

            match ids.next() {
                Some("") | None => {}
                Some(t) => face.tex_coords.push(resolve_index(t, self.tex_coords.len())?),
            }
            match ids.next() {
                Some("") | None => {}
                Some(n) => face.normals.push(resolve_index(n, self.normals.len())?),
            }
        }

        Some(face)
    }

    /// Axis-aligned bounding box, or `None` when no positions were loaded
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.positions.first()?;
        let mut min = *first;
        let mut max = *first;

        for p in &self.positions[1..] {
            for j in 0..3 {
                min[j] = min[j].min(p[j]);
                max[j] = max[j].max(p[j]);
            }
        }

        Some(BoundingBox { min, max })
    }

    /// Center the mesh on `center` and scale it uniformly so its largest
    /// dimension equals `scale`
    ///
    /// Keeps loaded furniture visually consistent regardless of the units the
    /// source file was modeled in.
    pub fn shift_and_scale(&mut self, center: [f32; 3], scale: f32) -> Result<(), MeshError> {
        let bbox = self.bounding_box().ok_or(MeshError::NoVertices)?;

        let size = [
            bbox.max[0] - bbox.min[0],
            bbox.max[1] - bbox.min[1],
            bbox.max[2] - bbox.min[2],
        ];
        let max_dim = size[0].max(size[1]).max(size[2]);
        let scale_factor = scale / max_dim;

        for p in &mut self.positions {
            for j in 0..3 {
                p[j] = (p[j] - (bbox.min[j] + bbox.max[j]) / 2.0) * scale_factor + center[j];
            }
        }

        Ok(())
    }

    /// Flatten faces into dense per-triangle vertex streams
    ///
    /// Each n-gon is fan-triangulated: (0,1,2), then (0,j-1,j) for every
    /// further vertex j. Faces with fewer than three vertices are skipped, as
    /// are faces whose indices fall outside the attribute lists. A texcoord or
    /// normal stream is only emitted when every usable face supplies the
    /// attribute for all of its vertices, so the streams stay parallel.
    pub fn vertex_buffers(&self) -> VertexBuffers {
        let usable: Vec<&Face> = self
            .faces
            .iter()
            .filter(|f| f.positions.len() >= 3)
            .collect();

        let emit_tex = !usable.is_empty()
            && usable
                .iter()
                .all(|f| f.tex_coords.len() == f.positions.len());
        let emit_norm = !usable.is_empty()
            && usable.iter().all(|f| f.normals.len() == f.positions.len());

        let mut positions = Vec::new();
        let mut tex_coords = Vec::new();
        let mut normals = Vec::new();

        for face in usable {
            if !self.face_in_range(face, emit_tex, emit_norm) {
                continue;
            }

            for j in 2..face.positions.len() {
                for corner in [0, j - 1, j] {
                    positions.extend_from_slice(&self.positions[face.positions[corner]]);
                    if emit_tex {
                        tex_coords.extend_from_slice(&self.tex_coords[face.tex_coords[corner]]);
                    }
                    if emit_norm {
                        normals.extend_from_slice(&self.normals[face.normals[corner]]);
                    }
                }
            }
        }

        VertexBuffers {
            positions,
            tex_coords: if emit_tex && !tex_coords.is_empty() {
                Some(tex_coords)
            } else {
                None
            },
            normals: if emit_norm && !normals.is_empty() {
                Some(normals)
            } else {
                None
            },
        }
    }

    /// True when every index the face will dereference is in range
    fn face_in_range(&self, face: &Face, check_tex: bool, check_norm: bool) -> bool {
        face.positions.iter().all(|&i| i < self.positions.len())
            && (!check_tex || face.tex_coords.iter().all(|&i| i < self.tex_coords.len()))
            && (!check_norm || face.normals.iter().all(|&i| i < self.normals.len()))
    }
}

/// Resolve a 1-based (possibly negative) OBJ index against the current list
/// length, yielding a 0-based index
fn resolve_index(token: &str, current_len: usize) -> Option<usize> {
    let idx: i64 = token.parse().ok()?;
    let resolved = if idx < 0 {
        current_len as i64 + idx
    } else {
        idx - 1
    };
    if resolved < 0 {
        None
    } else {
        Some(resolved as usize)
    }
}

fn parse_floats_3<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    Some([
        tokens.next()?.parse().ok()?,
        tokens.next()?.parse().ok()?,
        tokens.next()?.parse().ok()?,
    ])
}

fn parse_floats_2<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 2]> {
    Some([tokens.next()?.parse().ok()?, tokens.next()?.parse().ok()?])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";

    #[test]
    fn test_parse_counts() {
        let text = "\
# a comment
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vn 0 0 1
g ignored
f 1/1/1 2/2/1 3/1/1 4/2/1
";
        let mesh = ObjMesh::parse(text);
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.tex_coords.len(), 2);
        assert_eq!(mesh.normals.len(), 1);
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn test_fan_triangulation_emits_n_minus_2_triangles() {
        let text = "\
v 0 0 0
v 1 0 0
v 2 1 0
v 1 2 0
v 0 2 0
f 1 2 3 4 5
";
        let mesh = ObjMesh::parse(text);
        let buffers = mesh.vertex_buffers();

        // 5-gon -> 3 triangles -> 9 vertices
        assert_eq!(buffers.vertex_count(), 9);

        // fan pattern: (0,1,2), (0,2,3), (0,3,4)
        let v = &buffers.positions;
        let vertex = |i: usize| [v[i * 3], v[i * 3 + 1], v[i * 3 + 2]];
        assert_eq!(vertex(0), [0.0, 0.0, 0.0]);
        assert_eq!(vertex(1), [1.0, 0.0, 0.0]);
        assert_eq!(vertex(2), [2.0, 1.0, 0.0]);
        assert_eq!(vertex(3), [0.0, 0.0, 0.0]);
        assert_eq!(vertex(4), [2.0, 1.0, 0.0]);
        assert_eq!(vertex(5), [1.0, 2.0, 0.0]);
        assert_eq!(vertex(6), [0.0, 0.0, 0.0]);
        assert_eq!(vertex(7), [1.0, 2.0, 0.0]);
        assert_eq!(vertex(8), [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_negative_indices_resolve_against_current_list() {
        // -1 must refer to the last position parsed *before* the face line,
        // not the last position in the finished file
        let text = "\
v 0 0 0
v 1 0 0
v 2 0 0
f 1 2 -1
v 9 9 9
";
        let mesh = ObjMesh::parse(text);
        let buffers = mesh.vertex_buffers();
        assert_eq!(buffers.vertex_count(), 3);
        assert_eq!(&buffers.positions[6..9], &[2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bounding_box_of_empty_mesh_is_none() {
        let mesh = ObjMesh::parse("# nothing here\n");
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_bounding_box_spans_all_positions() {
        let mesh = ObjMesh::parse("v -1 2 0\nv 3 -4 1\nv 0 0 5\n");
        let bbox = mesh.bounding_box().unwrap();
        assert_eq!(bbox.min, [-1.0, -4.0, 0.0]);
        assert_eq!(bbox.max, [3.0, 2.0, 5.0]);
    }

    #[test]
    fn test_shift_and_scale_centers_and_resizes() {
        let text = "\
v 0 0 0
v 4 2 0
v 0 2 2
";
        let mut mesh = ObjMesh::parse(text);
        mesh.shift_and_scale([1.0, 2.0, 3.0], 2.0).unwrap();

        let bbox = mesh.bounding_box().unwrap();
        let center = [
            (bbox.min[0] + bbox.max[0]) / 2.0,
            (bbox.min[1] + bbox.max[1]) / 2.0,
            (bbox.min[2] + bbox.max[2]) / 2.0,
        ];
        let size = [
            bbox.max[0] - bbox.min[0],
            bbox.max[1] - bbox.min[1],
            bbox.max[2] - bbox.min[2],
        ];
        let max_dim = size[0].max(size[1]).max(size[2]);

        assert!((center[0] - 1.0).abs() < 1e-6);
        assert!((center[1] - 2.0).abs() < 1e-6);
        assert!((center[2] - 3.0).abs() < 1e-6);
        assert!((max_dim - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_shift_and_scale_fails_on_empty_mesh() {
        let mut mesh = ObjMesh::default();
        let err = mesh.shift_and_scale([0.0; 3], 1.0).unwrap_err();
        assert_eq!(err.to_string(), "Mesh has no vertices to normalize.");
    }

    #[test]
    fn test_shift_and_scale_normalizes_random_clouds() {
        use rand::Rng;

        let mut rng = rand::rng();
        for _ in 0..20 {
            let mut mesh = ObjMesh::default();
            for _ in 0..50 {
                mesh.positions.push([
                    (rng.random::<f32>() - 0.5) * 200.0,
                    (rng.random::<f32>() - 0.5) * 200.0,
                    (rng.random::<f32>() - 0.5) * 200.0,
                ]);
            }
            mesh.shift_and_scale([0.0; 3], 1.0).unwrap();

            let bbox = mesh.bounding_box().unwrap();
            let mut max_dim: f32 = 0.0;
            for j in 0..3 {
                assert!((bbox.min[j] + bbox.max[j]).abs() < 1e-3);
                max_dim = max_dim.max(bbox.max[j] - bbox.min[j]);
            }
            assert!((max_dim - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_degenerate_faces_are_dropped() {
        let text = "\
v 0 0 0
v 1 0 0
f 1 2
";
        let mesh = ObjMesh::parse(text);
        let buffers = mesh.vertex_buffers();
        assert_eq!(buffers.vertex_count(), 0);
    }

    #[test]
    fn test_missing_attributes_yield_no_streams() {
        let mesh = ObjMesh::parse(TRIANGLE);
        let buffers = mesh.vertex_buffers();
        assert_eq!(buffers.vertex_count(), 3);
        assert!(buffers.tex_coords.is_none());
        assert!(buffers.normals.is_none());
    }

    #[test]
    fn test_partial_texcoords_drop_the_stream() {
        // second face has no vt indices, so a parallel texcoord stream
        // cannot be built
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
f 2 4 3
";
        let mesh = ObjMesh::parse(text);
        let buffers = mesh.vertex_buffers();
        assert_eq!(buffers.vertex_count(), 6);
        assert!(buffers.tex_coords.is_none());
    }

    #[test]
    fn test_out_of_range_face_is_skipped() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
f 1 2 9
";
        let mesh = ObjMesh::parse(text);
        let buffers = mesh.vertex_buffers();
        assert_eq!(buffers.vertex_count(), 3);
    }

    #[test]
    fn test_separate_texcoord_and_normal_indices() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
";
        let mesh = ObjMesh::parse(text);
        let buffers = mesh.vertex_buffers();
        assert_eq!(buffers.vertex_count(), 3);
        assert_eq!(buffers.tex_coords.as_ref().map(|t| t.len()), Some(6));
        assert_eq!(buffers.normals.as_ref().map(|n| n.len()), Some(9));
        assert_eq!(&buffers.normals.unwrap()[0..3], &[0.0, 0.0, 1.0]);
    }
}
