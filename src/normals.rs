//! Per-vertex surface normals for the renderer.

use crate::float::Float;
use crate::topology::Face;
use crate::vec::Vec4;

/// Area-weighted vertex normals for `faces`, one entry per vertex.
///
/// See [`recompute_normals_into`].
pub fn recompute_normals<F: Float>(positions: &[Vec4<F>], faces: &[Face], vertex_count: usize) -> Vec<Vec4<F>> {
    let mut normals = vec![Vec4::zero(); vertex_count];
    recompute_normals_into(&mut normals, positions, faces);
    normals
}

/// Reset `normals` to zero and accumulate every face's `(v3 - v1) x (v2 - v1)`
/// into its three vertices.
///
/// Face indices address the duplicated vertex buffer, so positions are read
/// at `index % positions.len()`. Results are not normalized and keep `w = 0`.
/// Indices past the end of `normals` are ignored.
pub fn recompute_normals_into<F: Float>(normals: &mut [Vec4<F>], positions: &[Vec4<F>], faces: &[Face]) {
    normals.fill(Vec4::zero());
    let n = positions.len();
    if n == 0 {
        return;
    }
    for face in faces {
        let [i1, i2, i3] = face.indices().map(|i| i as usize);
        let v1 = positions[i1 % n].xyz();
        let v2 = positions[i2 % n].xyz();
        let v3 = positions[i3 % n].xyz();
        let normal = Vec4::direction((v3 - v1).cross(v2 - v1));
        for i in [i1, i2, i3] {
            if let Some(slot) = normals.get_mut(i) {
                *slot += normal;
            }
        }
    }
}
