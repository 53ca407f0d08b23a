//! Topology builder: particles, springs and exterior faces of a lattice body.

use crate::config::{LatticeShape, LatticeSpec};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::lattice::{self, LatticeDims};
use crate::partition::BlockPartition;
use crate::spring::{self, Spring, SpringKind, SpringSlot, PRIMARY_SLOTS, SLOTS_PER_PARTICLE};
use crate::vec::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// One outward-facing triangle.
///
/// Indices address the duplicated body vertex buffer (see
/// [`Topology::vertex_count`]), not the particle array directly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Face {
    pub index1: u32,
    pub index2: u32,
    pub index3: u32,
}

impl Face {
    pub fn new(index1: u32, index2: u32, index3: u32) -> Self {
        Face { index1, index2, index3 }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.index1, self.index2, self.index3]
    }

    /// Shift every index by `offset`.
    pub fn offset(self, offset: u32) -> Self {
        Face::new(self.index1 + offset, self.index2 + offset, self.index3 + offset)
    }
}

/// Immutable structure of a lattice body, built once per scene.
#[derive(Clone, Debug)]
pub struct Topology<F: Float> {
    spec: LatticeSpec<F>,
    dims: LatticeDims,
    partition: BlockPartition,
    positions: Vec<Vec4<F>>,
    springs: Vec<Spring<F>>,
    faces: Vec<Face>,
    degree: Vec<u32>,
}

/// Build the topology of a lattice body.
///
/// Validation runs before anything is allocated; an allocation failure is
/// reported without returning a partial topology.
pub fn build_topology<F: Float>(spec: &LatticeSpec<F>) -> Result<Topology<F>, PhysicsError> {
    Topology::build(spec)
}

impl<F: Float> Topology<F> {
    pub fn build(spec: &LatticeSpec<F>) -> Result<Self, PhysicsError> {
        let dims = spec.validate()?;
        let partition = BlockPartition::new(dims, spec.block_radius);
        let n = dims.particle_count();

        let mut positions = allocate("position", n)?;
        positions.extend(dims.iter().map(|(x, y, z)| lattice::place(spec, x, y, z)));

        let mut springs = allocate("spring", partition.spring_capacity())?;
        springs.resize(partition.spring_capacity(), Spring::null(0));
        let cell = spec.cell_size();
        for (x, y, z) in dims.iter() {
            let base = partition.spring_base(x, y, z);
            let owner = dims.linear_index(x, y, z);
            for slot in &mut springs[base..base + SLOTS_PER_PARTICLE] {
                *slot = Spring::null(owner as u32);
            }
            for primary in PRIMARY_SLOTS {
                let chosen = match dims.neighbor(x, y, z, primary.offset) {
                    Some(other) => Some((primary, other)),
                    None => spring::shear_fallback(primary.slot)
                        .and_then(|fb| dims.neighbor(x, y, z, fb.offset).map(|other| (fb, other))),
                };
                if let Some((slot, other)) = chosen {
                    let rest_length = match spec.shape {
                        LatticeShape::Cuboid => analytic_length(&slot, cell),
                        LatticeShape::Sphere => positions[owner].distance(positions[other]),
                    };
                    springs[base + slot.slot] = Spring::new(owner as u32, other as u32, slot.kind, rest_length);
                }
            }
        }

        let mut degree = allocate("degree", n)?;
        degree.resize(n, 0u32);
        for s in springs.iter().filter(|s| !s.is_null()) {
            let (a, b) = s.ends();
            degree[a] += 1;
            degree[b] += 1;
        }

        let mut faces = allocate("face", face_count(dims))?;
        triangulate_exterior(dims, n as u32, &mut faces);

        let topology = Topology { spec: spec.clone(), dims, partition, positions, springs, faces, degree };
        ftlog::info!(
            "built {:?} lattice {}x{}x{}: {} particles, {} of {} spring slots active, {} faces",
            spec.shape,
            dims.nx,
            dims.ny,
            dims.nz,
            n,
            topology.active_spring_count(),
            topology.springs.len(),
            topology.faces.len(),
        );
        ftlog::debug!(
            "block partition: radius {}, {:?} blocks, {} slots per cell",
            partition.radius(),
            partition.blocks(),
            partition.cell_len(),
        );
        Ok(topology)
    }

    pub fn spec(&self) -> &LatticeSpec<F> { &self.spec }
    pub fn dims(&self) -> LatticeDims { self.dims }
    pub fn partition(&self) -> &BlockPartition { &self.partition }

    /// Rest positions of every particle (`w = 1`).
    pub fn positions(&self) -> &[Vec4<F>] { &self.positions }

    /// Dense spring array, null springs included.
    pub fn springs(&self) -> &[Spring<F>] { &self.springs }

    pub fn faces(&self) -> &[Face] { &self.faces }

    /// Non-null springs incident to each particle.
    pub fn degree(&self) -> &[u32] { &self.degree }

    pub fn particle_count(&self) -> usize { self.positions.len() }

    /// Body vertices handed to a renderer: every particle once per face-plane
    /// family (xy, xz, yz), so each family can carry its own normals.
    pub fn vertex_count(&self) -> usize { self.positions.len() * 3 }

    pub fn active_springs(&self) -> impl Iterator<Item = &Spring<F>> {
        self.springs.iter().filter(|s| !s.is_null())
    }

    pub fn active_spring_count(&self) -> usize {
        self.active_springs().count()
    }

    /// Active springs per kind, indexed by [`SpringKind::as_u32`].
    pub fn spring_kind_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for s in self.active_springs() {
            counts[s.kind.as_u32() as usize] += 1;
        }
        counts
    }

    /// Body vertex buffer for the given particle positions.
    pub fn body_vertices(&self, positions: &[Vec4<F>]) -> Vec<Vec4<F>> {
        let mut out = Vec::with_capacity(positions.len() * 3);
        for _ in 0..3 {
            out.extend_from_slice(positions);
        }
        out
    }
}

/// Faces covering the six exterior sides: two triangles per boundary cell.
pub fn face_count(dims: LatticeDims) -> usize {
    let (cx, cy, cz) = (dims.nx - 1, dims.ny - 1, dims.nz - 1);
    (cx * cy + cy * cz + cz * cx) * 4
}

/// An empty vector with room for exactly `len` entries, or an allocation
/// error naming `buffer`.
pub(crate) fn allocate<T>(buffer: &'static str, len: usize) -> Result<Vec<T>, PhysicsError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| PhysicsError::Allocation { buffer, len })?;
    Ok(v)
}

/// Rest length of a cuboid spring from its grid offset and the cell size.
fn analytic_length<F: Float>(slot: &SpringSlot, cell: Vec3<F>) -> F {
    let [dx, dy, dz] = slot.offset;
    let steps = Vec3::new(F::from_f32(dx as f32), F::from_f32(dy as f32), F::from_f32(dz as f32));
    let span = steps.component_mul(cell);
    match slot.kind {
        // Axis-aligned: avoid a rounding trip through sqrt.
        SpringKind::Structural | SpringKind::Bend => span.max_abs(),
        _ => span.length(),
    }
}

/// Triangulate the boundary grids of a lattice.
///
/// The xz faces are shifted by `family_stride` and the yz faces by twice
/// that, so each face-plane family can address its own vertex copy; pass 0
/// to share vertices. Winding is outward under the `(v3 - v1) x (v2 - v1)`
/// normal convention.
pub(crate) fn triangulate_exterior(dims: LatticeDims, family_stride: u32, faces: &mut Vec<Face>) {
    let (nx, ny, nz) = (dims.nx, dims.ny, dims.nz);
    let family = family_stride;
    let at = |x: usize, y: usize, z: usize| dims.linear_index(x, y, z) as u32;
    let (xm, ym, zm) = (nx - 1, ny - 1, nz - 1);

    // xy family: z = 0 and z = max.
    for y in 0..ym {
        for x in 0..xm {
            faces.push(Face::new(at(x, y, 0), at(x + 1, y, 0), at(x + 1, y + 1, 0)));
            faces.push(Face::new(at(x, y, 0), at(x + 1, y + 1, 0), at(x, y + 1, 0)));
            faces.push(Face::new(at(x, y, zm), at(x + 1, y + 1, zm), at(x + 1, y, zm)));
            faces.push(Face::new(at(x, y, zm), at(x, y + 1, zm), at(x + 1, y + 1, zm)));
        }
    }

    // xz family: y = 0 and y = max.
    for z in 0..zm {
        for x in 0..xm {
            faces.push(Face::new(at(x, 0, z), at(x, 0, z + 1), at(x + 1, 0, z + 1)).offset(family));
            faces.push(Face::new(at(x, 0, z), at(x + 1, 0, z + 1), at(x + 1, 0, z)).offset(family));
            faces.push(Face::new(at(x, ym, z), at(x + 1, ym, z + 1), at(x, ym, z + 1)).offset(family));
            faces.push(Face::new(at(x, ym, z), at(x + 1, ym, z), at(x + 1, ym, z + 1)).offset(family));
        }
    }

    // yz family: x = 0 and x = max.
    let family = family * 2;
    for z in 0..zm {
        for y in 0..ym {
            faces.push(Face::new(at(0, y, z), at(0, y + 1, z), at(0, y + 1, z + 1)).offset(family));
            faces.push(Face::new(at(0, y, z), at(0, y + 1, z + 1), at(0, y, z + 1)).offset(family));
            faces.push(Face::new(at(xm, y, z), at(xm, y + 1, z + 1), at(xm, y + 1, z)).offset(family));
            faces.push(Face::new(at(xm, y, z), at(xm, y, z + 1), at(xm, y + 1, z + 1)).offset(family));
        }
    }
}
