//! Render mesh: the body plus tessellated collision scenery in one buffer set.
//!
//! Layout of every per-vertex buffer:
//!
//! ```text
//! [ body (3N, one copy per face-plane family) | plane quads (4 each) | sphere lattices (p^3 each) ]
//! ```
//!
//! Face indices address this combined buffer. Only the body part changes
//! between frames.

use crate::collision::{CollisionScene, Plane, Sphere};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::lattice::LatticeDims;
use crate::normals::recompute_normals_into;
use crate::particle::Particles;
use crate::topology::{self, Face, Topology};
use crate::vec::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// How scene primitives are turned into triangles, and the mesh colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneryConfig<F: Float> {
    /// Half-width of the quad drawn for each plane. Default: 100.
    pub plane_extent: F,
    /// Lattice points per axis used to tessellate each sphere. Default: 16.
    pub sphere_precision: usize,
    /// Default: (0.3, 1, 0.3, 1).
    pub body_color: Vec4<F>,
    /// Default: white.
    pub scenery_color: Vec4<F>,
}

impl<F: Float> SceneryConfig<F> {
    pub fn new() -> Self {
        SceneryConfig {
            plane_extent: F::from_f32(100.0),
            sphere_precision: 16,
            body_color: Vec4::new(F::from_f32(0.3), F::one(), F::from_f32(0.3), F::one()),
            scenery_color: Vec4::new(F::one(), F::one(), F::one(), F::one()),
        }
    }

    pub fn with_plane_extent(mut self, extent: F) -> Self {
        self.plane_extent = extent;
        self
    }

    pub fn with_sphere_precision(mut self, precision: usize) -> Self {
        self.sphere_precision = precision;
        self
    }

    pub fn with_colors(mut self, body: Vec4<F>, scenery: Vec4<F>) -> Self {
        self.body_color = body;
        self.scenery_color = scenery;
        self
    }

    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.sphere_precision < 2 {
            return Err(PhysicsError::InvalidSceneryPrecision { precision: self.sphere_precision });
        }
        if !self.plane_extent.is_finite() || self.plane_extent <= F::zero() {
            return Err(PhysicsError::InvalidSceneryExtent { value: self.plane_extent.to_f64() });
        }
        Ok(())
    }
}

impl<F: Float> Default for SceneryConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Corners of a square of half-width `extent` on `plane`, centred on the
/// point closest to the origin.
///
/// Faces `(0, 2, 1)` and `(0, 3, 2)` face along the plane normal.
pub fn plane_quad<F: Float>(plane: &Plane<F>, extent: F) -> [Vec4<F>; 4] {
    let n = plane.normal;
    let helper = if n.y.abs() < F::from_f32(0.9) {
        Vec3::unit_y()
    } else {
        Vec3::new(F::one(), F::zero(), F::zero())
    };
    let u = helper.cross(n).normalize().scale(extent);
    let v = n.cross(u);
    let center = plane.anchor();
    [
        Vec4::point(center - u - v),
        Vec4::point(center + u - v),
        Vec4::point(center + u + v),
        Vec4::point(center - u + v),
    ]
}

/// A `precision^3` lattice pushed onto the sphere surface, with radial normals.
pub fn sphere_lattice<F: Float>(sphere: &Sphere<F>, precision: usize) -> (Vec<Vec4<F>>, Vec<Vec4<F>>) {
    let dims = LatticeDims::new(precision, precision, precision);
    let mid = F::from_usize(precision - 1) * F::half();
    let mut vertices = Vec::with_capacity(dims.particle_count());
    let mut normals = Vec::with_capacity(dims.particle_count());
    for (x, y, z) in dims.iter() {
        let radial = Vec3::new(F::from_usize(x) - mid, F::from_usize(y) - mid, F::from_usize(z) - mid).normalize();
        vertices.push(Vec4::point(sphere.center + radial.scale(sphere.radius)));
        normals.push(Vec4::direction(radial));
    }
    (vertices, normals)
}

/// Exterior faces of a tessellated sphere: `(p - 1)^2 * 12`.
pub fn sphere_face_count(precision: usize) -> usize {
    topology::face_count(LatticeDims::new(precision, precision, precision))
}

/// Combined vertex, normal, color and face buffers for a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderMesh<F: Float> {
    vertices: Vec<Vec4<F>>,
    normals: Vec<Vec4<F>>,
    colors: Vec<Vec4<F>>,
    faces: Vec<Face>,
    body_vertex_count: usize,
    body_face_count: usize,
}

impl<F: Float> RenderMesh<F> {
    /// Lay out the body at `positions` followed by every plane and sphere of `scene`.
    pub fn assemble(
        topology: &Topology<F>,
        positions: &[Vec4<F>],
        scene: &CollisionScene<F>,
        config: &SceneryConfig<F>,
    ) -> Result<Self, PhysicsError> {
        config.validate()?;
        scene.validate()?;

        let body_vertex_count = topology.vertex_count();
        let per_sphere = config.sphere_precision.pow(3);
        let total = scene
            .spheres
            .len()
            .checked_mul(per_sphere)
            .and_then(|s| s.checked_add(body_vertex_count + scene.planes.len() * 4))
            .unwrap_or(usize::MAX);
        if u32::try_from(total).is_err() {
            return Err(PhysicsError::TooManyVertices { count: total });
        }

        let mut mesh = RenderMesh {
            vertices: topology.body_vertices(positions),
            normals: vec![Vec4::zero(); body_vertex_count],
            colors: vec![config.body_color; body_vertex_count],
            faces: topology.faces().to_vec(),
            body_vertex_count,
            body_face_count: topology.faces().len(),
        };
        recompute_normals_into(&mut mesh.normals, positions, topology.faces());

        for plane in &scene.planes {
            let base = mesh.vertices.len() as u32;
            mesh.vertices.extend_from_slice(&plane_quad(plane, config.plane_extent));
            mesh.normals.extend([Vec4::direction(plane.normal); 4]);
            mesh.faces.push(Face::new(0, 2, 1).offset(base));
            mesh.faces.push(Face::new(0, 3, 2).offset(base));
        }

        let sphere_dims = LatticeDims::new(config.sphere_precision, config.sphere_precision, config.sphere_precision);
        let mut sphere_faces = Vec::with_capacity(sphere_face_count(config.sphere_precision));
        topology::triangulate_exterior(sphere_dims, 0, &mut sphere_faces);
        for sphere in &scene.spheres {
            let base = mesh.vertices.len() as u32;
            let (vertices, normals) = sphere_lattice(sphere, config.sphere_precision);
            mesh.vertices.extend(vertices);
            mesh.normals.extend(normals);
            mesh.faces.extend(sphere_faces.iter().map(|f| f.offset(base)));
        }

        mesh.colors.resize(mesh.vertices.len(), config.scenery_color);
        ftlog::debug!(
            "render mesh: {} vertices ({} body), {} faces ({} body)",
            mesh.vertices.len(),
            body_vertex_count,
            mesh.faces.len(),
            mesh.body_face_count,
        );
        Ok(mesh)
    }

    /// Refresh the body's vertices and normals from the current particles.
    pub fn update_body(&mut self, particles: &Particles<F>, topology: &Topology<F>) {
        let positions = particles.positions();
        let n = positions.len();
        for family in self.vertices[..self.body_vertex_count].chunks_mut(n.max(1)) {
            particles.write_positions(family);
        }
        recompute_normals_into(
            &mut self.normals[..self.body_vertex_count],
            &positions,
            &topology.faces()[..self.body_face_count],
        );
    }

    pub fn vertices(&self) -> &[Vec4<F>] { &self.vertices }
    pub fn normals(&self) -> &[Vec4<F>] { &self.normals }
    pub fn colors(&self) -> &[Vec4<F>] { &self.colors }
    pub fn faces(&self) -> &[Face] { &self.faces }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn body_vertex_count(&self) -> usize { self.body_vertex_count }
    pub fn body_face_count(&self) -> usize { self.body_face_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LatticeSpec;

    #[test]
    fn plane_quad_faces_follow_the_normal() {
        let plane = Plane::new(Vec3::new(0.3, 0.95, 0.0), -3.0);
        let corners = plane_quad(&plane, 10.0f64);
        for face in [Face::new(0, 2, 1), Face::new(0, 3, 2)] {
            let [a, b, c] = face.indices().map(|i| corners[i as usize].xyz());
            let normal = (c - a).cross(b - a).normalize();
            assert!(normal.dot(plane.normal) > 0.999);
        }
        for corner in corners {
            assert!(plane.signed_distance(corner.xyz()).abs() < 1e-9);
        }
    }

    #[test]
    fn assembled_layout() {
        let topology = Topology::build(&LatticeSpec::<f32>::cuboid(3, 3, 3)).unwrap();
        let scene = CollisionScene::showcase();
        let config = SceneryConfig::new().with_sphere_precision(4);
        let mesh = RenderMesh::assemble(&topology, topology.positions(), &scene, &config).unwrap();
        assert_eq!(mesh.vertex_count(), 81 + 4 + 64);
        assert_eq!(mesh.normals().len(), mesh.vertex_count());
        assert_eq!(mesh.colors().len(), mesh.vertex_count());
        assert_eq!(mesh.faces().len(), 48 + 2 + 9 * 12);
        assert!(mesh.faces().iter().flat_map(|f| f.indices()).all(|i| (i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.colors()[0], config.body_color);
        assert_eq!(mesh.colors()[81], config.scenery_color);
    }

    #[test]
    fn rejects_coarse_spheres() {
        let config = SceneryConfig::<f32>::new().with_sphere_precision(1);
        assert_eq!(config.validate(), Err(PhysicsError::InvalidSceneryPrecision { precision: 1 }));
    }
}
