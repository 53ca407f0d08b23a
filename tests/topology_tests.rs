use std::collections::HashSet;

use float_cmp::approx_eq;
use jello::{build_topology, LatticeSpec, PhysicsError, SpringKind, Topology, Vec3};
use test_case::test_case;

fn structural_pairs(nx: usize, ny: usize, nz: usize) -> usize {
    (nx - 1) * ny * nz + nx * (ny - 1) * nz + nx * ny * (nz - 1)
}

fn bend_pairs(nx: usize, ny: usize, nz: usize) -> usize {
    (nx - 2) * ny * nz + nx * (ny - 2) * nz + nx * ny * (nz - 2)
}

#[test_case(2, 2, 2 ; "2x2x2")]
#[test_case(3, 3, 3 ; "3x3x3")]
#[test_case(3, 4, 5 ; "3x4x5")]
#[test_case(8, 8, 8 ; "8x8x8")]
#[test_case(9, 2, 6 ; "9x2x6")]
fn counts_match_lattice(nx: usize, ny: usize, nz: usize) {
    let topology: Topology<f32> = build_topology(&LatticeSpec::cuboid(nx, ny, nz)).unwrap();

    assert_eq!(topology.particle_count(), nx * ny * nz);
    assert_eq!(topology.vertex_count(), 3 * nx * ny * nz);
    let expected_faces = ((nx - 1) * (ny - 1) + (ny - 1) * (nz - 1) + (nz - 1) * (nx - 1)) * 4;
    assert_eq!(topology.faces().len(), expected_faces);

    let counts = topology.spring_kind_counts();
    assert_eq!(counts[SpringKind::Structural as usize], structural_pairs(nx, ny, nz));
    // One diagonal per plane per eligible particle, whichever way it leans.
    assert_eq!(counts[SpringKind::Shear as usize], structural_pairs(nx, ny, nz));
    assert_eq!(counts[SpringKind::Bend as usize], bend_pairs(nx, ny, nz));
    assert_eq!(counts[SpringKind::Null as usize], 0);
}

#[test_case(3, 3, 3 ; "odd")]
#[test_case(4, 5, 2 ; "mixed")]
#[test_case(6, 6, 6 ; "even")]
fn springs_are_unique_and_well_formed(nx: usize, ny: usize, nz: usize) {
    let topology: Topology<f64> = build_topology(&LatticeSpec::cuboid(nx, ny, nz).sphere()).unwrap();
    let n = topology.particle_count() as u32;
    let mut seen = HashSet::new();
    for spring in topology.active_springs() {
        assert_ne!(spring.index1, spring.index2);
        assert!(spring.index1 < n && spring.index2 < n);
        let pair = (spring.index1.min(spring.index2), spring.index1.max(spring.index2));
        assert!(seen.insert(pair), "duplicate spring {:?}", pair);
    }
}

#[test]
fn cuboid_rest_lengths_are_analytic() {
    let spec = LatticeSpec::cuboid(4, 3, 5).with_extents(3.0, 2.0, 1.0);
    let topology: Topology<f64> = build_topology(&spec).unwrap();
    let cell = spec.cell_size();
    let positions = topology.positions();

    for spring in topology.active_springs() {
        let (a, b) = spring.ends();
        let measured = positions[a].distance(positions[b]);
        assert!(approx_eq!(f64, spring.rest_length, measured, epsilon = 1e-12));
        match spring.kind {
            SpringKind::Structural => {
                assert!([cell.x, cell.y, cell.z].contains(&spring.rest_length));
            }
            SpringKind::Bend => {
                assert!([cell.x, cell.y, cell.z].iter().any(|c| 2.0 * c == spring.rest_length));
            }
            SpringKind::Shear => {
                let diagonals = [(cell.x, cell.y), (cell.x, cell.z), (cell.y, cell.z)].map(|(p, q)| (p * p + q * q).sqrt());
                assert!(diagonals.iter().any(|d| approx_eq!(f64, *d, spring.rest_length, ulps = 2)));
            }
            SpringKind::Null => unreachable!(),
        }
    }
}

#[test]
fn sphere_rest_lengths_are_measured() {
    let spec = LatticeSpec::cuboid(5, 6, 7).with_extents(2.0, 3.0, 2.5).sphere();
    let topology: Topology<f32> = build_topology(&spec).unwrap();
    let positions = topology.positions();
    for spring in topology.active_springs() {
        let (a, b) = spring.ends();
        assert!(approx_eq!(f32, spring.rest_length, positions[a].distance(positions[b]), epsilon = 1e-6));
    }
}

#[test_case(5, 5, 5, [2.0, 2.0, 2.0] ; "odd sphere")]
#[test_case(6, 4, 8, [3.0, 1.0, 2.0] ; "even ellipsoid")]
fn sphere_shell_lies_on_the_ellipsoid(nx: usize, ny: usize, nz: usize, extents: [f64; 3]) {
    let offset = Vec3::new(1.0, -2.0, 10.0);
    let spec = LatticeSpec::cuboid(nx, ny, nz)
        .with_extents(extents[0], extents[1], extents[2])
        .with_offset(offset)
        .sphere();
    let topology: Topology<f64> = build_topology(&spec).unwrap();
    let dims = topology.dims();
    let semi = Vec3::new(extents[0] / 2.0, extents[1] / 2.0, extents[2] / 2.0);

    for (x, y, z) in dims.iter().filter(|&(x, y, z)| dims.is_boundary(x, y, z)) {
        let p = topology.positions()[dims.linear_index(x, y, z)].xyz() - offset;
        let unit = Vec3::new(p.x / semi.x, p.y / semi.y, p.z / semi.z);
        assert!(approx_eq!(f64, unit.length(), 1.0, epsilon = 1e-9), "({}, {}, {}) off the shell", x, y, z);
    }
}

#[test]
fn faces_wind_outward() {
    let spec = LatticeSpec::cuboid(4, 3, 5).with_extents(2.0, 1.0, 3.0).with_offset(Vec3::new(0.0, 5.0, 0.0));
    let topology: Topology<f64> = build_topology(&spec).unwrap();
    let positions = topology.positions();
    let n = positions.len();

    for face in topology.faces() {
        let [v1, v2, v3] = face.indices().map(|i| positions[i as usize % n].xyz());
        let normal = (v3 - v1).cross(v2 - v1);
        let centroid = (v1 + v2 + v3).scale(1.0 / 3.0);
        assert!(normal.dot(centroid - spec.offset) > 0.0, "{:?} winds inward", face);
    }
}

#[test]
fn face_families_address_their_own_vertex_copy() {
    let topology: Topology<f32> = build_topology(&LatticeSpec::cuboid(3, 4, 5)).unwrap();
    let n = topology.particle_count() as u32;
    let dims = topology.dims();
    let (xy, xz) = ((dims.nx - 1) * (dims.ny - 1) * 4, (dims.nx - 1) * (dims.nz - 1) * 4);
    let faces = topology.faces();

    assert!(faces[..xy].iter().flat_map(|f| f.indices()).all(|i| i < n));
    assert!(faces[xy..xy + xz].iter().flat_map(|f| f.indices()).all(|i| (n..2 * n).contains(&i)));
    assert!(faces[xy + xz..].iter().flat_map(|f| f.indices()).all(|i| (2 * n..3 * n).contains(&i)));
}

#[test]
fn invalid_spec_fails_before_building() {
    let err = build_topology(&LatticeSpec::<f32>::cuboid(2, 2, 2).with_extents(1.0, f32::NAN, 1.0)).unwrap_err();
    assert!(matches!(err, PhysicsError::InvalidExtent { .. }));
    assert_eq!(err.to_string(), "lattice extent along y must be positive and finite, got NaN");
}

#[test]
fn huge_block_radius_is_a_validation_error() {
    let radius = 1 << 22;
    let err = build_topology(&LatticeSpec::<f32>::cuboid(2, 2, 2).with_block_radius(radius)).unwrap_err();
    assert_eq!(err, PhysicsError::SpringCapacityOverflow { radius });
}

#[cfg(target_pointer_width = "64")]
#[test]
fn unallocatable_spring_array_is_reported() {
    // 96 * 2^57 slots fit in a usize but not in the address space.
    let radius = 1 << 19;
    let err = build_topology(&LatticeSpec::<f32>::cuboid(2, 2, 2).with_block_radius(radius)).unwrap_err();
    assert!(matches!(err, PhysicsError::Allocation { buffer: "spring", .. }));
    assert_eq!(err, PhysicsError::Allocation { buffer: "spring", len: 96 << 57 });
}
