use jello::{AccumulationMode, CollisionScene, LatticeSpec, Simulator, SolverConfig, Vec3, Vec4};

fn run(spec: &LatticeSpec<f32>, config: SolverConfig<f32>, ticks: usize) -> Vec<Vec4<f32>> {
    let mut sim = Simulator::new(spec, CollisionScene::showcase(), config).unwrap();
    // Sideways drift breaks the symmetry of the contacts.
    sim.particles_mut().set_velocity_raw(Vec3::new(0.01, 0.0, 0.0));
    for _ in 0..ticks {
        sim.step(1.0 / 60.0);
    }
    sim.positions().to_vec()
}

fn assert_bitwise_eq(a: &[Vec4<f32>], b: &[Vec4<f32>]) {
    assert_eq!(a.len(), b.len());
    for (i, (p, q)) in a.iter().zip(b).enumerate() {
        assert_eq!(
            [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()],
            [q.x.to_bits(), q.y.to_bits(), q.z.to_bits()],
            "particle {} differs",
            i
        );
    }
}

#[test]
fn simulation_deterministic() {
    let spec = LatticeSpec::default();
    let results: Vec<_> = (0..4).map(|_| run(&spec, SolverConfig::new(), 90)).collect();
    for r in &results[1..] {
        assert_bitwise_eq(&results[0], r);
    }
}

#[test]
fn thread_count_does_not_change_the_result() {
    let spec = LatticeSpec::default().sphere().with_block_radius(3);
    let in_pool = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
        pool.install(|| run(&spec, SolverConfig::new(), 60))
    };
    let single = in_pool(1);
    assert_bitwise_eq(&single, &in_pool(2));
    assert_bitwise_eq(&single, &in_pool(7));
}

#[test]
fn atomic_accumulation_matches_exclusive() {
    let spec = LatticeSpec::cuboid(7, 6, 9).with_offset(Vec3::new(0.0, 0.0, 10.0));
    let exclusive = run(&spec, SolverConfig::new(), 60);
    let atomic = run(&spec, SolverConfig::new().with_accumulation(AccumulationMode::Atomic), 60);
    assert_bitwise_eq(&exclusive, &atomic);
}
