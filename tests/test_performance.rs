//! Performance tests for level generation and pathfinding

use delve::generation::generate_level;
use delve::{Algorithm, DelveResult, GenerationConfig, Pursuit, PursuitStep};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;
use std::time::Instant;

#[test]
fn test_generation_performance() -> DelveResult<()> {
    let start = Instant::now();
    let iterations = 10;

    for seed in 0..iterations {
        for algorithm in [Algorithm::RoomsAndCorridors, Algorithm::Blob, Algorithm::Path] {
            let config = GenerationConfig::new(seed).with_algorithm(algorithm);
            generate_level(&config, 1)?;
        }
    }

    let elapsed = start.elapsed();
    let per_level = elapsed / (iterations as u32 * 3);
    println!(
        "Generated {} levels in {:?} ({:?} per level)",
        iterations * 3,
        elapsed,
        per_level
    );

    // Generous bound so unoptimized test builds pass
    assert!(
        per_level.as_millis() < 2000,
        "Level generation too slow: {:?} per level",
        per_level
    );
    Ok(())
}

#[test]
fn test_pursuit_performance() -> DelveResult<()> {
    let level = generate_level(&GenerationConfig::new(4242), 1)?;
    let passable = level.passable_cells(&HashSet::new());
    let pursuit = Pursuit::uniform();
    let mut rng = StdRng::seed_from_u64(1);

    // Walk the whole way to the stairs one turn at a time, as unit AI would
    let start = Instant::now();
    let mut position = level.start;
    let mut turns = 0;
    loop {
        match pursuit.next_step(position, level.stairs_down, &passable, &mut rng) {
            PursuitStep::Move(next) => position = next,
            PursuitStep::InReach => break,
            PursuitStep::NoPath => panic!("stairs unreachable from start"),
        }
        turns += 1;
        assert!(turns < 10_000, "pursuit is not converging");
    }

    let elapsed = start.elapsed();
    println!("Pursued the stairs over {} turns in {:?}", turns, elapsed);
    assert!(elapsed.as_secs() < 10, "Pursuit too slow: {:?}", elapsed);
    Ok(())
}
