use std::fs;
use std::path::PathBuf;
use treegp::dispatch::{decode_payload, encode_payload, global_index, partition, payload_len};
use treegp::{Driver, RunConfig};

fn temp_output(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("treegp-{tag}-{}", std::process::id()))
}

fn small_config(workers: usize, output_dir: PathBuf) -> RunConfig {
    RunConfig {
        mutation_rate: 0.1,
        crossover_rate: 0.75,
        seed: 11,
        function_id: 4,
        population_size: 12,
        generations: 2,
        workers,
        output_dir,
    }
}

#[test]
fn partition_and_translation_agree() {
    // Slice sizes [4, 3, 3]: rank 2 local 0 lands at global 4 + 3 = 7.
    let sizes = partition(10, 3);
    assert_eq!(sizes, vec![4, 3, 3]);
    assert_eq!(global_index(&sizes, 2, 0), 7);

    // Every (rank, local) pair covers each global index exactly once.
    let mut seen = vec![false; 10];
    for (rank, &size) in sizes.iter().enumerate() {
        for local in 0..size {
            let global = global_index(&sizes, rank, local);
            assert!(!seen[global]);
            seen[global] = true;
        }
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn payload_survives_the_padded_buffer() {
    let rpns = vec![
        "x 4 5 + * x 8 / +".to_string(),
        "5 x 7 - *".to_string(),
        "x".to_string(),
    ];
    // Another rank's longer payload sets the buffer size.
    let max_len = payload_len(&rpns) + 57;
    let decoded = decode_payload(&encode_payload(&rpns, max_len).unwrap(), max_len).unwrap();
    assert_eq!(decoded, rpns);
}

#[test]
fn distributed_run_completes_and_logs() {
    let dir = temp_output("dist");
    let _ = fs::remove_dir_all(&dir);

    let mut driver = Driver::new(small_config(3, dir.clone())).unwrap();
    let best = driver.run().unwrap();
    assert!(best.fitness().is_finite());

    // Header plus one row per generation 0..=2.
    let log = fs::read_to_string(dir.join("log.csv")).unwrap();
    assert_eq!(log.lines().count(), 4);
    let archive = fs::read_to_string(dir.join("archive.csv")).unwrap();
    assert_eq!(archive.lines().count(), 4);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn distributed_matches_single_process() {
    // Only the seed crosses the wire and reproduction happens on the
    // master, so worker count must not change the trajectory.
    let dir_local = temp_output("eq-local");
    let dir_dist = temp_output("eq-dist");
    let _ = fs::remove_dir_all(&dir_local);
    let _ = fs::remove_dir_all(&dir_dist);

    let best_local = Driver::new(small_config(1, dir_local.clone()))
        .unwrap()
        .run()
        .unwrap();
    let best_dist = Driver::new(small_config(4, dir_dist.clone()))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(best_local.rpn_string(), best_dist.rpn_string());
    assert_eq!(best_local.fitness(), best_dist.fitness());

    fs::remove_dir_all(&dir_local).unwrap();
    fs::remove_dir_all(&dir_dist).unwrap();
}

#[test]
fn more_workers_than_individuals_is_handled() {
    // Population 12 over 16 ranks leaves four empty slices; the run must
    // not deadlock on them.
    let dir = temp_output("sparse");
    let _ = fs::remove_dir_all(&dir);

    let mut config = small_config(16, dir.clone());
    config.generations = 1;
    let best = Driver::new(config).unwrap().run().unwrap();
    assert!(best.fitness().is_finite());

    fs::remove_dir_all(&dir).unwrap();
}
