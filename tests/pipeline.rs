//! End-to-end file round trip: read, chunked encrypt through the simulated
//! pool, write, decrypt, compare.

use encrypty::cipher::{self, Transform};
use encrypty::fileio;
use encrypty::scheduler::{SimTiming, WorkerPool};

#[test]
fn encrypt_decrypt_round_trip_on_disk() {
  let dir = tempfile::tempdir().expect("tempdir");
  let input = dir.path().join("report.txt");
  let original: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
  fileio::write_buffer(&input, &original).expect("write input");

  let key = 5;
  let data = fileio::read_buffer(&input).expect("read input");

  let report = tokio_test::block_on(async {
    let pool = WorkerPool::new(4, SimTiming::instant());
    pool.run(&data, key, Transform::Encrypt).await
  });
  assert_eq!(report.output.len(), original.len());
  assert_ne!(report.output, original);

  let encrypted_path = fileio::encrypted_name(&input);
  assert_eq!(
    encrypted_path.file_name().and_then(|n| n.to_str()),
    Some("encrypted_report.txt")
  );
  fileio::write_buffer(&encrypted_path, &report.output).expect("write encrypted");

  let encrypted = fileio::read_buffer(&encrypted_path).expect("read encrypted");
  let decrypted = cipher::decrypt(&encrypted, key);
  assert_eq!(decrypted, original);

  let decrypted_path = fileio::decrypted_name(&encrypted_path);
  assert_eq!(
    decrypted_path.file_name().and_then(|n| n.to_str()),
    Some("decrypted_report.txt")
  );
}

#[test]
fn pool_report_exports_as_json() {
  let data = vec![7u8; 5000];
  let report = tokio_test::block_on(async {
    let pool = WorkerPool::new(2, SimTiming::instant());
    pool.run(&data, 13, Transform::Encrypt).await
  });

  let run_report = report.to_run_report();
  let json = serde_json::to_value(&run_report).expect("serialize report");
  assert_eq!(json["simulation"]["workers"], 2);
  assert_eq!(
    json["tasks"].as_array().map(|t| t.len()),
    Some(report.total_chunks)
  );
  assert!(json["timeline"].as_array().is_some());
}
