//! Buffer partitioning for the simulated worker pool. Chunks carry their
//! index so reassembly is independent of completion order.

pub const MIN_CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct Chunk {
  pub index: usize,
  pub worker_id: usize,
  pub data: Vec<u8>,
}

pub fn chunk_size_for(len: usize, worker_count: usize) -> usize {
  let workers = worker_count.max(1);
  MIN_CHUNK_SIZE.max(len / workers)
}

/// Split a buffer into contiguous chunks of roughly equal size, assigning
/// each to a worker lane round-robin. An empty buffer yields no chunks.
pub fn split_chunks(data: &[u8], worker_count: usize) -> Vec<Chunk> {
  let workers = worker_count.max(1);
  let chunk_size = chunk_size_for(data.len(), workers);
  data
    .chunks(chunk_size)
    .enumerate()
    .map(|(index, slice)| Chunk {
      index,
      worker_id: index % workers,
      data: slice.to_vec(),
    })
    .collect()
}

/// Concatenate transformed chunks back into one buffer in index order,
/// regardless of the order the parts arrive in.
pub fn reassemble(mut parts: Vec<(usize, Vec<u8>)>) -> Vec<u8> {
  parts.sort_by_key(|(index, _)| *index);
  let total: usize = parts.iter().map(|(_, data)| data.len()).sum();
  let mut result = Vec::with_capacity(total);
  for (_, data) in parts {
    result.extend_from_slice(&data);
  }
  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cipher;

  #[test]
  fn chunk_size_floor() {
    assert_eq!(chunk_size_for(100, 4), MIN_CHUNK_SIZE);
    assert_eq!(chunk_size_for(8192, 4), 2048);
    assert_eq!(chunk_size_for(0, 4), MIN_CHUNK_SIZE);
  }

  #[test]
  fn split_preserves_bytes_and_indices() {
    let data: Vec<u8> = (0..100).cycle().take(5000).collect();
    let chunks = split_chunks(&data, 4);
    assert!(chunks.len() > 1);
    let mut offset = 0;
    for (i, chunk) in chunks.iter().enumerate() {
      assert_eq!(chunk.index, i);
      assert_eq!(chunk.worker_id, i % 4);
      assert_eq!(&data[offset..offset + chunk.data.len()], &chunk.data[..]);
      offset += chunk.data.len();
    }
    assert_eq!(offset, data.len());
  }

  #[test]
  fn empty_buffer_yields_no_chunks() {
    assert!(split_chunks(&[], 4).is_empty());
    assert!(reassemble(Vec::new()).is_empty());
  }

  #[test]
  fn reassemble_ignores_arrival_order() {
    let parts = vec![
      (2, vec![7, 8]),
      (0, vec![1, 2, 3]),
      (1, vec![4, 5, 6]),
    ];
    assert_eq!(reassemble(parts), vec![1, 2, 3, 4, 5, 6, 7, 8]);
  }

  #[test]
  fn chunked_transform_matches_whole_buffer() {
    let data: Vec<u8> = (0..=255).cycle().take(10_000).collect();
    let key = 42;
    let whole = cipher::encrypt(&data, key);
    for workers in [1, 2, 3, 4, 8] {
      let parts: Vec<(usize, Vec<u8>)> = split_chunks(&data, workers)
        .into_iter()
        .map(|chunk| (chunk.index, cipher::encrypt(&chunk.data, key)))
        .collect();
      assert_eq!(reassemble(parts), whole, "workers {}", workers);
    }
  }
}
