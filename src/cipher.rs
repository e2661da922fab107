// Additive byte cipher for the multiprocessing demo.
// A Caesar shift over bytes with zero cryptographic strength; it exists so
// the worker visualization has a real transform to apply. Do not use it to
// protect anything.

use rand::Rng;
use serde::{Serialize, Deserialize};

pub const DEFAULT_KEY: u8 = 13;
pub const MIN_KEY: u8 = 1;
pub const MAX_KEY: u8 = 255;

pub fn encrypt(data: &[u8], key: u8) -> Vec<u8> {
  data.iter().map(|&b| b.wrapping_add(key)).collect()
}

pub fn decrypt(data: &[u8], key: u8) -> Vec<u8> {
  data.iter().map(|&b| b.wrapping_sub(key)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
  Encrypt,
  Decrypt,
}

impl Transform {
  pub fn apply(self, data: &[u8], key: u8) -> Vec<u8> {
    match self {
      Transform::Encrypt => encrypt(data, key),
      Transform::Decrypt => decrypt(data, key),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Transform::Encrypt => "Encryption",
      Transform::Decrypt => "Decryption",
    }
  }
}

/// Clamp a raw user-supplied key into the accepted [1, 255] range.
pub fn clamp_key(raw: i64) -> u8 {
  if raw < MIN_KEY as i64 {
    MIN_KEY
  } else if raw > MAX_KEY as i64 {
    MAX_KEY
  } else {
    raw as u8
  }
}

pub fn random_key() -> u8 {
  rand::thread_rng().gen_range(MIN_KEY..=MAX_KEY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStrength {
  Weak,
  Medium,
  Strong,
}

impl KeyStrength {
  pub fn label(self) -> &'static str {
    match self {
      KeyStrength::Weak => "Weak",
      KeyStrength::Medium => "Medium",
      KeyStrength::Strong => "Strong",
    }
  }
}

/// Cosmetic bands for the strength meter. A shift cipher has no meaningful
/// strength; the labels are part of the demo's fiction.
pub fn key_strength(key: u8) -> KeyStrength {
  if (50..=200).contains(&key) {
    KeyStrength::Medium
  } else if key > 200 || key < 10 {
    KeyStrength::Strong
  } else {
    KeyStrength::Weak
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trip_restores_input() {
    let data: Vec<u8> = (0..=255).collect();
    for key in [0u8, 1, 5, 13, 128, 255] {
      assert_eq!(decrypt(&encrypt(&data, key), key), data, "key {}", key);
    }
  }

  #[test]
  fn zero_key_is_identity() {
    let data = b"hello world".to_vec();
    assert_eq!(encrypt(&data, 0), data);
    assert_eq!(decrypt(&data, 0), data);
  }

  #[test]
  fn known_vector() {
    assert_eq!(encrypt(&[10, 255, 0], 5), vec![15, 4, 5]);
    assert_eq!(decrypt(&[15, 4, 5], 5), vec![10, 255, 0]);
  }

  #[test]
  fn output_length_matches_input() {
    let data = vec![42u8; 4097];
    assert_eq!(encrypt(&data, 77).len(), data.len());
    assert_eq!(decrypt(&data, 77).len(), data.len());
  }

  #[test]
  fn transform_variants_are_inverses() {
    let data = b"some chunk of bytes".to_vec();
    let enc = Transform::Encrypt.apply(&data, 99);
    assert_eq!(Transform::Decrypt.apply(&enc, 99), data);
  }

  #[test]
  fn clamp_key_bounds() {
    assert_eq!(clamp_key(-4), 1);
    assert_eq!(clamp_key(0), 1);
    assert_eq!(clamp_key(1), 1);
    assert_eq!(clamp_key(200), 200);
    assert_eq!(clamp_key(255), 255);
    assert_eq!(clamp_key(9000), 255);
  }

  #[test]
  fn strength_bands() {
    assert_eq!(key_strength(5), KeyStrength::Strong);
    assert_eq!(key_strength(10), KeyStrength::Weak);
    assert_eq!(key_strength(49), KeyStrength::Weak);
    assert_eq!(key_strength(50), KeyStrength::Medium);
    assert_eq!(key_strength(200), KeyStrength::Medium);
    assert_eq!(key_strength(201), KeyStrength::Strong);
  }

  #[test]
  fn random_key_in_range() {
    for _ in 0..100 {
      let k = random_key();
      assert!((MIN_KEY..=MAX_KEY).contains(&k));
    }
  }
}
