//! Deterministic ID types using SHA-256.
//!
//! - `ParamsHash`: digest of a sorted `key=value` parameter mapping (§4.1).
//! - `RunId`: unique identifier for a single backtest run, truncated to 16
//!   hex chars per spec.md §6's determinism contract.
//!
//! Same fixed-size-hash-wrapper idiom as the teacher's `hash_id!` macro, with
//! `Sha256` standing in for `blake3::hash` — spec.md §4.1 is explicit that
//! the signal-ID and params-hash algorithms are SHA-256.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte SHA-256 hash wrapper with hex display and serde as hex string.
macro_rules! hash_id {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            pub fn from_bytes(data: &[u8]) -> Self {
                let mut hasher = Sha256::new();
                hasher.update(data);
                let digest = hasher.finalize();
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&digest);
                Self(bytes)
            }

            pub fn as_hex(&self) -> String {
                self.0.iter().map(|b| format!("{b:02x}")).collect()
            }

            /// First `len` hex characters, for truncated identifiers (§6).
            pub fn as_hex_truncated(&self, len: usize) -> String {
                let hex = self.as_hex();
                hex[..len.min(hex.len())].to_string()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.as_hex()[..16])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.as_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&self.as_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let hex = String::deserialize(d)?;
                let bytes: Vec<u8> = (0..hex.len())
                    .step_by(2)
                    .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
                    .collect::<Result<_, _>>()
                    .map_err(serde::de::Error::custom)?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 bytes"))?;
                Ok(Self(arr))
            }
        }
    };
}

hash_id!(ParamsHash);
hash_id!(RunId);
