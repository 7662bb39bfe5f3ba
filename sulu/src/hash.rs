// This file is part of the product Sulu.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Optimistic locking: clients send back the hash they last saw, writes with a
//! stale hash are rejected unless forced.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Error code clients use to offer a forced retry.
pub const INVALID_HASH_CODE: u32 = 1102;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    InvalidHash { expected: String, received: String },
    Serialize(String),
}

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashError::InvalidHash { .. } => {
                write!(f, "The resource was modified by someone else in the meantime")
            }
            HashError::Serialize(msg) => write!(f, "Failed to hash resource: {}", msg),
        }
    }
}

impl std::error::Error for HashError {}

/// Hex SHA-256 of the JSON form of `value`.
pub fn content_hash<T: Serialize>(value: &T) -> Result<String, HashError> {
    let bytes = serde_json::to_vec(value).map_err(|err| HashError::Serialize(err.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// Accepts a write when forced, when the client sent no hash, or when hashes match.
pub fn check_hash(client_hash: Option<&str>, current_hash: &str, force: bool) -> Result<(), HashError> {
    if force {
        return Ok(());
    }
    match client_hash {
        None => Ok(()),
        Some(hash) if hash.eq_ignore_ascii_case(current_hash) => Ok(()),
        Some(hash) => Err(HashError::InvalidHash {
            expected: current_hash.to_string(),
            received: hash.to_string(),
        }),
    }
}
