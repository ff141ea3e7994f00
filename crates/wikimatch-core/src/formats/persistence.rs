//! Binary ancestor-table snapshots.
//!
//! Layout:
//!
//! ```text
//! [magic: 4][version: 1][has_checksum: 1][checksum: 32, optional][postcard body]
//! ```
//!
//! The body keeps the shared layout of [`AncestorSet`], so members of one
//! component are stored once. With the `crypto-hash` feature a BLAKE3 digest
//! of the body is written and checked on load.

use crate::closure::AncestorSet;
use crate::error::{MatchError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot file magic.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"WMAT";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

const CHECKSUM_LEN: usize = 32;
const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 2;

#[derive(Serialize)]
struct BodyRef<'a, N: Ord> {
    index: &'a BTreeMap<N, usize>,
    sets: &'a [BTreeSet<N>],
}

#[derive(Deserialize)]
struct Body<N: Ord> {
    index: BTreeMap<N, usize>,
    sets: Vec<BTreeSet<N>>,
}

/// Encode an ancestor table.
pub fn encode_ancestor_snapshot<N>(table: &AncestorSet<N>) -> Result<Vec<u8>>
where
    N: Ord + Serialize,
{
    let (index, sets) = table.parts();
    let body = postcard::to_allocvec(&BodyRef { index, sets })
        .map_err(|e| MatchError::snapshot(format!("encode failed: {e}")))?;

    let checksum = body_checksum(&body);
    let mut out = Vec::with_capacity(HEADER_LEN + CHECKSUM_LEN + body.len());
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_VERSION);
    match checksum {
        Some(digest) => {
            out.push(1);
            out.extend_from_slice(&digest);
        }
        None => out.push(0),
    }
    out.extend_from_slice(&body);

    tracing::debug!(
        nodes = table.len(),
        sets = table.set_count(),
        bytes = out.len(),
        "encoded ancestor snapshot"
    );
    Ok(out)
}

/// Decode an ancestor table written by [`encode_ancestor_snapshot`].
pub fn decode_ancestor_snapshot<N>(bytes: &[u8]) -> Result<AncestorSet<N>>
where
    N: Ord + Clone + DeserializeOwned,
{
    let Some((header, rest)) = bytes.split_at_checked(HEADER_LEN) else {
        return Err(MatchError::snapshot("truncated header"));
    };
    if header[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
        return Err(MatchError::snapshot("not an ancestor snapshot"));
    }
    let version = header[SNAPSHOT_MAGIC.len()];
    if version != SNAPSHOT_VERSION {
        return Err(MatchError::snapshot(format!(
            "unsupported version {version}, expected {SNAPSHOT_VERSION}"
        )));
    }

    let body = match header[SNAPSHOT_MAGIC.len() + 1] {
        0 => rest,
        1 => {
            let Some((stored, body)) = rest.split_at_checked(CHECKSUM_LEN) else {
                return Err(MatchError::snapshot("truncated checksum"));
            };
            verify_checksum(stored, body)?;
            body
        }
        flag => {
            return Err(MatchError::snapshot(format!("invalid checksum flag {flag}")));
        }
    };

    let decoded: Body<N> = postcard::from_bytes(body)
        .map_err(|e| MatchError::snapshot(format!("decode failed: {e}")))?;
    AncestorSet::from_parts(decoded.index, decoded.sets)
        .ok_or_else(|| MatchError::snapshot("node points at a missing ancestor set"))
}

#[cfg(feature = "crypto-hash")]
fn body_checksum(body: &[u8]) -> Option<[u8; CHECKSUM_LEN]> {
    Some(*blake3::hash(body).as_bytes())
}

#[cfg(not(feature = "crypto-hash"))]
fn body_checksum(_body: &[u8]) -> Option<[u8; CHECKSUM_LEN]> {
    None
}

#[cfg(feature = "crypto-hash")]
fn verify_checksum(stored: &[u8], body: &[u8]) -> Result<()> {
    if blake3::hash(body).as_bytes().as_slice() != stored {
        return Err(MatchError::snapshot("checksum mismatch"));
    }
    Ok(())
}

#[cfg(not(feature = "crypto-hash"))]
fn verify_checksum(_stored: &[u8], _body: &[u8]) -> Result<()> {
    tracing::warn!("snapshot carries a checksum but crypto-hash is disabled, not verified");
    Ok(())
}
