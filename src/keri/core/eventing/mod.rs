//! Event factories (inception, rotation, interaction, query, receipt, reply)
//! plus the Kever/Kevery verifier state machine built on top of them.

pub mod incept;
pub mod interact;
pub mod kever;
pub mod kevery;
pub mod query;
pub mod receipt;
pub mod reply;
pub mod rotate;
pub mod state;

use crate::cesr::indexing::siger::Siger;
use crate::cesr::indexing::Indexer;
use crate::cesr::verfer::Verfer;
use crate::keri::KERIError;
use std::collections::HashSet;

pub use incept::*;
pub use kever::Kever;

/// Witness threshold of accountable duplicity (toad), "ample" default: a
/// simple majority of the witness list, with a floor of 1 for a non-empty
/// list.
pub fn ample(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        std::cmp::max(1, (n as f64 / 2.0).ceil() as usize)
    }
}

fn is_digest_code(code: &str) -> bool {
    ["E", "S", "X"].contains(&code)
}

fn is_prefix_code(code: &str) -> bool {
    ["A", "B", "C", "D"].contains(&code)
}

/// Verifies each indexed signature in `sigers` against `ser` using the key at
/// its declared index in `verfers`. Returns the distinct (by index) sigers
/// whose signature verified, paired with their indices.
///
/// Indices with no corresponding key, or whose signature fails to verify,
/// are silently dropped -- the caller (Kever) is responsible for deciding
/// whether what remains satisfies the signing threshold.
pub fn verify_sigs(
    ser: &[u8],
    sigers: Vec<Siger>,
    verfers: &[Verfer],
) -> Result<(Vec<Siger>, Vec<usize>), KERIError> {
    let mut verified = Vec::new();
    let mut indices = Vec::new();
    let mut seen = HashSet::new();

    for siger in sigers {
        let idx = siger.index() as usize;
        if seen.contains(&idx) {
            continue;
        }
        let verfer = match verfers.get(idx) {
            Some(v) => v,
            None => continue,
        };
        if verfer.verify(siger.raw(), ser).unwrap_or(false) {
            seen.insert(idx);
            indices.push(idx);
            verified.push(siger);
        }
    }

    Ok((verified, indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cesr::signing::signer::Signer;
    use crate::cesr::signing::Sigmat;

    fn into_siger(sigmat: Sigmat) -> Siger {
        match sigmat {
            Sigmat::Indexed(siger) => siger,
            Sigmat::NonIndexed(_) => panic!("expected an indexed signature"),
        }
    }

    #[test]
    fn verify_sigs_dedups_by_index_and_drops_bad_sigs() {
        let signer0 = Signer::new(None, None, Some(true)).unwrap();
        let signer1 = Signer::new(None, None, Some(true)).unwrap();
        let verfers = vec![signer0.verfer().clone(), signer1.verfer().clone()];

        let msg = b"hello world";
        let siger0 = into_siger(signer0.sign(msg, Some(0), None, None).unwrap());
        let siger1 = into_siger(signer1.sign(msg, Some(1), None, None).unwrap());
        let bad = into_siger(signer0.sign(b"other message", Some(1), None, None).unwrap());

        let (verified, indices) =
            verify_sigs(msg, vec![siger0, siger1, bad], &verfers).unwrap();

        assert_eq!(indices, vec![0, 1]);
        assert_eq!(verified.len(), 2);
    }

    #[test]
    fn ample_is_majority_with_floor_one() {
        assert_eq!(ample(0), 0);
        assert_eq!(ample(1), 1);
        assert_eq!(ample(2), 1);
        assert_eq!(ample(3), 2);
        assert_eq!(ample(4), 2);
    }
}
