//! Win-hash commitments.
//!
//! The owner commits to a draw's outcome before settling it:
//! ```text
//! win_hash = sha256(secret || draw_id || winner || "win")
//! ```
//! `win_hash` is published with `SetWinHash` and the same digest is revealed again with
//! `PayReward`. The execution layer only compares the two digests; deriving them from a
//! secret lets anyone holding the secret audit a settled draw after the fact.

use commonware_cryptography::{
    ed25519::PublicKey,
    sha256::{Digest, Sha256},
    Hasher,
};

/// Length of the commitment secret in bytes.
pub const SECRET_LEN: usize = 32;

const WIN_DOMAIN: &[u8] = b"win";

/// Compute the commitment for `winner` of `draw_id` under `secret`.
pub fn compute_win_hash(secret: &[u8; SECRET_LEN], draw_id: u32, winner: &PublicKey) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.update(&draw_id.to_be_bytes());
    hasher.update(winner.as_ref());
    hasher.update(WIN_DOMAIN);
    hasher.finalize()
}

/// Returns `true` if `reveal` opens `commit`.
pub fn verify_reveal(commit: &Digest, reveal: Option<&Digest>) -> bool {
    reveal == Some(commit)
}

/// Owner-side helper holding the commitment secret.
#[derive(Clone)]
pub struct Committer {
    secret: [u8; SECRET_LEN],
}

impl Committer {
    pub fn from_secret(secret: [u8; SECRET_LEN]) -> Self {
        Self { secret }
    }

    pub fn commit(&self, draw_id: u32, winner: &PublicKey) -> Digest {
        compute_win_hash(&self.secret, draw_id, winner)
    }

    /// Check a settled draw against the winner it names.
    pub fn audit(&self, draw_id: u32, winner: &PublicKey, win_hash: &Digest) -> bool {
        verify_reveal(win_hash, Some(&self.commit(draw_id, winner)))
    }
}

impl std::fmt::Debug for Committer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Committer").finish_non_exhaustive()
    }
}
