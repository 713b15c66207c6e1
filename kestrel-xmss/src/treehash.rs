//! Merkle tree construction and root recomputation.
//!
//! Leaves are L-tree compressed WOTS+ public keys. Inner nodes at height
//! `j + 1` are `H(left, right)` under a hash tree address carrying the child
//! height `j` and the parent index (RFC 8391, Algorithms 9 and 13).
//!
//! [`treehash`] builds one node with an explicit stack of at most
//! `height + 1` entries; the BDS traversal in [`crate::bds`] drives the same
//! construction one leaf at a time.

use crate::address::Address;
use crate::hash::HashSuite;
use crate::ltree::ltree;
use crate::params::{Params, MAX_TREE_HEIGHT, MAX_WOTS_LEN};
use crate::wots::wots_pk_gen;

const STACK_DEPTH: usize = MAX_TREE_HEIGHT as usize + 1;

/// Compute leaf `idx` of the tree addressed by `subtree`.
///
/// Generates the WOTS+ public key of key pair `idx` and compresses it with an
/// L-tree.
pub fn gen_leaf<H: HashSuite<N>, const N: usize>(
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    subtree: &Address,
    idx: u32,
    params: &Params,
) -> [u8; N] {
    let mut buf = [[0u8; N]; MAX_WOTS_LEN];
    let pk = &mut buf[..params.wots_len()];

    let mut ots_adrs = subtree.ots_for(idx);
    wots_pk_gen::<H, N>(pk, sk_seed, pub_seed, &mut ots_adrs, params);

    let mut ltree_adrs = subtree.ltree_for(idx);
    ltree::<H, N>(pk, pub_seed, &mut ltree_adrs)
}

/// Compute the node at `height` whose leftmost leaf is `start`.
///
/// RFC 8391, Algorithm 9: treeHash(SK, s, t, ADRS)
///
/// `start` must be a multiple of `2^height`. Leaves are generated left to
/// right and merged on a stack as soon as two nodes of equal height meet.
pub fn treehash<H: HashSuite<N>, const N: usize>(
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    subtree: &Address,
    start: u32,
    height: u32,
    params: &Params,
) -> [u8; N] {
    debug_assert!(height <= params.tree_height());
    debug_assert_eq!(start % (1 << height), 0);

    let mut stack = [[0u8; N]; STACK_DEPTH];
    let mut levels = [0u32; STACK_DEPTH];
    let mut top = 0usize;

    for idx in start..start + (1u32 << height) {
        let mut node = gen_leaf::<H, N>(sk_seed, pub_seed, subtree, idx, params);
        let mut node_height = 0u32;

        while top > 0 && levels[top - 1] == node_height {
            let mut adrs = subtree.node_for(node_height, idx >> (node_height + 1));
            node = H::h(&stack[top - 1], &node, pub_seed, &mut adrs);
            node_height += 1;
            top -= 1;
        }

        stack[top] = node;
        levels[top] = node_height;
        top += 1;
    }

    debug_assert_eq!(top, 1);
    stack[0]
}

/// Root of the tree addressed by `subtree`.
pub fn tree_root<H: HashSuite<N>, const N: usize>(
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    subtree: &Address,
    params: &Params,
) -> [u8; N] {
    treehash::<H, N>(sk_seed, pub_seed, subtree, 0, params.tree_height(), params)
}

/// Authentication path of `leaf`, rebuilt from scratch.
///
/// Costs `2^tree_height - 1` leaf computations. Signing uses the BDS state
/// instead; this is the reference the traversal is checked against.
pub fn auth_path<H: HashSuite<N>, const N: usize>(
    out: &mut [[u8; N]],
    sk_seed: &[u8; N],
    pub_seed: &[u8; N],
    subtree: &Address,
    leaf: u32,
    params: &Params,
) {
    debug_assert_eq!(out.len(), params.tree_height() as usize);
    for (j, node) in out.iter_mut().enumerate() {
        let sibling = (leaf >> j) ^ 1;
        *node = treehash::<H, N>(sk_seed, pub_seed, subtree, sibling << j, j as u32, params);
    }
}

/// Walk an authentication path from `leaf` at `leaf_idx` up to the root.
///
/// RFC 8391, Algorithm 13 steps 5-13. `auth` is `tree_height * n` bytes; the
/// bit of `leaf_idx` at each level decides which side the running node is on.
pub fn compute_root<H: HashSuite<N>, const N: usize>(
    leaf: &[u8; N],
    leaf_idx: u32,
    auth: &[u8],
    pub_seed: &[u8; N],
    subtree: &Address,
) -> [u8; N] {
    let mut node = *leaf;
    let mut sibling = [0u8; N];

    for (k, chunk) in auth.chunks_exact(N).enumerate() {
        let k = k as u32;
        sibling.copy_from_slice(chunk);
        let mut adrs = subtree.node_for(k, leaf_idx >> (k + 1));
        node = if (leaf_idx >> k) & 1 == 0 {
            H::h(&node, &sibling, pub_seed, &mut adrs)
        } else {
            H::h(&sibling, &node, pub_seed, &mut adrs)
        };
    }

    node
}
