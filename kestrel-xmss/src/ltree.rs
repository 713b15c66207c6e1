//! L-tree: compression of a WOTS+ public key into a single Merkle leaf.
//!
//! RFC 8391, Algorithm 8.

use crate::address::Address;
use crate::hash::HashSuite;

/// Fold `len` WOTS+ public key values into one leaf.
///
/// Nodes are combined pairwise with H at increasing heights; an unpaired last
/// node is carried to the next height unchanged. `pk` is used as scratch space
/// and left in an unspecified state. `adrs` must be an L-tree address with its
/// L-tree index set.
pub fn ltree<H: HashSuite<N>, const N: usize>(
    pk: &mut [[u8; N]],
    pub_seed: &[u8; N],
    adrs: &mut Address,
) -> [u8; N] {
    debug_assert!(!pk.is_empty());
    let mut l = pk.len();
    let mut height = 0u32;

    while l > 1 {
        adrs.set_tree_height(height);
        let parents = l >> 1;
        for i in 0..parents {
            adrs.set_tree_index(i as u32);
            pk[i] = H::h(&pk[2 * i], &pk[2 * i + 1], pub_seed, adrs);
        }
        if l & 1 == 1 {
            pk[parents] = pk[l - 1];
            l = parents + 1;
        } else {
            l = parents;
        }
        height += 1;
    }

    pk[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_sha2::Sha2_256Hash;

    const N: usize = 32;

    fn leaves(count: usize) -> [[u8; N]; 8] {
        let mut out = [[0u8; N]; 8];
        for (i, leaf) in out.iter_mut().take(count).enumerate() {
            leaf.fill(i as u8 + 1);
        }
        out
    }

    #[test]
    fn test_ltree_single_node() {
        let mut pk = [[9u8; N]];
        let mut adrs = Address::new().ltree_for(0);
        assert_eq!(ltree::<Sha2_256Hash, N>(&mut pk, &[0u8; N], &mut adrs), [9u8; N]);
    }

    #[test]
    fn test_ltree_two_nodes() {
        let seed = [5u8; N];
        let pk = leaves(2);
        let mut work = [pk[0], pk[1]];

        let mut adrs = Address::subtree(0, 3).ltree_for(7);
        let root = ltree::<Sha2_256Hash, N>(&mut work, &seed, &mut adrs);

        let mut expected_adrs = Address::subtree(0, 3).ltree_for(7);
        let expected = Sha2_256Hash::h(&pk[0], &pk[1], &seed, &mut expected_adrs);
        assert_eq!(root, expected);
    }

    #[test]
    fn test_ltree_odd_node_is_carried() {
        // Three nodes: H(H(a, b), c) with c carried from height 0 to 1.
        let seed = [5u8; N];
        let pk = leaves(3);
        let mut work = [pk[0], pk[1], pk[2]];

        let base = Address::new().ltree_for(1);
        let root = ltree::<Sha2_256Hash, N>(&mut work, &seed, &mut base.clone());

        let mut adrs = base;
        adrs.set_tree_height(0);
        adrs.set_tree_index(0);
        let ab = Sha2_256Hash::h(&pk[0], &pk[1], &seed, &mut adrs);
        adrs.set_tree_height(1);
        adrs.set_tree_index(0);
        let expected = Sha2_256Hash::h(&ab, &pk[2], &seed, &mut adrs);

        assert_eq!(root, expected);
    }

    #[test]
    fn test_ltree_depends_on_ltree_index() {
        let seed = [5u8; N];
        let pk = leaves(5);
        let mut a = [pk[0], pk[1], pk[2], pk[3], pk[4]];
        let mut b = a;

        let ra = ltree::<Sha2_256Hash, N>(&mut a, &seed, &mut Address::new().ltree_for(0));
        let rb = ltree::<Sha2_256Hash, N>(&mut b, &seed, &mut Address::new().ltree_for(1));
        assert_ne!(ra, rb);
    }
}
