//! BDS tree traversal.
//!
//! Keeps the authentication path of the next unused leaf ready at all times,
//! spending a bounded number of leaf computations per signature instead of
//! rebuilding the path from scratch (Buchmann, Dahmen, Schneider, "Merkle
//! Tree Traversal Revisited", as used by the XMSS reference implementation).
//!
//! For a tree of height `h` with retain parameter `k` the state holds:
//!
//! - `auth`: the current authentication path (`h` nodes)
//! - `keep`: left nodes saved for the next merge (`h / 2` nodes)
//! - a node stack shared by all treehash instances (`h + 1` nodes)
//! - one treehash instance per height below `h - k`
//! - `retain`: right nodes of the top `k` levels (`2^k - k - 1` nodes)
//! - `next_leaf`: progress of building a following tree leaf by leaf
//!
//! All buffers are sized once in [`BdsState::new`]; signing never allocates.

use crate::address::Address;
use crate::hash::HashSuite;
use crate::params::Params;
use crate::treehash::gen_leaf;
use crate::utils::{to_int, write_int};
use kestrel_core::{Error, Result};
use zeroize::Zeroize;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Bytes per serialized treehash instance besides its node:
/// `h (4) || next_idx (4) || stack_usage (1) || completed (1)`.
const TREEHASH_META_BYTES: usize = 10;

/// One incremental treehash computation for a single height.
#[derive(Clone, Zeroize)]
struct TreehashInst<const N: usize> {
    node: [u8; N],
    h: u32,
    next_idx: u32,
    stack_usage: u32,
    completed: bool,
}

impl<const N: usize> TreehashInst<N> {
    fn idle(h: u32) -> Self {
        Self {
            node: [0u8; N],
            h,
            next_idx: 0,
            stack_usage: 0,
            completed: true,
        }
    }
}

/// Work counters of a BDS state.
///
/// Not part of the serialized state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BdsCounters {
    /// Leaves computed (WOTS+ key generation plus L-tree).
    pub leaves: u64,
    /// Hash tree merges.
    pub merges: u64,
}

/// BDS traversal state of one tree.
#[derive(Clone, Zeroize)]
pub struct BdsState<const N: usize> {
    tree_height: u32,
    k: u32,
    auth: Vec<[u8; N]>,
    keep: Vec<[u8; N]>,
    stack: Vec<[u8; N]>,
    stack_levels: Vec<u8>,
    stack_offset: usize,
    treehash: Vec<TreehashInst<N>>,
    retain: Vec<[u8; N]>,
    next_leaf: u32,
    #[zeroize(skip)]
    counters: BdsCounters,
}

impl<const N: usize> BdsState<N> {
    /// Allocate an empty state for one tree of `params` with retain parameter `k`.
    pub fn new(params: &Params, k: u32) -> Result<Self> {
        params.check_bds_k(k)?;
        let h = params.tree_height();
        let th = h as usize;
        let low = (h - k) as usize;

        Ok(Self {
            tree_height: h,
            k,
            auth: vec![[0u8; N]; th],
            keep: vec![[0u8; N]; th / 2],
            stack: vec![[0u8; N]; th + 1],
            stack_levels: vec![0u8; th + 1],
            stack_offset: 0,
            treehash: (0..low as u32).map(TreehashInst::idle).collect(),
            retain: vec![[0u8; N]; retain_len(k)],
            next_leaf: 0,
            counters: BdsCounters::default(),
        })
    }

    /// Height of the tree this state traverses.
    #[must_use]
    pub fn tree_height(&self) -> u32 {
        self.tree_height
    }

    /// Retain parameter `k`.
    #[must_use]
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Leaf computations granted to [`Self::treehash_update`] per signature,
    /// `ceil((h - k) / 2)`.
    #[must_use]
    pub fn budget(&self) -> u32 {
        (self.tree_height - self.k).div_ceil(2)
    }

    /// Current authentication path, lowest level first.
    #[must_use]
    pub fn auth(&self) -> &[[u8; N]] {
        &self.auth
    }

    /// Write the current authentication path into `out` (`h * n` bytes).
    pub fn write_auth(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.auth.len() * N);
        for (chunk, node) in out.chunks_exact_mut(N).zip(self.auth.iter()) {
            chunk.copy_from_slice(node);
        }
    }

    /// Number of leaves already added by [`Self::state_update`].
    #[must_use]
    pub fn next_leaf(&self) -> u32 {
        self.next_leaf
    }

    /// Whether every leaf of a following tree has been added.
    #[must_use]
    pub fn is_next_tree_complete(&self) -> bool {
        self.next_leaf == 1 << self.tree_height
    }

    /// Work counters since creation or deserialization.
    #[must_use]
    pub fn counters(&self) -> BdsCounters {
        self.counters
    }

    fn leaf<H: HashSuite<N>>(
        &mut self,
        idx: u32,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) -> [u8; N] {
        self.counters.leaves += 1;
        gen_leaf::<H, N>(sk_seed, pub_seed, subtree, idx, params)
    }

    /// Store a right node of the tree being built if a later path needs it.
    fn capture(&mut self, height: u32, index: u32, node: &[u8; N]) -> Result<()> {
        let th = self.tree_height;
        if height >= th || index & 1 == 0 {
            return Err(Error::EncodingError);
        }
        let slot = if index == 1 {
            self.auth.get_mut(height as usize)
        } else if height < th - self.k {
            if index != 3 {
                return Ok(());
            }
            self.treehash.get_mut(height as usize).map(|inst| &mut inst.node)
        } else {
            let offset = (1usize << (th - 1 - height)) + height as usize - th as usize;
            let row = ((index - 3) >> 1) as usize;
            self.retain.get_mut(offset + row)
        };
        *slot.ok_or(Error::EncodingError)? = *node;
        Ok(())
    }

    /// Build the whole tree and set up the path for leaf 0. Returns the root.
    ///
    /// `subtree` addresses the tree (layer and tree index).
    pub fn init<H: HashSuite<N>>(
        &mut self,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) -> Result<[u8; N]> {
        for (i, inst) in self.treehash.iter_mut().enumerate() {
            *inst = TreehashInst::idle(i as u32);
        }
        self.stack_offset = 0;
        self.next_leaf = 0;
        self.complete_next_tree::<H>(sk_seed, pub_seed, subtree, params)
    }

    /// Add the next leaf of a tree under construction.
    ///
    /// Returns `Ok(false)` once all `2^h` leaves have been added, and
    /// [`Error::EncodingError`] if the stack does not fit the leaf counter.
    pub fn state_update<H: HashSuite<N>>(
        &mut self,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) -> Result<bool> {
        if self.is_next_tree_complete() {
            return Ok(false);
        }
        if self.stack_offset >= self.stack.len() {
            return Err(Error::EncodingError);
        }
        let idx = self.next_leaf;
        let leaf = self.leaf::<H>(idx, sk_seed, pub_seed, subtree, params);

        self.stack[self.stack_offset] = leaf;
        self.stack_levels[self.stack_offset] = 0;
        self.stack_offset += 1;

        while self.stack_offset > 1
            && self.stack_levels[self.stack_offset - 1] == self.stack_levels[self.stack_offset - 2]
        {
            let top = self.stack[self.stack_offset - 1];
            let height = u32::from(self.stack_levels[self.stack_offset - 1]);
            self.capture(height, idx >> height, &top)?;

            let mut adrs = subtree.node_for(height, idx >> (height + 1));
            let left = &self.stack[self.stack_offset - 2];
            self.stack[self.stack_offset - 2] = H::h(left, &top, pub_seed, &mut adrs);
            self.counters.merges += 1;

            self.stack_levels[self.stack_offset - 2] += 1;
            self.stack_offset -= 1;
        }

        self.next_leaf += 1;
        Ok(true)
    }

    /// Add all leaves still missing from the tree under construction and take
    /// its root off the stack.
    pub fn complete_next_tree<H: HashSuite<N>>(
        &mut self,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) -> Result<[u8; N]> {
        while self.state_update::<H>(sk_seed, pub_seed, subtree, params)? {}
        if self.stack_offset != 1 {
            return Err(Error::EncodingError);
        }
        self.stack_offset = 0;
        Ok(self.stack[0])
    }

    /// Forget a previous construction so this state can build a following tree.
    ///
    /// Treehash instances are left idle; a following tree is built with
    /// [`Self::state_update`] only.
    pub fn reset_next_tree(&mut self) {
        self.stack_offset = 0;
        self.next_leaf = 0;
        self.mark_treehash_completed();
    }

    /// Mark every treehash instance as idle.
    ///
    /// Needed when a state built by [`Self::state_update`] becomes the current
    /// state: its instances still carry the progress of an earlier tree.
    pub fn mark_treehash_completed(&mut self) {
        for inst in &mut self.treehash {
            inst.completed = true;
            inst.stack_usage = 0;
        }
    }

    /// Turn the path of `leaf` into the path of `leaf + 1`.
    ///
    /// Must not be called for the last leaf of the tree.
    pub fn round<H: HashSuite<N>>(
        &mut self,
        leaf: u32,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) {
        let th = self.tree_height;
        let low = th - self.k;
        debug_assert!(leaf < (1 << th) - 1);

        // Height of the lowest zero bit of the leaf index.
        let tau = (0..th).find(|&i| (leaf >> i) & 1 == 0).unwrap_or(th);

        let mut left = [0u8; N];
        let mut right = [0u8; N];
        if tau > 0 {
            left = self.auth[(tau - 1) as usize];
            // Read before `keep` is refreshed below.
            right = self.keep[((tau - 1) >> 1) as usize];
        }
        if (leaf >> (tau + 1)) & 1 == 0 && tau < th - 1 {
            self.keep[(tau >> 1) as usize] = self.auth[tau as usize];
        }

        if tau == 0 {
            self.auth[0] = self.leaf::<H>(leaf, sk_seed, pub_seed, subtree, params);
            return;
        }

        let mut adrs = subtree.node_for(tau - 1, leaf >> tau);
        self.auth[tau as usize] = H::h(&left, &right, pub_seed, &mut adrs);
        self.counters.merges += 1;

        for i in 0..tau {
            self.auth[i as usize] = if i < low {
                self.treehash[i as usize].node
            } else {
                let offset = (1usize << (th - 1 - i)) + i as usize - th as usize;
                let row = (((leaf >> i) - 1) >> 1) as usize;
                self.retain[offset + row]
            };
        }

        for i in 0..tau.min(low) {
            let start = leaf + 1 + 3 * (1 << i);
            if start < 1 << th {
                let inst = &mut self.treehash[i as usize];
                inst.h = i;
                inst.next_idx = start;
                inst.completed = false;
                inst.stack_usage = 0;
            }
        }
    }

    /// Lowest stack height reached by the unfinished instance using the top
    /// `usage` stack entries.
    fn min_height_on_stack(&self, usage: u32) -> u32 {
        (0..usage as usize)
            .map(|j| u32::from(self.stack_levels[self.stack_offset - 1 - j]))
            .fold(self.tree_height, u32::min)
    }

    /// Spend up to `budget` leaf computations on the treehash instances.
    ///
    /// Each step advances the unfinished instance whose lowest node is lowest.
    /// Returns the unspent budget.
    pub fn treehash_update<H: HashSuite<N>>(
        &mut self,
        budget: u32,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) -> Result<u32> {
        let th = self.tree_height;
        let count = self.treehash.len();
        let mut spent = 0;

        while spent < budget {
            let mut level = count;
            let mut l_min = th;
            for (i, inst) in self.treehash.iter().enumerate() {
                let low = if inst.completed {
                    th
                } else if inst.stack_usage == 0 {
                    i as u32
                } else {
                    self.min_height_on_stack(inst.stack_usage)
                };
                if low < l_min {
                    level = i;
                    l_min = low;
                }
            }
            if level == count {
                break;
            }
            self.treehash_step::<H>(level, sk_seed, pub_seed, subtree, params)?;
            spent += 1;
        }

        Ok(budget - spent)
    }

    /// Add one leaf to treehash instance `i`.
    fn treehash_step<H: HashSuite<N>>(
        &mut self,
        i: usize,
        sk_seed: &[u8; N],
        pub_seed: &[u8; N],
        subtree: &Address,
        params: &Params,
    ) -> Result<()> {
        let idx = self.treehash.get(i).ok_or(Error::EncodingError)?.next_idx;
        let mut node = self.leaf::<H>(idx, sk_seed, pub_seed, subtree, params);
        let mut height = 0u32;

        while self.treehash[i].stack_usage > 0 {
            let top = self.stack_offset.checked_sub(1).ok_or(Error::EncodingError)?;
            if u32::from(self.stack_levels[top]) != height {
                break;
            }
            let mut adrs = subtree.node_for(height, idx >> (height + 1));
            node = H::h(&self.stack[top], &node, pub_seed, &mut adrs);
            self.counters.merges += 1;
            height += 1;
            self.treehash[i].stack_usage -= 1;
            self.stack_offset = top;
        }

        let inst = &mut self.treehash[i];
        if height == inst.h {
            inst.node = node;
            inst.completed = true;
        } else {
            let slot = self.stack.get_mut(self.stack_offset).ok_or(Error::EncodingError)?;
            *slot = node;
            self.stack_levels[self.stack_offset] = height as u8;
            self.stack_offset += 1;
            inst.stack_usage += 1;
            inst.next_idx += 1;
        }
        Ok(())
    }

    /// Check the stack bookkeeping against the tree shape.
    ///
    /// A state under construction (`next_leaf < 2^h`) holds one stack node per
    /// set bit of `next_leaf`, highest first, and no treehash progress. A
    /// complete state holds only treehash nodes, or just its finished root.
    pub fn check(&self) -> Result<()> {
        let th = self.tree_height;
        let full = 1u32 << th;
        let offset = self.stack_offset;
        if offset > self.stack.len() || self.next_leaf > full {
            return Err(Error::EncodingError);
        }

        let mut usage = 0usize;
        for (i, inst) in self.treehash.iter().enumerate() {
            if inst.h != i as u32 || inst.stack_usage > inst.h || inst.next_idx > full {
                return Err(Error::EncodingError);
            }
            usage += inst.stack_usage as usize;
        }

        let levels = &self.stack_levels[..offset];
        let consistent = if self.next_leaf < full {
            let bits = (0..th).rev().filter(|&b| (self.next_leaf >> b) & 1 == 1);
            usage == 0 && levels.iter().map(|&l| u32::from(l)).eq(bits)
        } else if usage == 0 && offset == 1 {
            u32::from(levels[0]) == th
        } else {
            usage == offset && levels.iter().all(|&l| u32::from(l) < th)
        };
        if !consistent || self.stack_levels.iter().any(|&l| u32::from(l) > th) {
            return Err(Error::EncodingError);
        }
        Ok(())
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Encoded size of a state for one tree of `params` with retain parameter `k`.
    #[must_use]
    pub fn serialized_size(params: &Params, k: u32) -> usize {
        let th = params.tree_height() as usize;
        let low = th - k as usize;
        th * N
            + (th / 2) * N
            + (th + 1) * N
            + (th + 1)
            + 4
            + low * (N + TREEHASH_META_BYTES)
            + retain_len(k) * N
            + 4
    }

    /// Serialize into `out`, which must be exactly [`Self::serialized_size`] bytes.
    pub fn write_to(&self, out: &mut [u8]) {
        let mut w = Writer { buf: out, pos: 0 };
        for node in self.auth.iter().chain(&self.keep).chain(&self.stack) {
            w.put(node);
        }
        w.put(&self.stack_levels);
        w.put_int(self.stack_offset as u64, 4);
        for inst in &self.treehash {
            w.put(&inst.node);
            w.put_int(u64::from(inst.h), 4);
            w.put_int(u64::from(inst.next_idx), 4);
            w.put_int(u64::from(inst.stack_usage), 1);
            w.put_int(u64::from(inst.completed), 1);
        }
        for node in &self.retain {
            w.put(node);
        }
        w.put_int(u64::from(self.next_leaf), 4);
        debug_assert_eq!(w.pos, w.buf.len());
    }

    /// Deserialize a state, checking every counter against the tree shape.
    pub fn from_bytes(params: &Params, k: u32, bytes: &[u8]) -> Result<Self> {
        let expected = Self::serialized_size(params, k);
        if bytes.len() != expected {
            return Err(Error::InvalidStateLength {
                expected,
                actual: bytes.len(),
            });
        }

        let mut state = Self::new(params, k)?;
        let th = state.tree_height;
        let mut r = Reader { buf: bytes, pos: 0 };

        for node in state
            .auth
            .iter_mut()
            .chain(state.keep.iter_mut())
            .chain(state.stack.iter_mut())
        {
            node.copy_from_slice(r.take(N));
        }
        state.stack_levels.copy_from_slice(r.take(th as usize + 1));
        state.stack_offset = r.int(4) as usize;

        for inst in &mut state.treehash {
            inst.node.copy_from_slice(r.take(N));
            inst.h = r.int(4) as u32;
            inst.next_idx = r.int(4) as u32;
            inst.stack_usage = r.int(1) as u32;
            inst.completed = match r.int(1) {
                0 => false,
                1 => true,
                _ => return Err(Error::EncodingError),
            };
        }
        for node in &mut state.retain {
            node.copy_from_slice(r.take(N));
        }
        state.next_leaf = r.int(4) as u32;

        state.check()?;
        Ok(state)
    }
}

#[cfg(test)]
impl<const N: usize> BdsState<N> {
    /// Mark the whole node stack as in use without any owner.
    pub(crate) fn overfill_stack(&mut self) {
        self.stack_offset = self.stack.len();
    }
}

/// Number of retained nodes for the top `k` levels.
const fn retain_len(k: u32) -> usize {
    (1usize << k) - k as usize - 1
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_int(&mut self, value: u64, width: usize) {
        write_int(&mut self.buf[self.pos..self.pos + width], value);
        self.pos += width;
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> &'a [u8] {
        let buf: &'a [u8] = self.buf;
        let out = &buf[self.pos..self.pos + len];
        self.pos += len;
        out
    }

    fn int(&mut self, width: usize) -> u64 {
        to_int(self.take(width))
    }
}
