//! ADRS (Address) structure for domain separation in XMSS.
//!
//! Every keyed hash call in XMSS is bound to a 32-byte address made of eight
//! big-endian 32-bit words (RFC 8391, Section 2.5). Words 0-3 are shared by all
//! address types; words 4-7 depend on the type and are cleared whenever the
//! type changes.
//!
//! | Word | OTS            | L-tree         | Hash tree      |
//! |------|----------------|----------------|----------------|
//! | 0    | layer          | layer          | layer          |
//! | 1-2  | tree (64 bit)  | tree (64 bit)  | tree (64 bit)  |
//! | 3    | type = 0       | type = 1       | type = 2       |
//! | 4    | OTS address    | L-tree address | padding (0)    |
//! | 5    | chain address  | tree height    | tree height    |
//! | 6    | hash address   | tree index     | tree index     |
//! | 7    | key and mask   | key and mask   | key and mask   |

use zeroize::Zeroize;

/// ADRS type constants as defined in RFC 8391, Section 2.5.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdrsType {
    /// WOTS+ chain address.
    Ots = 0,
    /// L-tree address (WOTS+ public key compression).
    LTree = 1,
    /// Main Merkle tree node address.
    HashTree = 2,
}

/// 32-byte ADRS structure for domain separation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Zeroize)]
pub struct Address {
    bytes: [u8; 32],
}

impl Address {
    /// Create a new zeroed address.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: [0u8; 32] }
    }

    /// Create an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the serialized address (eight big-endian words).
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    fn word(&self, i: usize) -> u32 {
        let mut w = [0u8; 4];
        w.copy_from_slice(&self.bytes[4 * i..4 * i + 4]);
        u32::from_be_bytes(w)
    }

    fn set_word(&mut self, i: usize, value: u32) {
        self.bytes[4 * i..4 * i + 4].copy_from_slice(&value.to_be_bytes());
    }

    // =========================================================================
    // Common fields (words 0-3)
    // =========================================================================

    /// Set the layer address (word 0).
    pub fn set_layer(&mut self, layer: u32) {
        self.set_word(0, layer);
    }

    /// Get the layer address.
    #[must_use]
    pub fn layer(&self) -> u32 {
        self.word(0)
    }

    /// Set the 64-bit tree address (words 1-2).
    pub fn set_tree(&mut self, tree: u64) {
        self.bytes[4..12].copy_from_slice(&tree.to_be_bytes());
    }

    /// Get the tree address.
    #[must_use]
    pub fn tree(&self) -> u64 {
        let mut t = [0u8; 8];
        t.copy_from_slice(&self.bytes[4..12]);
        u64::from_be_bytes(t)
    }

    /// Set the address type (word 3) and zero words 4-7.
    pub fn set_type(&mut self, adrs_type: AdrsType) {
        self.set_word(3, adrs_type as u32);
        self.bytes[16..32].fill(0);
    }

    /// Get the raw address type.
    #[must_use]
    pub fn adrs_type(&self) -> u32 {
        self.word(3)
    }

    // =========================================================================
    // OTS fields
    // =========================================================================

    /// Set the OTS key pair address (word 4).
    pub fn set_ots(&mut self, ots: u32) {
        self.set_word(4, ots);
    }

    /// Get the OTS key pair address.
    #[must_use]
    pub fn ots(&self) -> u32 {
        self.word(4)
    }

    /// Set the chain address (word 5).
    pub fn set_chain(&mut self, chain: u32) {
        self.set_word(5, chain);
    }

    /// Get the chain address.
    #[must_use]
    pub fn chain(&self) -> u32 {
        self.word(5)
    }

    /// Set the hash address (word 6).
    pub fn set_hash(&mut self, hash: u32) {
        self.set_word(6, hash);
    }

    /// Get the hash address.
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.word(6)
    }

    // =========================================================================
    // L-tree and hash tree fields
    // =========================================================================

    /// Set the L-tree address (word 4).
    pub fn set_ltree(&mut self, ltree: u32) {
        self.set_word(4, ltree);
    }

    /// Get the L-tree address.
    #[must_use]
    pub fn ltree(&self) -> u32 {
        self.word(4)
    }

    /// Set the tree height (word 5).
    pub fn set_tree_height(&mut self, height: u32) {
        self.set_word(5, height);
    }

    /// Get the tree height.
    #[must_use]
    pub fn tree_height(&self) -> u32 {
        self.word(5)
    }

    /// Set the tree index (word 6).
    pub fn set_tree_index(&mut self, index: u32) {
        self.set_word(6, index);
    }

    /// Get the tree index.
    #[must_use]
    pub fn tree_index(&self) -> u32 {
        self.word(6)
    }

    /// Set the key-and-mask selector (word 7).
    pub fn set_key_and_mask(&mut self, key_and_mask: u32) {
        self.set_word(7, key_and_mask);
    }

    /// Get the key-and-mask selector.
    #[must_use]
    pub fn key_and_mask(&self) -> u32 {
        self.word(7)
    }

    // =========================================================================
    // Convenience constructors
    // =========================================================================

    /// Address of the subtree `tree` on `layer`, with all type fields zero.
    #[must_use]
    pub fn subtree(layer: u32, tree: u64) -> Self {
        let mut adrs = Self::new();
        adrs.set_layer(layer);
        adrs.set_tree(tree);
        adrs
    }

    /// OTS address for key pair `ots` of the subtree addressed by `self`.
    #[must_use]
    pub fn ots_for(&self, ots: u32) -> Self {
        let mut adrs = self.with_type(AdrsType::Ots);
        adrs.set_ots(ots);
        adrs
    }

    /// L-tree address for leaf `ltree` of the subtree addressed by `self`.
    #[must_use]
    pub fn ltree_for(&self, ltree: u32) -> Self {
        let mut adrs = self.with_type(AdrsType::LTree);
        adrs.set_ltree(ltree);
        adrs
    }

    /// Hash tree node address of the subtree addressed by `self`.
    #[must_use]
    pub fn node_for(&self, height: u32, index: u32) -> Self {
        let mut adrs = self.with_type(AdrsType::HashTree);
        adrs.set_tree_height(height);
        adrs.set_tree_index(index);
        adrs
    }

    /// Copy the address with a different type.
    #[must_use]
    pub fn with_type(&self, adrs_type: AdrsType) -> Self {
        let mut copy = *self;
        copy.set_type(adrs_type);
        copy
    }
}

impl core::fmt::Debug for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Address")
            .field("layer", &self.layer())
            .field("tree", &self.tree())
            .field("type", &self.adrs_type())
            .field("w4", &self.word(4))
            .field("w5", &self.word(5))
            .field("w6", &self.word(6))
            .field("key_and_mask", &self.key_and_mask())
            .finish()
    }
}
