use slotmap::new_key_type;

// Stable arena keys; parent links are stored as keys rather than references.
new_key_type! {
    pub struct AtomId;
    pub struct ResidueId;
    pub struct ChainId;
}
