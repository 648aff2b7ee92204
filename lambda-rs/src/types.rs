/// Index into the query database.
pub type QueryIdx = usize;
/// Index into the subject database; doubles as the SAM reference sequence id.
pub type SubjectIdx = usize;

// Fast hash maps using AHash instead of the default SipHash.
pub(crate) type HashMap<K, V> = ahash::HashMap<K, V>;
