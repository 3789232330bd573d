use super::hollow::HollowBinaryFileData;
use super::RawFileData;

/// A reference to a binary blob. Binary files are never edited.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BinaryFileData {
    hash: String,
    byte_length: usize,
}

impl BinaryFileData {
    pub fn new(hash: impl Into<String>, byte_length: usize) -> Self {
        BinaryFileData { hash: hash.into(), byte_length }
    }

    pub fn hash(&self) -> &str { &self.hash }

    pub fn byte_length(&self) -> usize { self.byte_length }

    pub fn to_hollow(&self) -> HollowBinaryFileData {
        HollowBinaryFileData::new(self.byte_length)
    }

    pub fn to_raw(&self) -> RawFileData {
        RawFileData {
            hash: Some(self.hash.clone()),
            byte_length: Some(self.byte_length),
            ..Default::default()
        }
    }
}
