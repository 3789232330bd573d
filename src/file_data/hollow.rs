//! Hollow files only know how long they are. They're used for size bookkeeping on files we never
//! want to load.

use tracing::trace;
use crate::error::Result;
use crate::operation::EditOperation;
use super::RawFileData;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HollowBinaryFileData {
    byte_length: usize,
}

impl HollowBinaryFileData {
    pub fn new(byte_length: usize) -> Self { HollowBinaryFileData { byte_length } }

    pub fn byte_length(&self) -> usize { self.byte_length }

    pub fn to_raw(&self) -> RawFileData {
        RawFileData { byte_length: Some(self.byte_length), ..Default::default() }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HollowStringFileData {
    string_length: usize,
}

impl HollowStringFileData {
    pub fn new(string_length: usize) -> Self { HollowStringFileData { string_length } }

    /// Length in UTF-16 code units.
    pub fn string_length(&self) -> usize { self.string_length }

    /// Hollow strings follow edits at the length level. There's no text to change.
    pub fn edit(&mut self, op: &EditOperation) -> Result<()> {
        self.string_length = op.apply_to_length(self.string_length)?;
        trace!(string_length = self.string_length, "edited hollow string");
        Ok(())
    }

    pub fn to_raw(&self) -> RawFileData {
        RawFileData { string_length: Some(self.string_length), ..Default::default() }
    }
}
