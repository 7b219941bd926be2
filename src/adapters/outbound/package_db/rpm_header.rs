//! Decoder for the header blobs stored in an RPM database.
//!
//! A blob holds `index_count` and `data_length` (big-endian u32), then
//! `index_count` 16-byte entries `(tag, type, offset, count)`, then the
//! data store the entries point into.

use std::collections::HashMap;

pub const TAG_NAME: u32 = 1000;
pub const TAG_VERSION: u32 = 1001;
pub const TAG_RELEASE: u32 = 1002;
pub const TAG_EPOCH: u32 = 1003;
pub const TAG_LICENSE: u32 = 1014;
pub const TAG_ARCH: u32 = 1022;
pub const TAG_SOURCERPM: u32 = 1044;
pub const TAG_PROVIDENAME: u32 = 1047;
pub const TAG_REQUIRENAME: u32 = 1049;
pub const TAG_DIRINDEXES: u32 = 1116;
pub const TAG_BASENAMES: u32 = 1117;
pub const TAG_DIRNAMES: u32 = 1118;

const TYPE_INT32: u32 = 4;
const TYPE_STRING: u32 = 6;
const TYPE_STRING_ARRAY: u32 = 8;
const TYPE_I18NSTRING: u32 = 9;

const INDEX_ENTRY_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    data_type: u32,
    offset: usize,
    count: usize,
}

/// A parsed header: index entries by tag over the header's data store
#[derive(Debug)]
pub struct RpmHeader<'a> {
    entries: HashMap<u32, IndexEntry>,
    data: &'a [u8],
}

impl<'a> RpmHeader<'a> {
    /// # Errors
    /// Returns a description of the problem if the blob is truncated or
    /// an entry points outside the data store
    pub fn parse(blob: &'a [u8]) -> Result<Self, String> {
        let index_count = read_u32(blob, 0).ok_or("header blob shorter than its preamble")? as usize;
        let data_length = read_u32(blob, 4).ok_or("header blob shorter than its preamble")? as usize;

        let data_start = index_count
            .checked_mul(INDEX_ENTRY_SIZE)
            .and_then(|n| n.checked_add(8))
            .ok_or("header index count overflows")?;
        let data_end = data_start
            .checked_add(data_length)
            .ok_or("header data length overflows")?;
        if blob.len() < data_end {
            return Err(format!(
                "header blob truncated: {} bytes, expected at least {}",
                blob.len(),
                data_end
            ));
        }

        let mut entries = HashMap::with_capacity(index_count);
        for i in 0..index_count {
            let at = 8 + i * INDEX_ENTRY_SIZE;
            let (Some(tag), Some(data_type), Some(offset), Some(count)) = (
                read_u32(blob, at),
                read_u32(blob, at + 4),
                read_u32(blob, at + 8),
                read_u32(blob, at + 12),
            ) else {
                return Err(format!("header index entry {} is truncated", i));
            };
            let offset = offset as usize;
            if offset > data_length {
                return Err(format!("tag {} points outside the data store", tag));
            }
            entries.insert(
                tag,
                IndexEntry {
                    data_type,
                    offset,
                    count: count as usize,
                },
            );
        }

        Ok(Self {
            entries,
            data: &blob[data_start..data_end],
        })
    }

    /// First string of a STRING, I18NSTRING or STRING_ARRAY tag
    pub fn string(&self, tag: u32) -> Option<String> {
        let entry = self.entries.get(&tag)?;
        match entry.data_type {
            TYPE_STRING | TYPE_I18NSTRING | TYPE_STRING_ARRAY => {
                self.strings_at(tag, entry.offset, 1).ok()?.into_iter().next()
            }
            _ => None,
        }
    }

    /// # Errors
    /// Returns a description of the problem if the data store holds fewer
    /// strings than the entry's count
    pub fn string_array(&self, tag: u32) -> Result<Vec<String>, String> {
        match self.entries.get(&tag) {
            Some(entry) if entry.data_type == TYPE_STRING_ARRAY => {
                self.strings_at(tag, entry.offset, entry.count)
            }
            Some(entry) if entry.data_type == TYPE_STRING => self.strings_at(tag, entry.offset, 1),
            _ => Ok(Vec::new()),
        }
    }

    /// # Errors
    /// Returns a description of the problem if the entry's count runs past
    /// the end of the data store
    pub fn u32_array(&self, tag: u32) -> Result<Vec<u32>, String> {
        match self.entries.get(&tag) {
            Some(entry) if entry.data_type == TYPE_INT32 => {
                let fits = entry
                    .count
                    .checked_mul(4)
                    .and_then(|len| entry.offset.checked_add(len))
                    .is_some_and(|end| end <= self.data.len());
                if !fits {
                    return Err(format!(
                        "tag {} declares {} integers past the end of the data store",
                        tag, entry.count
                    ));
                }
                Ok((0..entry.count)
                    .filter_map(|i| read_u32(self.data, entry.offset + i * 4))
                    .collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn u32(&self, tag: u32) -> Result<Option<u32>, String> {
        Ok(self.u32_array(tag)?.into_iter().next())
    }

    /// Every string needs its NUL terminator, so a count larger than the
    /// remaining data store cannot be satisfied.
    fn strings_at(&self, tag: u32, offset: usize, count: usize) -> Result<Vec<String>, String> {
        let truncated = || {
            format!(
                "tag {} declares {} strings but the data store ends first",
                tag, count
            )
        };
        let rest = self.data.get(offset..).ok_or_else(truncated)?;
        if count > rest.len() {
            return Err(truncated());
        }

        let mut strings = Vec::with_capacity(count);
        let mut position = 0;
        for _ in 0..count {
            let remaining = &rest[position..];
            let len = remaining.iter().position(|&b| b == 0).ok_or_else(truncated)?;
            strings.push(String::from_utf8_lossy(&remaining[..len]).into_owned());
            position += len + 1;
        }
        Ok(strings)
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let slice = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Assembles header blobs for tests
#[cfg(test)]
pub(crate) mod builder {
    use super::*;

    #[derive(Default)]
    pub(crate) struct HeaderBuilder {
        entries: Vec<(u32, u32, usize, usize)>,
        data: Vec<u8>,
    }

    impl HeaderBuilder {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn string(mut self, tag: u32, value: &str) -> Self {
            let offset = self.data.len();
            self.data.extend_from_slice(value.as_bytes());
            self.data.push(0);
            self.entries.push((tag, TYPE_STRING, offset, 1));
            self
        }

        pub(crate) fn strings(mut self, tag: u32, values: &[&str]) -> Self {
            let offset = self.data.len();
            for value in values {
                self.data.extend_from_slice(value.as_bytes());
                self.data.push(0);
            }
            self.entries.push((tag, TYPE_STRING_ARRAY, offset, values.len()));
            self
        }

        pub(crate) fn ints(mut self, tag: u32, values: &[u32]) -> Self {
            while self.data.len() % 4 != 0 {
                self.data.push(0);
            }
            let offset = self.data.len();
            for value in values {
                self.data.extend_from_slice(&value.to_be_bytes());
            }
            self.entries.push((tag, TYPE_INT32, offset, values.len()));
            self
        }

        pub(crate) fn build(self) -> Vec<u8> {
            let mut blob = Vec::new();
            blob.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());
            blob.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
            for (tag, data_type, offset, count) in &self.entries {
                blob.extend_from_slice(&tag.to_be_bytes());
                blob.extend_from_slice(&data_type.to_be_bytes());
                blob.extend_from_slice(&(*offset as u32).to_be_bytes());
                blob.extend_from_slice(&(*count as u32).to_be_bytes());
            }
            blob.extend_from_slice(&self.data);
            blob
        }
    }
}

#[cfg(test)]
mod tests {
    use super::builder::HeaderBuilder;
    use super::*;

    #[test]
    fn test_parse_strings_and_ints() {
        let blob = HeaderBuilder::new()
            .string(TAG_NAME, "zlib")
            .strings(TAG_BASENAMES, &["zlib.h", "zconf.h"])
            .ints(TAG_DIRINDEXES, &[0, 0])
            .ints(TAG_EPOCH, &[1])
            .build();

        let header = RpmHeader::parse(&blob).unwrap();
        assert_eq!(header.string(TAG_NAME).as_deref(), Some("zlib"));
        assert_eq!(header.string_array(TAG_BASENAMES).unwrap(), vec!["zlib.h", "zconf.h"]);
        assert_eq!(header.u32_array(TAG_DIRINDEXES).unwrap(), vec![0, 0]);
        assert_eq!(header.u32(TAG_EPOCH).unwrap(), Some(1));
        assert_eq!(header.string(TAG_VERSION), None);
    }

    #[test]
    fn test_truncated_blob_is_rejected() {
        let mut blob = HeaderBuilder::new().string(TAG_NAME, "zlib").build();
        blob.truncate(blob.len() - 2);
        assert!(RpmHeader::parse(&blob).is_err());
        assert!(RpmHeader::parse(&[0, 0]).is_err());
    }

    #[test]
    fn test_offset_outside_data_is_rejected() {
        let mut blob = HeaderBuilder::new().string(TAG_NAME, "zlib").build();
        // offset field of the first index entry
        blob[16..20].copy_from_slice(&1000u32.to_be_bytes());
        assert!(RpmHeader::parse(&blob).is_err());
    }

    #[test]
    fn test_string_count_beyond_data_is_rejected() {
        let mut blob = HeaderBuilder::new()
            .strings(TAG_REQUIRENAME, &["glibc", "bash"])
            .build();
        // count field of the first index entry
        blob[20..24].copy_from_slice(&u32::MAX.to_be_bytes());

        let header = RpmHeader::parse(&blob).unwrap();
        assert!(header.string_array(TAG_REQUIRENAME).is_err());
        assert_eq!(header.string(TAG_REQUIRENAME).as_deref(), Some("glibc"));
    }

    #[test]
    fn test_string_count_short_of_terminators_is_rejected() {
        let mut blob = HeaderBuilder::new()
            .strings(TAG_BASENAMES, &["a.h", "b.h"])
            .build();
        blob[20..24].copy_from_slice(&3u32.to_be_bytes());

        let header = RpmHeader::parse(&blob).unwrap();
        assert!(header.string_array(TAG_BASENAMES).is_err());
    }

    #[test]
    fn test_int_count_beyond_data_is_rejected() {
        let mut blob = HeaderBuilder::new().ints(TAG_DIRINDEXES, &[0, 1]).build();
        blob[20..24].copy_from_slice(&u32::MAX.to_be_bytes());

        let header = RpmHeader::parse(&blob).unwrap();
        assert!(header.u32_array(TAG_DIRINDEXES).is_err());
    }
}
