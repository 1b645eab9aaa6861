//! Wake-word model set format (`srmodels.bin`)
//!
//! Aggregates named model groups, each a bundle of named member files, into
//! the blob the speech-recognition runtime loads from its model partition.
//! Names are raw 8-bit fields: each character keeps only the low byte of its
//! code point.
//!
//! # Layout
//! ```text
//! 0x00: group_count u32
//! per group (sorted by name):
//!       name [u8; 32]
//!       member_count u32
//!       per member (sorted by name):
//!             name [u8; 32]
//!             start u32     (absolute offset from the start of the blob)
//!             length u32
//! data area: member bytes concatenated in the same group/member order
//! ```
//!
//! The data area begins right after the last group header, so the first
//! member's `start` equals the total header length and each following start
//! advances by the previous member's length, continuous across groups.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::PackagingError;
use crate::packing::{
    NAME_LEN, pack_name_latin1, pack_u32, read_u32, to_u32, unpack_name,
};

const GROUP_HEADER_SIZE: usize = NAME_LEN + 4;
const MEMBER_HEADER_SIZE: usize = NAME_LEN + 4 + 4;

/// Summary of the registered groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSetStats {
    pub group_count: usize,
    pub member_count: usize,
    pub total_size: usize,
    pub groups: Vec<String>,
}

/// Builds a model set blob from group/member files.
///
/// Groups and members live in sorted maps, so header and data emission always
/// walk the same order.
#[derive(Debug, Default)]
pub struct ModelSetEncoder {
    groups: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl ModelSetEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one member file. Re-adding a member replaces its bytes.
    pub fn add_member_file(
        &mut self,
        group: impl Into<String>,
        member: impl Into<String>,
        data: Vec<u8>,
    ) {
        let group = group.into();
        let member = member.into();
        for name in [&group, &member] {
            if name.chars().count() > NAME_LEN {
                warn!("Model name '{}' exceeds {} characters and will be truncated", name, NAME_LEN);
            }
        }
        self.groups.entry(group).or_default().insert(member, data);
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn stats(&self) -> ModelSetStats {
        ModelSetStats {
            group_count: self.groups.len(),
            member_count: self.groups.values().map(BTreeMap::len).sum(),
            total_size: self
                .groups
                .values()
                .flat_map(BTreeMap::values)
                .map(Vec::len)
                .sum(),
            groups: self.groups.keys().cloned().collect(),
        }
    }

    /// Total size of the group count and every group/member header
    fn header_len(&self) -> usize {
        4 + self
            .groups
            .values()
            .map(|members| GROUP_HEADER_SIZE + members.len() * MEMBER_HEADER_SIZE)
            .sum::<usize>()
    }

    /// Encode every registered group.
    pub fn pack(&self) -> Result<Vec<u8>, PackagingError> {
        if self.groups.is_empty() {
            return Err(PackagingError::NoModels);
        }

        let header_len = self.header_len();
        let data_len: usize = self.stats().total_size;
        let mut out = Vec::with_capacity(header_len + data_len);

        pack_u32(&mut out, to_u32(self.groups.len(), "model group count")?);
        let mut start = header_len;
        for (group, members) in &self.groups {
            out.extend_from_slice(&pack_name_latin1(group));
            pack_u32(&mut out, to_u32(members.len(), "model member count")?);
            for (member, data) in members {
                out.extend_from_slice(&pack_name_latin1(member));
                pack_u32(&mut out, to_u32(start, "model member offset")?);
                pack_u32(&mut out, to_u32(data.len(), "model member length")?);
                start += data.len();
            }
        }
        debug_assert_eq!(out.len(), header_len);

        for data in self.groups.values().flat_map(BTreeMap::values) {
            out.extend_from_slice(data);
        }
        Ok(out)
    }
}

/// One decoded model member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMember<'a> {
    pub name: String,
    pub start: u32,
    pub data: &'a [u8],
}

/// One decoded model group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGroup<'a> {
    pub name: String,
    pub members: Vec<ModelMember<'a>>,
}

impl<'a> ModelGroup<'a> {
    pub fn member(&self, name: &str) -> Option<&ModelMember<'a>> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Decoded view over a model set blob.
#[derive(Debug, Clone)]
pub struct ModelSetReader<'a> {
    groups: Vec<ModelGroup<'a>>,
}

impl<'a> ModelSetReader<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, PackagingError> {
        let truncated = |what: &str, needed: usize| PackagingError::Truncated {
            what: what.to_string(),
            needed,
            available: bytes.len(),
        };

        let group_count = read_u32(bytes, 0).ok_or_else(|| truncated("model group count", 4))?;
        let mut cursor = 4usize;
        let mut groups = Vec::new();

        for _ in 0..group_count {
            let name_field = bytes
                .get(cursor..cursor + NAME_LEN)
                .ok_or_else(|| truncated("model group header", cursor + GROUP_HEADER_SIZE))?;
            let member_count = read_u32(bytes, cursor + NAME_LEN)
                .ok_or_else(|| truncated("model group header", cursor + GROUP_HEADER_SIZE))?;
            let name = unpack_name(name_field);
            cursor += GROUP_HEADER_SIZE;

            let mut members = Vec::new();
            for _ in 0..member_count {
                let needed = cursor + MEMBER_HEADER_SIZE;
                let member_field = bytes
                    .get(cursor..cursor + NAME_LEN)
                    .ok_or_else(|| truncated("model member header", needed))?;
                let start = read_u32(bytes, cursor + NAME_LEN)
                    .ok_or_else(|| truncated("model member header", needed))?;
                let length = read_u32(bytes, cursor + NAME_LEN + 4)
                    .ok_or_else(|| truncated("model member header", needed))?;
                let member_name = unpack_name(member_field);
                cursor = needed;

                let end = start as usize + length as usize;
                let data = bytes.get(start as usize..end).ok_or_else(|| {
                    PackagingError::InvalidLayout(format!(
                        "member '{}/{}' spans {}..{} past {} bytes",
                        name,
                        member_name,
                        start,
                        end,
                        bytes.len()
                    ))
                })?;
                members.push(ModelMember {
                    name: member_name,
                    start,
                    data,
                });
            }
            groups.push(ModelGroup { name, members });
        }

        Ok(Self { groups })
    }

    /// Groups in header order
    pub fn groups(&self) -> &[ModelGroup<'a>] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&ModelGroup<'a>> {
        self.groups.iter().find(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelSetEncoder {
        let mut encoder = ModelSetEncoder::new();
        encoder.add_member_file("b", "y", vec![3, 3, 3]);
        encoder.add_member_file("b", "x", vec![2, 2]);
        encoder.add_member_file("a", "z", vec![1]);
        encoder
    }

    #[test]
    fn test_empty_fails() {
        assert_eq!(ModelSetEncoder::new().pack(), Err(PackagingError::NoModels));
    }

    #[test]
    fn test_group_and_member_order() {
        let blob = sample().pack().unwrap();
        let reader = ModelSetReader::parse(&blob).unwrap();

        let groups: Vec<_> = reader.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, ["a", "b"]);
        let members: Vec<_> = reader.groups()[1]
            .members
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(members, ["x", "y"]);
    }

    #[test]
    fn test_header_bytes() {
        let blob = sample().pack().unwrap();
        // count + a(36 + 1*40) + b(36 + 2*40)
        let header_len = 4 + (36 + 40) + (36 + 80);
        assert_eq!(blob.len(), header_len + 6);

        assert_eq!(read_u32(&blob, 0), Some(2));
        assert_eq!(&blob[4..5], b"a");
        assert!(blob[5..36].iter().all(|&b| b == 0));
        assert_eq!(read_u32(&blob, 36), Some(1));
        assert_eq!(&blob[40..41], b"z");
        assert_eq!(read_u32(&blob, 72), Some(header_len as u32));
        assert_eq!(read_u32(&blob, 76), Some(1));
    }

    #[test]
    fn test_starts_run_through_data_area() {
        let blob = sample().pack().unwrap();
        let reader = ModelSetReader::parse(&blob).unwrap();
        let header_len = 4 + (36 + 40) + (36 + 80);

        let mut running = 0usize;
        for group in reader.groups() {
            for member in &group.members {
                assert_eq!(member.start as usize - header_len, running);
                running += member.data.len();
            }
        }
        assert_eq!(running, 6);

        // Data area is z, x, y
        assert_eq!(&blob[header_len..], &[1, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_round_trip_member_bytes() {
        let blob = sample().pack().unwrap();
        let reader = ModelSetReader::parse(&blob).unwrap();
        let b = reader.group("b").unwrap();
        assert_eq!(b.member("x").unwrap().data, &[2, 2]);
        assert_eq!(b.member("y").unwrap().data, &[3, 3, 3]);
        assert_eq!(reader.group("a").unwrap().member("z").unwrap().data, &[1]);
    }

    #[test]
    fn test_replacing_member() {
        let mut encoder = sample();
        encoder.add_member_file("a", "z", vec![9, 9]);
        let stats = encoder.stats();
        assert_eq!(stats.member_count, 3);
        assert_eq!(stats.total_size, 7);
    }

    #[test]
    fn test_latin1_names() {
        let mut encoder = ModelSetEncoder::new();
        encoder.add_member_file("wn9_héllo", "_MODEL_INFO_", vec![0]);
        let blob = encoder.pack().unwrap();
        assert_eq!(blob[4 + 5], 0xE9);
    }

    #[test]
    fn test_stats_and_clear() {
        let mut encoder = sample();
        let stats = encoder.stats();
        assert_eq!(stats.group_count, 2);
        assert_eq!(stats.member_count, 3);
        assert_eq!(stats.total_size, 6);
        assert_eq!(stats.groups, ["a", "b"]);

        encoder.clear();
        assert!(encoder.is_empty());
        assert_eq!(encoder.pack(), Err(PackagingError::NoModels));
    }

    #[test]
    fn test_reader_rejects_truncated() {
        let blob = sample().pack().unwrap();
        assert!(ModelSetReader::parse(&blob[..50]).is_err());
        assert!(matches!(
            ModelSetReader::parse(&blob[..blob.len() - 1]),
            Err(PackagingError::InvalidLayout(_))
        ));
    }
}
