//! Permission codes and permission sets
//!
//! A code is one capability from a closed alphabet. Each code owns one bit of a
//! [`PermissionSet`] mask, so membership is an exact bit test and one code's
//! letter can never be mistaken for part of another's.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::LETTERS;
use crate::error::{Error, Result};

/// A single capability on a content node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PermissionCode {
    /// Sentinel for "nothing configured here"; never a valid query
    None = 0,
    CultureAndHostnames,
    AuditTrail,
    Browse,
    ChangeDocumentType,
    Copy,
    Delete,
    Move,
    Create,
    PublicAccess,
    Unpublish,
    Permissions,
    Rollback,
    SendToTranslation,
    Sort,
    SendToPublish,
    Translate,
    Update,
}

impl PermissionCode {
    /// Every code in canonical order, sentinel first
    pub const ALL: [PermissionCode; 18] = [
        PermissionCode::None,
        PermissionCode::CultureAndHostnames,
        PermissionCode::AuditTrail,
        PermissionCode::Browse,
        PermissionCode::ChangeDocumentType,
        PermissionCode::Copy,
        PermissionCode::Delete,
        PermissionCode::Move,
        PermissionCode::Create,
        PermissionCode::PublicAccess,
        PermissionCode::Unpublish,
        PermissionCode::Permissions,
        PermissionCode::Rollback,
        PermissionCode::SendToTranslation,
        PermissionCode::Sort,
        PermissionCode::SendToPublish,
        PermissionCode::Translate,
        PermissionCode::Update,
    ];

    #[inline]
    pub const fn bit(self) -> u32 {
        1 << (self as u8)
    }

    /// The single-letter form used by the assigning system
    pub fn letter(self) -> char {
        LETTERS[self as usize].1
    }

    pub fn name(self) -> &'static str {
        LETTERS[self as usize].2
    }

    pub fn from_letter(c: char) -> Result<Self> {
        LETTERS
            .iter()
            .find(|(_, l, _)| *l == c)
            .map(|(code, _, _)| *code)
            .ok_or(Error::UnknownPermission(c))
    }

    pub fn is_none(self) -> bool {
        self == PermissionCode::None
    }
}

impl fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PermissionCode {
    type Err = Error;

    /// Accepts either the snake_case name or the single letter
    fn from_str(s: &str) -> Result<Self> {
        if let Some((code, _, _)) = LETTERS.iter().find(|(_, _, n)| *n == s) {
            return Ok(*code);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_letter(c),
            _ => Err(Error::UnknownPermissionName(s.to_string())),
        }
    }
}

/// Mask covering every defined code
const VALID_BITS: u32 = (1 << PermissionCode::ALL.len()) - 1;

/// A set of permission codes recorded for one group at one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PermissionSet(u32);

impl PermissionSet {
    pub const EMPTY: PermissionSet = PermissionSet(0);

    /// The "no permissions" assignment: exactly `{None}`
    pub const SENTINEL: PermissionSet = PermissionSet(PermissionCode::None.bit());

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build from a raw mask, rejecting bits outside the alphabet
    pub fn from_bits(bits: u32) -> Option<Self> {
        (bits & !VALID_BITS == 0).then_some(PermissionSet(bits))
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn with(mut self, code: PermissionCode) -> Self {
        self.insert(code);
        self
    }

    #[inline]
    pub fn insert(&mut self, code: PermissionCode) {
        self.0 |= code.bit();
    }

    #[inline]
    pub fn remove(&mut self, code: PermissionCode) {
        self.0 &= !code.bit();
    }

    #[inline]
    pub fn contains(self, code: PermissionCode) -> bool {
        self.0 & code.bit() != 0
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True for the set holding only the sentinel code
    #[inline]
    pub fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }

    /// The only member of a one-element set
    pub fn single(self) -> Option<PermissionCode> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Members in canonical order
    pub fn iter(self) -> impl Iterator<Item = PermissionCode> {
        PermissionCode::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Parse the aggregated letter form, e.g. `"FA"` for browse + update
    pub fn parse_letters(s: &str) -> Result<Self> {
        s.chars()
            .map(PermissionCode::from_letter)
            .collect::<Result<Vec<_>>>()
            .map(|codes| codes.into_iter().collect())
    }

    /// Parse a list of letter strings as recorded by the assigning system,
    /// where one entry may aggregate several codes (`["FA"]`) or hold one
    /// code each (`["F", "A"]`)
    pub fn parse_legacy<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        entries.iter().try_fold(Self::EMPTY, |acc, e| {
            Ok(PermissionSet(acc.0 | Self::parse_letters(e.as_ref())?.0))
        })
    }

    /// Letter form in canonical order
    pub fn to_letters(self) -> String {
        self.iter().map(PermissionCode::letter).collect()
    }
}

impl From<PermissionCode> for PermissionSet {
    fn from(code: PermissionCode) -> Self {
        PermissionSet(code.bit())
    }
}

impl FromIterator<PermissionCode> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = PermissionCode>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, PermissionSet::with)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_letters())
    }
}

impl FromStr for PermissionSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_letters(s)
    }
}

// Serialized as the letter string so snapshots stay readable
impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_letters())
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_letters(&s).map_err(serde::de::Error::custom)
    }
}
