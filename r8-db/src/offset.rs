// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Resolving signed offsets against a sequence length.

use crate::error::{Error, Result};

/// How an offset outside `[0, length)` is brought back into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    /// Offsets must lie in `[-length, length - 1]`; negatives count from the end.
    None,
    /// Circular wrap, any distance outside the range.
    Wrap,
    /// Clamp to `[-length, length - 1]`, then count negatives from the end.
    #[default]
    Restrict,
    /// Clamp straight to `[0, length - 1]`.
    Limit,
}

impl Wrap {
    /// Numeric flag value of this policy.
    pub fn flag(self) -> u8 {
        match self {
            Self::None => 1,
            Self::Wrap => 2,
            Self::Restrict => 3,
            Self::Limit => 4,
        }
    }
}

impl TryFrom<u8> for Wrap {
    type Error = Error;

    fn try_from(flag: u8) -> Result<Self> {
        match flag {
            1 => Ok(Self::None),
            2 => Ok(Self::Wrap),
            3 => Ok(Self::Restrict),
            4 => Ok(Self::Limit),
            other => Err(Error::invalid_argument(
                "wrap",
                format!("unknown offset wrap flag {other}"),
            )),
        }
    }
}

/// Resolve `offset` against a sequence of `length` elements.
///
/// Returns the canonical non-negative position. `length` must be greater
/// than zero.
pub fn offset_wrap(length: usize, offset: i64, policy: Wrap) -> Result<usize> {
    if length == 0 {
        return Err(Error::invalid_argument(
            "length",
            "must be greater than zero",
        ));
    }
    let len = i64::try_from(length)
        .map_err(|_| Error::invalid_argument("length", "does not fit in a signed offset"))?;

    let resolved = match policy {
        Wrap::None => {
            if offset < -len || offset >= len {
                return Err(Error::OutOfBounds { offset, length });
            }
            if offset < 0 { len + offset } else { offset }
        }
        Wrap::Wrap => offset.rem_euclid(len),
        Wrap::Restrict => {
            let clamped = offset.clamp(-len, len - 1);
            if clamped < 0 { len + clamped } else { clamped }
        }
        Wrap::Limit => offset.clamp(0, len - 1),
    };

    // resolved is within [0, len) here
    Ok(resolved as usize)
}
