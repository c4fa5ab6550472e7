//! Bounded inflation of ZIP entries.
//!
//! Declared sizes in the central directory are only a first filter; reads are capped at the
//! effective limit plus one byte so forged metadata cannot push past it.

use std::io::Read;

use crate::error::{PackageError, Result};

pub(crate) const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024;
pub(crate) const DEFAULT_MAX_TOTAL_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug)]
pub(crate) struct InflateBudget {
    max_total_bytes: u64,
    used_bytes: u64,
}

impl InflateBudget {
    pub(crate) fn new(max_total_bytes: u64) -> Self {
        Self {
            max_total_bytes,
            used_bytes: 0,
        }
    }

    fn remaining(&self) -> u64 {
        self.max_total_bytes.saturating_sub(self.used_bytes)
    }

    fn too_large(&self, extra: u64) -> PackageError {
        PackageError::PackageTooLarge {
            total: self.used_bytes.saturating_add(extra),
            max: self.max_total_bytes,
        }
    }

    fn consume(&mut self, bytes: u64) -> Result<()> {
        self.used_bytes = self.used_bytes.saturating_add(bytes);
        if self.used_bytes > self.max_total_bytes {
            return Err(PackageError::PackageTooLarge {
                total: self.used_bytes,
                max: self.max_total_bytes,
            });
        }
        Ok(())
    }
}

/// Reads one entry, failing once it exceeds `max_part_bytes` or the remaining budget.
pub(crate) fn read_entry<R: Read>(
    entry: &mut R,
    part: &str,
    declared_size: u64,
    max_part_bytes: u64,
    budget: &mut InflateBudget,
) -> Result<Vec<u8>> {
    let remaining = budget.remaining();
    let effective_max = max_part_bytes.min(remaining);
    let limit_is_total = effective_max < max_part_bytes;

    if declared_size > max_part_bytes {
        return Err(PackageError::PartTooLarge {
            part: part.to_string(),
            size: declared_size,
            max: max_part_bytes,
        });
    }
    if limit_is_total && declared_size > effective_max {
        return Err(budget.too_large(declared_size));
    }

    let mut buf = Vec::new();
    entry
        .take(effective_max.saturating_add(1))
        .read_to_end(&mut buf)?;

    let observed = buf.len() as u64;
    if observed > effective_max {
        if limit_is_total {
            return Err(budget.too_large(observed));
        }
        return Err(PackageError::PartTooLarge {
            part: part.to_string(),
            size: observed,
            max: max_part_bytes,
        });
    }

    budget.consume(observed)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forged_small_declared_size_is_still_capped() {
        let data = vec![b'x'; 32];
        let mut budget = InflateBudget::new(1024);
        let err = read_entry(&mut data.as_slice(), "xl/big.bin", 4, 16, &mut budget).unwrap_err();
        match err {
            PackageError::PartTooLarge { part, size, max } => {
                assert_eq!(part, "xl/big.bin");
                assert_eq!(size, 17);
                assert_eq!(max, 16);
            }
            other => panic!("expected PartTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn budget_accumulates_across_entries() {
        let mut budget = InflateBudget::new(10);
        read_entry(&mut &b"123456"[..], "a", 6, 100, &mut budget).expect("first entry fits");
        let err = read_entry(&mut &b"abcdef"[..], "b", 6, 100, &mut budget).unwrap_err();
        assert!(
            matches!(err, PackageError::PackageTooLarge { total, max: 10 } if total > 10),
            "{err:?}"
        );
    }
}
