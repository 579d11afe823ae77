//! In-place logical combination of two vectors.

use blockbits_common::{Error, Result};

use crate::{block::Block, bvector::BitVector, optimize::OptimizeMode};

/// Binary operation applied by [`BitVector::combine`]. The discriminants
/// are the integer op codes accepted by [`CombineOp::try_from`].
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
    And = 0,
    Or = 1,
    /// Difference: `dest & !src`.
    Sub = 2,
    Xor = 3,
}

impl TryFrom<i32> for CombineOp {
    type Error = Error;

    fn try_from(value: i32) -> Result<CombineOp> {
        match value {
            0 => Ok(CombineOp::And),
            1 => Ok(CombineOp::Or),
            2 => Ok(CombineOp::Sub),
            3 => Ok(CombineOp::Xor),
            _ => Err(Error::invalid_arg(
                "op",
                format!("unknown combine operation {value}"),
            )),
        }
    }
}

impl BitVector {
    /// `self = self <op> other`, block by block.
    ///
    /// Only blocks present on at least one side are visited; absent blocks
    /// take the shortcut their zero content allows. The declared size of
    /// `self` is kept, and bits of `other` at or beyond it are ignored.
    pub fn combine(&mut self, other: &BitVector, op: CombineOp) -> Result<()> {
        let last_block = self.last_block();
        match op {
            CombineOp::And => {
                let mut outcome = Ok(());
                self.blocks.retain(|idx, dst| {
                    if outcome.is_err() {
                        return true;
                    }
                    let Some(src) = other.blocks.get(idx) else {
                        return false;
                    };
                    outcome = dst.combine_with(src, op);
                    if outcome.is_ok() && dst.is_empty() {
                        return false;
                    }
                    outcome = std::mem::replace(&mut outcome, Ok(())).and_then(|()| dst.optimize(OptimizeMode::Compact));
                    true
                });
                outcome?;
            }
            CombineOp::Or | CombineOp::Xor => {
                for (idx, src) in other.blocks.iter() {
                    if idx > last_block {
                        break;
                    }
                    if self.blocks.get(idx).is_some() {
                        self.combine_block(idx, src, op)?;
                    } else if !src.is_empty() {
                        self.blocks.insert(idx, src.try_clone()?)?;
                    }
                }
                self.clear_tail()?;
            }
            CombineOp::Sub => {
                for (idx, src) in other.blocks.iter() {
                    if idx > last_block {
                        break;
                    }
                    self.combine_block(idx, src, op)?;
                }
            }
        }
        log::debug!(
            "combine {op:?}: {} blocks in result",
            self.blocks.len()
        );
        Ok(())
    }

    pub fn and_with(&mut self, other: &BitVector) -> Result<()> {
        self.combine(other, CombineOp::And)
    }

    pub fn or_with(&mut self, other: &BitVector) -> Result<()> {
        self.combine(other, CombineOp::Or)
    }

    pub fn sub_with(&mut self, other: &BitVector) -> Result<()> {
        self.combine(other, CombineOp::Sub)
    }

    pub fn xor_with(&mut self, other: &BitVector) -> Result<()> {
        self.combine(other, CombineOp::Xor)
    }

    /// Combines one present destination block with `src`, then drops it if
    /// it became empty or re-picks its representation.
    fn combine_block(&mut self, idx: u32, src: &Block, op: CombineOp) -> Result<()> {
        let Some(dst) = self.blocks.get_mut(idx) else {
            return Ok(());
        };
        dst.combine_with(src, op)?;
        if dst.is_empty() {
            self.blocks.remove(idx);
        } else {
            dst.optimize(OptimizeMode::Compact)?;
        }
        Ok(())
    }
}
