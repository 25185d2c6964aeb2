//! Bounded snapshot history for step-back.

use crate::cpu::registers::Registers;
use serde::{Serialize, Deserialize};
use std::collections::VecDeque;

/// Register state plus line cursor, captured before an instruction runs.
///
/// Memory is not part of the snapshot, so stepping back does not undo
/// stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub regs: Registers,
    /// Index of the line that was about to execute.
    pub line: usize,
}

/// Most-recent-last stack of snapshots that drops the oldest entry when
/// full.
#[derive(Debug, Clone)]
pub struct History {
    states: VecDeque<CpuState>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            states: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, state: CpuState) {
        if self.capacity == 0 {
            return;
        }
        if self.states.len() == self.capacity {
            self.states.pop_front();
        }
        self.states.push_back(state);
    }

    pub fn pop(&mut self) -> Option<CpuState> {
        self.states.pop_back()
    }

    pub fn peek(&self) -> Option<&CpuState> {
        self.states.back()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(line: usize) -> CpuState {
        let mut regs = Registers::new();
        regs.a = line as u8;
        CpuState { regs, line }
    }

    #[test]
    fn test_lifo_order() {
        let mut history = History::new(4);
        history.push(state(1));
        history.push(state(2));
        assert_eq!(history.peek().map(|s| s.line), Some(2));
        assert_eq!(history.pop().map(|s| s.line), Some(2));
        assert_eq!(history.pop().map(|s| s.line), Some(1));
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_evicts_oldest() {
        let mut history = History::new(3);
        for line in 0..5 {
            history.push(state(line));
        }
        assert_eq!(history.len(), 3);
        let lines: Vec<usize> = std::iter::from_fn(|| history.pop()).map(|s| s.line).collect();
        assert_eq!(lines, vec![4, 3, 2]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = History::new(0);
        history.push(state(1));
        assert!(history.is_empty());
    }
}
