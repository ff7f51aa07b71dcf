use crate::error::PanelError;
use serde::{Deserialize, Serialize};

pub const BREAKER_COUNT: usize = 3;

/// The three switchable power outputs, bit i of the raw byte being breaker i.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreakerState(pub [bool; BREAKER_COUNT]);

impl BreakerState {
    /// Bits above 2 are ignored.
    pub fn from_raw_byte(raw: u64) -> Self {
        let mut outputs = [false; BREAKER_COUNT];
        let mut tmp = raw;
        for output in outputs.iter_mut() {
            *output = tmp & 1 == 1;
            tmp >>= 1;
        }
        Self(outputs)
    }

    pub fn to_raw_byte(self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, on)| if *on { acc | (1 << i) } else { acc })
    }

    pub fn get(&self, index: usize) -> Result<bool, PanelError> {
        self.0
            .get(index)
            .copied()
            .ok_or(PanelError::InvalidBreaker(index))
    }

    pub fn set(&mut self, index: usize, on: bool) -> Result<(), PanelError> {
        let slot = self
            .0
            .get_mut(index)
            .ok_or(PanelError::InvalidBreaker(index))?;
        *slot = on;
        Ok(())
    }

    /// Flips breaker `index` in place and returns its new value.
    pub fn toggle(&mut self, index: usize) -> Result<bool, PanelError> {
        let on = !self.get(index)?;
        self.set(index, on)?;
        Ok(on)
    }

    pub fn outputs(&self) -> [bool; BREAKER_COUNT] {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_byte_bits_map_to_breakers() {
        for raw in 0u64..8 {
            let state = BreakerState::from_raw_byte(raw);
            for i in 0..BREAKER_COUNT {
                assert_eq!(state.0[i], (raw >> i) & 1 == 1, "raw={raw} bit={i}");
            }
            assert_eq!(state.to_raw_byte() as u64, raw);
        }
        assert_eq!(BreakerState::from_raw_byte(5), BreakerState([true, false, true]));
    }

    #[test]
    fn high_bits_are_ignored() {
        assert_eq!(BreakerState::from_raw_byte(0b1111_1010), BreakerState([false, true, false]));
    }

    #[test]
    fn toggle_twice_is_identity() {
        let mut state = BreakerState([true, false, true]);
        assert_eq!(state.toggle(1), Ok(true));
        assert_eq!(state, BreakerState([true, true, true]));
        assert_eq!(state.toggle(1), Ok(false));
        assert_eq!(state, BreakerState([true, false, true]));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut state = BreakerState::default();
        assert_eq!(state.toggle(3), Err(PanelError::InvalidBreaker(3)));
        assert_eq!(state, BreakerState::default());
    }
}
