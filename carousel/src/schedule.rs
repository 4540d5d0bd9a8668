//! The periodic switching rule of the carousel.

use std::ops::Range;

use crate::Error;

/// The physical-column to slot assignment at t = 0.
///
/// Slot indices run along the liquid path: slot 0 is the first column
/// position of the first registered zone, higher slots follow downstream
/// around the ring. `Identity` starts column i in slot i.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InitialLayout {
    #[default]
    Identity,
    /// `slots[i]` is the slot column i occupies at t = 0. Must be a
    /// permutation of the slot indices.
    Custom(Vec<usize>),
}

impl InitialLayout {
    /// The slot `column` occupies at t = 0. Columns beyond a custom layout
    /// keep their own index.
    pub fn initial_slot(&self, column: usize) -> usize {
        match self {
            InitialLayout::Identity => column,
            InitialLayout::Custom(slots) => slots.get(column).copied().unwrap_or(column),
        }
    }

    pub(crate) fn check(&self, n_slots: usize) -> Result<(), Error> {
        match self {
            InitialLayout::Identity => Ok(()),
            InitialLayout::Custom(slots) => {
                if slots.len() != n_slots {
                    return Err(Error::InvalidLayout { n_slots });
                }
                let mut seen = vec![false; n_slots];
                for &slot in slots {
                    if slot >= n_slots || seen[slot] {
                        return Err(Error::InvalidLayout { n_slots });
                    }
                    seen[slot] = true;
                }
                Ok(())
            }
        }
    }
}

/// The pure switching rule: which slot a physical column occupies at which
/// elapsed time.
///
/// The assignment is constant on each half-open interval [kτ, (k+1)τ) and
/// advances by one slot (mod C) at every boundary, so at exactly t = kτ the
/// post-switch assignment is already in effect. The assignment at t = 0 is
/// exactly the configured [`InitialLayout`]; no implicit offset is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchSchedule {
    switch_time: f64,
    n_slots: usize,
    layout: InitialLayout,
}

impl SwitchSchedule {
    /// A schedule over `n_slots` slots, switching every `switch_time`
    /// seconds, with the identity layout. `n_slots` must be at least 1.
    pub fn new(switch_time: f64, n_slots: usize) -> Self {
        debug_assert!(n_slots > 0);
        Self {
            switch_time,
            n_slots,
            layout: InitialLayout::Identity,
        }
    }

    pub fn with_layout(mut self, layout: InitialLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn switch_time(&self) -> f64 {
        self.switch_time
    }

    pub fn n_slots(&self) -> usize {
        self.n_slots
    }

    pub fn layout(&self) -> &InitialLayout {
        &self.layout
    }

    /// Duration of one full carousel cycle, C·τ. After a full cycle every
    /// column is back in its initial slot.
    pub fn cycle_time(&self) -> f64 {
        self.n_slots as f64 * self.switch_time
    }

    /// Index of the switch interval containing `elapsed`. Negative times
    /// count intervals before the initial layout.
    pub fn switch_index(&self, elapsed: f64) -> i64 {
        (elapsed / self.switch_time).floor() as i64
    }

    /// The half-open time window of switch interval `index`.
    pub fn interval(&self, index: i64) -> Range<f64> {
        index as f64 * self.switch_time..(index + 1) as f64 * self.switch_time
    }

    /// The slot `column` occupies at `elapsed` seconds.
    pub fn slot_for_column(&self, column: usize, elapsed: f64) -> usize {
        self.slot_at_switch(column, self.switch_index(elapsed))
    }

    /// The slot `column` occupies during switch interval `index`.
    pub fn slot_at_switch(&self, column: usize, index: i64) -> usize {
        let n = self.n_slots as i64;
        let start = (self.layout.initial_slot(column) % self.n_slots) as i64;
        (start + index).rem_euclid(n) as usize
    }

    /// The full slot-to-column assignment during switch interval `index`:
    /// element s is the column sitting in slot s.
    pub fn layout_at_switch(&self, index: i64) -> Vec<usize> {
        let mut slots = vec![0; self.n_slots];
        for column in 0..self.n_slots {
            slots[self.slot_at_switch(column, index)] = column;
        }
        slots
    }

    /// The column occupying `slot` at `elapsed` seconds.
    pub fn column_for_slot(&self, slot: usize, elapsed: f64) -> usize {
        self.layout_at_switch(self.switch_index(elapsed))[slot % self.n_slots]
    }
}
