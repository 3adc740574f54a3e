//! Hierarchical timer wheel engine.
//!
//! Levels of increasing granularity are chained lowest-first. A submitted
//! task lands in the lowest level whose span covers its delay; every advance
//! moves the lowest cursor one slot and, whenever a cursor completes a
//! revolution, migrates the next level's current slot down in one batch
//! before firing everything due. Insertion and cascade are O(1) amortized:
//! a task crosses each level boundary at most once in its lifetime.

use crate::errors::WheelError;
use crate::slot::{SlotList, Task};

/// Per-slot capacity hint, in tasks.
const SLOT_CAPACITY: usize = 8;

/// One wheel in the hierarchy: a ring of slots at a fixed granularity.
#[derive(Debug)]
struct Level {
    slots: Vec<SlotList>,
    /// Virtual-time units per slot.
    tick: u64,
    /// Absolute virtual time. Advanced one tick per revolution of the level
    /// below, or synced to the level below when a submission delegates up.
    now: u64,
}

impl Level {
    fn new(slot_count: usize, tick: u64, now: u64) -> Self {
        Self {
            slots: (0..slot_count).map(|_| SlotList::new(SLOT_CAPACITY)).collect(),
            tick,
            now,
        }
    }

    fn slot_count(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Maximum delay this level alone can represent.
    fn span(&self) -> u64 {
        self.tick * self.slot_count()
    }

    fn cursor(&self) -> usize {
        ((self.now / self.tick) % self.slot_count()) as usize
    }

    fn insert(&mut self, task: Task) {
        let index = ((task.due / self.tick) % self.slot_count()) as usize;
        self.slots[index].insert_ordered(task);
    }
}

/// One-time constructor for the level chain.
///
/// Levels are declared lowest (finest) first. The chain is validated once in
/// [`WheelBuilder::build`] and cannot be rewired afterwards.
///
/// # Examples
///
/// ```ignore
/// // seconds / minutes / hours
/// let wheel = WheelBuilder::new()
///     .level(60, 1)
///     .level(60, 60)
///     .level(24, 3600)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct WheelBuilder {
    levels: Vec<(usize, u64)>,
    start: u64,
}

impl WheelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a level of `slot_count` slots, each `tick` virtual-time
    /// units wide.
    #[must_use]
    pub fn level(mut self, slot_count: usize, tick: u64) -> Self {
        self.levels.push((slot_count, tick));
        self
    }

    /// Initial virtual time for every level. Defaults to 0.
    #[must_use]
    pub fn start_at(mut self, now: u64) -> Self {
        self.start = now;
        self
    }

    /// Validates the chain and builds the wheel.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::Validation`] if no level was declared, a level
    /// has zero slots or a zero tick duration, or spans are not strictly
    /// ascending along the chain.
    pub fn build(self) -> Result<TimerWheel, WheelError> {
        if self.levels.is_empty() {
            return Err(WheelError::validation("wheel needs at least one level"));
        }

        let mut prev_span = 0u64;
        for (position, &(slot_count, tick)) in self.levels.iter().enumerate() {
            if slot_count == 0 {
                return Err(WheelError::validation(format!(
                    "level {} has no slots",
                    position
                )));
            }
            if tick == 0 {
                return Err(WheelError::validation(format!(
                    "level {} has a zero tick duration",
                    position
                )));
            }
            let span = tick.checked_mul(slot_count as u64).ok_or_else(|| {
                WheelError::validation(format!("level {} span overflows u64", position))
            })?;
            if span <= prev_span {
                return Err(WheelError::validation(format!(
                    "level {} span {} does not exceed the previous span {}",
                    position, span, prev_span
                )));
            }
            if position > 0 && tick != prev_span {
                log::warn!(
                    "level {} tick {} is not aligned to the previous span {}, \
                     cascade granularity degrades",
                    position,
                    tick,
                    prev_span
                );
            }
            prev_span = span;
        }

        let levels: Vec<Level> = self
            .levels
            .iter()
            .map(|&(slot_count, tick)| Level::new(slot_count, tick, self.start))
            .collect();
        let wheel = TimerWheel { levels, pending: 0 };

        log::debug!(
            "timer wheel built: {} levels, horizon={}, start={}",
            wheel.levels.len(),
            wheel.horizon(),
            self.start
        );

        Ok(wheel)
    }
}

/// Hierarchical timer wheel scheduling one-shot actions in virtual time.
///
/// # Thread Safety
///
/// `TimerWheel` is not thread-safe. Confine it to one thread, or guard
/// `submit` and `advance` with a single external lock.
#[derive(Debug)]
pub struct TimerWheel {
    /// Lowest (finest) level first; the overflow chain is the vector order.
    levels: Vec<Level>,
    pending: usize,
}

impl TimerWheel {
    /// Schedules `action` to run `delay` virtual-time units from now.
    ///
    /// Ownership of the action and its captured context moves to the wheel;
    /// no handle is returned and there is no cancellation. The action runs
    /// exactly once, inside the [`TimerWheel::advance`] call that reaches
    /// its target time; a delay shorter than one tick runs on the next call.
    ///
    /// # Errors
    ///
    /// Returns [`WheelError::HorizonExceeded`] if `delay` exceeds the
    /// topmost level's span. The action is dropped unscheduled.
    pub fn submit<F>(&mut self, delay: u64, action: F) -> Result<(), WheelError>
    where
        F: FnOnce() + 'static,
    {
        let now = self.levels[0].now;
        let tick = self.levels[0].tick;
        let mut due = now.saturating_add(delay);
        // The current tick has already fired. A due time that rounds into it
        // would sit in the cursor slot for a full revolution, so it moves to
        // the next tick boundary instead.
        if due / tick == now / tick {
            due = (now / tick + 1).saturating_mul(tick);
        }
        match self.insert_from(0, delay, Task::new(due, Box::new(action))) {
            Ok(()) => {
                self.pending += 1;
                Ok(())
            }
            Err(err) => {
                log::warn!("submit rejected: {}", err);
                Err(err)
            }
        }
    }

    /// Advances virtual time by one lowest-level tick.
    ///
    /// Cascades whole slot batches down the chain wherever a cursor
    /// completed a revolution, then fires every task due this tick, in due
    /// order with ties in submission order. Actions run synchronously on
    /// the caller's thread.
    pub fn advance(&mut self) {
        self.advance_level(0);
        self.fire_due();
    }

    /// Number of tasks scheduled and not yet fired.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Current virtual time at the lowest level.
    pub fn now(&self) -> u64 {
        self.levels[0].now
    }

    /// Maximum delay the chain can represent: the topmost level's span.
    pub fn horizon(&self) -> u64 {
        self.levels.last().map_or(0, Level::span)
    }

    /// Drops every pending task, releasing each action's captured state.
    pub fn clear(&mut self) {
        for level in self.levels.iter_mut() {
            for slot in level.slots.iter_mut() {
                slot.clear();
            }
        }
        self.pending = 0;
        log::debug!("timer wheel cleared");
    }

    fn advance_level(&mut self, index: usize) {
        let level = &mut self.levels[index];
        level.now += level.tick;
        if self.levels[index].cursor() == 0 && index + 1 < self.levels.len() {
            self.advance_level(index + 1);
            self.cascade(index + 1);
        }
    }

    /// Migrates the entire batch in `upper`'s current slot into the level
    /// below, keyed off each task's unchanged absolute due time.
    fn cascade(&mut self, upper: usize) {
        let cursor = self.levels[upper].cursor();
        let batch = self.levels[upper].slots[cursor].take_all();
        for task in batch {
            if let Err(err) = self.reinsert(upper - 1, task) {
                let err = WheelError::from(err);
                debug_assert!(false, "{}", err);
                log::error!("{}", err);
                self.pending -= 1;
            }
        }
    }

    fn reinsert(&mut self, lower: usize, task: Task) -> anyhow::Result<()> {
        let due = task.due;
        let delay = due.saturating_sub(self.levels[lower].now);
        self.insert_from(lower, delay, task).map_err(|err| {
            anyhow::anyhow!(
                "cascade of task due {} into level {} failed: {}, this indicates a bug",
                due,
                lower,
                err
            )
        })
    }

    /// Walks the chain upward from `start` to the lowest level whose span
    /// covers `delay` and inserts there.
    fn insert_from(&mut self, start: usize, delay: u64, task: Task) -> Result<(), WheelError> {
        let mut index = start;
        while delay > self.levels[index].span() {
            if index + 1 == self.levels.len() {
                return Err(WheelError::horizon(delay, self.horizon()));
            }
            // Both levels must agree on "now" at the moment of delegation;
            // the remaining delay recomputed at cascade time is otherwise
            // off by the drift.
            self.levels[index + 1].now = self.levels[index].now;
            index += 1;
        }
        self.levels[index].insert(task);
        Ok(())
    }

    /// Drains and runs the lowest level's current slot.
    fn fire_due(&mut self) {
        let cursor = self.levels[0].cursor();
        let due_now = self.levels[0].slots[cursor].take_all();
        self.pending -= due_now.len();
        for task in due_now {
            task.fire();
        }
    }
}

impl Drop for TimerWheel {
    fn drop(&mut self) {
        if self.pending > 0 {
            log::warn!(
                "timer wheel dropped with {} tasks still pending",
                self.pending
            );
        } else {
            log::debug!("timer wheel dropped");
        }
    }
}
