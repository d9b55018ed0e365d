use crate::game::equipment::EquipmentItem;

/// The one press currently in flight. The slot is exclusive: a second press
/// anywhere is rejected while this exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveHold {
    pub item_id: usize,
    pub started_at_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldRelease {
    /// Held at least as long as the target. Overshoot is allowed; there is
    /// no upper bound on lateness.
    Completed { elapsed_s: f64 },
    /// Let go before the target. `canceled` marks releases where the pointer
    /// left the interaction area, as opposed to a plain early release.
    TooEarly { elapsed_s: f64, canceled: bool },
}

/// Tracks the active press-and-hold attempt against injected timestamps.
/// All timing flows through the `now_s` arguments, so tests never sleep.
#[derive(Debug, Default)]
pub struct HoldTracker {
    active: Option<ActiveHold>,
}

impl HoldTracker {
    pub fn new() -> Self {
        Self { active: None }
    }

    #[inline(always)]
    pub fn active(&self) -> Option<ActiveHold> {
        self.active
    }

    /// Starts a hold on `item`. Rejected while paused, while any hold is
    /// already active, or once the item is completed. Rejections change
    /// nothing and make no noise.
    pub fn begin(&mut self, item: &EquipmentItem, paused: bool, now_s: f64) -> bool {
        if paused || item.completed || self.active.is_some() {
            return false;
        }
        self.active = Some(ActiveHold {
            item_id: item.id,
            started_at_s: now_s,
        });
        true
    }

    /// Elapsed seconds of the active hold, if any. Pure query for the tick.
    pub fn elapsed(&self, now_s: f64) -> Option<(usize, f64)> {
        self.active
            .map(|h| (h.item_id, (now_s - h.started_at_s).max(0.0)))
    }

    /// Moves the active start timestamp forward, excluding an interval (a
    /// pause) from the hold's elapsed time. No-op without an active hold.
    pub fn shift_start(&mut self, offset_s: f64) {
        if let Some(hold) = &mut self.active {
            hold.started_at_s += offset_s;
        }
    }

    /// Resolves a release for `item`. `None` when no active hold matches,
    /// which also makes a second release for the same item a no-op. A
    /// matching release always clears the slot, success or failure; only a
    /// success touches the item.
    pub fn end(
        &mut self,
        item: &mut EquipmentItem,
        canceled: bool,
        now_s: f64,
    ) -> Option<HoldRelease> {
        let hold = self.active?;
        if hold.item_id != item.id {
            return None;
        }
        self.active = None;
        let elapsed_s = (now_s - hold.started_at_s).max(0.0);
        if elapsed_s >= item.target_seconds {
            item.completed = true;
            Some(HoldRelease::Completed { elapsed_s })
        } else {
            Some(HoldRelease::TooEarly {
                elapsed_s,
                canceled,
            })
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}
