// Redraw coalescing while a transition holds the display.

/// Reentrant hold count plus a single pending flag.
///
/// Holds nest (several transitions may overlap), but however many redraws are requested
/// while held, exactly one runs when the last hold is released.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedrawGate {
    holds: u32,
    pending: bool,
}

impl RedrawGate {
    pub fn lock(&mut self) {
        self.holds = self.holds.saturating_add(1);
    }

    /// Release one hold. Returns true when the caller should redraw now.
    /// Unbalanced unlocks are ignored.
    pub fn unlock(&mut self) -> bool {
        self.holds = self.holds.saturating_sub(1);
        if self.holds == 0 && self.pending {
            self.pending = false;
            true
        } else {
            false
        }
    }

    /// Ask for a redraw. Returns true when it may run immediately; otherwise it is
    /// folded into the pending one.
    pub fn request(&mut self) -> bool {
        if self.holds > 0 {
            self.pending = true;
            false
        } else {
            true
        }
    }

    pub fn is_locked(&self) -> bool {
        self.holds > 0
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
