//! Attempt budget for select+connect cycles.

/// Counts attempts against a fixed maximum.
#[derive(Debug, Clone)]
pub struct AttemptBudget {
    max: u32,
    used: u32,
}

impl AttemptBudget {
    pub fn new(max: u32) -> Self {
        Self { max, used: 0 }
    }

    /// Consume one attempt. Returns its 1-based number, or `None` once spent.
    pub fn try_start(&mut self) -> Option<u32> {
        if self.used >= self.max {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    pub fn used(&self) -> u32 {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_out_exactly_max_attempts() {
        let mut budget = AttemptBudget::new(3);
        let attempts: Vec<_> = std::iter::from_fn(|| budget.try_start()).collect();
        assert_eq!(attempts, vec![1, 2, 3]);
        assert_eq!(budget.try_start(), None);
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn zero_budget_never_starts() {
        let mut budget = AttemptBudget::new(0);
        assert_eq!(budget.try_start(), None);
    }
}
