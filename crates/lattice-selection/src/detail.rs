//! The lazily-loaded child state: a small counter.
//!
//! The detail screen is a counter the user nudges up and down. Its reducer is
//! self-contained; the loader forwards actions into whichever detail is
//! active (see [`crate::reducer`]).

/// The heavier, lazily-loaded state for a selected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detail {
    pub count: i64,
}

/// User interaction with a loaded detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    Increment,
    Decrement,
    /// Replace the count outright.
    Set(i64),
}

impl Detail {
    pub fn new(count: i64) -> Self {
        Self { count }
    }

    /// Apply an action. Arithmetic saturates at the `i64` bounds.
    pub fn reduce(&mut self, action: DetailAction) {
        self.count = match action {
            DetailAction::Increment => self.count.saturating_add(1),
            DetailAction::Decrement => self.count.saturating_sub(1),
            DetailAction::Set(count) => count,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_decrement() {
        let mut detail = Detail::new(1);
        detail.reduce(DetailAction::Increment);
        detail.reduce(DetailAction::Increment);
        detail.reduce(DetailAction::Decrement);
        assert_eq!(detail.count, 2);
    }

    #[test]
    fn test_set() {
        let mut detail = Detail::default();
        detail.reduce(DetailAction::Set(-5));
        assert_eq!(detail, Detail::new(-5));
    }

    #[test]
    fn test_saturates() {
        let mut detail = Detail::new(i64::MAX);
        detail.reduce(DetailAction::Increment);
        assert_eq!(detail.count, i64::MAX);

        detail.reduce(DetailAction::Set(i64::MIN));
        detail.reduce(DetailAction::Decrement);
        assert_eq!(detail.count, i64::MIN);
    }
}
