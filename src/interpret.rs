//! Raw predicted delay -> human-readable category.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    AtMost(f64),
    Below(f64),
    Exactly(f64),
    Unbounded,
}

impl Bound {
    fn admits(self, x: f64) -> bool {
        match self {
            Bound::AtMost(b) => x <= b,
            Bound::Below(b) => x < b,
            Bound::Exactly(b) => x == b,
            Bound::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Early,
    SlightlyEarly,
    OnTime,
    MinorDelay,
    ModerateDelay,
    SignificantDelay,
}

// Ascending upper bounds; first match wins. Together they cover every real number.
const RULES: [(Bound, Category); 6] = [
    (Bound::AtMost(-5.0), Category::Early),
    (Bound::Below(0.0), Category::SlightlyEarly),
    (Bound::Exactly(0.0), Category::OnTime),
    (Bound::AtMost(15.0), Category::MinorDelay),
    (Bound::AtMost(30.0), Category::ModerateDelay),
    (Bound::Unbounded, Category::SignificantDelay),
];

/// A classified delay. `Display` renders the caller-facing text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpretation {
    pub category: Category,
    pub minutes: f64,
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.minutes;
        match self.category {
            Category::Early => write!(f, "early by {:.0} minutes", m.abs()),
            Category::SlightlyEarly => f.write_str("slightly early"),
            Category::OnTime => f.write_str("on time"),
            Category::MinorDelay => write!(f, "minor delay of {:.0} minutes", m),
            Category::ModerateDelay => write!(f, "moderate delay of {:.0} minutes", m),
            Category::SignificantDelay => write!(f, "significant delay of {:.0} minutes", m),
        }
    }
}

/// Total over the reals. The on-time check is exact equality with zero.
pub fn classify(delay_minutes: f64) -> Interpretation {
    let category = RULES
        .iter()
        .find(|(bound, _)| bound.admits(delay_minutes))
        .map(|(_, c)| *c)
        .unwrap_or(Category::SignificantDelay);
    Interpretation {
        category,
        minutes: delay_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(x: f64) -> String {
        classify(x).to_string()
    }

    #[test]
    fn bucket_labels() {
        assert_eq!(text(-5.0), "early by 5 minutes");
        assert_eq!(text(-22.6), "early by 23 minutes");
        assert_eq!(text(-4.9), "slightly early");
        assert_eq!(text(-0.0001), "slightly early");
        assert_eq!(text(0.0), "on time");
        assert_eq!(text(0.2), "minor delay of 0 minutes");
        assert_eq!(text(15.0), "minor delay of 15 minutes");
        assert_eq!(text(15.1), "moderate delay of 15 minutes");
        assert_eq!(text(30.0), "moderate delay of 30 minutes");
        assert_eq!(text(31.0), "significant delay of 31 minutes");
    }

    #[test]
    fn upper_ends_are_closed() {
        assert_eq!(classify(15.0).category, Category::MinorDelay);
        assert_eq!(classify(15.0001).category, Category::ModerateDelay);
        assert_eq!(classify(30.0).category, Category::ModerateDelay);
        assert_eq!(classify(30.0001).category, Category::SignificantDelay);
        assert_eq!(classify(-5.0).category, Category::Early);
        assert_eq!(classify(-4.9999).category, Category::SlightlyEarly);
    }

    #[test]
    fn on_time_is_exact_zero_only() {
        assert_eq!(classify(-0.0).category, Category::OnTime);
        assert_eq!(classify(1e-12).category, Category::MinorDelay);
        assert_eq!(classify(-1e-12).category, Category::SlightlyEarly);
    }

    #[test]
    fn buckets_are_ordered_without_gaps() {
        let mut last = 0;
        let mut x = -100.0;
        while x <= 100.0 {
            let idx = RULES.iter().position(|(_, c)| *c == classify(x).category).unwrap();
            assert!(idx >= last, "category went backwards at {x}");
            last = idx;
            x += 0.05;
        }
        assert_eq!(classify(f64::MAX).category, Category::SignificantDelay);
        assert_eq!(classify(f64::MIN).category, Category::Early);
    }
}
