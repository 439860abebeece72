//! Trim policies for decorative entries injected around the page list.

/// Which fixed positions of an extracted page list hold non-content images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimPolicy {
    /// Drop the first and last entries (cover + trailing thumbnail).
    StripBoth,
    /// Drop the first entry only.
    StripLeading,
    /// Keep everything.
    Keep,
}

impl TrimPolicy {
    /// Shortest list this policy can trim without emptying it outright.
    pub fn min_len(self) -> usize {
        match self {
            Self::StripBoth => 2,
            Self::StripLeading => 1,
            Self::Keep => 0,
        }
    }

    /// Apply the policy. Lists shorter than [`min_len`](Self::min_len) become empty.
    pub fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        let len = items.len();
        if len < self.min_len() {
            return Vec::new();
        }

        match self {
            Self::StripBoth => items.into_iter().skip(1).take(len - 2).collect(),
            Self::StripLeading => items.into_iter().skip(1).collect(),
            Self::Keep => items,
        }
    }
}

impl std::fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StripBoth => write!(f, "strip-both"),
            Self::StripLeading => write!(f, "strip-leading"),
            Self::Keep => write!(f, "keep"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_strip_both() {
        assert_eq!(TrimPolicy::StripBoth.apply(pages(7)), vec![1, 2, 3, 4, 5]);
        assert_eq!(TrimPolicy::StripBoth.apply(pages(2)), Vec::<usize>::new());
    }

    #[test]
    fn test_strip_leading() {
        assert_eq!(TrimPolicy::StripLeading.apply(pages(3)), vec![1, 2]);
        assert_eq!(TrimPolicy::StripLeading.apply(pages(1)), Vec::<usize>::new());
    }

    #[test]
    fn test_keep() {
        assert_eq!(TrimPolicy::Keep.apply(pages(4)), pages(4));
        assert!(TrimPolicy::Keep.apply(pages(0)).is_empty());
    }

    #[test]
    fn test_below_minimum_is_empty_not_error() {
        assert!(TrimPolicy::StripBoth.apply(pages(1)).is_empty());
        assert!(TrimPolicy::StripBoth.apply(pages(0)).is_empty());
        assert!(TrimPolicy::StripLeading.apply(pages(0)).is_empty());
    }

    #[test]
    fn test_lengths_for_every_size() {
        for m in 0..12 {
            assert_eq!(TrimPolicy::StripBoth.apply(pages(m)).len(), m.saturating_sub(2));
            assert_eq!(TrimPolicy::StripLeading.apply(pages(m)).len(), m.saturating_sub(1));
            assert_eq!(TrimPolicy::Keep.apply(pages(m)).len(), m);
        }
    }
}
