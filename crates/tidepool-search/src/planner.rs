//! Page slicing and shortfall arithmetic.

use tidepool_common::CatalogItem;

/// What the local catalog contributes to a page, and how much is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    /// Locally matched items that land on the requested page.
    pub local_slice: Vec<CatalogItem>,
    /// Items the page still needs after `local_slice`.
    pub shortfall: u32,
}

impl FillPlan {
    pub fn needs_fallback(&self) -> bool {
        self.shortfall > 0
    }
}

/// Slice page `page` (1-based) of `per_page` items out of `matched`.
///
/// A page that starts past the end of `matched` is empty, not an error; its
/// whole size becomes the shortfall. `page` and `per_page` of zero are
/// treated as one.
pub fn plan(matched: &[CatalogItem], page: u32, per_page: u32) -> FillPlan {
    let page = page.max(1) as usize;
    let per_page = per_page.max(1);

    let start = (page - 1).saturating_mul(per_page as usize);
    let end = start.saturating_add(per_page as usize).min(matched.len());

    let local_slice = if start < matched.len() {
        matched[start..end].to_vec()
    } else {
        Vec::new()
    };

    // local_slice.len() <= per_page, so this fits in u32
    let shortfall = per_page - local_slice.len() as u32;

    FillPlan {
        local_slice,
        shortfall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn corpus(n: usize) -> Vec<CatalogItem> {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| CatalogItem::new(format!("photos/{i:03}.jpg"), ts, i as u64))
            .collect()
    }

    #[test]
    fn full_page_needs_no_fallback() {
        let matched = corpus(50);
        let plan = plan(&matched, 2, 20);
        assert_eq!(plan.local_slice, matched[20..40].to_vec());
        assert_eq!(plan.shortfall, 0);
        assert!(!plan.needs_fallback());
    }

    #[test]
    fn partial_last_page() {
        let matched = corpus(50);
        let plan = plan(&matched, 3, 20);
        assert_eq!(plan.local_slice, matched[40..50].to_vec());
        assert_eq!(plan.shortfall, 10);
    }

    #[test]
    fn page_past_the_end() {
        let matched = corpus(5);
        let plan = plan(&matched, 4, 20);
        assert!(plan.local_slice.is_empty());
        assert_eq!(plan.shortfall, 20);
    }

    #[test]
    fn empty_corpus() {
        let plan = plan(&[], 1, 20);
        assert!(plan.local_slice.is_empty());
        assert_eq!(plan.shortfall, 20);
    }

    #[test]
    fn slice_plus_shortfall_is_per_page() {
        for len in [0usize, 1, 5, 19, 20, 21, 57] {
            let matched = corpus(len);
            for page in 1..=5u32 {
                for per_page in [1u32, 3, 20] {
                    let plan = plan(&matched, page, per_page);
                    assert_eq!(plan.local_slice.len() as u32 + plan.shortfall, per_page);
                }
            }
        }
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let plan = plan(&corpus(3), u32::MAX, u32::MAX);
        assert!(plan.local_slice.is_empty());
        assert_eq!(plan.shortfall, u32::MAX);
    }

    #[test]
    fn zero_inputs_treated_as_one() {
        let matched = corpus(3);
        let plan = plan(&matched, 0, 0);
        assert_eq!(plan.local_slice, matched[0..1].to_vec());
        assert_eq!(plan.shortfall, 0);
    }
}
