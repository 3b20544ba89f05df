//! Deterministic ordering and page windows over a fetched stake history

use crate::models::PaymentRecord;

/// Result of slicing a history into a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The requested window, with the size of the whole history
    Success {
        records: Vec<PaymentRecord>,
        total: usize,
    },
    /// The wallet has no recorded stakes
    NoData,
    /// The window starts past the last record
    PageOutOfRange { total: usize },
}

/// Most recent first. The sort is stable, so payments sharing a timestamp
/// keep the order the ledger returned them in.
pub fn sort_by_time_desc(records: &mut [PaymentRecord]) {
    records.sort_by(|a, b| b.time.cmp(&a.time));
}

/// Slice `[(page-1)*page_size, page*page_size)` out of `records`, clamped to
/// its length. `page` and `page_size` must already be at least 1.
pub fn paginate(records: &[PaymentRecord], page: usize, page_size: usize) -> PageOutcome {
    let total = records.len();
    if total == 0 {
        return PageOutcome::NoData;
    }

    let start = match page.saturating_sub(1).checked_mul(page_size) {
        Some(start) if start < total => start,
        _ => return PageOutcome::PageOutOfRange { total },
    };
    let end = start.saturating_add(page_size).min(total);

    PageOutcome::Success {
        records: records[start..end].to_vec(),
        total,
    }
}
