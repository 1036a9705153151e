//! Download progress events.

/// Unit a progress value counts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ProgressUnit {
    /// Bytes of a single transfer
    Bytes,
    /// Items of a multi-item download
    Items,
}

/// One step of a download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Amount done so far
    pub current: u64,
    /// Expected total, when known
    pub total: Option<u64>,
    /// What is being counted
    pub unit: ProgressUnit,
}

impl Progress {
    /// Byte progress of a streamed transfer.
    pub fn bytes(current: u64, total: Option<u64>) -> Self {
        Self {
            current,
            total,
            unit: ProgressUnit::Bytes,
        }
    }

    /// Item progress of a multi-item download.
    pub fn items(current: u64, total: u64) -> Self {
        Self {
            current,
            total: Some(total),
            unit: ProgressUnit::Items,
        }
    }

    /// Completion percentage, when the total is known.
    pub fn percent(&self) -> Option<u64> {
        self.total
            .filter(|t| *t > 0)
            .map(|t| self.current.min(t) * 100 / t)
    }

    /// True when the step reaches the known total.
    pub fn is_last(&self) -> bool {
        self.total.is_some_and(|t| self.current >= t)
    }
}

const UNKNOWN_TOTAL_STEP: u64 = 1024 * 1024;

/// Decides which progress events are worth rendering.
///
/// Totals of 100 or more report at each 25 % step. Smaller totals report
/// every third step and the last one. Unknown totals report once per MiB.
///
/// # Examples
///
/// ```
/// use siphon_core::{Progress, ProgressThrottle};
///
/// let mut throttle = ProgressThrottle::default();
/// let shown: Vec<u64> = (1..=5)
///     .map(|i| Progress::items(i, 5))
///     .filter(|p| throttle.should_report(p))
///     .map(|p| p.current)
///     .collect();
/// assert_eq!(shown, vec![3, 5]);
/// ```
#[derive(Debug, Default)]
pub struct ProgressThrottle {
    last: Option<u64>,
}

impl ProgressThrottle {
    /// Whether `progress` should be shown; records it when it should.
    pub fn should_report(&mut self, progress: &Progress) -> bool {
        let report = match progress.total {
            Some(total) if total >= 100 => {
                let step = progress.current.min(total) * 4 / total;
                let last_step = self.last.map(|l| l.min(total) * 4 / total);
                last_step.is_none_or(|l| step > l) && step > 0
            }
            Some(_) => progress.current % 3 == 0 || progress.is_last(),
            None => self
                .last
                .is_none_or(|l| progress.current >= l + UNKNOWN_TOTAL_STEP),
        };
        if report {
            self.last = Some(progress.current);
        }
        report
    }
}
