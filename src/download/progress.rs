/// Tracks how much of a download has been written, and when a progress dot is due.
///
/// A dot is due every time the whole percentage changes. Without a known total
/// no dots are ever due.
#[derive(Debug, Clone)]
pub struct Progress {
    total: Option<u64>,
    written: u64,
    percent: u64,
}

impl Progress {
    #[must_use]
    pub fn new(total: Option<u64>) -> Self {
        Self {
            // An empty body has nothing to report progress on
            total: total.filter(|total| *total > 0),
            written: 0,
            percent: 0,
        }
    }

    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Whole percent written so far, `None` when the size is unknown
    #[must_use]
    pub fn percentage(&self) -> Option<u64> {
        self.total.map(|total| {
            let percent = u128::from(self.written) * 100 / u128::from(total);
            u64::try_from(percent).unwrap_or(u64::MAX)
        })
    }

    /// Records `bytes` more written, returns true if a dot should be printed.
    pub fn advance(&mut self, bytes: u64) -> bool {
        self.written = self.written.saturating_add(bytes);

        match self.percentage() {
            Some(percent) if percent != self.percent => {
                self.percent = percent;
                true
            }
            _ => false,
        }
    }
}
