//! Decides when a scrolled list has stopped producing new content.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

pub const DEFAULT_REPEATS_TO_END: u32 = 5;

/// Consecutive reads with no rows at all before the list is considered gone.
const MAX_EMPTY_PAGES: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `repeats_to_end` consecutive reads brought nothing unseen.
    Repeated,
    /// The list rendered no rows for too many reads in a row.
    EmptyPages,
    /// The screen stopped moving: the same page came back `repeats_to_end`
    /// times in a row, counting its first appearance.
    IdenticalPages,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::Repeated => write!(f, "repeated content"),
            EndReason::EmptyPages => write!(f, "empty pages"),
            EndReason::IdenticalPages => write!(f, "identical pages"),
        }
    }
}

/// Tracks page reads of one list.
///
/// Feed it the row keys of every read with [`notify_page`](Self::notify_page)
/// and ask [`is_end`](Self::is_end) before scrolling again.
#[derive(Debug)]
pub struct ScrollEndDetector {
    repeats_to_end: u32,
    seen: HashSet<String>,
    repeats: u32,
    empty_pages: u32,
    identical_pages: u32,
    last_digest: Option<[u8; 32]>,
    pages: u32,
}

impl Default for ScrollEndDetector {
    fn default() -> Self {
        Self::new(DEFAULT_REPEATS_TO_END)
    }
}

impl ScrollEndDetector {
    #[must_use]
    pub fn new(repeats_to_end: u32) -> Self {
        Self {
            repeats_to_end: repeats_to_end.max(1),
            seen: HashSet::new(),
            repeats: 0,
            empty_pages: 0,
            identical_pages: 0,
            last_digest: None,
            pages: 0,
        }
    }

    /// Record one read; returns `true` if it contained unseen keys.
    pub fn notify_page(&mut self, keys: &[String]) -> bool {
        self.pages += 1;
        if keys.is_empty() {
            self.empty_pages += 1;
            return false;
        }
        self.empty_pages = 0;

        let digest = page_digest(keys);
        if self.last_digest == Some(digest) {
            self.identical_pages += 1;
        } else {
            self.identical_pages = 1;
            self.last_digest = Some(digest);
        }

        let mut fresh = 0usize;
        for key in keys {
            if self.seen.insert(key.clone()) {
                fresh += 1;
            }
        }
        if fresh == 0 {
            self.repeats += 1;
        } else {
            self.repeats = 0;
        }
        fresh > 0
    }

    #[must_use]
    pub fn is_end(&self) -> Option<EndReason> {
        if self.identical_pages >= self.repeats_to_end {
            Some(EndReason::IdenticalPages)
        } else if self.repeats >= self.repeats_to_end {
            Some(EndReason::Repeated)
        } else if self.empty_pages >= MAX_EMPTY_PAGES {
            Some(EndReason::EmptyPages)
        } else {
            None
        }
    }

    #[must_use]
    pub fn pages(&self) -> u32 {
        self.pages
    }

    #[must_use]
    pub fn unique(&self) -> usize {
        self.seen.len()
    }
}

fn page_digest(keys: &[String]) -> [u8; 32] {
    let mut sorted: Vec<&str> = keys.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let mut hasher = Sha256::new();
    for key in sorted {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
    }
    hasher.finalize().into()
}
