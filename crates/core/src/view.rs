//! Sorted, paginated views over the cached task list
//!
//! Everything in this module is pure: it never touches the cache or the
//! network.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::task::{Task, TaskPriority, TaskStatus};
use crate::{Error, Result};

/// Sort key of a list view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Priority,
    Status,
    Title,
    /// Newest first, using the numeric id as a creation proxy.
    ///
    /// Ids are not guaranteed to follow creation time, so this ordering is
    /// only approximately chronological.
    Date,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Status => "status",
            Self::Title => "title",
            Self::Date => "date",
        }
    }

    /// Compare two tasks under this order
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Priority => TaskPriority::rank(a.priority.as_ref())
                .cmp(&TaskPriority::rank(b.priority.as_ref())),
            Self::Status => a.status.rank().cmp(&b.status.rank()),
            Self::Title => compare_titles(&a.title, &b.title),
            Self::Date => b.id.cmp(&a.id),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "title" => Ok(Self::Title),
            "date" => Ok(Self::Date),
            other => Err(Error::validation(format!("unknown sort order '{}'", other))),
        }
    }
}

/// Accent- and case-insensitive title comparison
///
/// Titles that fold to the same key fall back to a plain comparison so the
/// order stays total.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    deunicode::deunicode(title).to_lowercase()
}

/// Number of cards per page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub const ALLOWED: [usize; 4] = [5, 10, 15, 50];

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = Error;

    fn try_from(size: usize) -> Result<Self> {
        if Self::ALLOWED.contains(&size) {
            Ok(Self(size))
        } else {
            Err(Error::validation(format!(
                "page size {} is not one of {:?}",
                size,
                Self::ALLOWED
            )))
        }
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

/// Current page of a list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// 1-based page number
    pub current_page: usize,
    pub page_size: PageSize,
}

impl Default for PageParams {
    fn default() -> Self {
        Self::first(PageSize::default())
    }
}

impl PageParams {
    pub fn first(page_size: PageSize) -> Self {
        Self {
            current_page: 1,
            page_size,
        }
    }

    /// Validated page parameters
    pub fn new(current_page: usize, page_size: usize) -> Result<Self> {
        if current_page == 0 {
            return Err(Error::validation("page numbers start at 1"));
        }
        Ok(Self {
            current_page,
            page_size: PageSize::try_from(page_size)?,
        })
    }
}

/// One page of a derived view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    pub items: Vec<Task>,
    /// Length of the sorted sequence before pagination
    pub total: usize,
}

/// Sort `tasks` by `order` and cut out page `current_page` of `page_size` items
///
/// The sort is stable, so ties keep their cache order. Pages past the end,
/// page 0 and a zero page size all yield an empty slice.
pub fn derive_view(
    tasks: &[Task],
    order: SortOrder,
    current_page: usize,
    page_size: usize,
) -> TaskPage {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| order.compare(a, b));

    let start = current_page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
        .unwrap_or(usize::MAX);
    let items = sorted
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    TaskPage {
        items,
        total: tasks.len(),
    }
}

/// `derive_view` restricted to tasks with the given status
pub fn derive_filtered_view(
    tasks: &[Task],
    status: Option<&TaskStatus>,
    order: SortOrder,
    current_page: usize,
    page_size: usize,
) -> TaskPage {
    match status {
        None => derive_view(tasks, order, current_page, page_size),
        Some(status) => {
            let matching: Vec<Task> = tasks
                .iter()
                .filter(|t| &t.status == status)
                .cloned()
                .collect();
            derive_view(&matching, order, current_page, page_size)
        }
    }
}

/// Number of pages needed for `total` items
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}
