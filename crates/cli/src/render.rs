//! Plain-text rendering of task cards and details

use std::fmt::Write;

use taskdesk_core::view::{page_count, TaskPage};
use taskdesk_core::{CollectionCache, PageParams, SortOrder, Task, TaskDetail};

/// Characters of the description shown on a card
const PREVIEW_CHARS: usize = 80;

pub fn render_card(task: &Task, responsible: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", task.id, task.title);
    let _ = write!(out, "    Status: {}", task.status);
    if let Some(priority) = &task.priority {
        let _ = write!(out, " | Priority: {}", priority);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "    {}", task.description_preview(PREVIEW_CHARS));
    let _ = write!(out, "    Responsible: {}", responsible);
    out
}

/// One page of cards with a footer describing the position
pub fn render_page(
    page: &TaskPage,
    cache: &CollectionCache,
    params: PageParams,
    order: SortOrder,
) -> String {
    if page.total == 0 {
        return "No tasks found.".to_string();
    }

    let mut out = String::new();
    for task in &page.items {
        let _ = writeln!(out, "{}", render_card(task, cache.responsible_name(task.user_id)));
        let _ = writeln!(out);
    }
    let _ = write!(
        out,
        "Page {} of {} ({} tasks, {} per page, sorted by {})",
        params.current_page,
        page_count(page.total, params.page_size.get()),
        page.total,
        params.page_size.get(),
        order
    );
    out
}

pub fn render_detail(detail: &TaskDetail) -> String {
    let task = &detail.task;
    let mut out = String::new();
    let _ = writeln!(out, "ID:          #{}", task.id);
    let _ = writeln!(out, "Title:       {}", task.title);
    let _ = writeln!(out, "Description: {}", task.description);
    let _ = writeln!(out, "Status:      {}", task.status);
    if let Some(priority) = &task.priority {
        let _ = writeln!(out, "Priority:    {}", priority);
    }
    let _ = writeln!(out, "Responsible: {}", detail.responsible_name());
    let _ = write!(out, "Email:       {}", detail.responsible_email());
    out
}
