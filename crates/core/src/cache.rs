//! In-memory mirror of the remote task and user lists

use crate::task::Task;
use crate::user::{self, User};
use crate::view::{PageParams, PageSize};

/// A mutation applied while a load was in flight
#[derive(Debug, Clone, PartialEq, Eq)]
enum JournalEntry {
    Upsert(Task),
    Replace(Task),
    Remove(i64),
}

/// Task/user collections of one mounted view
///
/// `tasks` keeps fetch/creation order; views sort a copy.
///
/// Mutations that land while a load is in flight are journaled and replayed
/// over the fetched list, so a load never undoes a newer create, update or
/// delete. Only the most recently started load may apply its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionCache {
    pub tasks: Vec<Task>,
    pub users: Vec<User>,
    pub loading: bool,
    pub page: PageParams,
    generation: u64,
    journal: Vec<JournalEntry>,
}

impl Default for CollectionCache {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl CollectionCache {
    /// Empty cache waiting for its first load
    pub fn new(page_size: PageSize) -> Self {
        Self {
            tasks: Vec::new(),
            users: Vec::new(),
            loading: true,
            page: PageParams::first(page_size),
            generation: 0,
            journal: Vec::new(),
        }
    }

    /// Start a load; the returned generation identifies its result
    pub fn begin_load(&mut self) -> u64 {
        self.loading = true;
        self.generation += 1;
        self.journal.clear();
        self.generation
    }

    /// Apply the result of the load started as `generation`
    ///
    /// Mutations journaled since that load began are replayed over `tasks`.
    /// Returns false, leaving the cache untouched, when a newer load has
    /// started in the meantime.
    pub fn finish_load(&mut self, generation: u64, mut tasks: Vec<Task>, users: Vec<User>) -> bool {
        if generation != self.generation {
            return false;
        }
        for entry in self.journal.drain(..) {
            match entry {
                JournalEntry::Upsert(task) => upsert_into(&mut tasks, task),
                JournalEntry::Replace(task) => {
                    replace_in(&mut tasks, task);
                }
                JournalEntry::Remove(id) => tasks.retain(|t| t.id != id),
            }
        }
        self.replace(tasks, users);
        true
    }

    /// Record the failure of the load started as `generation`
    ///
    /// Returns false when a newer load has started in the meantime.
    pub fn fail_load(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.mark_failed();
        true
    }

    /// Replace both collections after a successful load
    pub fn replace(&mut self, tasks: Vec<Task>, users: Vec<User>) {
        self.tasks = tasks;
        self.users = users;
        self.loading = false;
        self.page.current_page = 1;
        self.journal.clear();
    }

    /// Record a failed load: both collections are left empty
    pub fn mark_failed(&mut self) {
        self.tasks.clear();
        self.users.clear();
        self.loading = false;
        self.journal.clear();
    }

    fn record(&mut self, entry: JournalEntry) {
        if self.loading && self.generation > 0 {
            self.journal.push(entry);
        }
    }

    pub fn find_task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_user(&self, id: i64) -> Option<&User> {
        user::find_user(&self.users, id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.find_task(id).is_some()
    }

    /// Add a task at the end, or replace the record with the same id
    pub fn upsert(&mut self, task: Task) {
        self.record(JournalEntry::Upsert(task.clone()));
        upsert_into(&mut self.tasks, task);
    }

    /// Replace the record with the same id; returns false if it is not cached
    pub fn replace_task(&mut self, task: Task) -> bool {
        self.record(JournalEntry::Replace(task.clone()));
        replace_in(&mut self.tasks, task)
    }

    /// Remove by id; removing an absent id is a no-op
    pub fn remove(&mut self, id: i64) -> Option<Task> {
        self.record(JournalEntry::Remove(id));
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }

    pub fn responsible_name(&self, user_id: i64) -> &str {
        user::responsible_name(&self.users, user_id)
    }

    pub fn responsible_email(&self, user_id: i64) -> &str {
        user::responsible_email(&self.users, user_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn upsert_into(tasks: &mut Vec<Task>, task: Task) {
    match tasks.iter_mut().find(|t| t.id == task.id) {
        Some(existing) => *existing = task,
        None => tasks.push(task),
    }
}

fn replace_in(tasks: &mut [Task], task: Task) -> bool {
    match tasks.iter_mut().find(|t| t.id == task.id) {
        Some(existing) => {
            *existing = task;
            true
        }
        None => false,
    }
}
