use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use trainer_core::model::Task;

/// Picks the next practice task from a command's pool.
///
/// Unsolved tasks of the lowest difficulty come first; ties are broken at
/// random so repeated visits do not always show the same prompt.
pub struct TaskSelector<'a> {
    pool: &'a [Task],
}

impl<'a> TaskSelector<'a> {
    #[must_use]
    pub fn new(pool: &'a [Task]) -> Self {
        Self { pool }
    }

    /// Tasks whose key is not in `completed`, in pool order.
    pub fn remaining<'c>(
        &'c self,
        completed: &'c BTreeSet<String>,
    ) -> impl Iterator<Item = &'a Task> + 'c {
        self.pool
            .iter()
            .filter(move |task| !completed.contains(task.key()))
    }

    /// Lowest difficulty among unsolved tasks, or `None` once the pool is exhausted.
    #[must_use]
    pub fn easiest_tier(&self, completed: &BTreeSet<String>) -> Option<u32> {
        self.remaining(completed).map(|task| task.difficulty).min()
    }

    /// Choose the next task, or `None` when every task has been solved.
    pub fn select<R: Rng + ?Sized>(
        &self,
        completed: &BTreeSet<String>,
        rng: &mut R,
    ) -> Option<&'a Task> {
        let tier = self.easiest_tier(completed)?;
        let candidates: Vec<&'a Task> = self
            .remaining(completed)
            .filter(|task| task.difficulty == tier)
            .collect();
        candidates.choose(rng).copied()
    }
}
