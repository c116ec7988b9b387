use crate::model::{AchievementId, Catalog, ProgressRecord};
use crate::streak::longest_streak;

/// Module whose full completion grants `MasterOfBasics`.
pub const BASICS_MODULE_ID: &str = "1";

const QUICK_LEARNER_TASKS: usize = 5;
const PERSISTENT_STUDENT_DAYS: u32 = 5;

/// A one-way badge and the condition that grants it.
///
/// Conditions look at the whole record as it is now, not at what just changed.
#[derive(Debug)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    condition: fn(&ProgressRecord, &Catalog) -> bool,
}

impl Achievement {
    #[must_use]
    pub fn is_met(&self, record: &ProgressRecord, catalog: &Catalog) -> bool {
        (self.condition)(record, catalog)
    }
}

/// Every achievement, in the order they are checked and reported.
pub static ACHIEVEMENTS: [Achievement; 5] = [
    Achievement {
        id: AchievementId::FirstSteps,
        name: "First steps",
        description: "Complete your first task",
        condition: |record, _| !record.completed_tasks().is_empty(),
    },
    Achievement {
        id: AchievementId::QuickLearner,
        name: "Quick learner",
        description: "Complete 5 tasks",
        condition: |record, _| record.completed_tasks().len() >= QUICK_LEARNER_TASKS,
    },
    Achievement {
        id: AchievementId::MasterOfBasics,
        name: "Master of basics",
        description: "Complete every task in the basics module",
        condition: |record, catalog| module_completed(record, catalog, BASICS_MODULE_ID),
    },
    Achievement {
        id: AchievementId::TestChampion,
        name: "Test champion",
        description: "Score 100% in any test",
        condition: |record, _| record.test_results().values().any(|r| r.score >= 100.0),
    },
    Achievement {
        id: AchievementId::PersistentStudent,
        name: "Persistent student",
        description: "Practice 5 days in a row",
        condition: |record, _| longest_streak(record.session_dates()) >= PERSISTENT_STUDENT_DAYS,
    },
];

/// Look up the registry entry for an id.
#[must_use]
pub fn achievement(id: AchievementId) -> &'static Achievement {
    match id {
        AchievementId::FirstSteps => &ACHIEVEMENTS[0],
        AchievementId::QuickLearner => &ACHIEVEMENTS[1],
        AchievementId::MasterOfBasics => &ACHIEVEMENTS[2],
        AchievementId::TestChampion => &ACHIEVEMENTS[3],
        AchievementId::PersistentStudent => &ACHIEVEMENTS[4],
    }
}

/// True when every task of `module_id` is in the record. A module missing from
/// the catalog is never complete.
#[must_use]
pub fn module_completed(record: &ProgressRecord, catalog: &Catalog, module_id: &str) -> bool {
    catalog.module(module_id).is_some_and(|module| {
        module
            .task_keys()
            .into_iter()
            .all(|key| record.is_task_completed(key))
    })
}

/// Unlock every achievement whose condition now holds and that the record does
/// not have yet. Returns the newly unlocked ones in registry order.
///
/// Running it again without changes to the record unlocks nothing.
pub fn check_achievements(
    record: &mut ProgressRecord,
    catalog: &Catalog,
) -> Vec<&'static Achievement> {
    let mut unlocked = Vec::new();
    for entry in &ACHIEVEMENTS {
        if record.has_achievement(entry.id) || !entry.is_met(record, catalog) {
            continue;
        }
        record.unlock(entry.id);
        unlocked.push(entry);
    }
    unlocked
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
