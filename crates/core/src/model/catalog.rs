use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("module {module}: command {command} has a task with empty text")]
    EmptyTaskText { module: String, command: String },

    #[error("module {module}: task {task:?} has an empty solution")]
    EmptySolution { module: String, task: String },

    #[error("test level {level}: question {index} has no options")]
    NoOptions { level: String, index: usize },

    #[error("test level {level}: question {index} marks option {correct} correct but has {options} options")]
    CorrectOutOfRange {
        level: String,
        index: usize,
        correct: usize,
        options: usize,
    },

    #[error("scenario {id} has no steps")]
    EmptyScenario { id: String },
}

//
// ─── CONTENT TYPES ─────────────────────────────────────────────────────────────
//

/// A canned wrong answer with a targeted explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSimulation {
    pub wrong_input: String,
    pub message: String,
}

/// A single practice prompt. The `task` text doubles as its progress key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task: String,
    pub solution: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_simulation: Vec<ErrorSimulation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

fn default_difficulty() -> u32 {
    1
}

impl Task {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.task
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default)]
    pub theory: String,
    #[serde(default)]
    pub when_useful: String,
    #[serde(default)]
    pub params: String,
    #[serde(default)]
    pub practice: Vec<Task>,
}

impl CommandSpec {
    /// Distinct task keys of this command's practice pool.
    #[must_use]
    pub fn task_keys(&self) -> BTreeSet<&str> {
        self.practice.iter().map(Task::key).collect()
    }

    /// Hardest difficulty in the practice pool, if any.
    #[must_use]
    pub fn max_difficulty(&self) -> Option<u32> {
        self.practice.iter().map(|t| t.difficulty).max()
    }

    /// Splits `"ls - list directory contents"` into its command and description.
    #[must_use]
    pub fn title_parts(&self) -> (&str, Option<&str>) {
        match self.name.split_once(" - ") {
            Some((command, description)) => (command, Some(description)),
            None => (self.name.as_str(), None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub commands: IndexMap<String, CommandSpec>,
}

impl Module {
    /// Distinct task keys across every command in the module.
    #[must_use]
    pub fn task_keys(&self) -> BTreeSet<&str> {
        self.commands
            .values()
            .flat_map(|cmd| cmd.practice.iter().map(Task::key))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct: usize,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestLevel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub task: String,
    #[serde(default)]
    pub hint: String,
    pub solution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    pub steps: Vec<ScenarioStep>,
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Read-only training content: modules of commands, multiple-choice tests and
/// multi-step scenarios.
///
/// On disk the `tests` and `scenarios` sections sit next to the module entries
/// in one top-level object; every other key is a module id. Document order is
/// kept so menus list entries the way the author wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    tests: IndexMap<String, TestLevel>,
    #[serde(default)]
    scenarios: IndexMap<String, Scenario>,
    #[serde(flatten)]
    modules: IndexMap<String, Module>,
}

impl Catalog {
    #[must_use]
    pub fn new(
        modules: IndexMap<String, Module>,
        tests: IndexMap<String, TestLevel>,
        scenarios: IndexMap<String, Scenario>,
    ) -> Self {
        Self {
            tests,
            scenarios,
            modules,
        }
    }

    #[must_use]
    pub fn modules(&self) -> &IndexMap<String, Module> {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    #[must_use]
    pub fn command(&self, module_id: &str, command_id: &str) -> Option<&CommandSpec> {
        self.module(module_id)?.commands.get(command_id)
    }

    #[must_use]
    pub fn tests(&self) -> &IndexMap<String, TestLevel> {
        &self.tests
    }

    #[must_use]
    pub fn test_level(&self, level: &str) -> Option<&TestLevel> {
        self.tests.get(level)
    }

    #[must_use]
    pub fn scenarios(&self) -> &IndexMap<String, Scenario> {
        &self.scenarios
    }

    #[must_use]
    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.get(id)
    }

    /// Finds a scenario by its `id` field rather than its menu key.
    #[must_use]
    pub fn scenario_by_id(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.values().find(|s| s.id == id)
    }

    /// Every distinct task key in the catalog.
    #[must_use]
    pub fn all_task_keys(&self) -> BTreeSet<&str> {
        self.modules.values().flat_map(Module::task_keys).collect()
    }

    /// Task texts that appear more than once across the catalog.
    ///
    /// Progress is keyed by task text, so a duplicate makes two tasks
    /// indistinguishable: solving one marks both as done.
    #[must_use]
    pub fn duplicate_task_keys(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for module in self.modules.values() {
            for command in module.commands.values() {
                for task in &command.practice {
                    *seen.entry(task.key()).or_default() += 1;
                }
            }
        }
        seen.into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key.to_owned())
            .collect()
    }

    /// Check structural invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogError` found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (module_id, module) in &self.modules {
            for (command_id, command) in &module.commands {
                for task in &command.practice {
                    if task.task.trim().is_empty() {
                        return Err(CatalogError::EmptyTaskText {
                            module: module_id.clone(),
                            command: command_id.clone(),
                        });
                    }
                    if task.solution.trim().is_empty() {
                        return Err(CatalogError::EmptySolution {
                            module: module_id.clone(),
                            task: task.task.clone(),
                        });
                    }
                }
            }
        }

        for (level, test) in &self.tests {
            for (index, question) in test.questions.iter().enumerate() {
                if question.options.is_empty() {
                    return Err(CatalogError::NoOptions {
                        level: level.clone(),
                        index,
                    });
                }
                if question.correct >= question.options.len() {
                    return Err(CatalogError::CorrectOutOfRange {
                        level: level.clone(),
                        index,
                        correct: question.correct,
                        options: question.options.len(),
                    });
                }
            }
        }

        for scenario in self.scenarios.values() {
            if scenario.steps.is_empty() {
                return Err(CatalogError::EmptyScenario {
                    id: scenario.id.clone(),
                });
            }
        }

        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
