use trainer_core::model::{CommandSpec, Module};

/// One line of the command menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandRowVm {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    /// Highest task difficulty, at least one star.
    pub stars: String,
    pub task_count: usize,
}

impl CommandRowVm {
    fn new(id: &str, command: &CommandSpec) -> Self {
        let (title, subtitle) = command.title_parts();
        let level = command.max_difficulty().unwrap_or(1).max(1);
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            subtitle: subtitle.map(str::to_owned),
            stars: stars(level),
            task_count: command.practice.len(),
        }
    }
}

#[must_use]
pub fn stars(level: u32) -> String {
    "★".repeat(level as usize)
}

#[must_use]
pub fn map_command_rows(module: &Module) -> Vec<CommandRowVm> {
    module
        .commands
        .iter()
        .map(|(id, command)| CommandRowVm::new(id, command))
        .collect()
}
