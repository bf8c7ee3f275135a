use super::task::Task;
use std::collections::BTreeMap;

/// Average time of the finished tasks sharing one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSummary {
    pub name: String,
    pub finished_count: usize,
    pub average_secs: u64,
}

/// Every task and subtask, parents first
pub fn all_tasks(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().flat_map(|task| task.with_subtasks())
}

fn counts_toward_average(task: &Task) -> bool {
    task.finished && task.time > 0
}

/// Floor of the mean time of finished tasks and subtasks named exactly `name`
/// with a non-zero time. `None` when there is nothing to average.
pub fn average_finished_time(tasks: &[Task], name: &str) -> Option<u64> {
    let (total, count) = all_tasks(tasks)
        .filter(|t| t.name == name && counts_toward_average(t))
        .fold((0u64, 0u64), |(total, count), t| (total + t.time, count + 1));

    if count == 0 {
        None
    } else {
        Some(total / count)
    }
}

/// Per-name averages over all finished work, sorted by name
pub fn finished_summaries(tasks: &[Task]) -> Vec<NameSummary> {
    let mut by_name: BTreeMap<&str, (u64, usize)> = BTreeMap::new();

    for task in all_tasks(tasks).filter(|t| counts_toward_average(t)) {
        let entry = by_name.entry(task.name.as_str()).or_insert((0, 0));
        entry.0 += task.time;
        entry.1 += 1;
    }

    by_name
        .into_iter()
        .map(|(name, (total, count))| NameSummary {
            name: name.to_string(),
            finished_count: count,
            average_secs: total / count as u64,
        })
        .collect()
}
