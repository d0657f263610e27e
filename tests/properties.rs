//! Property tests over generated task forests
//!
//! The generator builds arbitrary two-level forests (parents always point at
//! an earlier task of the same comparison level, so every tree is well
//! formed) and checks the structural invariants the engine promises for any
//! input.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

use gantt_engine::engine::{build_forest, build_nested_index, build_task_map};
use gantt_engine::{EmptyTask, Schedule, Task, TaskOrEmpty};

#[derive(Debug, Clone)]
struct Seed {
    level_one: bool,
    empty: bool,
    parent_seed: u8,
    start_offset: u8,
    duration: u8,
}

fn seed_strategy() -> impl Strategy<Value = Seed> {
    (any::<bool>(), any::<bool>(), any::<u8>(), 0u8..60, 0u8..20).prop_map(
        |(level_one, empty, parent_seed, start_offset, duration)| Seed {
            level_one,
            empty,
            parent_seed,
            start_offset,
            duration,
        },
    )
}

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn tasks_from_seeds(seeds: &[Seed]) -> Vec<TaskOrEmpty> {
    let mut tasks: Vec<TaskOrEmpty> = Vec::new();

    for (position, seed) in seeds.iter().enumerate() {
        let level = if seed.level_one { 1 } else { 2 };
        let id = format!("t{}", position);
        let name = format!("Task {}", position);

        let candidates: Vec<usize> = (0..tasks.len())
            .filter(|&i| tasks[i].comparison_level() == level)
            .collect();
        let parent = if candidates.is_empty() || seed.parent_seed % 3 == 0 {
            None
        } else {
            let chosen = candidates[seed.parent_seed as usize % candidates.len()];
            Some(tasks[chosen].id().to_string())
        };

        if seed.empty {
            tasks.push(
                EmptyTask {
                    id,
                    name,
                    parent,
                    comparison_level: level,
                    display_order: None,
                }
                .into(),
            );
        } else {
            let start = base_date() + TimeDelta::days(seed.start_offset as i64);
            let end = start + TimeDelta::days(seed.duration as i64);
            let mut task = Task::new(id, name, start, end);
            task.parent = parent;
            task.comparison_level = level;
            tasks.push(task.into());
        }
    }

    tasks
}

proptest! {
    #[test]
    fn forest_partitions_every_task(seeds in prop::collection::vec(seed_strategy(), 0..40)) {
        let tasks = tasks_from_seeds(&seeds);
        let (children, roots) = build_forest(&tasks);

        let mut indexes: Vec<usize> = Vec::new();
        for level_roots in roots.values() {
            indexes.extend(level_roots.iter().copied());
        }
        for level_children in children.values() {
            for child_indexes in level_children.values() {
                indexes.extend(child_indexes.iter().copied());
            }
        }

        indexes.sort_unstable();
        let expected: Vec<usize> = (0..tasks.len()).collect();
        prop_assert_eq!(indexes, expected);
    }

    #[test]
    fn nested_indexes_are_unique_per_level(seeds in prop::collection::vec(seed_strategy(), 0..40)) {
        let tasks = tasks_from_seeds(&seeds);
        let (children, roots) = build_forest(&tasks);
        let nested = build_nested_index(&tasks, &children, &roots);

        for level_index in nested.values() {
            let mut dotted: Vec<&String> = level_index.values().map(|(_, s)| s).collect();
            let total = dotted.len();
            dotted.sort();
            dotted.dedup();
            prop_assert_eq!(dotted.len(), total);

            for (depth, index) in level_index.values() {
                prop_assert_eq!(*depth, index.split('.').count() - 1);
            }
        }

        // every task is reachable in this generator, so every task is indexed
        let task_map = build_task_map(&tasks);
        for (level, level_tasks) in &task_map {
            prop_assert_eq!(nested.get(level).map_or(0, |m| m.len()), level_tasks.len());
        }
    }

    #[test]
    fn level_one_maps_ignore_level_two_tasks(seeds in prop::collection::vec(seed_strategy(), 0..40)) {
        let tasks = tasks_from_seeds(&seeds);
        let level_one_only: Vec<TaskOrEmpty> = tasks
            .iter()
            .filter(|task| task.comparison_level() == 1)
            .cloned()
            .collect();

        let combined = Schedule::build(tasks);
        let alone = Schedule::build(level_one_only);

        prop_assert_eq!(
            combined.nested_index.get(&1),
            alone.nested_index.get(&1)
        );

        let project = |schedule: &Schedule| -> Option<Vec<(String, Vec<String>)>> {
            schedule.children.get(&1).map(|level| {
                let mut projected: Vec<(String, Vec<String>)> = level
                    .iter()
                    .map(|(parent, indexes)| {
                        (
                            parent.clone(),
                            indexes
                                .iter()
                                .map(|&i| schedule.tasks[i].id().to_string())
                                .collect(),
                        )
                    })
                    .collect();
                projected.sort();
                projected
            })
        };
        prop_assert_eq!(project(&combined), project(&alone));
    }

    #[test]
    fn rebuilding_is_idempotent(seeds in prop::collection::vec(seed_strategy(), 0..40)) {
        let tasks = tasks_from_seeds(&seeds);
        let first = Schedule::build(tasks.clone());
        let second = Schedule::build(tasks);
        prop_assert_eq!(first, second);
    }
}
