#[cfg(test)]
mod tests {
    use crate::task::manager::*;
    use crate::task::registry::*;
    use crate::task::tree::*;
    use crate::task::types::*;
    use chrono::NaiveDate;

    // Helper function to create a task spec for testing
    fn create_test_task_spec(description: &str) -> TaskSpec {
        TaskSpec {
            description: description.to_string(),
            due_date: None,
            priority: None,
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = TaskRegistry::new();

        assert_eq!(registry.count(), 0);
        assert_eq!(registry.next_id(), 1);
        assert_eq!(registry.list(TaskFilter::All).count(), 0);
    }

    #[test]
    fn test_add_then_search_round_trip() {
        let mut registry = TaskRegistry::new();

        let task_id = registry.add_task(create_test_task_spec("x")).unwrap();
        let task = registry.search_task(task_id).unwrap();

        assert_eq!(task.description, "x");
        assert!(!task.completed);
        assert_eq!(task.priority, TaskPriority::Low);
    }

    #[test]
    fn test_add_task_with_due_date_and_priority() {
        let mut registry = TaskRegistry::new();

        let task_id = registry
            .add_task(TaskSpec {
                description: "walk dog".to_string(),
                due_date: Some("2025-01-01".to_string()),
                priority: Some(TaskPriority::High),
            })
            .unwrap();

        let task = registry.search_task(task_id).unwrap();
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut registry = TaskRegistry::new();

        let first = registry.add_task(create_test_task_spec("a")).unwrap();
        let second = registry.add_task(create_test_task_spec("b")).unwrap();
        assert!(second > first);

        registry.remove_task(second).unwrap();
        let third = registry.add_task(create_test_task_spec("c")).unwrap();

        assert!(third > second);
        assert_eq!(third, 3);
    }

    #[test]
    fn test_rejected_task_does_not_consume_id() {
        let mut registry = TaskRegistry::new();

        let err = registry
            .add_task(TaskSpec {
                description: "bad date".to_string(),
                due_date: Some("2025-02-30".to_string()),
                priority: None,
            })
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        assert!(matches!(
            registry.add_task(create_test_task_spec("")),
            Err(TaskError::Validation(_))
        ));

        assert_eq!(registry.add_task(create_test_task_spec("ok")).unwrap(), 1);
    }

    #[test]
    fn test_remove_then_search() {
        let mut registry = TaskRegistry::new();
        let task_id = registry.add_task(create_test_task_spec("gone")).unwrap();
        registry.add_task(create_test_task_spec("stays")).unwrap();
        registry.add_subtask(task_id, "child").unwrap();

        let count = registry.count();
        let removed = registry.remove_task(task_id).unwrap();

        assert_eq!(removed.subtasks.len(), 1);
        assert_eq!(registry.count(), count - 1);
        assert_eq!(
            registry.search_task(task_id),
            Err(TaskError::NotFound(task_id))
        );
        assert_eq!(
            registry.remove_task(task_id),
            Err(TaskError::NotFound(task_id))
        );
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut registry = TaskRegistry::new();
        let task_id = registry.add_task(create_test_task_spec("once")).unwrap();

        assert_eq!(registry.complete_task(task_id), Ok(()));
        assert_eq!(registry.complete_task(task_id), Ok(()));
        assert!(registry.search_task(task_id).unwrap().completed);

        assert_eq!(registry.complete_task(42), Err(TaskError::NotFound(42)));
    }

    #[test]
    fn test_subtasks_keep_insertion_order() {
        let mut registry = TaskRegistry::new();
        let task_id = registry.add_task(create_test_task_spec("parent")).unwrap();

        assert_eq!(registry.add_subtask(task_id, "first").unwrap(), 1);
        assert_eq!(registry.add_subtask(task_id, "second").unwrap(), 2);
        registry.complete_subtask(task_id, 2).unwrap();

        let subtasks = registry.list_subtasks(task_id).unwrap();
        assert_eq!(subtasks.len(), 2);
        assert_eq!(subtasks[0].description, "first");
        assert!(!subtasks[0].completed);
        assert!(subtasks[1].completed);

        // Subtasks never mint registry ids.
        assert_eq!(registry.next_id(), 2);
        assert_eq!(
            registry.add_subtask(99, "orphan"),
            Err(TaskError::NotFound(99))
        );
    }

    #[test]
    fn test_list_filters() {
        let mut registry = TaskRegistry::new();
        for description in ["a", "b", "c", "d"] {
            registry.add_task(create_test_task_spec(description)).unwrap();
        }
        registry.complete_task(2).unwrap();
        registry.complete_task(4).unwrap();

        let all: Vec<TaskId> = registry.list(TaskFilter::All).map(|t| t.id).collect();
        let open: Vec<TaskId> = registry
            .list(TaskFilter::Uncompleted)
            .map(|t| t.id)
            .collect();

        assert_eq!(all, vec![1, 2, 3, 4]);
        assert_eq!(open, vec![1, 3]);
    }

    #[test]
    fn test_registry_store_stays_valid() {
        let mut registry = TaskRegistry::new();
        for i in 0..64 {
            registry
                .add_task(create_test_task_spec(&format!("task {}", i)))
                .unwrap();
        }
        for task_id in (1..=64).step_by(3) {
            registry.remove_task(task_id).unwrap();
        }

        registry.store().validate().unwrap();
        assert_eq!(registry.count(), 64 - 22);
    }

    #[test]
    fn test_store_error_converts_to_task_error() {
        let err: TaskError = StoreError::DuplicateKey(3).into();
        assert!(err.to_string().starts_with("Erro interno:"));
    }

    #[tokio::test]
    async fn test_manager_shares_registry_between_clones() {
        let manager = TaskManager::new();
        let other = manager.clone();

        let task_id = manager.add_task(create_test_task_spec("shared")).await.unwrap();
        other.complete_task(task_id).await.unwrap();

        let task = manager.search_task(task_id).await.unwrap();
        assert!(task.completed);
        assert_eq!(manager.list(TaskFilter::Uncompleted).await.len(), 0);
        assert_eq!(other.list(TaskFilter::All).await.len(), 1);
    }

    #[tokio::test]
    async fn test_manager_statistics() {
        let manager = TaskManager::new();
        manager.add_task(create_test_task_spec("a")).await.unwrap();
        manager.add_task(create_test_task_spec("b")).await.unwrap();
        manager.complete_task(1).await.unwrap();
        manager.remove_task(2).await.unwrap();

        let stats = manager.get_statistics().await;
        assert_eq!(
            stats,
            TaskStatistics {
                total_tasks: 1,
                completed_tasks: 1,
                next_id: 3,
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_get_unique_ids() {
        let manager = TaskManager::new();
        let mut handles = Vec::new();

        for worker in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for i in 0..25 {
                    let spec = create_test_task_spec(&format!("worker {} task {}", worker, i));
                    ids.push(manager.add_task(spec).await.unwrap());
                }
                ids
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.extend(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 200);
        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
        assert_eq!(manager.count().await, 200);
    }
}
