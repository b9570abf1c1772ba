//! Integration tests for the mark workflow on an in-memory SQLite store
//!
//! Covers listing visibility, task creation fan-out, duplicate marking,
//! prev/next navigation and deletion.

use std::sync::Arc;

use quill::mark::{
    LoginUser, MarkData, MarkError, MarkService, MarkStore, MarkTaskCreate, MarkTaskStatus,
    NewChatMessage, NewMarkAppUser, NewMarkRecord, NewMarkTask, SqliteMarkStore, User,
};

// ============================================================================
// Helpers
// ============================================================================

fn admin() -> LoginUser {
    LoginUser::new(1, "admin", "admin")
}

fn alice() -> LoginUser {
    LoginUser::new(2, "alice", "user")
}

fn bob() -> LoginUser {
    LoginUser::new(3, "bob", "user")
}

async fn setup() -> (MarkService, Arc<SqliteMarkStore>) {
    let store = Arc::new(SqliteMarkStore::in_memory().await.unwrap());
    for user in [admin(), alice(), bob()] {
        store
            .upsert_user(User {
                user_id: user.user_id,
                user_name: user.user_name.clone(),
                role: user.role.clone(),
            })
            .await
            .unwrap();
    }
    (MarkService::new(store.clone()), store)
}

fn create_req(apps: &[&str], users: &[&str]) -> MarkTaskCreate {
    MarkTaskCreate {
        app_list: apps.iter().map(|s| s.to_string()).collect(),
        user_list: users.iter().map(|s| s.to_string()).collect(),
    }
}

fn mark_req(task_id: i64, session_id: &str) -> MarkData {
    MarkData {
        task_id,
        session_id: session_id.to_string(),
        status: Some(1),
        flow_type: Some("flow".to_string()),
    }
}

async fn add_message(store: &SqliteMarkStore, chat_id: &str, flow_id: &str) {
    store
        .insert_message(NewChatMessage {
            chat_id: chat_id.to_string(),
            flow_id: flow_id.to_string(),
            flow_type: "assistant".to_string(),
            user_id: None,
            message: "hello".to_string(),
        })
        .await
        .unwrap();
}

// ============================================================================
// create_task / get_user
// ============================================================================

#[tokio::test]
async fn test_create_task_inserts_cross_product() {
    let (service, store) = setup().await;
    let task_id = service
        .create_task(&admin(), create_req(&["app-a", "app-b"], &["2", "3"]))
        .await
        .unwrap();

    let task = store.get_task(task_id).await.unwrap().unwrap();
    assert_eq!(task.app_id, "app-a,app-b");
    assert_eq!(task.process_users, "2,3");
    assert_eq!(task.status, MarkTaskStatus::Default);
    assert_eq!(task.create_user, "admin");

    let rows = store.list_app_users(task_id).await.unwrap();
    assert_eq!(rows.len(), 4);
    let pairs: Vec<(String, i64)> = rows.iter().map(|r| (r.app_id.clone(), r.user_id)).collect();
    assert_eq!(
        pairs,
        vec![
            ("app-a".to_string(), 2),
            ("app-a".to_string(), 3),
            ("app-b".to_string(), 2),
            ("app-b".to_string(), 3),
        ]
    );
}

#[tokio::test]
async fn test_create_task_rejects_bad_input() {
    let (service, _) = setup().await;

    let err = service
        .create_task(&admin(), create_req(&[], &["2"]))
        .await
        .unwrap_err();
    assert!(matches!(err, MarkError::InvalidArgument(_)));

    let err = service
        .create_task(&admin(), create_req(&["app"], &["not-a-number"]))
        .await
        .unwrap_err();
    assert!(matches!(err, MarkError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_create_task_dedups_apps_and_users() {
    let (service, store) = setup().await;
    let task_id = service
        .create_task(&admin(), create_req(&["app", " app ", "app-b"], &["2", "2", " 3"]))
        .await
        .unwrap();

    let task = store.get_task(task_id).await.unwrap().unwrap();
    assert_eq!(task.app_id, "app,app-b");
    assert_eq!(task.process_users, "2,3");
    assert_eq!(store.list_app_users(task_id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_task_rolls_back_when_a_row_fails() {
    let (service, store) = setup().await;
    let row = || NewMarkAppUser {
        app_id: "app".into(),
        user_id: 2,
    };

    // 重复的关联行触发唯一索引，主任务也不应落库
    let result = store
        .create_task(
            NewMarkTask {
                create_user: "admin".into(),
                create_id: 1,
                app_id: "app".into(),
                process_users: "2".into(),
            },
            vec![row(), row()],
        )
        .await;
    assert!(result.is_err());

    let page = service.list(&admin(), None, 10, 1).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(store.list_app_users(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_user_resolves_assigned_users() {
    let (service, _) = setup().await;
    let task_id = service
        .create_task(&admin(), create_req(&["app"], &["2", "3", "99"]))
        .await
        .unwrap();

    let users = service.get_user(task_id).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.user_name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);

    let err = service.get_user(404).await.unwrap_err();
    assert_eq!(err.to_string(), "任务不存在");
}

// ============================================================================
// mark / get_record
// ============================================================================

#[tokio::test]
async fn test_mark_twice_returns_duplicate_error() {
    let (service, store) = setup().await;
    let task_id = service
        .create_task(&admin(), create_req(&["app"], &["2", "3"]))
        .await
        .unwrap();

    service.mark(&alice(), mark_req(task_id, "chat-1")).await.unwrap();
    let task = store.get_task(task_id).await.unwrap().unwrap();
    assert_eq!(task.status, MarkTaskStatus::Ing);

    let err = service
        .mark(&bob(), mark_req(task_id, "chat-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarkError::AlreadyMarked));
    assert_eq!(err.to_string(), "已经标注过了");

    let record = service.get_record("chat-1", task_id).await.unwrap().unwrap();
    assert_eq!(record.create_user, "alice");
    assert_eq!(record.flow_type.as_deref(), Some("flow"));
}

#[tokio::test]
async fn test_same_session_can_be_marked_in_different_tasks() {
    let (service, _) = setup().await;
    let t1 = service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap();
    let t2 = service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap();

    service.mark(&alice(), mark_req(t1, "chat-1")).await.unwrap();
    service.mark(&alice(), mark_req(t2, "chat-1")).await.unwrap();
}

#[tokio::test]
async fn test_unique_index_backs_up_precheck() {
    let (service, store) = setup().await;
    let task_id = service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap();
    service.mark(&alice(), mark_req(task_id, "chat-1")).await.unwrap();

    // 绕过服务层的查重，直接插入
    let err = store
        .create_record(NewMarkRecord {
            create_user: "bob".into(),
            create_id: 3,
            session_id: "chat-1".into(),
            task_id,
            status: None,
            flow_type: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MarkError::AlreadyMarked));
}

#[tokio::test]
async fn test_create_record_for_missing_task_writes_nothing() {
    let (_, store) = setup().await;
    let err = store
        .create_record(NewMarkRecord {
            create_user: "alice".into(),
            create_id: 2,
            session_id: "chat-1".into(),
            task_id: 77,
            status: Some(1),
            flow_type: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MarkError::TaskNotFound(77)));
    assert!(store.get_record(77, "chat-1").await.unwrap().is_none());
    assert!(store.latest_record_by_user(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_record_leaves_task_untouched() {
    let (service, store) = setup().await;
    let task_id = service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap();
    let first = store
        .create_record(NewMarkRecord {
            create_user: "alice".into(),
            create_id: 2,
            session_id: "chat-1".into(),
            task_id,
            status: None,
            flow_type: None,
        })
        .await
        .unwrap();
    let marked = store.get_task(task_id).await.unwrap().unwrap();
    assert_eq!(marked.status, MarkTaskStatus::Ing);

    let err = store
        .create_record(NewMarkRecord {
            create_user: "bob".into(),
            create_id: 3,
            session_id: "chat-1".into(),
            task_id,
            status: None,
            flow_type: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, MarkError::AlreadyMarked));

    // 失败的插入连同状态更新一起回滚
    let after = store.get_task(task_id).await.unwrap().unwrap();
    assert_eq!(after.update_time, marked.update_time);
    assert_eq!(store.list_records(task_id).await.unwrap(), vec![first]);
}

#[tokio::test]
async fn test_mark_unknown_task() {
    let (service, _) = setup().await;
    let err = service.mark(&alice(), mark_req(77, "chat-1")).await.unwrap_err();
    assert!(matches!(err, MarkError::TaskNotFound(77)));
}

#[tokio::test]
async fn test_get_record_missing_is_none() {
    let (service, _) = setup().await;
    assert!(service.get_record("nope", 1).await.unwrap().is_none());
}

// ============================================================================
// list
// ============================================================================

#[tokio::test]
async fn test_list_visibility_and_progress() {
    let (service, _) = setup().await;
    let shared = service
        .create_task(&admin(), create_req(&["app"], &["2", "3"]))
        .await
        .unwrap();
    let bob_only = service
        .create_task(&admin(), create_req(&["app"], &["3"]))
        .await
        .unwrap();

    service.mark(&alice(), mark_req(shared, "c1")).await.unwrap();
    service.mark(&bob(), mark_req(shared, "c2")).await.unwrap();
    service.mark(&alice(), mark_req(shared, "c3")).await.unwrap();

    let page = service.list(&admin(), None, 10, 1).await.unwrap();
    assert_eq!(page.total, 2);
    // 新任务在前
    assert_eq!(page.list[0].task.id, bob_only);
    assert_eq!(page.list[1].mark_process, vec!["alice:2", "bob:1"]);

    let page = service.list(&alice(), None, 10, 1).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].task.id, shared);

    let page = service.list(&bob(), None, 10, 1).await.unwrap();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_list_status_filter_and_paging() {
    let (service, _) = setup().await;
    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap());
    }
    service.mark(&alice(), mark_req(ids[0], "c1")).await.unwrap();

    let page = service
        .list(&admin(), Some(MarkTaskStatus::Ing), 10, 1)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].task.id, ids[0]);

    let page = service
        .list(&admin(), Some(MarkTaskStatus::Default), 10, 1)
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let page = service.list(&admin(), None, 2, 2).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.list.len(), 1);
    assert_eq!(page.list[0].task.id, ids[0]);

    // 非法分页参数回落到默认值
    let page = service.list(&admin(), None, 0, 0).await.unwrap();
    assert_eq!(page.list.len(), 3);
}

#[tokio::test]
async fn test_list_far_page_returns_empty_list() {
    let (service, _) = setup().await;
    for _ in 0..3 {
        service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap();
    }

    let page = service.list(&admin(), None, 10, i64::MAX).await.unwrap();
    assert_eq!(page.total, 3);
    assert!(page.list.is_empty());

    let page = service.list(&admin(), None, i64::MAX, 2).await.unwrap();
    assert_eq!(page.total, 3);
    assert!(page.list.is_empty());

    let page = service.list(&alice(), None, i64::MAX, i64::MAX).await.unwrap();
    assert_eq!(page.total, 3);
    assert!(page.list.is_empty());
}

// ============================================================================
// next / delete
// ============================================================================

#[tokio::test]
async fn test_next_rejects_unknown_action() {
    let (service, _) = setup().await;
    let err = service.next(&alice(), "jump", 1).await.unwrap_err();
    assert!(matches!(err, MarkError::InvalidAction(_)));
    assert_eq!(err.to_string(), "action参数错误");
}

#[tokio::test]
async fn test_next_returns_newest_unmarked_session() {
    let (service, store) = setup().await;
    let task_id = service
        .create_task(&admin(), create_req(&["app-a", "app-b"], &["2"]))
        .await
        .unwrap();
    add_message(&store, "c1", "app-a").await;
    add_message(&store, "c2", "app-b").await;
    add_message(&store, "c3", "other-app").await;

    let target = service.next(&alice(), "next", task_id).await.unwrap().unwrap();
    assert_eq!(target.chat_id.as_deref(), Some("c2"));
    assert_eq!(target.flow_type.as_deref(), Some("assistant"));

    service.mark(&alice(), mark_req(task_id, "c2")).await.unwrap();
    let target = service.next(&alice(), "next", task_id).await.unwrap().unwrap();
    assert_eq!(target.chat_id.as_deref(), Some("c1"));

    service.mark(&alice(), mark_req(task_id, "c1")).await.unwrap();
    let target = service.next(&alice(), "next", task_id).await.unwrap().unwrap();
    assert_eq!(target.task_id, task_id);
    assert!(target.chat_id.is_none());
}

#[tokio::test]
async fn test_prev_returns_last_marked_session() {
    let (service, store) = setup().await;
    let task_id = service.create_task(&admin(), create_req(&["app"], &["2"])).await.unwrap();

    assert!(service.next(&alice(), "prev", task_id).await.unwrap().is_none());

    add_message(&store, "c1", "app").await;
    service.mark(&alice(), mark_req(task_id, "c1")).await.unwrap();
    // 消息不存在时退回标注记录上的信息
    service.mark(&alice(), mark_req(task_id, "c9")).await.unwrap();

    let target = service.next(&alice(), "prev", task_id).await.unwrap().unwrap();
    assert_eq!(target.chat_id.as_deref(), Some("c9"));
    assert_eq!(target.flow_type.as_deref(), Some("flow"));

    assert!(service.next(&bob(), "prev", task_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_next_unknown_task() {
    let (service, _) = setup().await;
    let err = service.next(&alice(), "next", 5).await.unwrap_err();
    assert!(matches!(err, MarkError::TaskNotFound(5)));
}

#[tokio::test]
async fn test_delete_removes_task_records_and_rows() {
    let (service, store) = setup().await;
    let task_id = service
        .create_task(&admin(), create_req(&["app"], &["2", "3"]))
        .await
        .unwrap();
    service.mark(&alice(), mark_req(task_id, "c1")).await.unwrap();

    service.delete(task_id).await.unwrap();

    assert!(store.get_task(task_id).await.unwrap().is_none());
    assert!(store.list_records(task_id).await.unwrap().is_empty());
    assert!(store.list_app_users(task_id).await.unwrap().is_empty());
    assert_eq!(service.list(&admin(), None, 10, 1).await.unwrap().total, 0);

    // 删除不存在的任务不报错
    service.delete(task_id).await.unwrap();
}
