// ABOUTME: Tests for the SQLite message store
// ABOUTME: Validates room creation, transactional appends, ordering, and on-disk persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use parley_server::database::{Database, MessageStore, NewChatMessage, RoomRecord};
use parley_server::errors::ErrorCode;

fn new_message(sender: &str, content: &str) -> NewChatMessage {
    NewChatMessage {
        content: content.to_owned(),
        timestamp: "1700000000".to_owned(),
        sender_id: format!("{sender}-id"),
        sender_username: sender.to_owned(),
    }
}

#[tokio::test]
async fn test_create_and_find_room() -> Result<()> {
    let db = common::create_test_database().await?;

    assert!(db.find_room("room42").await?.is_none());
    let created = db.create_room("room42").await?;
    let found = db.find_room("room42").await?.unwrap();

    assert_eq!(created, found);
    assert_eq!(found.created_at, found.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_room_is_rejected() -> Result<()> {
    let db = common::create_test_database().await?;
    db.create_room("room42").await?;

    let error = db.create_room("room42").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceAlreadyExists);
    assert_eq!(error.resource_id.as_deref(), Some("room42"));
    Ok(())
}

#[tokio::test]
async fn test_messages_listed_in_append_order() -> Result<()> {
    let db = common::create_test_database().await?;
    let room = db.create_room("room42").await?;

    db.append_message(&room, &new_message("alice", "Hello"))
        .await?;
    db.append_message(&room, &new_message("bob", "Salut"))
        .await?;
    db.append_message(&room, &new_message("alice", "How are you?"))
        .await?;

    let messages = db.list_messages("room42").await?;
    let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["Hello", "Salut", "How are you?"]);
    assert_eq!(messages[1].sender_username, "bob");
    assert_eq!(messages[1].sender_id, "bob-id");
    assert_eq!(messages[1].timestamp, "1700000000");
    Ok(())
}

#[tokio::test]
async fn test_append_bumps_room_updated_at() -> Result<()> {
    let db = common::create_test_database().await?;
    let room = db.create_room("room42").await?;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let record = db
        .append_message(&room, &new_message("alice", "Hello"))
        .await?;

    let reloaded = db.find_room("room42").await?.unwrap();
    assert_eq!(reloaded.updated_at, record.created_at);
    assert_ne!(reloaded.updated_at, room.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_append_to_unknown_room_rolls_back() -> Result<()> {
    let db = common::create_test_database().await?;
    let ghost = RoomRecord {
        id: "ghost".to_owned(),
        room_id: "ghost-room".to_owned(),
        created_at: String::new(),
        updated_at: String::new(),
    };

    let result = db.append_message(&ghost, &new_message("alice", "Hello")).await;

    assert!(result.is_err());
    assert!(db.list_messages("ghost-room").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rooms_do_not_share_messages() -> Result<()> {
    let db = common::create_test_database().await?;
    let r1 = db.create_room("r1").await?;
    db.create_room("r2").await?;

    db.append_message(&r1, &new_message("alice", "only in r1"))
        .await?;

    assert_eq!(db.list_messages("r1").await?.len(), 1);
    assert!(db.list_messages("r2").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_file_database_survives_reopen() -> Result<()> {
    common::init_test_logging();
    let temp_dir = tempfile::tempdir()?;
    let url = format!(
        "sqlite:{}",
        temp_dir.path().join("nested").join("parley.db").display()
    );

    {
        let db = Database::new(&url).await?;
        let room = db.create_room("room42").await?;
        db.append_message(&room, &new_message("alice", "persisted"))
            .await?;
        db.pool().close().await;
    }

    let reopened = Database::new(&url).await?;
    let messages = reopened.list_messages("room42").await?;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "persisted");
    Ok(())
}
