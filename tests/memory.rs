//! On-disk document shape and cross-restart accumulation

use std::fs;

use serde_json::Value;
use tempfile::TempDir;

use lumi_companion::{
    ConversationMessage, ConversationRecord, EmotionLabel, LongTermMemory, MemoryStore,
    MessageRole, Preferences,
};

fn temp_store() -> (MemoryStore, TempDir) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = MemoryStore::new(
        dir.path().join("memory.json"),
        dir.path().join("long_term.json"),
    );
    (store, dir)
}

#[test]
fn test_short_term_document_is_a_plain_json_array() {
    let (store, _dir) = temp_store();

    let messages = vec![
        ConversationMessage::system("persona".to_string()),
        ConversationMessage::user("我喜欢猫"),
        ConversationMessage::assistant("猫咪真可爱"),
    ];
    store.persist_short_term(&messages).unwrap();

    let raw = fs::read_to_string(store.short_term_path()).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    let entries = doc.as_array().unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["role"], "system");
    // The system entry carries no timestamp key at all
    assert!(entries[0].get("timestamp").is_none());
    assert_eq!(entries[1]["role"], "user");
    assert_eq!(entries[1]["content"], "我喜欢猫");
    assert!(entries[1]["timestamp"].is_string());
    assert_eq!(entries[2]["role"], "assistant");
}

#[test]
fn test_long_term_document_shape() {
    let (store, _dir) = temp_store();

    let mut memory = LongTermMemory::default();
    memory
        .conversations
        .push(ConversationRecord::new("我喜欢猫", "喵！", EmotionLabel::Happy));
    memory.preferences.likes.push("猫".to_string());
    store.persist_long_term(&memory).unwrap();

    let raw = fs::read_to_string(store.long_term_path()).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(doc["conversations"][0]["user_input"], "我喜欢猫");
    assert_eq!(doc["conversations"][0]["reply"], "喵！");
    assert_eq!(doc["conversations"][0]["emotion"], "happy");
    assert_eq!(doc["preferences"]["likes"][0], "猫");
}

#[test]
fn test_timestamps_use_the_readable_format() {
    let (store, _dir) = temp_store();

    store
        .persist_short_term(&[
            ConversationMessage::system("p".to_string()),
            ConversationMessage::user("你好"),
        ])
        .unwrap();

    let loaded = store.load_short_term("p").unwrap();
    let stamp = loaded[1].timestamp.clone().unwrap();
    assert!(chrono::NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S").is_ok());
}

#[test]
fn test_preferences_accumulate_across_reloads() {
    let (store, _dir) = temp_store();

    let mut memory = LongTermMemory::default();
    let first = Preferences {
        likes: vec!["猫".to_string()],
        ..Preferences::default()
    };
    assert_eq!(memory.preferences.merge(&first), 1);
    store.persist_long_term(&memory).unwrap();

    // A later run sees the earlier likes and only adds what is new
    let mut reloaded = store.load_long_term().unwrap();
    let second = Preferences {
        likes: vec!["猫".to_string(), "狗".to_string()],
        interests: vec!["天文学".to_string()],
        ..Preferences::default()
    };
    assert_eq!(reloaded.preferences.merge(&second), 2);
    store.persist_long_term(&reloaded).unwrap();

    let final_doc = store.load_long_term().unwrap();
    assert_eq!(final_doc.preferences.likes, vec!["猫".to_string(), "狗".to_string()]);
    assert_eq!(final_doc.preferences.interests, vec!["天文学".to_string()]);
    assert!(final_doc.preferences.dislikes.is_empty());
}

#[test]
fn test_partial_long_term_document_still_loads() {
    let (store, _dir) = temp_store();

    fs::write(store.long_term_path(), r#"{"conversations": []}"#).unwrap();

    let memory = store.load_long_term().unwrap();
    assert!(memory.conversations.is_empty());
    assert!(memory.preferences.is_empty());
}

#[test]
fn test_corrupt_short_term_is_an_error() {
    let (store, _dir) = temp_store();

    fs::write(store.short_term_path(), "[{not json").unwrap();

    assert!(store.load_short_term("p").is_err());
}

#[test]
fn test_system_head_stable_across_persist_reload_cycles() {
    let (store, _dir) = temp_store();

    let mut messages = store.load_short_term("persona").unwrap();
    messages.push(ConversationMessage::user("你好"));
    store.persist_short_term(&messages).unwrap();

    // Repeated load/persist must not duplicate the system head
    for _ in 0..3 {
        let again = store.load_short_term("persona").unwrap();
        assert_eq!(again.len(), 2);
        assert_eq!(again[0].role, MessageRole::System);
        store.persist_short_term(&again).unwrap();
    }
}

#[test]
fn test_clear_then_load_starts_fresh() {
    let (store, _dir) = temp_store();

    store
        .persist_short_term(&[
            ConversationMessage::system("old persona".to_string()),
            ConversationMessage::user("你好"),
        ])
        .unwrap();
    let mut memory = LongTermMemory::default();
    memory.preferences.likes.push("猫".to_string());
    store.persist_long_term(&memory).unwrap();

    store.clear().unwrap();

    let messages = store.load_short_term("new persona").unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "new persona");
    assert!(store.load_long_term().unwrap().preferences.is_empty());
}
