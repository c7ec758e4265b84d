// Integration tests for the full flow: SessionRegistry -> DirectoryWatcher/
// TranscriptWatcher -> normalized events, exercised the way a host process
// actually drives this crate.
use std::time::Duration;

use transcript_testing::fixtures::{append_line, write_jsonl};
use transcript_watch::{Channels, DirectoryWatcherConfig, SessionRegistry, TranscriptWatcherConfig, WatchChannels, WatchSpec};

fn claude_user_line(uuid: &str, session_id: &str, text: &str) -> String {
    serde_json::json!({
        "type": "user",
        "uuid": uuid,
        "sessionId": session_id,
        "message": { "role": "user", "content": text },
    })
    .to_string()
}

#[tokio::test]
async fn registry_drives_a_transcript_watch_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(dir.path(), "s1.jsonl", &[claude_user_line("u1", "s1", "hello")]);

    let registry = SessionRegistry::new();
    let mut config = TranscriptWatcherConfig::new(path);
    config.source = Some("claude".to_string());
    config.poll_interval = Duration::from_millis(20);

    let channels = registry.watch("task-a", WatchSpec::Transcript(config)).await.unwrap();
    let WatchChannels::Transcript(Channels::Parsed(mut parsed)) = channels else {
        panic!("expected parsed transcript channels")
    };

    let event = tokio::time::timeout(Duration::from_secs(1), parsed.events.recv())
        .await
        .expect("event arrived")
        .expect("channel open");
    assert_eq!(event.session_id, "s1");

    registry.stop("task-a").await;
    assert!(parsed.events.recv().await.is_none());
}

#[tokio::test]
async fn registry_drives_a_directory_watch_across_two_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let s1 = "11111111-1111-1111-1111-111111111111.jsonl";
    write_jsonl(dir.path(), s1, &[claude_user_line("u1", "s1", "first session")]);

    let registry = SessionRegistry::new();
    let mut config = DirectoryWatcherConfig::new(dir.path(), "claude");
    config.poll_interval = Duration::from_millis(20);

    let channels = registry.watch("task-b", WatchSpec::Directory(config)).await.unwrap();
    let WatchChannels::Directory(mut directory_channels) = channels else {
        panic!("expected directory channels")
    };

    let first = tokio::time::timeout(Duration::from_secs(1), directory_channels.events.recv())
        .await
        .expect("event arrived")
        .expect("channel open");
    assert_eq!(first.session_id, "s1");

    let s2 = "22222222-2222-2222-2222-222222222222.jsonl";
    append_line(&dir.path().join(s2), &claude_user_line("u2", "s2", "second session"));

    let second = tokio::time::timeout(Duration::from_secs(1), directory_channels.events.recv())
        .await
        .expect("event arrived")
        .expect("channel open");
    assert_eq!(second.session_id, "s2");

    let stats = registry.stats("task-b").await.unwrap();
    assert_eq!(stats.active_files.len(), 2);

    registry.stop_all().await;
}

#[tokio::test]
async fn raw_mode_bypasses_adapter_parsing() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jsonl(dir.path(), "raw.jsonl", &["not json at all".to_string()]);

    let registry = SessionRegistry::new();
    let mut config = TranscriptWatcherConfig::new(path);
    config.raw_mode = true;
    config.poll_interval = Duration::from_millis(20);

    let channels = registry.watch("task-raw", WatchSpec::Transcript(config)).await.unwrap();
    let WatchChannels::Transcript(Channels::Raw(mut raw)) = channels else {
        panic!("expected raw channels")
    };

    let line = tokio::time::timeout(Duration::from_secs(1), raw.lines.recv())
        .await
        .expect("line arrived")
        .expect("channel open");
    assert_eq!(line.bytes, b"not json at all");

    registry.stop("task-raw").await;
}
