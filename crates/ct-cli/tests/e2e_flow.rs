//! End-to-end tests for the session tracking flow.
//!
//! Drives the real binary through the hook-facing lifecycle:
//! session start, activity logging, session end, then reports and exports.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn ct_binary() -> String {
    env!("CARGO_BIN_EXE_ct").to_string()
}

/// Runs `ct` with an isolated home and database.
fn ct(temp: &Path, args: &[&str]) -> Output {
    Command::new(ct_binary())
        .env("HOME", temp)
        .env("CT_DATABASE_PATH", temp.join("ct.db"))
        .env_remove("XDG_DATA_HOME")
        .env_remove("XDG_CONFIG_HOME")
        .args(args)
        .output()
        .expect("failed to run ct")
}

fn ct_ok(temp: &Path, args: &[&str]) -> String {
    let output = ct(temp, args);
    assert!(
        output.status.success(),
        "ct {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn start_session(temp: &Path, project: &str, timestamp: &str) -> String {
    ct_ok(
        temp,
        &[
            "session",
            "start",
            "--project",
            project,
            "--timestamp",
            timestamp,
        ],
    )
    .trim()
    .to_string()
}

#[test]
fn full_session_flow_produces_report_and_export() {
    let temp = TempDir::new().unwrap();
    let session_id = start_session(temp.path(), "/repo/alpha", "2025-01-01T09:00:00Z");
    assert!(!session_id.is_empty());

    // Activities at 09:05, 09:10, 09:50: gaps of 5 and 40 minutes.
    for timestamp in [
        "2025-01-01T09:05:00Z",
        "2025-01-01T09:10:00Z",
        "2025-01-01T09:50:00Z",
    ] {
        ct_ok(
            temp.path(),
            &[
                "log",
                "--session",
                &session_id,
                "--kind",
                "tool_use",
                "--timestamp",
                timestamp,
            ],
        );
    }

    let end_output = ct_ok(
        temp.path(),
        &["session", "end", "--timestamp", "2025-01-01T10:00:00Z"],
    );
    assert!(end_output.contains(&session_id));
    assert!(end_output.contains("alpha"));

    // 5 + min(40, 30) + 5 base = 40 active minutes.
    let report = ct_ok(
        temp.path(),
        &["report", "2025-01-01", "2025-01-01", "--json"],
    );
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(report["total_minutes"], 40.0);
    assert_eq!(report["total_sessions"], 1);
    assert_eq!(report["project_breakdown"]["alpha"]["minutes"], 40.0);
    assert_eq!(report["daily_breakdown"]["2025-01-01"]["sessions"], 1);

    let page = ct_ok(temp.path(), &["activities", "--session", &session_id]);
    let page: serde_json::Value = serde_json::from_str(&page).unwrap();
    assert_eq!(page["count"], 3);
    assert_eq!(page["has_more"], false);
    // Newest first.
    assert_eq!(
        page["activities"][0]["timestamp"],
        "2025-01-01T09:50:00Z"
    );
}

#[test]
fn log_uses_active_session_and_decodes_base64() {
    let temp = TempDir::new().unwrap();
    let session_id = start_session(temp.path(), "/repo/alpha", "2025-01-01T09:00:00Z");

    // {"prompt":"hi"} base64-encoded.
    ct_ok(
        temp.path(),
        &[
            "log",
            "--kind",
            "message",
            "--timestamp",
            "2025-01-01T09:05:00Z",
            "--metadata-base64",
            "eyJwcm9tcHQiOiJoaSJ9",
        ],
    );

    let page = ct_ok(
        temp.path(),
        &[
            "activities",
            "--session",
            &session_id,
            "--fields",
            "id,metadata.prompt",
        ],
    );
    let page: serde_json::Value = serde_json::from_str(&page).unwrap();
    assert_eq!(page["count"], 1);
    assert_eq!(page["activities"][0]["metadata.prompt"], "hi");

    let stats = ct_ok(temp.path(), &["stats", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(stats[0]["message_count"], 1);
}

#[test]
fn restart_closes_dangling_session() {
    let temp = TempDir::new().unwrap();
    let first = start_session(temp.path(), "/repo/alpha", "2025-01-01T09:00:00Z");
    let second = start_session(temp.path(), "/repo/alpha", "2025-01-01T11:00:00Z");
    assert_ne!(first, second);

    let stats = ct_ok(temp.path(), &["stats", "--json"]);
    let sessions: serde_json::Value = serde_json::from_str(&stats).unwrap();
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 2);

    let old = sessions
        .iter()
        .find(|s| s["id"] == first.as_str())
        .unwrap();
    assert_eq!(old["end_time"], "2025-01-01T11:00:00Z");

    let current = ct_ok(temp.path(), &["session", "current"]);
    assert!(current.contains(&second));
}

#[test]
fn activities_chain_under_token_budget() {
    let temp = TempDir::new().unwrap();
    let session_id = start_session(temp.path(), "/repo/alpha", "2025-01-01T09:00:00Z");

    for minute in 1..=6 {
        let timestamp = format!("2025-01-01T09:0{minute}:00Z");
        ct_ok(
            temp.path(),
            &[
                "log",
                "--session",
                &session_id,
                "--timestamp",
                &timestamp,
            ],
        );
    }

    let full = ct_ok(temp.path(), &["activities"]);
    let full: serde_json::Value = serde_json::from_str(&full).unwrap();
    assert_eq!(full["count"], 6);
    let expected: Vec<String> = full["activities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect();

    // Budget sized to fit roughly two records per page. 200 is the fixed
    // envelope allowance on top of the summed record estimates.
    let estimated = full["estimated_tokens"].as_u64().unwrap();
    let per_record = (estimated - 200) / 6;
    let token_limit = (200 + per_record * 2).to_string();

    let mut collected = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;
    loop {
        let mut args = vec!["activities", "--token-limit", &token_limit];
        if let Some(cursor) = &cursor {
            args.push("--continue-after");
            args.push(cursor.as_str());
        }
        let page = ct_ok(temp.path(), &args);
        let page: serde_json::Value = serde_json::from_str(&page).unwrap();

        for activity in page["activities"].as_array().unwrap() {
            collected.push(activity["id"].as_str().unwrap().to_string());
        }
        pages += 1;
        assert!(pages < 10, "pagination failed to terminate");
        if page["has_more"] != true {
            break;
        }
        cursor = Some(page["continue_after"].as_str().unwrap().to_string());
    }

    assert!(pages > 1, "budget should force multiple pages");
    assert_eq!(collected, expected);
}
