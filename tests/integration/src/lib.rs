//! Integration tests for Gatehouse.
//!
//! These tests drive inbound handlers the way a connection loop and a
//! management API would: provisioning users while connections authenticate,
//! and plugins registering hooks at runtime.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{bail, Context, Result};
use rand::{distributions::Alphanumeric, Rng};
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

/// Generates a random alphanumeric password.
pub fn random_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Source address of the `n`th simulated client.
pub fn client_addr(n: u16) -> SocketAddr {
    SocketAddr::from(([198, 51, 100, 1], 10_000 + n))
}

/// Find the server binary in the target directory.
pub fn find_server_binary() -> Result<PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    // Try debug build first, then release
    let candidates = [
        std::path::Path::new(&manifest_dir).join("../../target/debug/gatehouse-server"),
        std::path::Path::new(&manifest_dir).join("../../target/debug/gatehouse-server.exe"),
        std::path::Path::new(&manifest_dir).join("../../target/release/gatehouse-server"),
        std::path::Path::new(&manifest_dir).join("../../target/release/gatehouse-server.exe"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.canonicalize()?);
        }
    }

    bail!(
        "Could not find gatehouse-server binary. Run 'cargo build -p gatehouse-server' first. Searched in: {:?}",
        candidates
    )
}

/// Writes `config` to a temporary file and runs the server in check mode.
pub async fn run_check(binary: &Path, config: &serde_json::Value) -> Result<Output> {
    let dir = TempDir::new().context("Failed to create temp dir")?;
    let path = dir.path().join("gatehouse.json");
    std::fs::write(&path, serde_json::to_vec_pretty(config)?)
        .context("Failed to write config")?;

    let output = tokio::process::Command::new(binary)
        .arg("--check")
        .arg("--config")
        .arg(&path)
        .output()
        .await
        .with_context(|| format!("Failed to start server: {:?}", binary))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    use gatehouse_auth::{AuthError, User};
    use gatehouse_hooks::{HookError, PolicyLevels, SessionPolicy};
    use gatehouse_inbound::{
        InboundError, ServerConfig, TrojanAccount, TrojanInbound, VlessAccount, VlessInbound,
    };

    fn trojan_user(i: usize, password: &str) -> User<TrojanAccount> {
        User::new(format!("user{}@example.com", i), 0, TrojanAccount::new(password))
    }

    #[test]
    fn test_provision_and_revoke_while_authenticating() {
        let inbound = Arc::new(TrojanInbound::new("trojan-in", PolicyLevels::new()));
        let passwords: Vec<String> = (0..32).map(|_| random_password(24)).collect();
        for (i, password) in passwords.iter().enumerate().take(16) {
            inbound
                .validator()
                .add(trojan_user(i, password))
                .unwrap();
        }

        let gate = Arc::new(Barrier::new(5));

        let admin = {
            let inbound = Arc::clone(&inbound);
            let passwords = passwords.clone();
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                gate.wait();
                for (i, password) in passwords.iter().enumerate().skip(16) {
                    inbound
                        .validator()
                        .add(trojan_user(i, password))
                        .unwrap();
                }
                for i in 0..8 {
                    inbound.validator().del(&format!("USER{}@example.com", i)).unwrap();
                }
            })
        };

        let clients: Vec<_> = (0..4u16)
            .map(|n| {
                let inbound = Arc::clone(&inbound);
                let passwords = passwords.clone();
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    gate.wait();
                    for _ in 0..50 {
                        for (i, password) in passwords.iter().enumerate() {
                            let key = TrojanAccount::new(password.as_str()).key().clone();
                            match inbound.accept(&key, client_addr(n)) {
                                Ok(session) => assert_eq!(
                                    session.credential.label(),
                                    format!("user{}@example.com", i)
                                ),
                                Err(InboundError::Unauthorized) => {},
                                Err(e) => panic!("unexpected error: {}", e),
                            }
                        }
                    }
                })
            })
            .collect();

        admin.join().unwrap();
        for client in clients {
            client.join().unwrap();
        }

        let validator = inbound.validator();
        assert_eq!(validator.get_count(), 24);
        assert_eq!(validator.get_all().len(), 24);
        for (i, password) in passwords.iter().enumerate() {
            let key = TrojanAccount::new(password.as_str()).key().clone();
            assert_eq!(validator.get(&key).is_some(), i >= 8, "user {}", i);
        }
    }

    #[test]
    fn test_concurrent_registration_of_same_email() {
        let inbound = Arc::new(VlessInbound::new("vless-in", PolicyLevels::new()));
        let gate = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let inbound = Arc::clone(&inbound);
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    let account = VlessAccount::new(&format!("id-{}", i), "").unwrap();
                    gate.wait();
                    inbound
                        .validator()
                        .add(User::new("shared@example.com", 0, account))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AuthError::DuplicateLabel(_))))
                .count(),
            7
        );
        assert_eq!(inbound.validator().get_all_labels(), vec!["shared@example.com"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_metrics_plugin_counts_connections() {
        let inbound = Arc::new(VlessInbound::new("vless-in", PolicyLevels::new()));
        let account = VlessAccount::new("metrics-user", "").unwrap();
        let id = account.id;
        inbound
            .validator()
            .add(User::new("metrics@example.com", 0, account))
            .unwrap();

        let processed = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(AtomicUsize::new(0));
        {
            let processed = Arc::clone(&processed);
            inbound.callbacks().on_process.add(move |_| {
                processed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            });
            let started = Arc::clone(&started);
            inbound.callbacks().on_process_start.add(move |policy| {
                started.fetch_add(1, Ordering::Relaxed);
                policy.stats_user_downlink = true;
                Ok(())
            });
        }

        let tasks: Vec<_> = (0..64u16)
            .map(|n| {
                let inbound = Arc::clone(&inbound);
                tokio::spawn(async move { inbound.accept(&id, client_addr(n)).map(|s| s.policy) })
            })
            .collect();

        for task in tasks {
            let policy = task.await.unwrap().unwrap();
            assert!(policy.stats_user_downlink);
        }
        assert_eq!(processed.load(Ordering::Relaxed), 64);
        assert_eq!(started.load(Ordering::Relaxed), 64);
    }

    #[test]
    fn test_plugin_teardown_restores_access() {
        let inbound = VlessInbound::new("vless-in", PolicyLevels::new());
        let account = VlessAccount::new("teardown", "").unwrap();
        let id = account.id;
        inbound.validator().add(User::new("t@example.com", 0, account)).unwrap();

        let keep = inbound.callbacks().on_process.add(|inbound| {
            inbound.set_attribute("audited", "true");
            Ok(())
        });
        let blocker = inbound
            .callbacks()
            .on_process
            .add(|_| Err(HookError::from("maintenance window")));

        match inbound.accept(&id, client_addr(1)) {
            Err(InboundError::Hook(failure)) => {
                assert_eq!(failure.id, blocker);
                assert_eq!(failure.source.to_string(), "maintenance window");
            },
            other => panic!("expected hook failure, got {:?}", other),
        }

        inbound.callbacks().on_process.rm(blocker);

        let session = inbound.accept(&id, client_addr(1)).unwrap();
        assert_eq!(session.inbound.attribute("audited"), Some("true"));
        assert_eq!(inbound.callbacks().on_process.add(|_| Ok(())), keep + 2);
    }

    #[test]
    fn test_policy_hook_sees_level_policy() {
        let mut levels = PolicyLevels::new();
        levels.insert(
            5,
            SessionPolicy {
                handshake: Duration::from_secs(2),
                ..SessionPolicy::default()
            },
        );
        let inbound = VlessInbound::new("vless-in", levels);
        let account = VlessAccount::new("vip", "").unwrap();
        let id = account.id;
        inbound.validator().add(User::new("vip@example.com", 5, account)).unwrap();

        inbound.callbacks().on_process_start.add(|policy| {
            if policy.handshake > Duration::from_secs(3) {
                return Err("unexpected policy level".into());
            }
            policy.conn_idle = Duration::from_secs(30);
            Ok(())
        });

        let session = inbound.accept(&id, client_addr(2)).unwrap();
        assert_eq!(session.policy.handshake, Duration::from_secs(2));
        assert_eq!(session.policy.conn_idle, Duration::from_secs(30));
    }

    #[test]
    fn test_config_inbounds_are_isolated() {
        let config = serde_json::json!({
            "inbounds": [
                { "tag": "a", "protocol": "trojan",
                  "settings": { "clients": [ { "email": "x@example.com", "password": "one" } ] } },
                { "tag": "b", "protocol": "trojan",
                  "settings": { "clients": [ { "email": "x@example.com", "password": "two" } ] } }
            ]
        });
        let set = ServerConfig::from_json(&config.to_string()).unwrap().build().unwrap();

        let tags: HashSet<&str> = set.iter().map(|inbound| inbound.tag()).collect();
        assert_eq!(tags, HashSet::from(["a", "b"]));

        set.get("a").unwrap().remove_user("x@example.com").unwrap();
        assert_eq!(set.get("a").unwrap().user_count(), 0);
        assert_eq!(set.get("b").unwrap().user_count(), 1);
    }

    #[tokio::test]
    async fn test_server_check_mode() {
        let Ok(binary) = find_server_binary() else {
            eprintln!("gatehouse-server binary not built, skipping");
            return;
        };

        let valid = serde_json::json!({
            "inbounds": [
                { "tag": "vmess-in", "protocol": "vmess",
                  "settings": { "clients": [ { "email": "a@example.com", "id": "alpha" } ] } }
            ]
        });
        let output = run_check(&binary, &valid).await.unwrap();
        assert!(output.status.success(), "{:?}", output);

        let invalid = serde_json::json!({
            "inbounds": [
                { "tag": "vless-in", "protocol": "vless",
                  "settings": { "clients": [
                      { "email": "a@example.com", "id": "alpha" },
                      { "email": "A@example.com", "id": "beta" }
                  ] } }
            ]
        });
        let output = run_check(&binary, &invalid).await.unwrap();
        assert!(!output.status.success());
    }
}
