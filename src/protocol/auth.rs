//! Per-module auth challenge detection.

use super::{control_line, AUTH_REQUIRED_KEYWORD};
use crate::error::ProbeResult;
use crate::transport::Transport;
use tracing::debug;

/// True if `response` opens with `@RSYNCD: AUTHREQD`.
pub fn is_auth_challenge(response: &str) -> bool {
    response.starts_with(&control_line(AUTH_REQUIRED_KEYWORD))
}

/// Request `module` on a negotiated connection and report whether the daemon
/// challenges for credentials.
///
/// No reply, or any reply other than the challenge, counts as anonymous
/// access. The daemon ties the challenge to the connection, so each module
/// needs its own freshly negotiated connection.
pub async fn requires_auth<T>(transport: &mut T, module: &str) -> ProbeResult<bool>
where
    T: Transport + ?Sized,
{
    transport
        .write_bytes(format!("{}\n", module).as_bytes())
        .await?;

    let response = transport.read_available().await?;
    let challenged = is_auth_challenge(&response);
    debug!(module, challenged, "auth probe");
    Ok(challenged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{FakeConnection, FakeDaemon};
    use std::collections::HashMap;

    fn daemon_replying(module: &str, reply: &str) -> FakeConnection {
        FakeConnection::standalone(FakeDaemon {
            module_replies: HashMap::from([(module.to_string(), reply.to_string())]),
            ..Default::default()
        })
    }

    #[test]
    fn test_is_auth_challenge() {
        assert!(is_auth_challenge("@RSYNCD: AUTHREQD"));
        assert!(is_auth_challenge("@RSYNCD: AUTHREQD c2FsdA==\n"));
        assert!(!is_auth_challenge("@RSYNCD: OK\n"));
        assert!(!is_auth_challenge(""));
        assert!(!is_auth_challenge("motd\n@RSYNCD: AUTHREQD\n"));
    }

    #[tokio::test]
    async fn test_challenge_means_auth_required() {
        let mut conn = daemon_replying("secret", "@RSYNCD: AUTHREQD dGVzdA==\n");
        assert!(requires_auth(&mut conn, "secret").await.unwrap());
        assert_eq!(conn.writes(), vec!["secret\n"]);
    }

    #[tokio::test]
    async fn test_ok_means_anonymous() {
        let mut conn = daemon_replying("pub", "@RSYNCD: OK\n");
        assert!(!requires_auth(&mut conn, "pub").await.unwrap());
    }

    #[tokio::test]
    async fn test_silence_means_anonymous() {
        let mut conn = daemon_replying("other", "@RSYNCD: AUTHREQD\n");
        assert!(!requires_auth(&mut conn, "pub").await.unwrap());
    }
}
