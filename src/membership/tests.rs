//! Membership Module Tests
//!
//! Validates the node table, the gossip wire codec, and the merge logic
//! that propagates membership knowledge across the cluster.
//!
//! ## Test Scopes
//! - **Node Table**: self-exclusion, heartbeat semantics, state snapshots.
//! - **Wire Codec**: encode/parse of the pipe-delimited gossip line,
//!   including the bracketed address list and malformed input.
//! - **Gossip Merge**: inbound messages add the sender and every
//!   advertised peer, refreshing the sender's heartbeat.
//! - **Staleness Sweep**: peers missing heartbeats are demoted, never
//!   evicted, and revived by the next heartbeat.

#[cfg(test)]
mod tests {
    use crate::membership::manager::MembershipManager;
    use crate::membership::types::GossipMessage;
    use crate::transport::GossipHandler;
    use std::time::Duration;

    const SELF: &str = "127.0.0.1:6000";

    fn manager() -> MembershipManager {
        MembershipManager::new(SELF.to_string())
    }

    // ============================================================
    // NODE TABLE TESTS
    // ============================================================

    #[test]
    fn test_add_node_inserts_healthy() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");

        let state = gm.get_state();
        assert_eq!(state.len(), 1);

        let node = &state["127.0.0.1:6001"];
        assert!(node.healthy);
        assert!(node.files.is_empty());
    }

    #[test]
    fn test_add_node_excludes_self() {
        let gm = manager();
        gm.add_node(SELF);

        assert!(gm.get_state().is_empty(), "Self must never enter the peer table");
        assert!(!gm.get_nodes().contains(&SELF.to_string()));
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");
        gm.add_node("127.0.0.1:6001");

        assert_eq!(gm.get_state().len(), 1);
    }

    #[test]
    fn test_update_heartbeat_does_not_add() {
        let gm = manager();
        gm.update_heartbeat("127.0.0.1:6001");

        assert!(
            gm.get_state().is_empty(),
            "Heartbeat for an unknown node must not implicitly add it"
        );
    }

    #[test]
    fn test_update_heartbeat_revives_unhealthy() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");
        gm.set_unhealthy("127.0.0.1:6001");
        assert!(!gm.get_state()["127.0.0.1:6001"].healthy);

        gm.update_heartbeat("127.0.0.1:6001");
        assert!(gm.get_state()["127.0.0.1:6001"].healthy);
    }

    #[test]
    fn test_healthy_nodes_filters_demoted() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");
        gm.add_node("127.0.0.1:6002");
        gm.set_unhealthy("127.0.0.1:6002");

        let healthy = gm.healthy_nodes();
        assert_eq!(healthy, vec!["127.0.0.1:6001".to_string()]);

        // The replication audience still contains both.
        let mut all = gm.get_nodes();
        all.sort();
        assert_eq!(all, vec!["127.0.0.1:6001", "127.0.0.1:6002"]);
    }

    #[test]
    fn test_get_state_is_snapshot() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");

        let snapshot = gm.get_state();
        gm.add_node("127.0.0.1:6002");
        gm.set_unhealthy("127.0.0.1:6001");

        assert_eq!(snapshot.len(), 1, "Snapshot must not see later mutations");
        assert!(snapshot["127.0.0.1:6001"].healthy);
    }

    // ============================================================
    // GOSSIP WIRE CODEC TESTS
    // ============================================================

    #[test]
    fn test_gossip_message_encode() {
        let msg = GossipMessage {
            sender: "10.0.0.1:6000".to_string(),
            timestamp: 1700000000,
            peers: vec!["10.0.0.2:6000".to_string(), "10.0.0.3:6000".to_string()],
        };

        assert_eq!(
            msg.encode(),
            "GOSSIP|10.0.0.1:6000|1700000000|[10.0.0.2:6000 10.0.0.3:6000]"
        );
    }

    #[test]
    fn test_gossip_message_round_trip() {
        let msg = GossipMessage {
            sender: "10.0.0.1:6000".to_string(),
            timestamp: 42,
            peers: vec!["10.0.0.2:6000".to_string()],
        };

        let restored = GossipMessage::parse(&msg.encode()).expect("Parse failed");
        assert_eq!(restored, msg);
    }

    #[test]
    fn test_gossip_message_empty_peer_list() {
        let msg = GossipMessage::parse("GOSSIP|10.0.0.1:6000|1|[]").expect("Parse failed");
        assert!(msg.peers.is_empty());
    }

    #[test]
    fn test_gossip_message_too_few_fields() {
        assert!(GossipMessage::parse("GOSSIP|10.0.0.1:6000").is_err());
        assert!(GossipMessage::parse("GOSSIP|10.0.0.1:6000|1700000000").is_err());
    }

    #[test]
    fn test_gossip_message_bad_timestamp() {
        assert!(GossipMessage::parse("GOSSIP|10.0.0.1:6000|yesterday|[]").is_err());
    }

    // ============================================================
    // GOSSIP MERGE TESTS
    // ============================================================

    #[test]
    fn test_apply_gossip_merges_sender_and_peers() {
        let gm = manager();
        gm.apply_gossip("GOSSIP|127.0.0.1:6001|1700000000|[127.0.0.1:6002 127.0.0.1:6003]")
            .expect("Gossip should be accepted");

        let mut known = gm.get_nodes();
        known.sort();
        assert_eq!(
            known,
            vec!["127.0.0.1:6001", "127.0.0.1:6002", "127.0.0.1:6003"],
            "Sender and every advertised peer should be added"
        );
    }

    #[test]
    fn test_apply_gossip_skips_self() {
        let gm = manager();
        gm.apply_gossip(&format!("GOSSIP|127.0.0.1:6001|1|[{} 127.0.0.1:6002]", SELF))
            .unwrap();

        let mut known = gm.get_nodes();
        known.sort();
        assert_eq!(known, vec!["127.0.0.1:6001", "127.0.0.1:6002"]);
    }

    #[test]
    fn test_apply_gossip_refreshes_sender() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");
        gm.set_unhealthy("127.0.0.1:6001");

        gm.apply_gossip("GOSSIP|127.0.0.1:6001|1|[]").unwrap();
        assert!(
            gm.get_state()["127.0.0.1:6001"].healthy,
            "Gossip from a demoted node should revive it"
        );
    }

    #[tokio::test]
    async fn test_handle_gossip_drops_malformed() {
        let gm = manager();
        gm.handle_gossip("GOSSIP|127.0.0.1:6001").await;

        assert!(
            gm.get_state().is_empty(),
            "A malformed message must not alter the table"
        );
    }

    // ============================================================
    // STALENESS SWEEP TESTS
    // ============================================================

    #[test]
    fn test_sweep_ignores_fresh_nodes() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");

        let demoted = gm.sweep_stale(Duration::from_secs(60));
        assert_eq!(demoted, 0);
        assert!(gm.get_state()["127.0.0.1:6001"].healthy);
    }

    #[test]
    fn test_sweep_demotes_only_stale_nodes() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");
        std::thread::sleep(Duration::from_millis(50));
        gm.add_node("127.0.0.1:6002");

        let demoted = gm.sweep_stale(Duration::from_millis(25));
        assert_eq!(demoted, 1);

        let state = gm.get_state();
        assert!(!state["127.0.0.1:6001"].healthy, "Stale node should be demoted");
        assert!(state["127.0.0.1:6002"].healthy, "Fresh node should stay healthy");
    }

    #[test]
    fn test_demoted_node_is_kept_and_revived() {
        let gm = manager();
        gm.add_node("127.0.0.1:6001");
        std::thread::sleep(Duration::from_millis(20));
        gm.sweep_stale(Duration::from_millis(10));

        // No eviction, only demotion.
        assert_eq!(gm.get_state().len(), 1);

        gm.update_heartbeat("127.0.0.1:6001");
        assert!(gm.get_state()["127.0.0.1:6001"].healthy);
        assert_eq!(gm.sweep_stale(Duration::from_secs(60)), 0);
    }
}
