use std::{collections::BTreeMap, error::Error, fmt, sync::Arc};

use lib::types::{ConnectionId, DisplayName};
use tokio::sync::RwLock;

use crate::connection::Connection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateConnection(ConnectionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateConnection(id) => {
                write!(f, "connection {} is already registered", id)
            }
        }
    }
}

impl Error for RegistryError {}

/// One broadcast-eligible client as seen by a snapshot.
#[derive(Debug, Clone)]
pub struct Member {
    pub connection: Arc<Connection>,
    pub name: DisplayName,
}

/// Who is present. Every session joins and leaves through here and the
/// broadcaster only ever iterates a copy taken under the lock.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    members: Arc<RwLock<BTreeMap<ConnectionId, Member>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateConnection`] if this connection id is
    /// already present; the existing entry is left untouched.
    pub async fn join(
        &self,
        connection: Arc<Connection>,
        name: DisplayName,
    ) -> Result<(), RegistryError> {
        let mut members = self.members.write().await;
        let id = connection.id();
        if members.contains_key(&id) {
            return Err(RegistryError::DuplicateConnection(id));
        }
        members.insert(id, Member { connection, name });
        Ok(())
    }

    /// Removes the entry and hands back its name. Absent ids are a no-op.
    pub async fn leave(&self, id: ConnectionId) -> Option<DisplayName> {
        self.members
            .write()
            .await
            .remove(&id)
            .map(|member| member.name)
    }

    /// Members in accept order as of this instant. Later joins and leaves do
    /// not affect the returned list.
    pub async fn snapshot(&self) -> Vec<Member> {
        self.members.read().await.values().cloned().collect()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.members.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use lib::types::{ConnectionId, DisplayName};

    use super::{Registry, RegistryError};
    use crate::connection::tests::pipe_connection;

    #[tokio::test]
    async fn join_then_snapshot_lists_member() {
        let registry = Registry::new();
        let (alice, _client) = pipe_connection(1, 64);
        registry
            .join(alice, DisplayName::from("alice"))
            .await
            .expect("join");

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].name.as_str(), "alice");
        assert_eq!(snapshot[0].connection.id(), ConnectionId(1));
    }

    #[tokio::test]
    async fn rejects_duplicate_connection() {
        let registry = Registry::new();
        let (alice, _client) = pipe_connection(1, 64);
        registry
            .join(alice.clone(), DisplayName::from("alice"))
            .await
            .expect("first join");

        let second = registry.join(alice, DisplayName::from("again")).await;
        assert_eq!(
            second,
            Err(RegistryError::DuplicateConnection(ConnectionId(1)))
        );
        assert_eq!(registry.snapshot().await[0].name.as_str(), "alice");
    }

    #[tokio::test]
    async fn duplicate_names_are_separate_members() {
        let registry = Registry::new();
        let (first, _a) = pipe_connection(1, 64);
        let (second, _b) = pipe_connection(2, 64);
        registry.join(first, DisplayName::from("sam")).await.expect("join");
        registry.join(second, DisplayName::from("sam")).await.expect("join");
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn leave_is_idempotent() {
        let registry = Registry::new();
        let (alice, _client) = pipe_connection(1, 64);
        registry
            .join(alice, DisplayName::from("alice"))
            .await
            .expect("join");

        assert_eq!(
            registry.leave(ConnectionId(1)).await,
            Some(DisplayName::from("alice"))
        );
        assert_eq!(registry.leave(ConnectionId(1)).await, None);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn snapshot_is_ordered_and_detached() {
        let registry = Registry::new();
        let mut clients = Vec::new();
        for id in [3, 1, 2] {
            let (connection, client) = pipe_connection(id, 64);
            clients.push(client);
            registry
                .join(connection, DisplayName::from(format!("user{}", id).as_str()))
                .await
                .expect("join");
        }

        let snapshot = registry.snapshot().await;
        registry.leave(ConnectionId(2)).await;

        let ids: Vec<u64> = snapshot.iter().map(|m| m.connection.id().0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!registry.contains(ConnectionId(2)).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_joins_and_leaves_stay_consistent() {
        let registry = Registry::new();
        let mut tasks = Vec::new();
        for id in 0..64u64 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let (connection, client) = pipe_connection(id, 64);
                registry
                    .join(connection, DisplayName::from("member"))
                    .await
                    .expect("join");
                assert!(registry.contains(ConnectionId(id)).await);
                if id % 2 == 0 {
                    registry.leave(ConnectionId(id)).await;
                    assert!(!registry.contains(ConnectionId(id)).await);
                }
                client
            }));
        }

        let mut clients = Vec::new();
        for task in tasks {
            clients.push(task.await.expect("task"));
        }

        let present: BTreeSet<u64> = registry
            .snapshot()
            .await
            .iter()
            .map(|m| m.connection.id().0)
            .collect();
        let expected: BTreeSet<u64> = (0..64).filter(|id| id % 2 == 1).collect();
        assert_eq!(present, expected);
    }
}
