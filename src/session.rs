// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-flowlog-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of flowlog and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::collab::{to_collaborative_payload, Broadcaster, NoopBroadcaster};
use crate::history::{History, HistoryConfig, HistoryError, Step};
use crate::model::WorkflowGraph;
use crate::ops::Operation;

/// One open document: the live graph, its undo/redo log and the outbound peer channel.
///
/// Every operation that changes the graph is broadcast as a forward operation, including
/// the inverse run by `undo`. Peers never see undo as such.
#[derive(Debug)]
pub struct EditorSession<B = NoopBroadcaster> {
    graph: WorkflowGraph,
    history: History,
    broadcaster: B,
}

impl EditorSession<NoopBroadcaster> {
    pub fn local(graph: WorkflowGraph, config: HistoryConfig) -> Self {
        Self::new(graph, config, NoopBroadcaster)
    }
}

impl<B: Broadcaster> EditorSession<B> {
    pub fn new(graph: WorkflowGraph, config: HistoryConfig, broadcaster: B) -> Self {
        Self {
            graph,
            history: History::new(config),
            broadcaster,
        }
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn into_graph(self) -> WorkflowGraph {
        self.graph
    }

    pub fn apply(&mut self, operation: Operation) -> Result<Step, HistoryError> {
        let step = self.history.execute(&mut self.graph, operation)?;
        self.publish(&step);
        Ok(step)
    }

    pub fn undo(&mut self) -> Result<Option<Step>, HistoryError> {
        let step = self.history.undo(&mut self.graph)?;
        if let Some(step) = &step {
            self.publish(step);
        }
        Ok(step)
    }

    pub fn redo(&mut self) -> Result<Option<Step>, HistoryError> {
        let step = self.history.redo(&mut self.graph)?;
        if let Some(step) = &step {
            self.publish(step);
        }
        Ok(step)
    }

    fn publish(&self, step: &Step) {
        self.broadcaster
            .broadcast(to_collaborative_payload(&step.applied));
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::EditorSession;
    use crate::collab::{CollabTarget, CollabVerb, CollaborativePayload};
    use crate::history::HistoryConfig;
    use crate::model::fixtures::{block_id, sample_graph};
    use crate::model::Placement;
    use crate::ops::{MoveBlockData, Operation};

    type Session = EditorSession<mpsc::UnboundedSender<CollaborativePayload>>;

    #[fixture]
    fn session() -> (Session, UnboundedReceiver<CollaborativePayload>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            EditorSession::new(sample_graph(), HistoryConfig::default(), tx),
            rx,
        )
    }

    fn move_api() -> Operation {
        Operation::MoveBlock(MoveBlockData {
            block_id: block_id("api"),
            before: Placement::new(300.0, 0.0),
            after: Placement::new(320.0, 80.0),
        })
    }

    #[rstest]
    fn apply_broadcasts_the_forward_operation(
        session: (Session, UnboundedReceiver<CollaborativePayload>),
    ) {
        let (mut session, mut rx) = session;
        session.apply(move_api()).expect("apply");

        let message = rx.try_recv().expect("broadcast");
        assert_eq!(message.operation, CollabVerb::UpdatePosition);
        assert_eq!(message.target, CollabTarget::Block);
        assert_eq!(
            message.payload,
            json!({"id": "api", "position": {"x": 320.0, "y": 80.0}, "parentId": null})
        );
        assert!(rx.try_recv().is_err());
    }

    #[rstest]
    fn undo_and_redo_broadcast_what_they_applied(
        session: (Session, UnboundedReceiver<CollaborativePayload>),
    ) {
        let (mut session, mut rx) = session;
        session.apply(move_api()).expect("apply");
        session.undo().expect("undo");
        session.redo().expect("redo");

        let positions = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|message| message.payload["position"]["x"].clone())
            .collect::<Vec<_>>();
        assert_eq!(positions, vec![json!(320.0), json!(300.0), json!(320.0)]);
    }

    #[rstest]
    fn failed_apply_broadcasts_nothing(
        session: (Session, UnboundedReceiver<CollaborativePayload>),
    ) {
        let (mut session, mut rx) = session;
        let before = session.graph().clone();
        session
            .apply(Operation::MoveBlock(MoveBlockData {
                block_id: block_id("ghost"),
                before: Placement::new(0.0, 0.0),
                after: Placement::new(1.0, 1.0),
            }))
            .expect_err("unknown block");

        assert!(rx.try_recv().is_err());
        assert_eq!(session.graph(), &before);
        assert!(!session.history().can_undo());
    }

    #[rstest]
    fn empty_undo_broadcasts_nothing(session: (Session, UnboundedReceiver<CollaborativePayload>)) {
        let (mut session, mut rx) = session;
        assert_eq!(session.undo().expect("undo"), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn local_session_round_trips_without_peers() {
        let mut session = EditorSession::local(sample_graph(), HistoryConfig::default());
        session.apply(move_api()).expect("apply");
        session.undo().expect("undo");
        assert_eq!(session.into_graph(), sample_graph());
    }
}
