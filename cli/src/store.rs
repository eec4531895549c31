// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application state store
//!
//! [`Client`] is the handle a front end holds: it issues intents to the
//! server and hands out snapshots. [`StoreLoop`] is the single owner of the
//! state. It folds every message batch into one new snapshot and publishes
//! it once, so observers never see a half-applied batch.

use crate::error::ClientError;
use crate::reducer::{reduce_batch, reduce_local, LocalAction, Navigation};
use crate::state::{AppState, IdSequence};
use kgsgo_core::{Coord, Location};
use kgsgo_network::messages::Proposal;
use kgsgo_network::{
    ChannelId, ClientConfig, ClientMessage, MessageBatch, Session, SessionState, Transport,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Front-end handle to a running store
pub struct Client<T: Transport> {
    session: Arc<Session<T>>,
    snapshots: watch::Receiver<Arc<AppState>>,
    local_tx: mpsc::UnboundedSender<LocalAction>,
}

/// The task that owns the state; run it with [`StoreLoop::run`]
pub struct StoreLoop {
    batches: mpsc::UnboundedReceiver<MessageBatch>,
    local_rx: mpsc::UnboundedReceiver<LocalAction>,
    session_rx: watch::Receiver<SessionState>,
    snapshots: watch::Sender<Arc<AppState>>,
}

impl<T: Transport> Client<T> {
    /// Create a client over `transport` with ids starting at 1
    pub fn new(transport: T, config: &ClientConfig) -> (Self, StoreLoop) {
        Self::with_ids(transport, config, IdSequence::default())
    }

    /// Create a client whose records and chat lines draw ids from `ids`
    pub fn with_ids(transport: T, config: &ClientConfig, ids: IdSequence) -> (Self, StoreLoop) {
        let (session, batches) = Session::new(transport, config);
        let (local_tx, local_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(Arc::new(AppState::with_ids(ids)));
        let store = StoreLoop {
            batches,
            local_rx,
            session_rx: session.subscribe(),
            snapshots: snapshot_tx,
        };
        let client = Self {
            session,
            snapshots,
            local_tx,
        };
        (client, store)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Watch snapshots as they are published
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.snapshots.clone()
    }

    /// The underlying session
    pub fn session(&self) -> &Arc<Session<T>> {
        &self.session
    }

    fn dispatch(&self, action: LocalAction) -> Result<(), ClientError> {
        self.local_tx.send(action).map_err(|_| ClientError::Stopped)
    }

    async fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        self.session.send(&message).await?;
        Ok(())
    }

    /// Log in and start receiving
    pub async fn login(&self, name: &str, password: &str) -> Result<(), ClientError> {
        self.session.login(name, password).await?;
        Ok(())
    }

    /// Log out; the session ends client-side even if the request fails
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.logout().await?;
        Ok(())
    }

    /// Join a room, game or challenge
    pub async fn join(&self, channel_id: ChannelId) -> Result<(), ClientError> {
        self.send(ClientMessage::JoinRequest { channel_id }).await
    }

    /// Leave a channel
    pub async fn unjoin(&self, channel_id: ChannelId) -> Result<(), ClientError> {
        self.send(ClientMessage::UnjoinRequest { channel_id }).await
    }

    /// Say something in a channel
    pub async fn say(&self, channel_id: ChannelId, text: &str) -> Result<(), ClientError> {
        self.send(ClientMessage::Chat {
            channel_id,
            text: text.to_string(),
        })
        .await
    }

    /// Play a stone or pass. The move shows as pending on the live node
    /// until the server answers; a failed send takes it back.
    #[tracing::instrument(skip(self))]
    pub async fn play_move(&self, channel_id: ChannelId, loc: Location) -> Result<(), ClientError> {
        let snapshot = self.snapshot();
        let game = snapshot
            .game(channel_id)
            .ok_or(ClientError::UnknownGame(channel_id))?;
        let color = snapshot
            .user
            .as_ref()
            .and_then(|user| game.color_of(&user.name))
            .ok_or(ClientError::NotPlaying(channel_id))?;

        self.dispatch(LocalAction::PendingMove {
            channel_id,
            color,
            loc,
        })?;
        if let Err(err) = self.send(ClientMessage::GameMove { channel_id, loc }).await {
            self.dispatch(LocalAction::ClearPending { channel_id })?;
            return Err(err);
        }
        Ok(())
    }

    /// Mark the group at `coord` dead or alive while scoring
    pub async fn mark_life(
        &self,
        channel_id: ChannelId,
        coord: Coord,
        alive: bool,
    ) -> Result<(), ClientError> {
        self.send(ClientMessage::GameMarkLife {
            channel_id,
            x: coord.x,
            y: coord.y,
            alive,
        })
        .await
    }

    /// Ask the opponent to take back the last move
    pub async fn request_undo(&self, channel_id: ChannelId) -> Result<(), ClientError> {
        self.send(ClientMessage::GameUndoRequest { channel_id }).await
    }

    /// Grant or refuse the opponent's undo request
    pub async fn answer_undo(&self, channel_id: ChannelId, accept: bool) -> Result<(), ClientError> {
        let message = if accept {
            ClientMessage::GameUndoAccept { channel_id }
        } else {
            ClientMessage::GameUndoDecline { channel_id }
        };
        self.send(message).await?;
        self.dispatch(LocalAction::UndoAnswered { channel_id })
    }

    /// Give the opponent extra time
    pub async fn add_time(&self, channel_id: ChannelId, seconds: u32) -> Result<(), ClientError> {
        self.send(ClientMessage::GameAddTime {
            channel_id,
            seconds,
        })
        .await
    }

    /// Offer terms to a challenge
    pub async fn submit_challenge(
        &self,
        channel_id: ChannelId,
        proposal: Proposal,
    ) -> Result<(), ClientError> {
        self.send(ClientMessage::ChallengeSubmit {
            channel_id,
            proposal,
        })
        .await
    }

    /// Accept terms submitted to your challenge
    pub async fn accept_challenge(
        &self,
        channel_id: ChannelId,
        proposal: Proposal,
    ) -> Result<(), ClientError> {
        self.send(ClientMessage::ChallengeAccept {
            channel_id,
            proposal,
        })
        .await
    }

    /// Decline a challenge
    pub async fn decline_challenge(&self, channel_id: ChannelId) -> Result<(), ClientError> {
        self.send(ClientMessage::ChallengeDecline { channel_id }).await
    }

    /// Move the viewer of a joined game
    pub fn navigate(&self, channel_id: ChannelId, to: Navigation) -> Result<(), ClientError> {
        if self.snapshot().game(channel_id).is_none() {
            return Err(ClientError::UnknownGame(channel_id));
        }
        self.dispatch(LocalAction::Navigate { channel_id, to })
    }
}

impl StoreLoop {
    /// Apply batches and local actions until the session's batch stream
    /// ends. Fails only on a broken game record invariant.
    pub async fn run(mut self) -> Result<(), ClientError> {
        let mut state = Arc::clone(&self.snapshots.borrow());
        tracing::debug!("store loop started");

        loop {
            let next = tokio::select! {
                biased;

                Some(action) = self.local_rx.recv() => {
                    reduce_local((*state).clone(), &action)?
                }
                Ok(()) = self.session_rx.changed() => {
                    let session = *self.session_rx.borrow_and_update();
                    reduce_local((*state).clone(), &LocalAction::SessionChanged(session))?
                }
                batch = self.batches.recv() => match batch {
                    Some(batch) => {
                        tracing::trace!(messages = batch.messages.len(), "applying batch");
                        reduce_batch(&state, &batch)?
                    }
                    None => break,
                },
            };
            state = Arc::new(next);
            self.snapshots.send_replace(Arc::clone(&state));
        }

        tracing::debug!("store loop stopped");
        Ok(())
    }
}
