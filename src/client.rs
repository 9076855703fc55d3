//! Client session state
//!
//! This module contains the [`Client`] struct, which holds everything the
//! local participant knows about their session: who they are, the latest
//! room snapshot, the phase last observed, the local vote selection, the
//! reveal countdown and the chat panel. Server pushes and user actions are
//! applied to it one at a time from a single event loop.

use std::fmt::Debug;

use once_cell_serde::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, info, warn};
use web_time::Duration;

use crate::{
    AlarmMessage, IncomingMessage, OutgoingMessage,
    action::{self, CreateRoom, JoinRoom, SendChat, SubmitVote, SubmitWord},
    chat::{Chat, ChatTarget},
    config::ClientConfig,
    countdown::RevealCountdown,
    phase::{Effect, PhaseTracker, Screen, TransitionEffects},
    result::RoundSummary,
    session::Tunnel,
    snapshot::{Phase, Player, PlayerId, Role, RoomCode, RoomSnapshot, SecretReveal},
    store::{self, SessionIdentity, SessionStore, Storage, Theme},
    tally::{Tabulation, tabulate},
    turn::{TurnResolution, resolve_turn},
    view::{self, GameView, LobbyRow, VoteBoard},
    vote::{self, Toggle, VoteSelection},
};

/// What the local participant knows about themselves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// Connection identifier, known once connected
    pub id: Option<PlayerId>,
    /// Name the participant created or joined with
    pub name: String,
    /// Room the participant is in
    pub room: Option<RoomCode>,
    /// Whether the participant hosts the room
    pub is_host: bool,
    /// Role revealed to the participant
    pub role: Role,
    /// Word revealed to the participant
    pub secret_word: Option<String>,
}

/// Availability of the phase-specific controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Controls {
    /// Room code shown in the lobby
    pub room_code: Option<RoomCode>,
    /// The ready toggle was pressed and awaits the next round
    pub ready_sent: bool,
    /// Word cycles are over and word submission is locked
    pub game_over: bool,
    /// The participant asked to move on to the vote
    pub vote_requested: bool,
    /// The participant confirmed their vote
    pub vote_sent: bool,
}

/// Session state of the local participant
pub struct Client<S> {
    /// Client settings
    config: ClientConfig,
    /// Durable identity and theme
    store: SessionStore<S>,
    /// The local participant
    me: Participant,
    /// A room was requested and its code is not known yet
    awaiting_room: bool,
    /// Identity last written to the store
    saved: Option<SessionIdentity>,
    /// Identity offered for rejoining after a reconnect
    rejoin: Option<SessionIdentity>,
    /// Screen currently shown
    screen: Screen,
    /// Latest room snapshot
    snapshot: Option<RoomSnapshot>,
    /// Finished round, kept until a snapshot of another phase arrives
    result: Option<RoomSnapshot>,
    /// Tabulation of the latest votes (computed once per snapshot)
    tabulation: OnceCell<Tabulation>,
    /// Phase last observed
    phases: PhaseTracker,
    /// Local suspect selection
    selection: VoteSelection,
    /// Reveal countdown
    countdown: RevealCountdown,
    /// Control availability
    controls: Controls,
    /// Chat panel
    chat: Chat,
    /// Notices waiting to be shown to the participant
    notifications: Vec<String>,
}

impl<S> Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("me", &self.me)
            .field("screen", &self.screen)
            .field("phase", &self.phases.current())
            .finish_non_exhaustive()
    }
}

impl<S: Storage> Client<S> {
    /// Creates a client that is not connected yet
    pub fn new(config: ClientConfig, storage: S) -> Self {
        Self {
            config,
            store: SessionStore::new(storage),
            me: Participant::default(),
            awaiting_room: false,
            saved: None,
            rejoin: None,
            screen: Screen::Start,
            snapshot: None,
            result: None,
            tabulation: OnceCell::new(),
            phases: PhaseTracker::default(),
            selection: VoteSelection::new(),
            countdown: RevealCountdown::default(),
            controls: Controls::default(),
            chat: Chat::default(),
            notifications: Vec::new(),
        }
    }

    // Connection and rejoining

    /// Records the connection identifier assigned by the server
    ///
    /// If an identity from an earlier session is stored, it is offered for
    /// rejoining and returned.
    pub fn connect(&mut self, id: PlayerId) -> Option<&SessionIdentity> {
        info!(%id, "connected");
        self.me.id = Some(id);
        self.rejoin = self.store.load();
        if self.rejoin.is_none() {
            self.screen = Screen::Start;
        }
        self.rejoin.as_ref()
    }

    /// Identity offered for rejoining, if any
    pub fn rejoin_prompt(&self) -> Option<&SessionIdentity> {
        self.rejoin.as_ref()
    }

    /// Rejoins the room of the offered identity
    ///
    /// # Returns
    ///
    /// `false` if no identity was on offer
    pub fn accept_rejoin<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        let Some(identity) = self.rejoin.take() else {
            return false;
        };

        info!(name = %identity.name, room = %identity.room, "rejoining room");
        self.me.name.clone_from(&identity.name);
        self.me.room = Some(identity.room.clone());
        self.awaiting_room = false;
        tunnel.emit(&OutgoingMessage::JoinRoom(JoinRoom {
            name: identity.name.clone(),
            room_id: identity.room.clone(),
        }));
        self.saved = Some(identity);
        true
    }

    /// Declines the offered identity and forgets it
    pub fn decline_rejoin(&mut self) {
        self.rejoin = None;
        self.forget_identity();
        self.leave();
    }

    /// Leaves the finished round and forgets the stored identity
    pub fn play_again(&mut self) {
        self.forget_identity();
        self.leave();
    }

    // Server pushes

    /// Applies a message pushed by the server
    ///
    /// # Arguments
    ///
    /// * `message` - The pushed message
    /// * `tunnel` - Tunnel for requests the push triggers
    /// * `schedule_message` - Function to schedule countdown alarms
    ///
    /// # Returns
    ///
    /// The phase transition caused by a room snapshot, if one was applied
    pub fn receive<T: Tunnel, A: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: IncomingMessage,
        tunnel: &T,
        schedule_message: A,
    ) -> Option<TransitionEffects> {
        match message {
            IncomingMessage::GameState(snapshot) => {
                self.apply_snapshot(*snapshot, tunnel, schedule_message)
            }
            IncomingMessage::RevealSecret(SecretReveal { role, word }) => {
                debug!(?role, "secret revealed");
                self.me.role = role;
                self.me.secret_word = Some(word);
                None
            }
            IncomingMessage::GameResult(snapshot) => {
                self.result = Some(*snapshot);
                self.tabulation = OnceCell::new();
                self.screen = Screen::Result;
                None
            }
            IncomingMessage::Error(message) => {
                warn!(%message, "server reported an error");
                self.notifications.push(message);
                None
            }
            IncomingMessage::ChatMessage(message) => {
                self.chat.receive(message);
                None
            }
        }
    }

    /// Handles an alarm scheduled earlier through `schedule_message`
    ///
    /// # Returns
    ///
    /// `true` if the alarm was still current
    pub fn receive_alarm<A: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: &AlarmMessage,
        schedule_message: A,
    ) -> bool {
        match message {
            AlarmMessage::Countdown(tick) => {
                self.countdown
                    .receive_alarm(tick, self.config.reveal_tick, schedule_message)
            }
        }
    }

    fn apply_snapshot<T: Tunnel, A: FnMut(AlarmMessage, Duration)>(
        &mut self,
        snapshot: RoomSnapshot,
        tunnel: &T,
        mut schedule_message: A,
    ) -> Option<TransitionEffects> {
        if self.me.room.is_none() && !self.awaiting_room {
            debug!(room = %snapshot.id, "snapshot ignored outside of a room");
            return None;
        }

        self.me.is_host = self
            .me
            .id
            .as_ref()
            .is_some_and(|id| snapshot.is_host(id));
        self.me.room = Some(snapshot.id.clone());
        self.awaiting_room = false;
        self.remember_identity();

        let transition = self.phases.observe(&snapshot);
        for effect in &transition.effects {
            self.run_effect(effect, &mut schedule_message);
        }

        if snapshot.phase == Phase::Vote && self.has_voted_in(&snapshot) {
            self.selection.lock();
        }

        self.perform_host_duties(&snapshot, tunnel);
        self.chat.refresh_targets(&snapshot, &self.me.name);

        self.result = (snapshot.phase == Phase::Result).then(|| snapshot.clone());
        self.snapshot = Some(snapshot);
        self.tabulation = OnceCell::new();

        Some(transition)
    }

    fn run_effect<A: FnMut(AlarmMessage, Duration)>(
        &mut self,
        effect: &Effect,
        schedule_message: &mut A,
    ) {
        match effect {
            Effect::Navigate(screen) => self.screen = *screen,
            Effect::ShowRoomCode(code) => self.controls.room_code = Some(code.clone()),
            Effect::ResetReady => self.controls.ready_sent = false,
            Effect::StartRevealCountdown => self.countdown.start(
                self.config.reveal_seconds,
                self.config.reveal_tick,
                schedule_message,
            ),
            Effect::StopRevealCountdown => self.countdown.cancel(),
            Effect::ResetGameView => {
                self.controls.game_over = false;
                self.controls.vote_requested = false;
            }
            Effect::ShowGameOver => self.controls.game_over = true,
            Effect::ResetVoteSelection => {
                self.selection.clear();
                self.controls.vote_sent = false;
            }
        }
    }

    /// Starts the round or opens the vote once everybody is ready
    fn perform_host_duties<T: Tunnel>(&self, snapshot: &RoomSnapshot, tunnel: &T) {
        if !self.me.is_host {
            return;
        }

        match snapshot.phase {
            Phase::Lobby if view::ready_to_start(snapshot) => {
                info!(room = %snapshot.id, "everybody is ready, starting the round");
                tunnel.emit(&OutgoingMessage::StartGame(snapshot.id.clone()));
            }
            Phase::PreVote if view::ready_to_vote(snapshot) => {
                info!(room = %snapshot.id, "everybody wants to vote, opening the vote");
                tunnel.emit(&OutgoingMessage::ForceVotePhase(snapshot.id.clone()));
            }
            _ => {}
        }
    }

    fn has_voted_in(&self, snapshot: &RoomSnapshot) -> bool {
        self.me
            .id
            .as_ref()
            .and_then(|id| snapshot.player(id))
            .is_some_and(Player::has_voted)
    }

    fn remember_identity(&mut self) {
        let Some(room) = &self.me.room else {
            return;
        };
        if self.me.name.is_empty() {
            return;
        }

        let identity = SessionIdentity::new(self.me.name.clone(), room.clone());
        if self.saved.as_ref() == Some(&identity) {
            return;
        }
        if let Err(e) = self.store.save(&identity) {
            warn!(error = %e, "could not remember session identity");
        }
        self.saved = Some(identity);
    }

    fn forget_identity(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not forget session identity");
        }
        self.saved = None;
    }

    fn leave(&mut self) {
        self.me.room = None;
        self.me.is_host = false;
        self.me.role = Role::Unassigned;
        self.me.secret_word = None;
        self.awaiting_room = false;
        self.snapshot = None;
        self.result = None;
        self.tabulation = OnceCell::new();
        self.phases.reset();
        self.selection.clear();
        self.countdown.cancel();
        self.controls = Controls::default();
        self.chat = Chat::default();
        self.screen = Screen::Start;
    }

    fn room(&self) -> Result<RoomCode, action::Error> {
        self.me.room.clone().ok_or(action::Error::NoRoom)
    }

    // User actions

    /// Creates a room hosted by the participant
    ///
    /// # Errors
    ///
    /// Returns an error, and sends nothing, if the input is invalid.
    pub fn create_room<T: Tunnel>(
        &mut self,
        tunnel: &T,
        name: &str,
        imposters: u32,
        cycles: u32,
    ) -> Result<(), action::Error> {
        let request = CreateRoom::new(name, imposters, cycles)?;
        info!(name = %request.name, imposters, cycles, "creating room");
        self.me.name.clone_from(&request.name);
        self.me.room = None;
        self.awaiting_room = true;
        tunnel.emit(&OutgoingMessage::CreateRoom(request));
        Ok(())
    }

    /// Joins an existing room
    ///
    /// # Errors
    ///
    /// Returns an error, and sends nothing, if the input is invalid.
    pub fn join_room<T: Tunnel>(
        &mut self,
        tunnel: &T,
        name: &str,
        room: &str,
    ) -> Result<(), action::Error> {
        let request = JoinRoom::new(name, room)?;
        info!(name = %request.name, room = %request.room_id, "joining room");
        self.me.name.clone_from(&request.name);
        self.me.room = Some(request.room_id.clone());
        self.awaiting_room = false;
        tunnel.emit(&OutgoingMessage::JoinRoom(request));
        self.remember_identity();
        Ok(())
    }

    /// Flips the participant's ready flag
    ///
    /// # Errors
    ///
    /// Returns [`action::Error::NoRoom`] outside of a room.
    pub fn toggle_ready<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), action::Error> {
        let room = self.room()?;
        tunnel.emit(&OutgoingMessage::ToggleReady(room));
        self.controls.ready_sent = true;
        Ok(())
    }

    /// Submits a word on the participant's turn
    ///
    /// # Errors
    ///
    /// Returns an error, and sends nothing, if the word is invalid or it is
    /// not the participant's turn.
    pub fn submit_word<T: Tunnel>(&mut self, tunnel: &T, word: &str) -> Result<(), action::Error> {
        let submission = SubmitWord::new(self.room()?, word)?;
        if self.controls.game_over || !self.turn().is_local_turn {
            debug!("word rejected, not the local turn");
            return Err(action::Error::NotYourTurn);
        }
        tunnel.emit(&OutgoingMessage::SubmitWord(submission));
        Ok(())
    }

    /// Asks to move on to the vote
    ///
    /// # Errors
    ///
    /// Returns [`action::Error::NoRoom`] outside of a room.
    pub fn ready_for_vote<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), action::Error> {
        let room = self.room()?;
        tunnel.emit(&OutgoingMessage::ReadyForVote(room));
        self.controls.vote_requested = true;
        Ok(())
    }

    /// Marks or unmarks a suspect
    ///
    /// Outside of the vote, or once a vote was cast, this does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`vote::Error::CapacityExceeded`] if the quota is already
    /// reached; the selection is unchanged.
    pub fn toggle_vote(&mut self, id: PlayerId) -> Result<Toggle, vote::Error> {
        if self.phase() != Some(Phase::Vote) {
            return Ok(Toggle::Locked);
        }
        let quota = self.quota();
        self.selection.toggle(id, quota).inspect_err(|e| {
            debug!(error = %e, "suspect not marked");
        })
    }

    /// Whether the current selection may be sent as a vote
    pub fn can_confirm_vote(&self) -> bool {
        let already_voted = self.controls.vote_sent
            || self
                .snapshot
                .as_ref()
                .is_some_and(|snapshot| self.has_voted_in(snapshot));
        self.phase() == Some(Phase::Vote)
            && self.selection.is_confirmable(self.quota(), already_voted)
    }

    /// Sends the marked suspects as the participant's vote
    ///
    /// # Errors
    ///
    /// Returns an error, and sends nothing, if a vote was already cast or
    /// the selection does not match the quota.
    pub fn confirm_vote<T: Tunnel>(&mut self, tunnel: &T) -> Result<(), action::Error> {
        let room = self.room()?;
        if self.controls.vote_sent || self.selection.is_locked() {
            return Err(action::Error::AlreadyVoted);
        }
        if !self.can_confirm_vote() {
            return Err(action::Error::VoteIncomplete {
                quota: self.quota(),
            });
        }

        info!(suspects = self.selection.len(), "casting vote");
        tunnel.emit(&OutgoingMessage::SubmitVote(SubmitVote {
            room_id: room,
            votes_obj: self.selection.to_vote_set(),
        }));
        self.controls.vote_sent = true;
        Ok(())
    }

    /// Selects the recipient of chat messages
    ///
    /// # Returns
    ///
    /// `false` if `target` is not in the room
    pub fn select_chat_target(&mut self, target: ChatTarget) -> bool {
        self.chat.select(target)
    }

    /// Sends a chat message to the selected recipient
    ///
    /// # Errors
    ///
    /// Returns an error, and sends nothing, if the message is invalid.
    pub fn send_chat<T: Tunnel>(&mut self, tunnel: &T, msg: &str) -> Result<(), action::Error> {
        let message = SendChat::new(self.room()?, msg, self.chat.target().clone())?;
        tunnel.emit(&OutgoingMessage::SendChat(message));
        Ok(())
    }

    /// The stored colour theme
    pub fn theme(&self) -> Theme {
        self.store.theme()
    }

    /// Switches the colour theme and stores the choice
    ///
    /// # Errors
    ///
    /// Returns an error if the choice cannot be stored.
    pub fn toggle_theme(&mut self) -> Result<Theme, store::Error> {
        self.store.toggle_theme()
    }

    // Read-only accessors

    /// Client settings
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The local participant
    pub fn participant(&self) -> &Participant {
        &self.me
    }

    /// Screen currently shown
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Phase of the latest snapshot
    pub fn phase(&self) -> Option<Phase> {
        self.phases.current()
    }

    /// Latest room snapshot
    pub fn snapshot(&self) -> Option<&RoomSnapshot> {
        self.snapshot.as_ref()
    }

    /// Control availability
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Number of suspects each vote must name
    pub fn quota(&self) -> usize {
        self.snapshot
            .as_ref()
            .map_or(0, |snapshot| snapshot.settings.imposters as usize)
    }

    /// Whose turn it is
    pub fn turn(&self) -> TurnResolution {
        self.snapshot
            .as_ref()
            .map(|snapshot| {
                resolve_turn(
                    &snapshot.turn_order,
                    snapshot.turn_index,
                    self.me.id.as_ref(),
                )
            })
            .unwrap_or_default()
    }

    /// Local suspect selection
    pub fn vote_selection(&self) -> &VoteSelection {
        &self.selection
    }

    /// Reveal countdown
    pub fn countdown(&self) -> &RevealCountdown {
        &self.countdown
    }

    /// Chat panel
    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    /// Takes the notices waiting to be shown
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    fn vote_source(&self) -> Option<&RoomSnapshot> {
        self.result.as_ref().or(self.snapshot.as_ref())
    }

    /// Tabulation of the latest votes
    pub fn tabulation(&self) -> Option<&Tabulation> {
        let source = self.vote_source()?;
        Some(
            self.tabulation
                .get_or_init(|| tabulate(source.players(), RoundSummary::quota(source))),
        )
    }

    /// Summary of the latest finished round
    pub fn round_summary(&self) -> Option<RoundSummary> {
        let source = self.result.as_ref()?;
        let tabulation = self.tabulation()?;
        Some(RoundSummary::with_tabulation(source, tabulation))
    }

    /// Lobby roster
    pub fn lobby_roster(&self) -> Vec<LobbyRow> {
        self.snapshot
            .as_ref()
            .map(view::lobby_roster)
            .unwrap_or_default()
    }

    /// Word-submission screen
    pub fn game_view(&self) -> Option<GameView> {
        let snapshot = self.snapshot.as_ref()?;
        Some(GameView::new(
            snapshot,
            self.me.id.as_ref(),
            self.controls.game_over,
        ))
    }

    /// Pre-vote progress text
    pub fn pre_vote_status(&self) -> Option<String> {
        self.snapshot.as_ref().map(view::pre_vote_status)
    }

    /// Vote screen
    pub fn vote_board(&self) -> Option<VoteBoard> {
        let snapshot = self.snapshot.as_ref()?;
        let mut board = VoteBoard::new(snapshot, self.me.id.as_ref(), &self.selection, self.quota());
        board.can_confirm &= self.can_confirm_vote();
        Some(board)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockTunnel {
        sent: RefCell<Vec<OutgoingMessage>>,
    }

    impl MockTunnel {
        fn take(&self) -> Vec<OutgoingMessage> {
            std::mem::take(&mut *self.sent.borrow_mut())
        }
    }

    impl Tunnel for MockTunnel {
        fn emit(&self, message: &OutgoingMessage) {
            self.sent.borrow_mut().push(message.clone());
        }
    }

    #[derive(Default)]
    struct Alarms(Vec<(AlarmMessage, Duration)>);

    impl Alarms {
        fn scheduler(&mut self) -> impl FnMut(AlarmMessage, Duration) + '_ {
            |alarm, delay| self.0.push((alarm, delay))
        }
    }

    fn room(phase: &str, extra: serde_json::Value) -> IncomingMessage {
        let mut state = json!({
            "id": "ROOM",
            "hostId": "me",
            "phase": phase,
            "settings": { "imposters": 1, "cycles": 1 },
            "players": {
                "me": { "id": "me", "name": "Al", "isReady": true },
                "b": { "id": "b", "name": "Bea", "isReady": true },
                "c": { "id": "c", "name": "Cy", "isReady": false }
            },
            "turnOrder": ["me", "b", "c"],
            "turnIndex": 0
        });
        if let (Some(state), Some(extra)) = (state.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                state.insert(key.clone(), value.clone());
            }
        }
        IncomingMessage::GameState(Box::new(serde_json::from_value(state).unwrap()))
    }

    fn stored_identity() -> MemoryStorage {
        let mut store = SessionStore::new(MemoryStorage::default());
        store.save(&SessionIdentity::new("Al", "ROOM")).unwrap();
        store.storage().clone()
    }

    fn joined_client(tunnel: &MockTunnel) -> Client<MemoryStorage> {
        let mut client = Client::new(ClientConfig::default(), MemoryStorage::default());
        assert!(client.connect(PlayerId::from("me")).is_none());
        client.join_room(tunnel, "Al", "ROOM").unwrap();
        tunnel.take();
        client
    }

    #[test]
    fn test_fresh_connection_shows_start() {
        let mut client = Client::new(ClientConfig::default(), MemoryStorage::default());

        assert!(client.connect(PlayerId::from("me")).is_none());
        assert_eq!(client.screen(), Screen::Start);
        assert!(client.rejoin_prompt().is_none());
    }

    #[test]
    fn test_rejoin_accepted() {
        let mut client = Client::new(ClientConfig::default(), stored_identity());
        let tunnel = MockTunnel::default();

        assert_eq!(
            client.connect(PlayerId::from("me")),
            Some(&SessionIdentity::new("Al", "ROOM"))
        );
        assert!(client.accept_rejoin(&tunnel));
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::JoinRoom(JoinRoom {
                name: "Al".to_owned(),
                room_id: RoomCode::from("ROOM"),
            })]
        );
        assert!(!client.accept_rejoin(&tunnel));
    }

    #[test]
    fn test_rejoin_declined_forgets_identity() {
        let mut client = Client::new(ClientConfig::default(), stored_identity());

        client.connect(PlayerId::from("me"));
        client.decline_rejoin();

        assert!(client.rejoin_prompt().is_none());
        assert_eq!(client.screen(), Screen::Start);
        assert!(client.connect(PlayerId::from("me2")).is_none());
    }

    #[test]
    fn test_create_room_then_lobby() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = Client::new(ClientConfig::default(), MemoryStorage::default());
        client.connect(PlayerId::from("me"));

        assert_eq!(
            client.create_room(&tunnel, " ", 1, 1),
            Err(action::Error::EmptyName)
        );
        assert!(tunnel.take().is_empty());

        client.create_room(&tunnel, "Al", 1, 2).unwrap();
        assert!(matches!(
            tunnel.take().as_slice(),
            [OutgoingMessage::CreateRoom(_)]
        ));

        let transition = client
            .receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler())
            .unwrap();
        assert!(transition.is_transition());
        assert_eq!(client.screen(), Screen::Lobby);
        assert_eq!(client.controls().room_code, Some(RoomCode::from("ROOM")));
        assert!(client.participant().is_host);
        assert_eq!(client.lobby_roster().len(), 3);

        client.play_again();
        assert!(client.connect(PlayerId::from("me")).is_none());
    }

    #[test]
    fn test_identity_saved_once_room_is_known() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = Client::new(ClientConfig::default(), MemoryStorage::default());
        client.connect(PlayerId::from("me"));
        client.create_room(&tunnel, "Al", 1, 2).unwrap();
        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());

        assert_eq!(
            client.store.load(),
            Some(SessionIdentity::new("Al", "ROOM"))
        );
    }

    #[test]
    fn test_host_starts_when_everybody_is_ready() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());
        assert!(tunnel.take().is_empty());

        let all_ready = json!({ "players": {
            "me": { "id": "me", "name": "Al", "isReady": true },
            "b": { "id": "b", "name": "Bea", "isReady": true }
        }});
        client.receive(room("LOBBY", all_ready), &tunnel, alarms.scheduler());
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::StartGame(RoomCode::from("ROOM"))]
        );
    }

    #[test]
    fn test_guest_never_starts() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        let all_ready = json!({ "hostId": "b", "players": {
            "me": { "id": "me", "name": "Al", "isReady": true },
            "b": { "id": "b", "name": "Bea", "isReady": true }
        }});
        client.receive(room("LOBBY", all_ready), &tunnel, alarms.scheduler());

        assert!(!client.participant().is_host);
        assert!(tunnel.take().is_empty());
    }

    #[test]
    fn test_toggle_ready() {
        let tunnel = MockTunnel::default();
        let mut client = Client::new(ClientConfig::default(), MemoryStorage::default());
        assert_eq!(client.toggle_ready(&tunnel), Err(action::Error::NoRoom));

        client.join_room(&tunnel, "Al", "ROOM").unwrap();
        tunnel.take();
        client.toggle_ready(&tunnel).unwrap();

        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::ToggleReady(RoomCode::from("ROOM"))]
        );
        assert!(client.controls().ready_sent);
    }

    #[test]
    fn test_reveal_countdown_lifecycle() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("REVEAL", json!({})), &tunnel, alarms.scheduler());
        client.receive(
            IncomingMessage::RevealSecret(SecretReveal {
                role: Role::Crew,
                word: "harbour".to_owned(),
            }),
            &tunnel,
            alarms.scheduler(),
        );
        assert_eq!(client.screen(), Screen::Reveal);
        assert_eq!(client.participant().role, Role::Crew);
        assert_eq!(client.participant().secret_word.as_deref(), Some("harbour"));
        assert_eq!(client.countdown().label().as_deref(), Some("20s"));
        assert_eq!(alarms.0.len(), 1);

        let (first_tick, _) = alarms.0.remove(0);
        assert!(client.receive_alarm(&first_tick, alarms.scheduler()));
        assert_eq!(client.countdown().remaining(), Some(19));
        let (second_tick, _) = alarms.0.remove(0);

        client.receive(room("GAME", json!({})), &tunnel, alarms.scheduler());
        assert_eq!(client.countdown().remaining(), None);
        assert!(!client.receive_alarm(&second_tick, alarms.scheduler()));
        assert!(alarms.0.is_empty());
    }

    #[test]
    fn test_reveal_reentry_restarts_countdown() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("REVEAL", json!({})), &tunnel, alarms.scheduler());
        let (stale, _) = alarms.0.remove(0);
        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());
        client.receive(room("REVEAL", json!({})), &tunnel, alarms.scheduler());

        assert_eq!(alarms.0.len(), 1);
        assert!(!client.receive_alarm(&stale, alarms.scheduler()));
        assert_eq!(client.countdown().remaining(), Some(20));
    }

    #[test]
    fn test_word_submission_gated_by_turn() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("GAME", json!({ "turnIndex": 1 })), &tunnel, alarms.scheduler());
        assert!(!client.turn().is_local_turn);
        assert_eq!(
            client.submit_word(&tunnel, "salt"),
            Err(action::Error::NotYourTurn)
        );

        client.receive(room("GAME", json!({ "turnIndex": 0 })), &tunnel, alarms.scheduler());
        assert_eq!(client.submit_word(&tunnel, "  "), Err(action::Error::EmptyWord));
        client.submit_word(&tunnel, "salt").unwrap();
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::SubmitWord(SubmitWord {
                room_id: RoomCode::from("ROOM"),
                word: "salt".to_owned(),
            })]
        );
    }

    #[test]
    fn test_pre_vote_locks_words_and_host_opens_vote() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("GAME", json!({})), &tunnel, alarms.scheduler());
        client.receive(room("PRE_VOTE", json!({})), &tunnel, alarms.scheduler());
        assert_eq!(client.screen(), Screen::Game);
        assert!(client.controls().game_over);
        assert_eq!(client.submit_word(&tunnel, "salt"), Err(action::Error::NotYourTurn));
        assert_eq!(client.pre_vote_status().as_deref(), Some("0/3 Players Ready"));

        client.ready_for_vote(&tunnel).unwrap();
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::ReadyForVote(RoomCode::from("ROOM"))]
        );

        let everybody = json!({ "players": {
            "me": { "id": "me", "name": "Al", "wantsVote": true },
            "b": { "id": "b", "name": "Bea", "wantsVote": true }
        }});
        client.receive(room("PRE_VOTE", everybody), &tunnel, alarms.scheduler());
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::ForceVotePhase(RoomCode::from("ROOM"))]
        );
    }

    #[test]
    fn test_vote_flow() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);
        assert_eq!(client.toggle_vote(PlayerId::from("b")), Ok(Toggle::Locked));

        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());
        assert_eq!(client.screen(), Screen::Vote);
        assert!(!client.can_confirm_vote());
        assert_eq!(
            client.confirm_vote(&tunnel),
            Err(action::Error::VoteIncomplete { quota: 1 })
        );

        assert_eq!(client.toggle_vote(PlayerId::from("b")), Ok(Toggle::Selected));
        assert_eq!(
            client.toggle_vote(PlayerId::from("c")),
            Err(vote::Error::CapacityExceeded { quota: 1 })
        );
        assert!(client.can_confirm_vote());
        assert!(client.vote_board().unwrap().can_confirm);

        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());
        assert_eq!(client.vote_selection().selected(), &[PlayerId::from("b")]);

        client.confirm_vote(&tunnel).unwrap();
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::SubmitVote(SubmitVote {
                room_id: RoomCode::from("ROOM"),
                votes_obj: [PlayerId::from("b")].into_iter().collect(),
            })]
        );
        assert_eq!(client.confirm_vote(&tunnel), Err(action::Error::AlreadyVoted));

        let echoed = json!({ "players": {
            "me": { "id": "me", "name": "Al", "votes": { "b": true } },
            "b": { "id": "b", "name": "Bea" },
            "c": { "id": "c", "name": "Cy" }
        }});
        client.receive(room("VOTE", echoed), &tunnel, alarms.scheduler());
        assert!(client.vote_selection().is_locked());
        assert_eq!(client.toggle_vote(PlayerId::from("b")), Ok(Toggle::Locked));
        assert!(client.vote_board().unwrap().locked);
    }

    #[test]
    fn test_vote_entry_clears_selection() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());
        client.toggle_vote(PlayerId::from("b")).unwrap();
        client.receive(room("RESULT", json!({})), &tunnel, alarms.scheduler());
        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());

        assert!(client.vote_selection().is_empty());
        assert!(!client.controls().vote_sent);
    }

    #[test]
    fn test_jump_cut_from_lobby_to_vote() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());
        let transition = client
            .receive(room("VOTE", json!({})), &tunnel, alarms.scheduler())
            .unwrap();

        assert_eq!(transition.from, Some(Phase::Lobby));
        assert_eq!(client.screen(), Screen::Vote);
        assert_eq!(client.phase(), Some(Phase::Vote));
    }

    #[test]
    fn test_result_tabulation() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        let result = json!({
            "secretWord": "harbour",
            "players": {
                "me": { "id": "me", "name": "Al", "role": "Crew", "votes": { "b": true } },
                "b": { "id": "b", "name": "Bea", "role": "Imposter", "votes": { "c": true } },
                "c": { "id": "c", "name": "Cy", "role": "Crew", "votes": { "b": true } }
            }
        });
        client.receive(room("RESULT", result), &tunnel, alarms.scheduler());

        assert_eq!(client.screen(), Screen::Result);
        let tabulation = client.tabulation().unwrap();
        assert_eq!(tabulation.accused, vec![PlayerId::from("b")]);
        assert_eq!(tabulation.received(&PlayerId::from("b")), 2);

        let summary = client.round_summary().unwrap();
        assert_eq!(summary.secret_word.as_deref(), Some("harbour"));
        assert_eq!(summary.imposters_label(), "Bea");
        assert_eq!(summary.accused_label(), "Bea");
    }

    fn votes_on(suspect: &str) -> serde_json::Value {
        let mut votes = serde_json::Map::new();
        votes.insert(suspect.to_owned(), json!(true));
        json!({ "players": {
            "me": { "id": "me", "name": "Al", "role": "Crew", "votes": votes },
            "b": { "id": "b", "name": "Bea", "role": "Imposter", "votes": votes },
            "c": { "id": "c", "name": "Cy", "role": "Crew", "votes": { "me": true } }
        }})
    }

    #[test]
    fn test_second_round_starts_clean() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());
        client.toggle_vote(PlayerId::from("b")).unwrap();
        client.confirm_vote(&tunnel).unwrap();
        client.receive(room("RESULT", votes_on("b")), &tunnel, alarms.scheduler());
        assert_eq!(client.tabulation().unwrap().accused, vec![PlayerId::from("b")]);
        assert_eq!(client.round_summary().unwrap().accused_label(), "Bea");

        client.toggle_ready(&tunnel).unwrap();
        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());
        assert_eq!(client.screen(), Screen::Lobby);
        assert!(!client.controls().ready_sent);
        assert!(client.round_summary().is_none());
        assert!(client.tabulation().unwrap().accused.is_empty());

        client.receive(room("REVEAL", json!({})), &tunnel, alarms.scheduler());
        client.receive(room("GAME", json!({})), &tunnel, alarms.scheduler());
        assert!(!client.controls().game_over);
        client.receive(room("PRE_VOTE", json!({})), &tunnel, alarms.scheduler());
        assert!(client.controls().game_over);

        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());
        assert!(client.vote_selection().is_empty());
        assert!(!client.vote_selection().is_locked());
        assert!(!client.controls().vote_sent);
        assert!(client.round_summary().is_none());

        assert_eq!(client.toggle_vote(PlayerId::from("c")), Ok(Toggle::Selected));
        client.confirm_vote(&tunnel).unwrap();
        client.receive(room("VOTE", votes_on("c")), &tunnel, alarms.scheduler());
        let tabulation = client.tabulation().unwrap();
        assert_eq!(tabulation.accused, vec![PlayerId::from("c")]);
        assert_eq!(tabulation.received(&PlayerId::from("c")), 2);
        assert_eq!(tabulation.received(&PlayerId::from("b")), 0);

        client.receive(room("RESULT", votes_on("c")), &tunnel, alarms.scheduler());
        assert_eq!(client.tabulation().unwrap().accused, vec![PlayerId::from("c")]);
        assert_eq!(client.round_summary().unwrap().accused_label(), "Cy");
    }

    #[test]
    fn test_game_result_push_shows_result() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);
        client.receive(room("VOTE", json!({})), &tunnel, alarms.scheduler());

        let IncomingMessage::GameState(snapshot) = room("RESULT", json!({ "secretWord": "salt" }))
        else {
            unreachable!()
        };
        client.receive(IncomingMessage::GameResult(snapshot), &tunnel, alarms.scheduler());

        assert_eq!(client.screen(), Screen::Result);
        assert_eq!(client.phase(), Some(Phase::Vote));
        assert_eq!(
            client.round_summary().unwrap().secret_word.as_deref(),
            Some("salt")
        );
        assert_eq!(client.round_summary().unwrap().accused_label(), "None");
    }

    #[test]
    fn test_server_error_is_a_one_shot_notice() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);

        client.receive(
            IncomingMessage::Error("Room is full".to_owned()),
            &tunnel,
            alarms.scheduler(),
        );

        assert_eq!(client.take_notifications(), vec!["Room is full".to_owned()]);
        assert!(client.take_notifications().is_empty());
        assert_eq!(client.participant().room, Some(RoomCode::from("ROOM")));
    }

    #[test]
    fn test_chat() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);
        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());

        assert!(client.select_chat_target(ChatTarget::Player("Bea".to_owned())));
        assert_eq!(client.send_chat(&tunnel, ""), Err(action::Error::EmptyMessage));
        client.send_chat(&tunnel, "psst").unwrap();
        assert_eq!(
            tunnel.take(),
            vec![OutgoingMessage::SendChat(SendChat {
                room_id: RoomCode::from("ROOM"),
                msg: "psst".to_owned(),
                target: ChatTarget::Player("Bea".to_owned()),
            })]
        );

        client.receive(
            IncomingMessage::ChatMessage(crate::chat::ChatMessage {
                sender: "Bea".to_owned(),
                msg: "hey".to_owned(),
                target: ChatTarget::Player("Al".to_owned()),
            }),
            &tunnel,
            alarms.scheduler(),
        );
        assert!(client.chat().lines()[0].private);
    }

    #[test]
    fn test_play_again_ignores_further_snapshots() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);
        client.receive(room("RESULT", json!({})), &tunnel, alarms.scheduler());

        client.play_again();
        assert_eq!(client.screen(), Screen::Start);
        assert!(client.snapshot().is_none());
        assert!(client.store.load().is_none());

        assert!(
            client
                .receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler())
                .is_none()
        );
        assert_eq!(client.screen(), Screen::Start);
    }

    #[test]
    fn test_leaving_clears_chat() {
        let tunnel = MockTunnel::default();
        let mut alarms = Alarms::default();
        let mut client = joined_client(&tunnel);
        client.receive(room("LOBBY", json!({})), &tunnel, alarms.scheduler());
        client.select_chat_target(ChatTarget::Player("Bea".to_owned()));
        client.receive(
            IncomingMessage::ChatMessage(crate::chat::ChatMessage {
                sender: "Bea".to_owned(),
                msg: "hey".to_owned(),
                target: ChatTarget::All,
            }),
            &tunnel,
            alarms.scheduler(),
        );

        client.play_again();

        assert!(client.chat().lines().is_empty());
        assert_eq!(client.chat().target(), &ChatTarget::All);
    }

    #[test]
    fn test_theme_toggle() {
        let mut client = Client::new(ClientConfig::default(), MemoryStorage::default());

        assert_eq!(client.theme(), Theme::Bright);
        assert_eq!(client.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(client.theme(), Theme::Dark);
    }
}
