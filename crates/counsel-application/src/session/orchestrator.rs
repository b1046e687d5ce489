//! Session orchestrator.
//!
//! Owns the [`SessionState`] of one signed-in user and keeps it in sync with
//! the datastore and the chat backend. Front-ends call into it and render
//! from [`SessionOrchestrator::state`].

use super::state::{PendingTurn, SendOutcome, SessionState};
use counsel_core::chat::{ChatReply, ChatService, ChatTurn};
use counsel_core::conversation::{
    Conversation, ConversationRepository, ConversationType, NewConversation,
};
use counsel_core::error::Result;
use counsel_core::message::{Message, MessageRepository, MessageRole};
use counsel_core::user::{AuthSession, User};
use std::sync::Arc;

/// Assistant text appended when a chat call fails and the backend URL is unknown.
pub const CHAT_FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error. Please make sure the backend server is running.";

/// Apology naming the backend the user should check.
pub fn chat_failure_message(backend_url: &str) -> String {
    format!(
        "Sorry, I encountered an error. Please make sure the backend server is running at {}",
        backend_url
    )
}

/// Longest title derived from a first message, in Unicode scalar values.
pub const TITLE_MAX_CHARS: usize = 100;

/// Coordinates conversations, messages and chat turns for one session.
///
/// # Concurrency
///
/// Every mutating operation takes `&mut self`, so a single owner drives the
/// session and two sends can never overlap on one orchestrator.
pub struct SessionOrchestrator {
    /// Datastore access for conversation rows
    conversation_repository: Arc<dyn ConversationRepository>,
    /// Datastore access for message rows
    message_repository: Arc<dyn MessageRepository>,
    /// Backend that produces replies
    chat_service: Arc<dyn ChatService>,
    /// Source of the current user
    auth: Arc<dyn AuthSession>,
    state: SessionState,
    /// Assistant text appended when a chat call fails
    failure_message: String,
}

impl SessionOrchestrator {
    /// Creates an orchestrator with empty state.
    ///
    /// # Arguments
    ///
    /// * `conversation_repository` - Datastore for conversations
    /// * `message_repository` - Datastore for messages
    /// * `chat_service` - Backend chat service
    /// * `auth` - Session handle reporting the current user
    pub fn new(
        conversation_repository: Arc<dyn ConversationRepository>,
        message_repository: Arc<dyn MessageRepository>,
        chat_service: Arc<dyn ChatService>,
        auth: Arc<dyn AuthSession>,
    ) -> Self {
        Self {
            conversation_repository,
            message_repository,
            chat_service,
            auth,
            state: SessionState::default(),
            failure_message: CHAT_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Names `backend_url` in the apology shown when a chat call fails.
    pub fn with_backend_url(mut self, backend_url: &str) -> Self {
        self.failure_message = chat_failure_message(backend_url);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    /// Replaces the conversation list with the user's conversations.
    ///
    /// Failures are logged and the stale list is kept.
    pub async fn load_conversations(&mut self) {
        let Some(user) = self.auth.current_user() else {
            tracing::debug!("[Session] No user signed in; skipping conversation load");
            return;
        };

        match self.conversation_repository.list_for_user(&user.id).await {
            Ok(conversations) => {
                tracing::debug!(
                    "[Session] Loaded {} conversations for user {}",
                    conversations.len(),
                    user.id
                );
                self.state.conversations = conversations;
            }
            Err(e) => {
                tracing::warn!("[Session] Failed to load conversations: {}", e);
            }
        }
    }

    /// Replaces the message list with the conversation's messages.
    ///
    /// Failures are logged and the current list is kept.
    pub async fn load_messages(&mut self, conversation_id: &str) {
        match self
            .message_repository
            .list_for_conversation(conversation_id)
            .await
        {
            Ok(messages) => {
                tracing::debug!(
                    "[Session] Loaded {} messages for conversation {}",
                    messages.len(),
                    conversation_id
                );
                self.state.messages = messages;
            }
            Err(e) => {
                tracing::warn!(
                    "[Session] Failed to load messages for {}: {}",
                    conversation_id,
                    e
                );
            }
        }
    }

    /// Makes `conversation_id` active and loads its messages.
    ///
    /// Selecting the already-active conversation does nothing.
    pub async fn select_conversation(&mut self, conversation_id: &str) {
        if self.state.active_conversation_id.as_deref() == Some(conversation_id) {
            return;
        }

        tracing::info!("[Session] Selecting conversation {}", conversation_id);
        self.state.active_conversation_id = Some(conversation_id.to_string());
        self.load_messages(conversation_id).await;
    }

    /// Creates a conversation of the given type and makes it active.
    ///
    /// The new conversation starts with its placeholder title and an empty
    /// message list; nothing is fetched. Returns `None` when there is no user
    /// or the insert fails, in which case the state is unchanged.
    pub async fn new_conversation(
        &mut self,
        conversation_type: ConversationType,
    ) -> Option<Conversation> {
        let user = self.auth.current_user()?;
        let row = NewConversation::for_type(user.id, conversation_type);

        match self.conversation_repository.insert(&row).await {
            Ok(conversation) => {
                tracing::info!(
                    "[Session] Created {} conversation {}",
                    conversation_type,
                    conversation.id
                );
                self.state.conversations.insert(0, conversation.clone());
                self.state.active_conversation_id = Some(conversation.id.clone());
                self.state.messages.clear();
                Some(conversation)
            }
            Err(e) => {
                tracing::warn!(
                    "[Session] Failed to create {} conversation: {}",
                    conversation_type,
                    e
                );
                None
            }
        }
    }

    /// Sends one user message and records the reply.
    pub async fn send_message(&mut self, content: &str) -> SendOutcome {
        let Some(pending) = self.begin_send(content) else {
            return SendOutcome::Ignored;
        };

        let result = self.request_reply(&pending).await;
        self.complete_send(pending, result).await
    }

    /// Sends a begun turn to the backend without touching the state.
    ///
    /// Front-ends that render between the optimistic append and the reply
    /// call `begin_send`, render, then this, then `complete_send`.
    pub async fn request_reply(&self, pending: &PendingTurn) -> Result<ChatReply> {
        self.chat_service.send_chat(&pending.turn).await
    }

    /// Appends the user's message optimistically and marks the session pending.
    ///
    /// Returns the turn to send, or `None` when the message is empty, no
    /// conversation is active, no user is signed in, or a send is already
    /// pending.
    pub fn begin_send(&mut self, content: &str) -> Option<PendingTurn> {
        let content = content.trim();
        if content.is_empty() || self.state.pending {
            return None;
        }
        let conversation_id = self.state.active_conversation_id.clone()?;
        let user = self.auth.current_user()?;

        let first_message = !self
            .state
            .messages
            .iter()
            .any(|m| m.role == MessageRole::User);
        let message = Message::local(conversation_id.as_str(), MessageRole::User, content);
        let user_message_id = message.id.clone();
        self.state.messages.push(message);
        self.state.pending = true;

        Some(PendingTurn {
            turn: ChatTurn {
                user_id: user.id,
                conversation_type: self.state.active_conversation_type(),
                conversation_id,
                message: content.to_string(),
            },
            user_message_id,
            first_message,
        })
    }

    /// Records the outcome of a chat call and clears the pending flag.
    pub async fn complete_send(
        &mut self,
        pending: PendingTurn,
        result: Result<ChatReply>,
    ) -> SendOutcome {
        let PendingTurn {
            turn, first_message, ..
        } = pending;
        let outcome = match result {
            Ok(reply) => {
                self.append_assistant(&turn.conversation_id, reply.response);
                if first_message {
                    self.rename_from_first_message(&turn.conversation_id, &turn.message)
                        .await;
                }
                SendOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(
                    "[Session] Chat request for conversation {} failed: {}",
                    turn.conversation_id,
                    e
                );
                let apology = self.failure_message.clone();
                self.append_assistant(&turn.conversation_id, apology);
                SendOutcome::Failed
            }
        };

        self.state.pending = false;
        outcome
    }

    /// Ends the user session and clears all local state.
    pub async fn sign_out(&mut self) -> Result<()> {
        let result = self.auth.sign_out().await;
        if let Err(e) = &result {
            tracing::warn!("[Session] Sign-out failed: {}", e);
        }

        self.state = SessionState::default();
        tracing::info!("[Session] Signed out");
        result
    }

    fn append_assistant(&mut self, conversation_id: &str, content: String) {
        if self.state.active_conversation_id.as_deref() != Some(conversation_id) {
            // The user moved on; the datastore copy shows up on the next load.
            tracing::debug!(
                "[Session] Dropping reply for inactive conversation {}",
                conversation_id
            );
            return;
        }
        self.state
            .messages
            .push(Message::local(conversation_id, MessageRole::Assistant, content));
    }

    /// Titles a placeholder-named conversation after its first user message.
    ///
    /// Only called for the turn that opened the conversation's history, so a
    /// failed update is not retried on later turns.
    async fn rename_from_first_message(&mut self, conversation_id: &str, content: &str) {
        let still_placeholder = self
            .state
            .find_conversation(conversation_id)
            .map(Conversation::has_placeholder_title)
            .unwrap_or(false);
        if !still_placeholder {
            return;
        }

        let title: String = content.chars().take(TITLE_MAX_CHARS).collect();
        match self
            .conversation_repository
            .update_title(conversation_id, &title)
            .await
        {
            Ok(()) => {
                tracing::info!("[Session] Renamed conversation {}", conversation_id);
                if let Some(conversation) = self.state.find_conversation_mut(conversation_id) {
                    conversation.title = title;
                }
                self.load_conversations().await;
            }
            Err(e) => {
                tracing::warn!(
                    "[Session] Failed to rename conversation {}: {}",
                    conversation_id,
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use counsel_core::chat::BackendInfo;
    use counsel_core::error::CounselError;
    use counsel_core::message::NewMessage;
    use counsel_infrastructure::{ConfigAuthSession, InMemoryDatastore};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Wraps the in-memory datastore with call counters and failure switches.
    #[derive(Default)]
    struct MockDatastore {
        inner: InMemoryDatastore,
        fail_reads: Mutex<bool>,
        fail_writes: Mutex<bool>,
        list_conversation_calls: Mutex<usize>,
        list_message_calls: Mutex<usize>,
    }

    impl MockDatastore {
        fn set_fail_reads(&self, fail: bool) {
            *self.fail_reads.lock().unwrap() = fail;
        }

        fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        fn message_fetches(&self) -> usize {
            *self.list_message_calls.lock().unwrap()
        }

        fn check(&self, flag: &Mutex<bool>) -> Result<()> {
            if *flag.lock().unwrap() {
                Err(CounselError::data_access("datastore unavailable"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ConversationRepository for MockDatastore {
        async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
            *self.list_conversation_calls.lock().unwrap() += 1;
            self.check(&self.fail_reads)?;
            self.inner.list_for_user(user_id).await
        }

        async fn insert(&self, conversation: &NewConversation) -> Result<Conversation> {
            self.check(&self.fail_writes)?;
            ConversationRepository::insert(&self.inner, conversation).await
        }

        async fn update_title(&self, conversation_id: &str, title: &str) -> Result<()> {
            self.check(&self.fail_writes)?;
            self.inner.update_title(conversation_id, title).await
        }
    }

    #[async_trait]
    impl MessageRepository for MockDatastore {
        async fn list_for_conversation(&self, conversation_id: &str) -> Result<Vec<Message>> {
            *self.list_message_calls.lock().unwrap() += 1;
            self.check(&self.fail_reads)?;
            self.inner.list_for_conversation(conversation_id).await
        }

        async fn insert(&self, message: &NewMessage) -> Result<Message> {
            self.check(&self.fail_writes)?;
            MessageRepository::insert(&self.inner, message).await
        }
    }

    /// Replays scripted replies and records every turn it receives.
    #[derive(Default)]
    struct MockChatService {
        replies: Mutex<VecDeque<Result<ChatReply>>>,
        turns: Mutex<Vec<ChatTurn>>,
    }

    impl MockChatService {
        fn push_reply(&self, text: &str) {
            self.replies.lock().unwrap().push_back(Ok(reply(text)));
        }

        fn push_error(&self, error: CounselError) {
            self.replies.lock().unwrap().push_back(Err(error));
        }

        fn turns(&self) -> Vec<ChatTurn> {
            self.turns.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatService for MockChatService {
        async fn send_chat(&self, turn: &ChatTurn) -> Result<ChatReply> {
            self.turns.lock().unwrap().push(turn.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CounselError::network("no scripted reply")))
        }

        async fn backend_info(&self) -> Result<BackendInfo> {
            Ok(BackendInfo {
                message: "Legal assistant API".to_string(),
                version: "1.0.0".to_string(),
                model: None,
            })
        }
    }

    /// Answers every turn and stores both sides of it, as the real backend does.
    struct PersistingChatService {
        datastore: Arc<MockDatastore>,
    }

    #[async_trait]
    impl ChatService for PersistingChatService {
        async fn send_chat(&self, turn: &ChatTurn) -> Result<ChatReply> {
            let answer = format!("noted: {}", turn.message);
            for (role, content) in [
                (MessageRole::User, turn.message.clone()),
                (MessageRole::Assistant, answer.clone()),
            ] {
                MessageRepository::insert(
                    &self.datastore.inner,
                    &NewMessage {
                        conversation_id: turn.conversation_id.clone(),
                        role,
                        content,
                        tokens_used: None,
                    },
                )
                .await?;
            }
            Ok(reply(&answer))
        }

        async fn backend_info(&self) -> Result<BackendInfo> {
            Err(CounselError::network("not used"))
        }
    }

    fn reply(text: &str) -> ChatReply {
        ChatReply {
            response: text.to_string(),
            conversation_id: None,
            timestamp: None,
        }
    }

    struct Fixture {
        datastore: Arc<MockDatastore>,
        chat: Arc<MockChatService>,
        auth: Arc<ConfigAuthSession>,
        orchestrator: SessionOrchestrator,
    }

    fn fixture() -> Fixture {
        let datastore = Arc::new(MockDatastore::default());
        let chat = Arc::new(MockChatService::default());
        let auth = Arc::new(ConfigAuthSession::new(Some(User::new(
            "user-1",
            "ada@example.com",
        ))));
        let orchestrator = SessionOrchestrator::new(
            datastore.clone(),
            datastore.clone(),
            chat.clone(),
            auth.clone(),
        );
        Fixture {
            datastore,
            chat,
            auth,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_new_general_conversation_starts_empty_without_fetch() {
        let mut fx = fixture();

        let created = fx
            .orchestrator
            .new_conversation(ConversationType::General)
            .await
            .expect("conversation");

        let state = fx.orchestrator.state();
        assert_eq!(created.title, "New general");
        assert_eq!(state.active_conversation_id.as_deref(), Some(created.id.as_str()));
        assert_eq!(state.conversations[0].id, created.id);
        assert!(state.messages.is_empty());
        assert_eq!(fx.datastore.message_fetches(), 0);
    }

    #[tokio::test]
    async fn test_new_conversation_is_prepended() {
        let mut fx = fixture();

        let first = fx
            .orchestrator
            .new_conversation(ConversationType::Compliance)
            .await
            .unwrap();
        let second = fx
            .orchestrator
            .new_conversation(ConversationType::RiskAssessment)
            .await
            .unwrap();

        let ids: Vec<_> = fx
            .orchestrator
            .state()
            .conversations
            .iter()
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_new_conversation_failure_leaves_state_unchanged() {
        let mut fx = fixture();
        fx.datastore.set_fail_writes(true);

        let created = fx
            .orchestrator
            .new_conversation(ConversationType::General)
            .await;

        assert!(created.is_none());
        assert_eq!(fx.orchestrator.state(), &SessionState::default());
    }

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_reply("Happy to help.");

        let outcome = fx.orchestrator.send_message("  Hello there  ").await;

        let state = fx.orchestrator.state();
        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].role, MessageRole::User);
        assert_eq!(state.messages[0].content, "Hello there");
        assert_eq!(state.messages[1].role, MessageRole::Assistant);
        assert_eq!(state.messages[1].content, "Happy to help.");
        assert!(!state.pending);
    }

    #[tokio::test]
    async fn test_force_majeure_scenario() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::LegalResearch)
            .await
            .unwrap();
        fx.chat
            .push_reply("Force majeure excuses performance when extraordinary events occur.");

        let outcome = fx.orchestrator.send_message("What is force majeure?").await;

        let state = fx.orchestrator.state();
        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(state.messages.len(), 2);
        assert!(!state.pending);
        assert_eq!(
            state.active_conversation().map(|c| c.title.as_str()),
            Some("What is force majeure?")
        );

        let turns = fx.chat.turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].conversation_type, ConversationType::LegalResearch);
        assert_eq!(turns[0].user_id, "user-1");
    }

    #[tokio::test]
    async fn test_failed_send_appends_apology() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_error(CounselError::http(500, "Internal Server Error"));

        let outcome = fx.orchestrator.send_message("Review my lease").await;

        let state = fx.orchestrator.state();
        assert_eq!(outcome, SendOutcome::Failed);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "Review my lease");
        assert_eq!(state.messages[1].role, MessageRole::Assistant);
        assert_eq!(state.messages[1].content, CHAT_FAILURE_MESSAGE);
        assert!(!state.pending);
        // No reply, no rename
        assert_eq!(state.active_conversation().unwrap().title, "New general");
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();

        assert_eq!(fx.orchestrator.send_message("   \n\t").await, SendOutcome::Ignored);
        assert!(fx.orchestrator.state().messages.is_empty());
        assert!(fx.chat.turns().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_active_conversation_is_ignored() {
        let mut fx = fixture();

        assert_eq!(fx.orchestrator.send_message("Hello").await, SendOutcome::Ignored);
        assert!(fx.chat.turns().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_user_is_ignored() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.auth.sign_out().await.unwrap();

        assert_eq!(fx.orchestrator.send_message("Hello").await, SendOutcome::Ignored);
        assert!(fx.orchestrator.state().messages.is_empty());
    }

    #[tokio::test]
    async fn test_begin_send_marks_pending_and_blocks_second_send() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::ContractReview)
            .await
            .unwrap();

        let pending = fx.orchestrator.begin_send("Check clause 4").expect("turn");
        {
            let state = fx.orchestrator.state();
            assert!(state.pending);
            assert_eq!(state.messages.len(), 1);
            assert_eq!(state.messages[0].id, pending.user_message_id);
            assert_eq!(pending.turn.conversation_type, ConversationType::ContractReview);
        }

        assert!(fx.orchestrator.begin_send("Another one").is_none());
        assert_eq!(fx.orchestrator.state().messages.len(), 1);

        let outcome = fx
            .orchestrator
            .complete_send(pending, Ok(reply("Clause 4 looks fine.")))
            .await;
        assert_eq!(outcome, SendOutcome::Replied);
        assert!(!fx.orchestrator.state().pending);
        assert_eq!(fx.orchestrator.state().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_rename_happens_once() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_reply("first");
        fx.chat.push_reply("second");

        fx.orchestrator.send_message("Draft an NDA").await;
        fx.orchestrator.send_message("Make it mutual").await;

        let title = &fx.orchestrator.state().active_conversation().unwrap().title;
        assert_eq!(title, "Draft an NDA");
        assert_eq!(fx.orchestrator.state().messages.len(), 4);
    }

    #[tokio::test]
    async fn test_rename_truncates_to_100_chars() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_reply("ok");
        let long: String = "§".repeat(150);

        fx.orchestrator.send_message(&long).await;

        let title = &fx.orchestrator.state().active_conversation().unwrap().title;
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
        assert!(title.chars().all(|c| c == '§'));
    }

    #[tokio::test]
    async fn test_rename_skips_non_placeholder_title() {
        let mut fx = fixture();
        let existing = ConversationRepository::insert(
            &fx.datastore.inner,
            &NewConversation {
                title: "Lease dispute".to_string(),
                ..NewConversation::for_type("user-1", ConversationType::General)
            },
        )
        .await
        .unwrap();
        fx.orchestrator.load_conversations().await;
        fx.orchestrator.select_conversation(&existing.id).await;
        fx.chat.push_reply("ok");

        fx.orchestrator.send_message("Any update?").await;

        assert_eq!(
            fx.orchestrator.state().active_conversation().unwrap().title,
            "Lease dispute"
        );
    }

    #[tokio::test]
    async fn test_rename_failure_is_swallowed() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.datastore.set_fail_writes(true);
        fx.chat.push_reply("ok");

        let outcome = fx.orchestrator.send_message("Hello").await;

        let state = fx.orchestrator.state();
        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(state.messages.len(), 2);
        assert!(!state.pending);
        assert_eq!(state.active_conversation().unwrap().title, "New general");
    }

    #[tokio::test]
    async fn test_select_same_conversation_does_not_fetch() {
        let mut fx = fixture();
        let created = fx
            .orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();

        fx.orchestrator.select_conversation(&created.id).await;

        assert_eq!(fx.datastore.message_fetches(), 0);
    }

    #[tokio::test]
    async fn test_select_loads_messages_oldest_first() {
        let mut fx = fixture();
        let conversation = ConversationRepository::insert(
            &fx.datastore.inner,
            &NewConversation::for_type("user-1", ConversationType::Compliance),
        )
        .await
        .unwrap();
        for (role, content) in [(MessageRole::User, "q"), (MessageRole::Assistant, "a")] {
            MessageRepository::insert(
                &fx.datastore.inner,
                &NewMessage {
                    conversation_id: conversation.id.clone(),
                    role,
                    content: content.to_string(),
                    tokens_used: None,
                },
            )
            .await
            .unwrap();
        }
        fx.orchestrator.load_conversations().await;

        fx.orchestrator.select_conversation(&conversation.id).await;

        let state = fx.orchestrator.state();
        assert_eq!(fx.datastore.message_fetches(), 1);
        let contents: Vec<_> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q", "a"]);
        assert_eq!(state.active_conversation_type(), ConversationType::Compliance);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_stale_state() {
        let mut fx = fixture();
        let created = fx
            .orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_reply("ok");
        fx.orchestrator.send_message("Hello").await;
        fx.datastore.set_fail_reads(true);

        fx.orchestrator.load_conversations().await;
        fx.orchestrator.load_messages(&created.id).await;

        let state = fx.orchestrator.state();
        assert_eq!(state.conversations.len(), 1);
        assert_eq!(state.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_active_type_defaults_to_general() {
        let mut fx = fixture();
        fx.orchestrator.select_conversation("missing").await;

        assert_eq!(
            fx.orchestrator.state().active_conversation_type(),
            ConversationType::General
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_state() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();

        fx.orchestrator.sign_out().await.unwrap();

        assert_eq!(fx.orchestrator.state(), &SessionState::default());
        assert!(fx.orchestrator.current_user().is_none());
    }

    #[tokio::test]
    async fn test_first_message_matching_placeholder_is_not_followed_by_rename() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_reply("first");
        fx.chat.push_reply("second");

        fx.orchestrator.send_message("New general").await;
        fx.orchestrator.send_message("Make it mutual").await;

        let title = &fx.orchestrator.state().active_conversation().unwrap().title;
        assert_eq!(title, "New general");
    }

    #[tokio::test]
    async fn test_failed_rename_is_not_retried_on_later_turns() {
        let mut fx = fixture();
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_reply("first");
        fx.chat.push_reply("second");

        fx.datastore.set_fail_writes(true);
        fx.orchestrator.send_message("Draft an NDA").await;
        fx.datastore.set_fail_writes(false);
        let outcome = fx.orchestrator.send_message("Make it mutual").await;

        assert_eq!(outcome, SendOutcome::Replied);
        let state = fx.orchestrator.state();
        assert_eq!(state.messages.len(), 4);
        assert_eq!(state.active_conversation().unwrap().title, "New general");
    }

    #[tokio::test]
    async fn test_reloaded_session_does_not_rename_from_later_message() {
        let datastore = Arc::new(MockDatastore::default());
        let chat = Arc::new(PersistingChatService {
            datastore: datastore.clone(),
        });
        let auth = Arc::new(ConfigAuthSession::new(Some(User::new(
            "user-1",
            "ada@example.com",
        ))));

        // First session: the opening turn is stored but its rename fails
        let mut first = SessionOrchestrator::new(
            datastore.clone(),
            datastore.clone(),
            chat.clone(),
            auth.clone(),
        );
        let created = first
            .new_conversation(ConversationType::Compliance)
            .await
            .unwrap();
        datastore.set_fail_writes(true);
        assert_eq!(
            first.send_message("Are we GDPR compliant?").await,
            SendOutcome::Replied
        );
        datastore.set_fail_writes(false);

        // Second session over the same datastore
        let mut second =
            SessionOrchestrator::new(datastore.clone(), datastore.clone(), chat, auth);
        second.load_conversations().await;
        second.select_conversation(&created.id).await;
        assert_eq!(second.state().messages.len(), 2);

        let outcome = second.send_message("What about CCPA?").await;

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(
            second.state().active_conversation().unwrap().title,
            "New compliance"
        );
        let stored = datastore.inner.list_for_user("user-1").await.unwrap();
        assert_eq!(stored[0].title, "New compliance");
    }

    #[tokio::test]
    async fn test_failed_send_names_configured_backend() {
        let mut fx = fixture();
        fx.orchestrator = fx.orchestrator.with_backend_url("http://10.0.0.5:8000");
        fx.orchestrator
            .new_conversation(ConversationType::General)
            .await
            .unwrap();
        fx.chat.push_error(CounselError::network("connection refused"));

        fx.orchestrator.send_message("Hello").await;

        assert_eq!(
            fx.orchestrator.state().messages[1].content,
            "Sorry, I encountered an error. Please make sure the backend server is running at http://10.0.0.5:8000"
        );
    }
}
