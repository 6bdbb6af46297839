//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::{spawn_session, SessionHandle, SessionUpdate};
use crate::service::{ChatService, ServiceError, UserProfile};
use crate::speech::{SpeechOutput, SpeechSynthesizer, VoicePreference};
use crate::state_machine::{Session, SessionContext};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Mock Chat Service
// ============================================================================

/// Scripted reply for one chat message
struct ChatScript {
    delay: Duration,
    result: Result<String, ServiceError>,
}

/// Mock chat service that returns queued results
#[derive(Default)]
pub struct MockChatService {
    verifications: Mutex<VecDeque<Result<UserProfile, ServiceError>>>,
    replies: Mutex<VecDeque<Result<String, ServiceError>>>,
    /// Replies keyed by message text, taking precedence over the queue
    scripted: Mutex<HashMap<String, ChatScript>>,
    /// Record of all verification requests made
    pub verify_requests: Mutex<Vec<String>>,
    /// Record of all chat requests made, as (account number, message)
    pub chat_requests: Mutex<Vec<(String, String)>>,
}

impl MockChatService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a verification that resolves to `name`
    pub fn queue_user(&self, name: &str) {
        self.verifications
            .lock()
            .unwrap()
            .push_back(Ok(UserProfile::new(name)));
    }

    pub fn queue_verification_error(&self, error: ServiceError) {
        self.verifications.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_reply(&self, response: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(response.to_string()));
    }

    pub fn queue_chat_error(&self, error: ServiceError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Answer `message` with `response` after `delay`
    pub fn reply_to(&self, message: &str, response: &str, delay: Duration) {
        self.scripted.lock().unwrap().insert(
            message.to_string(),
            ChatScript {
                delay,
                result: Ok(response.to_string()),
            },
        );
    }

    pub fn recorded_chats(&self) -> Vec<(String, String)> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn recorded_verifications(&self) -> Vec<String> {
        self.verify_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn verify_account(&self, account_number: &str) -> Result<UserProfile, ServiceError> {
        self.verify_requests
            .lock()
            .unwrap()
            .push(account_number.to_string());
        self.verifications
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::network("No mock verification queued")))
    }

    async fn chat(&self, account_number: &str, message: &str) -> Result<String, ServiceError> {
        self.chat_requests
            .lock()
            .unwrap()
            .push((account_number.to_string(), message.to_string()));

        let scripted = self.scripted.lock().unwrap().remove(message);
        if let Some(script) = scripted {
            tokio::time::sleep(script.delay).await;
            return script.result;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::network("No mock reply queued")))
    }
}

// ============================================================================
// Recording Synthesizer
// ============================================================================

/// Synthesizer that records what it was asked to say
#[derive(Default)]
pub struct RecordingSynthesizer {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&self, text: &str) {
        self.spoken.lock().unwrap().push(text.to_string());
    }

    fn name(&self) -> &str {
        "recording"
    }
}

// ============================================================================
// Test Session
// ============================================================================

/// Helper for running a session against mocks with minimal boilerplate
pub struct TestSession {
    pub handle: SessionHandle,
    pub updates: broadcast::Receiver<SessionUpdate>,
    pub service: Arc<MockChatService>,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub speech: SpeechOutput,
    latest: Session,
}

impl TestSession {
    pub fn new(service: MockChatService) -> Self {
        Self::with_context(service, SessionContext::default())
    }

    pub fn with_context(service: MockChatService, context: SessionContext) -> Self {
        let service = Arc::new(service);
        let synthesizer = Arc::new(RecordingSynthesizer::new());
        let speech = SpeechOutput::new(synthesizer.clone(), VoicePreference::new(true));

        let handle = spawn_session(context, service.clone(), speech.clone());
        let updates = handle.subscribe();

        Self {
            handle,
            updates,
            service,
            synthesizer,
            speech,
            latest: Session::default(),
        }
    }

    pub async fn submit_account(&self, account_number: &str) {
        self.handle
            .submit_account(account_number)
            .await
            .expect("Failed to submit account");
    }

    pub async fn send_message(&self, text: &str) {
        self.handle
            .send_message(text)
            .await
            .expect("Failed to send message");
    }

    /// Wait until a published session satisfies `predicate`
    pub async fn wait_for_session(
        &mut self,
        predicate: impl Fn(&Session) -> bool,
        timeout: Duration,
    ) -> Option<Session> {
        if predicate(&self.latest) {
            return Some(self.latest.clone());
        }
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.updates.recv()).await {
                Ok(Ok(SessionUpdate::StateChange { session })) => {
                    self.latest = session;
                    if predicate(&self.latest) {
                        return Some(self.latest.clone());
                    }
                }
                _ => continue,
            }
        }
        None
    }

    /// Wait for the next alert, remembering any state seen on the way
    pub async fn wait_for_alert(&mut self, timeout: Duration) -> Option<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.updates.recv()).await {
                Ok(Ok(SessionUpdate::Alert { message })) => return Some(message),
                Ok(Ok(SessionUpdate::StateChange { session })) => self.latest = session,
                _ => continue,
            }
        }
        None
    }

    /// Verify `account_number` as `name` and wait for the welcome
    pub async fn verify_as(&mut self, account_number: &str, name: &str) -> Session {
        self.service.queue_user(name);
        self.submit_account(account_number).await;
        self.wait_for_session(Session::is_verified, Duration::from_secs(2))
            .await
            .expect("Session never verified")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::{Message, SendPolicy, VerificationStatus};

    const WAIT: Duration = Duration::from_secs(2);

    fn texts(session: &Session) -> Vec<&str> {
        session.transcript().iter().map(|m| m.text.as_str()).collect()
    }

    #[tokio::test]
    async fn test_mock_chat_service() {
        let service = MockChatService::new();
        service.queue_user("Alex");
        service.queue_reply("hi");

        let user = service.verify_account("12345").await.unwrap();
        assert_eq!(user.name, "Alex");
        assert_eq!(service.chat("12345", "hello").await.unwrap(), "hi");
        // Nothing left queued
        assert!(service.chat("12345", "again").await.is_err());

        assert_eq!(service.recorded_verifications(), vec!["12345"]);
        assert_eq!(service.recorded_chats().len(), 2);
    }

    /// Verify, ask for the balance, get it read back
    #[tokio::test]
    async fn test_balance_conversation() {
        let service = MockChatService::new();
        service.queue_reply("$42.00");
        let mut rt = TestSession::new(service);

        let verified = rt.verify_as("12345", "Alex").await;
        assert_eq!(
            verified.transcript(),
            &[Message::bot("Welcome Alex! How can I help you today?")]
        );

        rt.send_message("What's my balance?").await;
        let session = rt
            .wait_for_session(|s| s.transcript().len() == 3, WAIT)
            .await
            .expect("No reply");

        assert_eq!(
            texts(&session),
            vec![
                "Welcome Alex! How can I help you today?",
                "What's my balance?",
                "$42.00"
            ]
        );
        assert_eq!(
            rt.service.recorded_chats(),
            vec![("12345".to_string(), "What's my balance?".to_string())]
        );
        assert_eq!(
            rt.synthesizer.spoken(),
            vec!["Welcome Alex! How can I help you today?", "$42.00"]
        );
    }

    #[tokio::test]
    async fn test_invalid_account_alerts_and_allows_retry() {
        let service = MockChatService::new();
        service.queue_verification_error(ServiceError::from_status(400, "not found"));
        let mut rt = TestSession::new(service);

        rt.submit_account("bad").await;
        assert_eq!(
            rt.wait_for_alert(WAIT).await.as_deref(),
            Some("Invalid account number. Try again.")
        );
        let session = rt
            .wait_for_session(|s| s.status() == VerificationStatus::Unverified, WAIT)
            .await
            .unwrap();
        assert!(session.transcript().is_empty());

        rt.verify_as("12345", "Alex").await;
        assert_eq!(rt.service.recorded_verifications(), vec!["bad", "12345"]);
    }

    #[tokio::test]
    async fn test_send_before_verification_rejected() {
        let mut rt = TestSession::new(MockChatService::new());

        rt.send_message("hello").await;
        assert_eq!(
            rt.wait_for_alert(WAIT).await.as_deref(),
            Some("Please verify your account first.")
        );
        assert!(rt.service.recorded_chats().is_empty());
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let mut rt = TestSession::new(MockChatService::new());
        rt.verify_as("12345", "Alex").await;

        rt.send_message("   ").await;
        assert_eq!(
            rt.wait_for_alert(WAIT).await.as_deref(),
            Some("Message cannot be empty.")
        );
        assert!(rt.service.recorded_chats().is_empty());
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_user_message() {
        let service = MockChatService::new();
        service.queue_chat_error(ServiceError::from_status(500, ""));
        let mut rt = TestSession::new(service);
        rt.verify_as("12345", "Alex").await;

        rt.send_message("hello").await;
        assert_eq!(
            rt.wait_for_alert(WAIT).await.as_deref(),
            Some("Error sending message.")
        );
        let session = rt
            .wait_for_session(|s| !s.pending_send(), WAIT)
            .await
            .unwrap();
        assert_eq!(
            texts(&session),
            vec!["Welcome Alex! How can I help you today?", "hello"]
        );
    }

    #[tokio::test]
    async fn test_send_clears_input() {
        let service = MockChatService::new();
        service.queue_reply("ok");
        let mut rt = TestSession::new(service);
        rt.verify_as("12345", "Alex").await;

        rt.send_message("hello").await;
        let deadline = tokio::time::Instant::now() + WAIT;
        let mut cleared = false;
        while !cleared && tokio::time::Instant::now() < deadline {
            if let Ok(Ok(SessionUpdate::InputCleared)) =
                tokio::time::timeout(Duration::from_millis(50), rt.updates.recv()).await
            {
                cleared = true;
            }
        }
        assert!(cleared);
    }

    /// Concurrent sends: replies land in the order they resolve
    #[tokio::test]
    async fn test_concurrent_replies_in_resolution_order() {
        let service = MockChatService::new();
        service.reply_to("first", "to first", Duration::from_millis(300));
        service.reply_to("second", "to second", Duration::from_millis(10));
        let mut rt = TestSession::new(service);
        rt.verify_as("12345", "Alex").await;

        rt.send_message("first").await;
        rt.send_message("second").await;

        let session = rt
            .wait_for_session(|s| s.transcript().len() == 5, WAIT)
            .await
            .expect("Replies never arrived");
        assert_eq!(
            texts(&session)[1..],
            ["first", "second", "to second", "to first"]
        );
    }

    /// Serialized sends: the second request waits for the first reply
    #[tokio::test]
    async fn test_serialized_replies_in_send_order() {
        let service = MockChatService::new();
        service.reply_to("first", "to first", Duration::from_millis(300));
        service.reply_to("second", "to second", Duration::from_millis(10));
        let mut rt =
            TestSession::with_context(service, SessionContext::new(SendPolicy::Serialized));
        rt.verify_as("12345", "Alex").await;

        rt.send_message("first").await;
        rt.send_message("second").await;

        let session = rt
            .wait_for_session(|s| s.transcript().len() == 5, WAIT)
            .await
            .expect("Replies never arrived");
        assert_eq!(
            texts(&session)[1..],
            ["first", "second", "to first", "to second"]
        );
    }

    #[tokio::test]
    async fn test_disabled_voice_still_updates_transcript() {
        let service = MockChatService::new();
        service.queue_reply("$42.00");
        let mut rt = TestSession::new(service);
        assert!(!rt.speech.toggle());

        rt.verify_as("12345", "Alex").await;
        rt.send_message("What's my balance?").await;
        rt.wait_for_session(|s| s.transcript().len() == 3, WAIT)
            .await
            .expect("No reply");

        assert!(rt.synthesizer.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_resubmit_after_verified_alerts() {
        let mut rt = TestSession::new(MockChatService::new());
        rt.verify_as("12345", "Alex").await;

        rt.submit_account("67890").await;
        assert_eq!(
            rt.wait_for_alert(WAIT).await.as_deref(),
            Some("Account is already verified.")
        );
        assert_eq!(rt.service.recorded_verifications(), vec!["12345"]);
    }
}
