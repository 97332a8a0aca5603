use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    models::{question::QuestionRecord, submission::AnswerMap},
    quiz::{
        identity::Identity,
        session::{QuizSession, Screen},
    },
};

/// Live quiz sessions, one per signed-in student.
///
/// Transitions for a student are applied one at a time under the lock.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Identity, QuizSession>>,
}

impl SessionRegistry {
    /// Starts a fresh session, replacing any earlier one for `identity`.
    pub async fn mount(&self, identity: Identity, questions: Arc<[QuestionRecord]>) -> Screen {
        let session = QuizSession::new(questions);
        let screen = session.screen();
        self.sessions.lock().await.insert(identity, session);
        screen
    }

    /// Applies `transition` to the session and returns the resulting screen.
    /// `None` when no session is mounted.
    pub async fn update<F>(&self, identity: &Identity, transition: F) -> Option<Screen>
    where
        F: FnOnce(&mut QuizSession),
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(identity)?;
        transition(session);
        Some(session.screen())
    }

    pub async fn screen(&self, identity: &Identity) -> Option<Screen> {
        self.sessions.lock().await.get(identity).map(QuizSession::screen)
    }

    pub async fn answers(&self, identity: &Identity) -> Option<AnswerMap> {
        self.sessions
            .lock()
            .await
            .get(identity)
            .map(|session| session.answers().clone())
    }

    /// Ends the session, typically after a successful submission.
    pub async fn remove(&self, identity: &Identity) -> bool {
        self.sessions.lock().await.remove(identity).is_some()
    }
}
