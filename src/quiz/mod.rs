//! The quiz session controller: loader → session → guard, with the
//! identity adapter feeding the guard.

pub mod context;
pub mod expiry;
pub mod guard;
pub mod identity;
pub mod loader;
pub mod registry;
pub mod session;

pub use context::SessionContext;
pub use guard::SubmissionGuard;
pub use identity::{Identity, IdentityProvider};
pub use loader::QuestionLoader;
pub use registry::SessionRegistry;
pub use session::{QuizSession, Screen, SessionView};
