//! Client-side state core for the onboarding application.
//!
//! One [`OnboardingStore`] multiplexes the gateway's realtime subscriptions
//! across any number of UI consumers — ref-counted per entity family, and
//! per instance for steps — and layers optimistic mutations with
//! rollback-on-failure on top of the shared state. Consumers read through
//! `tokio::sync::watch` receivers and act through the slices; [`Session`]
//! is the thin role-gated adapter feature code mounts and unmounts.

pub mod activities;
pub mod coordinator;
pub mod error;
pub mod instances;
mod optimistic;
pub mod session;
pub mod state;
pub mod steps;
pub mod store;
pub mod suggestions;
pub mod users;

pub use coordinator::{Released, ReleaseHandle, SubscriptionCoordinator};
pub use error::StoreError;
pub use session::{EmployeeChecklist, ManagerDesk, Session};
pub use state::{KeyedSteps, SliceError, SliceState};
pub use steps::StepsByInstance;
pub use store::OnboardingStore;
pub use users::UsersState;
