//! # Ensaluti (Client Authentication Flow Controller)
//!
//! `ensaluti` drives the authentication flows of a client application:
//! credential sign-in, multi-step sign-up with email verification,
//! third-party OAuth sign-in, and route-level access gating. Screens stay
//! dumb; the controller owns sequencing, error mapping, and navigation
//! intents.
//!
//! ## Flows
//!
//! Three flows exist: **SignIn**, **SignUp**, and **Verify**. Each flow pairs
//! a declarative field schema with the remote operations of the identity
//! provider. A submission runs validation first and only reaches the network
//! when every field passes; remote failures are classified back onto form
//! fields or onto the synthetic `root` field.
//!
//! ## Collaborators
//!
//! - The identity provider is consumed through the [`client::RemoteAuthClient`]
//!   trait. [`client::HttpAuthClient`] is the stock HTTPS implementation.
//! - Navigation is expressed as [`auth::NavigationIntent`] values; the host
//!   app's router consumes them.
//! - Session state is a single-writer observable ([`auth::session`]); the
//!   route guard and controllers only read it.
//!
//! ## What this crate does not do
//!
//! No session-token persistence, no OAuth handshake internals, no rendering,
//! no routing. Those stay with the host application and the provider.

pub mod auth;
pub mod client;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
