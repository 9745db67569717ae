//! navshell remote SDK
//!
//! Wire types exchanged between the navigation shell and the code it does
//! not control: micro-frontends publishing navigation entries and
//! translation bundles, and the gateway/profile collaborators.
//! Everything here is plain serde data; the shell owns all behavior.

pub mod gateway;
pub mod types;

pub mod prelude {
    pub use crate::gateway::*;
    pub use crate::types::*;
}
