pub mod access;
pub mod workflow;

pub use access::{authorize, read_scope, require_owner, require_role, Action, Actor, OwnershipChain, ReadScope};
