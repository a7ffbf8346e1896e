pub mod key_seq;
pub mod listener;

pub use key_seq::KeySeq;
pub use listener::{ListenerError, ListenerGuard};
