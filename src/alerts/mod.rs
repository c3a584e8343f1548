pub mod policy;
pub mod dispatch;
pub mod message;

pub use policy::*;
pub use dispatch::*;
pub use message::*;

use thiserror::Error;

use crate::models::ContactChannel;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("No sender registered for channel {0}")]
    NoSender(&'static str),
}

impl DispatchError {
    pub fn no_sender(channel: ContactChannel) -> Self {
        Self::NoSender(channel.as_str())
    }
}
