pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use dispatcher::create_command_registry;

use crate::core::error::DchatError;
use crate::discussion::Discussion;
use crate::store::RecordStore;

/// Session state owned by the dispatcher: the record store, the single
/// open-discussion slot, and the defaults applied to new discussions.
pub struct Session {
    pub store: RecordStore,
    pub open: Option<Discussion>,
    pub default_model: String,
    pub default_token_limit: usize,
    pub auto_confirm: bool,
    pub should_continue: bool,
}

impl Session {
    pub fn new(
        store: RecordStore,
        default_model: String,
        default_token_limit: usize,
        auto_confirm: bool,
    ) -> Self {
        Self {
            store,
            open: None,
            default_model,
            default_token_limit,
            auto_confirm,
            should_continue: true,
        }
    }

    /// The open discussion, or `NoActiveDiscussion`.
    pub fn open_discussion(&mut self) -> Result<&mut Discussion, DchatError> {
        self.open.as_mut().ok_or(DchatError::NoActiveDiscussion)
    }

    /// Persists the open discussion, if any.
    pub fn save_open(&mut self) -> Result<(), DchatError> {
        if let Some(discussion) = self.open.as_mut() {
            self.store.save(discussion)?;
        }
        Ok(())
    }

    /// Saves and releases the open discussion. No-op when nothing is open.
    pub fn close_open(&mut self) -> Result<(), DchatError> {
        self.save_open()?;
        self.open = None;
        Ok(())
    }
}
