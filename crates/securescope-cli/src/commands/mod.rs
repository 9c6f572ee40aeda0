pub mod listing;
pub mod session;
pub mod shell;

use securescope_core::{AccessConfig, AccessControl};

pub struct CommandContext {
    pub system: AccessControl,
}

impl CommandContext {
    pub fn new(config: AccessConfig) -> Self {
        Self {
            system: AccessControl::new(config),
        }
    }
}
