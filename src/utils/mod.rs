pub mod logging;
pub mod slug;
pub mod terminal;
