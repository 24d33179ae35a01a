pub mod interaction;
pub mod message;

pub use interaction::handle_component;
pub use message::handle_message;
