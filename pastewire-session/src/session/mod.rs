mod command;
mod output;
mod session;

pub use command::SessionCommand;
pub use output::{Direction, PresentationOutput};
pub use session::{LogEntry, Session, SessionHandle};
