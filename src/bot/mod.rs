pub mod command;
pub mod dispatch;
pub mod poller;
pub mod replies;

pub use command::{parse_command, Command, Invocation};
pub use dispatch::Bot;
pub use poller::run;
