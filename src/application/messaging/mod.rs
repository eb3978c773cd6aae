//! Message handling - Wire codec, session dispatch and console parsing

pub mod codec;
pub mod dispatcher;
pub mod parser;

pub use codec::{Frame, FrameDecoder, MAX_FRAME};
pub use dispatcher::SessionDispatcher;
pub use parser::{CommandParser, ParsedLine};
