//! Console adapter for driving the robot by hand

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::application::errors::RelayError;
use crate::application::messaging::{CommandParser, ParsedLine};
use crate::domain::traits::CommandSink;

/// Interactive console: reads lines, sends the parsed commands, prints replies
pub struct ConsoleAdapter {
    parser: CommandParser,
    prompt: String,
}

impl ConsoleAdapter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: CommandParser::new(prefix),
            prompt: "> ".to_string(),
        }
    }

    /// Run against stdin/stdout until `quit` or end of input
    pub async fn run<S: CommandSink>(&self, sink: &mut S) -> Result<usize, RelayError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        self.run_with(stdin, &mut stdout, sink).await
    }

    /// Run the console loop over arbitrary input and output streams,
    /// returning the number of commands sent
    pub async fn run_with<R, W, S>(&self, input: R, output: &mut W, sink: &mut S) -> Result<usize, RelayError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: CommandSink,
    {
        tracing::info!("Starting console (type 'help' for commands)");
        let mut lines = input.lines();
        let mut sent = 0;

        loop {
            output.write_all(self.prompt.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match self.parser.parse(&line) {
                ParsedLine::Empty => continue,
                ParsedLine::Quit => break,
                ParsedLine::Help => {
                    output.write_all(CommandParser::usage().as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                ParsedLine::Invalid(msg) => {
                    output.write_all(format!("Error: {}\n", msg).as_bytes()).await?;
                }
                ParsedLine::Command(command) => {
                    let reply = sink.send(command).await?;
                    sent += 1;
                    output.write_all(format!("[ROBOT] {}\n", reply).as_bytes()).await?;
                }
            }
        }

        Ok(sent)
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new("")
    }
}
