//! Line-oriented terminal operator.

use std::io::IsTerminal;

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

use super::{Notice, Operator};
use crate::Result;
use crate::types::MessageRecord;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// [`Operator`] over any async line reader and writer.
pub struct Console<R, W> {
    reader: R,
    writer: W,
    color: bool,
}

impl Console<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .with_color(std::io::stdout().is_terminal())
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

#[async_trait]
impl<R, W> Operator for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.writer.write_all(prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    async fn render(&mut self, record: &MessageRecord) -> Result<()> {
        self.write_line(&format!("🤖:  {}", record.formatted())).await
    }

    async fn notify(&mut self, notice: Notice) -> Result<()> {
        let line = match notice {
            Notice::Welcome => self.paint(GREEN, "Welcome to the chatbot! Type 'exit' to quit."),
            Notice::Farewell => self.paint(RED, "👋 Bye..."),
            Notice::AuthorizationRequired { tool_name, url } => format!(
                "⚙️: Authorization required for tool call {}\n⚙️: Please authorize in your browser {}",
                tool_name, url
            ),
            Notice::AwaitingAuthorization => {
                "⚙️: Waiting for you to complete authorization...".to_string()
            }
            Notice::AuthorizationGranted => {
                "⚙️: Authorization granted. Resuming execution...".to_string()
            }
            Notice::AuthorizationFailed { error } => format!(
                "⚙️: Error waiting for authorization to complete: {}",
                error
            ),
            Notice::ApprovalRequired { tool_name, input } => {
                let input = serde_json::to_string_pretty(&input)?;
                format!(
                    "⚙️: Human in the loop required for tool call {}\n⚙️: Please approve the tool call {}",
                    tool_name, input
                )
            }
            Notice::TurnFailed { error } => self.paint(RED, &format!("Error: {}", error)),
        };
        self.write_line(&line).await
    }
}
