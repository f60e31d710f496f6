use anyhow::Result;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;

use crate::traits::EventStream;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        content: String,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    pub index: u32,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }

    pub fn is_done(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_ref())
            .is_some()
    }

    pub fn to_stream_events(&self) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(choice) = self.choices.first() {
            if let Some(content) = &choice.delta.content {
                if !content.is_empty() {
                    events.push(StreamEvent::Message {
                        content: content.clone(),
                    });
                }
            }

            if let Some(finish_reason) = &choice.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        events
    }
}

enum SseLine {
    Skip,
    Events(Vec<StreamEvent>),
    DoneMarker,
}

fn parse_sse_line(raw: &[u8]) -> Result<SseLine> {
    let Ok(line) = std::str::from_utf8(raw) else {
        return Ok(SseLine::Skip);
    };
    let line = line.trim();

    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Ok(SseLine::DoneMarker);
    }

    let chunk: ChatStreamChunk = serde_json::from_str(data)
        .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;
    Ok(SseLine::Events(chunk.to_stream_events()))
}

/// Parse an SSE byte stream of chat completion chunks into [`StreamEvent`]s.
///
/// Works on any byte stream so it can be driven by a live HTTP body or by a
/// fixture. The stream ends at the `[DONE]` marker or when the body ends.
pub fn parse_chat_sse_bytes<S, B, E>(stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer: VecDeque<u8> = VecDeque::with_capacity(8192);
        let mut finished = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        match parse_sse_line(&line_bytes) {
                            Ok(SseLine::Skip) => continue,
                            Ok(SseLine::Events(events)) => {
                                for event in events {
                                    yield Ok(event);
                                }
                            }
                            Ok(SseLine::DoneMarker) => {
                                yield Ok(StreamEvent::Done { finish_reason: None });
                                finished = true;
                                break;
                            }
                            Err(e) => yield Err(e),
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    finished = true;
                }
            }

            if finished {
                break;
            }
        }

        // Trailing line without a newline
        if !finished && !buffer.is_empty() {
            let rest: Vec<u8> = buffer.drain(..).collect();
            match parse_sse_line(&rest) {
                Ok(SseLine::Events(events)) => {
                    for event in events {
                        yield Ok(event);
                    }
                }
                Ok(SseLine::DoneMarker) => yield Ok(StreamEvent::Done { finish_reason: None }),
                Ok(SseLine::Skip) => {}
                Err(e) => yield Err(e),
            }
        }
    })
}

pub fn parse_chat_sse_stream(response: Response) -> EventStream {
    parse_chat_sse_bytes(response.bytes_stream())
}

/// Drain a stream, concatenating message content
pub async fn collect_text(mut stream: EventStream) -> Result<String> {
    let mut text = String::new();
    while let Some(event) = stream.next().await {
        if let StreamEvent::Message { content } = event? {
            text.push_str(&content);
        }
    }
    Ok(text)
}
