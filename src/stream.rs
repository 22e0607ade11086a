//! Incremental decoding of a response body into ordered text fragments.

use chat_api::{ChatStreamEvent, SseStreamParser};
use futures_util::StreamExt;
use generation_provider::{CancelToken, ChunkStream, Framing};

use crate::error::GenerationError;

/// Stateful decode step applied to each raw chunk in wire order.
pub trait Decoder: Send {
    /// Decode one chunk. State such as a split multi-byte sequence carries
    /// over to the next call.
    fn decode(&mut self, chunk: &[u8]) -> Result<String, GenerationError>;

    /// Flush remaining state at end of stream.
    fn finish(&mut self) -> Result<String, GenerationError>;

    /// True once the body signalled its logical end; later chunks are not read.
    fn is_finished(&self) -> bool {
        false
    }
}

#[must_use]
pub fn decoder_for(framing: Framing) -> Box<dyn Decoder> {
    match framing {
        Framing::PlainText => Box::new(Utf8Decoder::default()),
        Framing::ChatCompletionSse => Box::new(SseDeltaDecoder::default()),
    }
}

/// Strict UTF-8 decoder that never splits a character across chunks.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
    consumed: usize,
}

impl Decoder for Utf8Decoder {
    fn decode(&mut self, chunk: &[u8]) -> Result<String, GenerationError> {
        self.pending.extend_from_slice(chunk);

        let complete_len = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(error) if error.error_len().is_none() => error.valid_up_to(),
            Err(error) => {
                return Err(GenerationError::StreamDecode(format!(
                    "invalid UTF-8 at byte {}",
                    self.consumed + error.valid_up_to()
                )));
            }
        };

        let tail = self.pending.split_off(complete_len);
        let complete = std::mem::replace(&mut self.pending, tail);
        self.consumed += complete.len();
        String::from_utf8(complete).map_err(|error| GenerationError::StreamDecode(error.to_string()))
    }

    fn finish(&mut self) -> Result<String, GenerationError> {
        if self.pending.is_empty() {
            return Ok(String::new());
        }

        Err(GenerationError::StreamDecode(format!(
            "stream ended inside a multi-byte sequence at byte {}",
            self.consumed
        )))
    }
}

/// UTF-8 decoding followed by chat-completion SSE framing.
#[derive(Debug, Default)]
pub struct SseDeltaDecoder {
    utf8: Utf8Decoder,
    parser: SseStreamParser,
    done: bool,
}

impl SseDeltaDecoder {
    fn collect(&mut self, events: Vec<ChatStreamEvent>) -> Result<String, GenerationError> {
        let mut text = String::new();
        for event in events {
            if self.done {
                break;
            }
            match event {
                ChatStreamEvent::Delta { content } => text.push_str(&content),
                ChatStreamEvent::Done => self.done = true,
                ChatStreamEvent::Error { message } => {
                    return Err(GenerationError::Server {
                        status: None,
                        body: message,
                    });
                }
            }
        }
        Ok(text)
    }
}

impl Decoder for SseDeltaDecoder {
    fn decode(&mut self, chunk: &[u8]) -> Result<String, GenerationError> {
        if self.done {
            return Ok(String::new());
        }
        let text = self.utf8.decode(chunk)?;
        let events = self.parser.feed(&text);
        self.collect(events)
    }

    fn finish(&mut self) -> Result<String, GenerationError> {
        if self.done {
            return Ok(String::new());
        }
        let tail = self.utf8.finish()?;
        let mut events = self.parser.feed(&tail);
        events.extend(self.parser.finish());
        self.collect(events)
    }

    fn is_finished(&self) -> bool {
        self.done
    }
}

/// Read `chunks` to the end, handing each non-empty decoded fragment to
/// `sink` in arrival order.
///
/// Liveness of `token` is checked before every read and every delivery; once
/// it is revoked the traversal stops without error and without another sink
/// call. The caller inspects the token to tell revocation from completion.
pub async fn consume_stream(
    mut chunks: ChunkStream,
    decoder: &mut dyn Decoder,
    token: &CancelToken,
    sink: &mut (dyn FnMut(&str) + Send),
) -> Result<(), GenerationError> {
    loop {
        if !token.is_live() {
            return Ok(());
        }

        let Some(chunk) = chunks.next().await else {
            let tail = decoder.finish()?;
            if !tail.is_empty() && token.is_live() {
                sink(&tail);
            }
            return Ok(());
        };

        let text = decoder.decode(&chunk?)?;
        if !text.is_empty() {
            if !token.is_live() {
                return Ok(());
            }
            sink(&text);
        }

        if decoder.is_finished() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use generation_provider::{CancellationCoordinator, ChunkStream, TransportFailure};

    use super::{consume_stream, Decoder, SseDeltaDecoder, Utf8Decoder};
    use crate::error::GenerationError;

    fn chunks(parts: Vec<Vec<u8>>) -> ChunkStream {
        Box::pin(stream::iter(
            parts.into_iter().map(Ok::<Vec<u8>, TransportFailure>),
        ))
    }

    #[test]
    fn utf8_decoder_carries_split_characters() {
        let bytes = "字幕 ok".as_bytes();
        let mut decoder = Utf8Decoder::default();
        let mut text = String::new();
        for byte in bytes {
            text.push_str(&decoder.decode(&[*byte]).expect("valid prefix"));
        }
        text.push_str(&decoder.finish().expect("complete input"));
        assert_eq!(text, "字幕 ok");
    }

    #[test]
    fn utf8_decoder_rejects_invalid_and_truncated_input() {
        let mut decoder = Utf8Decoder::default();
        assert!(matches!(
            decoder.decode(&[b'a', 0xff]),
            Err(GenerationError::StreamDecode(_))
        ));

        let mut decoder = Utf8Decoder::default();
        assert_eq!(decoder.decode(&[0xe5, 0xad]).expect("incomplete is ok"), "");
        assert!(matches!(
            decoder.finish(),
            Err(GenerationError::StreamDecode(_))
        ));
    }

    #[test]
    fn sse_decoder_stops_at_done_and_reports_remote_errors() {
        let mut decoder = SseDeltaDecoder::default();
        let text = decoder
            .decode(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
            )
            .expect("frames should decode");
        assert_eq!(text, "Hi");
        assert!(decoder.is_finished());

        let mut decoder = SseDeltaDecoder::default();
        let error = decoder
            .decode(b"data: {\"error\":{\"message\":\"quota exceeded\"}}\n\n")
            .expect_err("remote error should fail the stream");
        assert_eq!(
            error,
            GenerationError::Server {
                status: None,
                body: "quota exceeded".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn consume_stream_delivers_fragments_in_order() {
        let coordinator = CancellationCoordinator::new();
        let token = coordinator.begin_session();
        let mut decoder = Utf8Decoder::default();
        let mut seen = Vec::new();

        consume_stream(
            chunks(vec![b"Hel".to_vec(), Vec::new(), b"lo ".to_vec(), b"world".to_vec()]),
            &mut decoder,
            &token,
            &mut |text| seen.push(text.to_owned()),
        )
        .await
        .expect("stream should complete");

        assert_eq!(seen, vec!["Hel", "lo ", "world"]);
    }

    #[tokio::test]
    async fn consume_stream_stops_reading_after_done_frame() {
        let coordinator = CancellationCoordinator::new();
        let token = coordinator.begin_session();
        let mut decoder = SseDeltaDecoder::default();
        let parts: ChunkStream = Box::pin(futures_util::stream::iter(vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n".to_vec()),
            Ok(b"data: [DONE]\n\n".to_vec()),
            Ok(vec![0xff]),
            Err(TransportFailure::connection("never read")),
        ]));
        let mut seen = Vec::new();

        consume_stream(parts, &mut decoder, &token, &mut |text| {
            seen.push(text.to_owned())
        })
        .await
        .expect("bytes after the done frame are ignored");

        assert_eq!(seen, vec!["Hi"]);
        assert!(decoder.is_finished());
        assert_eq!(decoder.finish().expect("finished decoder flushes nothing"), "");
    }

    #[tokio::test]
    async fn consume_stream_stops_delivering_after_revocation() {
        let coordinator = CancellationCoordinator::new();
        let token = coordinator.begin_session();
        let mut decoder = Utf8Decoder::default();
        let mut seen = Vec::new();

        consume_stream(
            chunks(vec![b"one".to_vec(), b"two".to_vec()]),
            &mut decoder,
            &token,
            &mut |text| {
                seen.push(text.to_owned());
                coordinator.cancel(&token);
            },
        )
        .await
        .expect("revocation is not an error");

        assert_eq!(seen, vec!["one"]);
    }

    #[tokio::test]
    async fn consume_stream_surfaces_read_errors() {
        let coordinator = CancellationCoordinator::new();
        let token = coordinator.begin_session();
        let mut decoder = Utf8Decoder::default();
        let parts: ChunkStream = Box::pin(futures_util::stream::iter(vec![
            Ok(b"partial".to_vec()),
            Err(TransportFailure::connection("connection reset")),
        ]));
        let mut seen = Vec::new();

        let error = consume_stream(parts, &mut decoder, &token, &mut |text| {
            seen.push(text.to_owned())
        })
        .await
        .expect_err("read error should abort");

        assert_eq!(seen, vec!["partial"]);
        assert_eq!(
            error,
            GenerationError::Transport("connection reset".to_owned())
        );
    }
}
