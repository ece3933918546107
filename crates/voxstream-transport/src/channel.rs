use async_trait::async_trait;
use tokio::sync::mpsc;
use voxstream_core::{ChannelError, StreamingRequest, StreamingResponse};

/// Send direction of a recognition channel.
#[async_trait]
pub trait RequestSender: Send {
    async fn send(&mut self, request: StreamingRequest) -> Result<(), ChannelError>;
    /// Half-close: no further requests will be sent. The receive direction
    /// stays open.
    async fn close_send(&mut self) -> Result<(), ChannelError>;
}

/// Receive direction of a recognition channel.
///
/// `recv` must be cancel-safe: a session drops an in-flight `recv` when the
/// audio side fails.
#[async_trait]
pub trait ResponseReceiver: Send {
    /// `Ok(None)` means the server closed its side of the stream.
    async fn recv(&mut self) -> Result<Option<StreamingResponse>, ChannelError>;
}

/// An open bidirectional recognition stream.
///
/// The two directions are owned separately so they can be driven from
/// different tasks without shared locking.
pub struct RecognitionChannel {
    sender: Box<dyn RequestSender>,
    receiver: Box<dyn ResponseReceiver>,
}

impl RecognitionChannel {
    pub fn new(sender: Box<dyn RequestSender>, receiver: Box<dyn ResponseReceiver>) -> Self {
        Self { sender, receiver }
    }

    /// Channel backed by a pair of bounded in-process queues. The returned
    /// [`ServerEnd`] plays the remote recognizer.
    pub fn in_memory(capacity: usize) -> (Self, ServerEnd) {
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (response_tx, response_rx) = mpsc::channel(capacity);
        let channel = Self::new(
            Box::new(QueueSender {
                tx: Some(request_tx),
            }),
            Box::new(QueueReceiver { rx: response_rx }),
        );
        let server = ServerEnd {
            requests: request_rx,
            responses: response_tx,
        };
        (channel, server)
    }

    pub fn into_split(self) -> (Box<dyn RequestSender>, Box<dyn ResponseReceiver>) {
        (self.sender, self.receiver)
    }
}

/// Remote side of an [`RecognitionChannel::in_memory`] channel.
///
/// Dropping `responses` ends the client's receive stream; `requests`
/// yields `None` once the client half-closes.
pub struct ServerEnd {
    pub requests: mpsc::Receiver<StreamingRequest>,
    pub responses: mpsc::Sender<Result<StreamingResponse, ChannelError>>,
}

struct QueueSender {
    tx: Option<mpsc::Sender<StreamingRequest>>,
}

#[async_trait]
impl RequestSender for QueueSender {
    async fn send(&mut self, request: StreamingRequest) -> Result<(), ChannelError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ChannelError::SendFailed("send direction already closed".to_string()))?;
        tx.send(request).await.map_err(|_| ChannelError::Closed)
    }

    async fn close_send(&mut self) -> Result<(), ChannelError> {
        self.tx.take();
        Ok(())
    }
}

struct QueueReceiver {
    rx: mpsc::Receiver<Result<StreamingResponse, ChannelError>>,
}

#[async_trait]
impl ResponseReceiver for QueueReceiver {
    async fn recv(&mut self) -> Result<Option<StreamingResponse>, ChannelError> {
        match self.rx.recv().await {
            Some(Ok(response)) => Ok(Some(response)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}
