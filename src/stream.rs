//! Streaming conversion API: emit pages as they are encoded.
//!
//! [`convert_stream`] yields each [`RenderedImage`] as soon as its page is
//! done instead of waiting for the whole document. Pages still arrive in
//! strict page order because the underlying loop is sequential.
//!
//! The channel between the blocking render thread and the stream holds a
//! single page. Dropping the stream closes the channel, and the render loop
//! stops before it starts the next page.

use crate::config::ConversionConfig;
use crate::error::Pdf2JpgError;
use crate::output::RenderedImage;
use crate::pipeline::{self, decode::Decoder};
use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// A boxed stream of page results.
///
/// Yields `Ok` once per page and, if the conversion fails, a single `Err`
/// as its last item.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<RenderedImage, Pdf2JpgError>> + Send>>;

/// Convert PDF bytes, streaming pages as they are ready.
///
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use pdf2jpg::{convert_stream, ConversionConfig, PdfiumDecoder};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let decoder = Arc::new(PdfiumDecoder::bind(None)?);
/// let bytes = std::fs::read("document.pdf")?;
/// let mut pages = convert_stream(decoder, bytes, &ConversionConfig::default());
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     println!("{} ready", page.download_filename());
/// }
/// # Ok(())
/// # }
/// ```
pub fn convert_stream(
    decoder: Arc<dyn Decoder>,
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> PageStream {
    let (tx, rx) = mpsc::channel(1);
    let config = config.clone();

    let worker = tokio::task::spawn_blocking(move || {
        let result = pipeline::run_blocking(decoder.as_ref(), &bytes, &config, |image| {
            match tx.blocking_send(Ok(image)) {
                Ok(()) => ControlFlow::Continue(()),
                Err(_) => ControlFlow::Break(()),
            }
        });
        match result {
            Ok(pages) => debug!("Stream producer finished after {} pages", pages),
            Err(e) => {
                if tx.blocking_send(Err(e)).is_err() {
                    debug!("Stream dropped before the conversion error was delivered");
                }
            }
        }
    });

    // A panic on the render thread drops `tx`; make sure it is at least logged.
    tokio::spawn(async move {
        if let Err(e) = worker.await {
            warn!("Stream render task panicked: {}", e);
        }
    });

    Box::pin(ReceiverStream::new(rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::testing::FakeDecoder;
    use futures::StreamExt;

    #[tokio::test]
    async fn yields_pages_in_order() {
        let decoder = Arc::new(FakeDecoder::letter_pages(4));
        let pages: Vec<_> = convert_stream(decoder, vec![], &ConversionConfig::default())
            .map(|r| r.unwrap().page_num)
            .collect()
            .await;
        assert_eq!(pages, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn error_is_the_last_item() {
        let decoder = Arc::new(FakeDecoder::letter_pages(3).failing_on_page(3));
        let items: Vec<_> = convert_stream(decoder, vec![], &ConversionConfig::default())
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok() && items[1].is_ok());
        assert!(matches!(
            items[2],
            Err(Pdf2JpgError::RasterisationFailed { page: 3, .. })
        ));
    }

    #[tokio::test]
    async fn dropping_the_stream_stops_rendering() {
        let decoder = Arc::new(FakeDecoder::letter_pages(10));
        let mut stream = convert_stream(decoder.clone(), vec![], &ConversionConfig::default());
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.page_num, 1);
        drop(stream);

        // One page buffered, one blocked in send when the receiver went away.
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        let rendered = decoder.rendered_pages();
        assert!(rendered.len() <= 3, "rendered {:?}", rendered);
    }
}
