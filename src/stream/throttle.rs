//! Latest-wins stream throttling

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Extension trait to add throttling to any Stream
pub trait ThrottleExt: Stream {
    /// Emit at most once per `period`, keeping only the latest item seen
    /// since the previous emission.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Stream combinator returned by [`ThrottleExt::throttle`]
    pub struct Throttle<S: Stream> {
        #[pin]
        stream: S,
        interval: Interval,
        pending: Option<S::Item>,
        exhausted: bool,
    }
}

impl<S: Stream> Throttle<S> {
    pub fn new(stream: S, period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { stream, interval, pending: None, exhausted: false }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain what is ready, newer items replace older ones
        while !*this.exhausted {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => *this.pending = Some(item),
                Poll::Ready(None) => *this.exhausted = true,
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            return if *this.exhausted { Poll::Ready(None) } else { Poll::Pending };
        }

        match this.interval.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(this.pending.take()),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_stream::wrappers::ReceiverStream;

    #[tokio::test]
    async fn keeps_latest_item_per_period() {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        let mut throttled = ReceiverStream::new(rx).throttle(Duration::from_millis(20));

        tx.send(1).await.unwrap();
        assert_eq!(throttled.next().await, Some(1));

        for value in 2..=5 {
            tx.send(value).await.unwrap();
        }
        assert_eq!(throttled.next().await, Some(5));

        drop(tx);
        assert_eq!(throttled.next().await, None);
    }

    #[tokio::test]
    async fn idle_source_does_not_end_stream() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        let mut throttled = ReceiverStream::new(rx).throttle(Duration::from_millis(10));

        let producer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            tx.send("late").await.unwrap();
        });

        assert_eq!(throttled.next().await, Some("late"));
        assert_eq!(throttled.next().await, None);
        producer.await.unwrap();
    }
}
