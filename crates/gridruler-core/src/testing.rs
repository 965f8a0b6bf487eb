//! Minimal executor helpers for unit tests.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::task::noop_waker_ref;

/// Spin-poll a future to completion.
///
/// Only suitable for futures that make progress on every poll; a future held
/// pending by the memory scene would spin forever.
pub fn block_on<F: Future>(f: F) -> F::Output {
    let mut cx = Context::from_waker(noop_waker_ref());
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

/// Poll a pinned future once.
pub fn poll_once<F: Future + ?Sized>(f: Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = Context::from_waker(noop_waker_ref());
    f.poll(&mut cx)
}
