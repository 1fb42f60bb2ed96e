use std::future::Future;

use futures::future::join_all;

/// Run `f` over `items` at most `limit` at a time.
///
/// Items are taken in consecutive chunks of `limit`; every future in a chunk
/// is polled concurrently and the next chunk starts only once the whole
/// chunk has finished. Results come back in input order.
pub async fn for_each_bounded<T, R, F, Fut>(items: Vec<T>, limit: usize, mut f: F) -> Vec<R>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let limit = limit.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        let chunk: Vec<Fut> = items.by_ref().take(limit).map(&mut f).collect();
        results.extend(join_all(chunk).await);
    }

    results
}
