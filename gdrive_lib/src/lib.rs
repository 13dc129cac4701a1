#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod directory_info;
pub mod directory_tree;
pub mod drive_api;
pub mod drive_v3_types;
pub mod errors;
pub mod gdrive_instance;
pub mod rate_limiter;

use anyhow::Error;
use rand::{
    distributions::{Distribution, Uniform},
    thread_rng,
};
use std::future::Future;
use tokio::time::{sleep, Duration};

use crate::errors::DriveError;

pub async fn exponential_retry<T, U, F>(f: T) -> Result<U, Error>
where
    T: Fn() -> F,
    F: Future<Output = Result<U, Error>>,
{
    let mut timeout: f64 = 1.0;
    let range = Uniform::from(0..1000);
    loop {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(err) => {
                if err
                    .downcast_ref::<DriveError>()
                    .map_or(false, DriveError::is_permanent)
                {
                    return Err(err);
                }
                log::debug!("retrying after error {}", err);
                sleep(Duration::from_millis((timeout * 1000.0) as u64)).await;
                timeout *= 2.0 + 2.0 * f64::from(range.sample(&mut thread_rng())) / 1000.0;
                if timeout >= 64.0 {
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{format_err, Error};
    use hyper::{Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{errors::DriveError, exponential_retry};

    fn api_error(status: StatusCode) -> Error {
        DriveError::Api {
            method: Method::GET,
            path: "/drive/v3/files".into(),
            status,
            body: "".into(),
        }
        .into()
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_retry_eventually_succeeds() -> Result<(), Error> {
        let calls = &AtomicUsize::new(0);
        let result = exponential_retry(move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(format_err!("transient"))
            } else {
                Ok(42)
            }
        })
        .await?;
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_retry_gives_up() {
        let result: Result<(), Error> =
            exponential_retry(|| async { Err(format_err!("permanent")) }).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_retry_stops_on_client_error() {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), Error> = exponential_retry(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(api_error(StatusCode::NOT_FOUND))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_retry_retries_rate_limit() -> Result<(), Error> {
        let calls = &AtomicUsize::new(0);
        let result = exponential_retry(move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 1 {
                Err(api_error(StatusCode::TOO_MANY_REQUESTS))
            } else {
                Ok("files")
            }
        })
        .await?;
        assert_eq!(result, "files");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        Ok(())
    }
}
