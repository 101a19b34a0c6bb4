/// Retry settings for GitHub API calls that are safe to repeat.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct Config
{
	/// How often to retry after the first attempt failed.
	pub max_retries: u32,
	/// Lower bound of the delay between two attempts in milliseconds.
	pub min_delay_ms: u64,
	/// Upper bound of the delay between two attempts in milliseconds.
	pub max_delay_ms: u64,
}

impl Default for Config
{
	fn default() -> Self
	{
		Self
		{
			max_retries: 3,
			min_delay_ms: 1000,
			max_delay_ms: 30 * 1000,
		}
	}
}

impl Config
{
	/// Build an exponential backoff policy (base 2) from these settings.
	pub fn policy(&self) -> retry_policies::policies::ExponentialBackoff
	{
		let min_delay = std::time::Duration::from_millis(self.min_delay_ms);
		let max_delay = std::time::Duration::from_millis(self.max_delay_ms.max(self.min_delay_ms));

		retry_policies::policies::ExponentialBackoff::builder()
			.backoff_exponent(2)
			.retry_bounds(min_delay, max_delay)
			.build_with_max_retries(self.max_retries)
	}
}

/// Run a fallible asynchronous operation until it succeeds or the policy gives up, sleeping
/// between attempts as the policy demands. Returns the error of the last attempt if all attempts
/// failed.
///
/// # Arguments
/// - `policy`: Decides whether and when to make another attempt.
/// - `description`: Human-readable description of the operation for log messages.
/// - `operation`: Produces a fresh future for each attempt.
pub async fn retry<P, F, Fut, T, E>(policy: &P, description: &str, mut operation: F)
	-> Result<T, E>
where
	P: retry_policies::RetryPolicy,
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	let mut n_past_retries = 0;

	loop
	{
		let error = match operation().await
		{
			Ok(value) => return Ok(value),
			Err(error) => error,
		};

		match policy.should_retry(n_past_retries)
		{
			retry_policies::RetryDecision::Retry{execute_after} =>
			{
				// The policy might hand out a point in time that has already passed
				let delay = (execute_after - chrono::Utc::now()).to_std().unwrap_or_default();

				log::warn!("could not {description} (attempt {}), retrying in {} ms: {error}",
					n_past_retries + 1, delay.as_millis());

				tokio::time::sleep(delay).await;
				n_past_retries += 1;
			},
			retry_policies::RetryDecision::DoNotRetry =>
			{
				log::warn!("could not {description} (attempt {}), giving up",
					n_past_retries + 1);

				return Err(error);
			},
		}
	}
}
