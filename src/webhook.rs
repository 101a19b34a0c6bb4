/// Message returned for webhook events other than repository events.
pub const IGNORED_EVENT_MESSAGE: &str = "not listening to this webhook event";

/// Payloads larger than this are rejected, which should be enough for all valid requests.
const MAX_PAYLOAD_SIZE: u64 = 256 * 1024;

/// Verify a webhook event payload by checking the provided signature.
///
/// # Arguments
/// - `provided_signature`: Value of the `x-hub-signature-256` header, such as `sha256=1a2b…`.
/// - `payload`: The raw request body the signature was computed over.
/// - `secret`: The webhook secret shared with GitHub.
pub fn verify_payload_signature(provided_signature: Option<&str>, payload: &[u8], secret: &str)
	-> Result<(), crate::Error>
{
	// Treat an empty header the same as a missing one
	let provided_signature = provided_signature
		.filter(|provided_signature| !provided_signature.is_empty())
		.ok_or(crate::Error::MissingPayloadSignature)?;

	let (algorithm, provided_signature) = provided_signature.split_once('=')
		.unwrap_or((provided_signature, ""));

	// Only SHA-256 signatures are supported, reject anything else
	if algorithm != "sha256"
	{
		log::warn!("received payload with unsupported signature algorithm “{algorithm}”");
		return Err(crate::Error::UnsupportedSignatureAlgorithm(algorithm.to_owned()));
	}

	use hmac::Mac as _;

	// Compute the expected signature
	let mut mac = hmac::Hmac::<sha2::Sha256>::new_from_slice(secret.as_bytes())
		.expect("this call is infallible because HMAC supports keys of arbitrary size");

	mac.update(payload);

	let expected_signature = mac.finalize().into_bytes();
	let expected_signature = hex::encode(expected_signature);

	// Compare the provided signature with what we expect it to be. Use a secure string wrapper that
	// provides a constant-time equality comparator to prevent timing attacks
	let provided_signature = secstr::SecStr::from(provided_signature);
	let expected_signature = secstr::SecStr::from(expected_signature);

	if provided_signature == expected_signature
	{
		log::debug!("successfully verified payload signature");
		Ok(())
	}
	else
	{
		log::warn!("received payload with invalid signature");
		Err(crate::Error::InvalidPayloadSignature)
	}
}

/// How a webhook delivery was handled. Only converted to an HTTP response at the very end.
#[derive(Debug)]
pub enum Outcome
{
	/// The delivery was handled successfully, which includes deliveries that were ignored.
	Success(&'static str),
	/// The delivery was rejected because it couldn’t be authenticated or decoded.
	AuthRejected
	{
		status_code: warp::http::StatusCode,
		message: String,
	},
	/// Handling the delivery failed for reasons the sender can’t do anything about.
	InternalFailure(anyhow::Error),
}

impl From<Result<&'static str, crate::Error>> for Outcome
{
	fn from(result: Result<&'static str, crate::Error>) -> Self
	{
		let error = match result
		{
			Ok(message) => return Self::Success(message),
			Err(error) => error,
		};

		match error.rejection_status()
		{
			Some(status_code) => Self::AuthRejected{status_code, message: error.to_string()},
			None =>
			{
				// Log the full error chain so that operators can inspect it later, as the sender
				// only gets to see a generic message
				let error = anyhow::Error::from(error);
				log::error!("could not handle webhook event: {:?}", error);
				Self::InternalFailure(error)
			},
		}
	}
}

impl warp::Reply for Outcome
{
	fn into_response(self) -> warp::reply::Response
	{
		use warp::Reply as _;

		match self
		{
			Self::Success(message) =>
				warp::reply::with_status(message.to_owned(), warp::http::StatusCode::OK)
					.into_response(),
			Self::AuthRejected{status_code, message} =>
				warp::reply::with_status(message, status_code).into_response(),
			Self::InternalFailure(_) =>
				warp::reply::with_status("Internal server error".to_owned(),
					warp::http::StatusCode::INTERNAL_SERVER_ERROR)
					.into_response(),
		}
	}
}

/// All routes of this service. Webhook events are expected as POST requests to the root path.
///
/// # Arguments
/// - `webhook_secret`: The secret shared with GitHub to sign webhook payloads.
/// - `guard`: Handles the verified repository events.
pub fn routes(webhook_secret: String, guard: crate::guard::Guard)
	-> impl warp::Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone
{
	use warp::Filter as _;

	let webhook_secret = std::sync::Arc::<str>::from(webhook_secret);

	// Only listen for requests to the root path
	warp::path::end()
		// Only listen for POST requests
		.and(warp::post())
		.and(warp::body::content_length_limit(MAX_PAYLOAD_SIZE))
		// Relay the webhook secret and the guard to the request handler
		.and(warp::any().map(move || webhook_secret.clone()))
		.and(warp::any().map(move || guard.clone()))
		// Relay the payload signature and event type headers if present
		.and(warp::header::optional::<String>("x-hub-signature-256"))
		.and(warp::header::optional::<String>("x-github-event"))
		// Relay the body as raw bytes, as the signature is computed over the exact body
		.and(warp::body::bytes())
		.and_then(handle_webhook_event)
		.recover(handle_rejection)
}

/// Request handler for webhook events.
async fn handle_webhook_event(
	webhook_secret: std::sync::Arc<str>,
	guard: crate::guard::Guard,
	provided_signature: Option<String>,
	event: Option<String>,
	payload: warp::hyper::body::Bytes)
	-> Result<Outcome, std::convert::Infallible>
{
	let result = process_webhook_event(&webhook_secret, &guard, provided_signature.as_deref(),
		event.as_deref(), &payload).await;

	Ok(Outcome::from(result))
}

/// Verify, gate and handle a single webhook event.
async fn process_webhook_event(
	webhook_secret: &str,
	guard: &crate::guard::Guard,
	provided_signature: Option<&str>,
	event: Option<&str>,
	payload: &[u8])
	-> Result<&'static str, crate::Error>
{
	verify_payload_signature(provided_signature, payload, webhook_secret)?;

	// Acknowledge events we don’t react to (such as the ping event sent when setting up the
	// webhook) without treating them as errors
	if let Some(event) = event.filter(|event| !event.eq_ignore_ascii_case("repository"))
	{
		log::debug!("received “{event}” event, ignoring");
		return Ok(IGNORED_EVENT_MESSAGE);
	}

	let payload: crate::RepositoryEventPayload = serde_json::from_slice(payload)
		.map_err(crate::Error::DecodePayloadBody)?;

	guard.handle_repository_event(payload).await
}

/// Request handler for all requests that were rejected previously.
///
/// # Arguments
/// - `error`: Reasons for why this request was rejected by all routes.
async fn handle_rejection(error: warp::Rejection)
	-> Result<impl warp::Reply, std::convert::Infallible>
{
	let status_code;
	let message;

	if error.is_not_found()
	{
		status_code = warp::http::StatusCode::NOT_FOUND;
		message = "not found";
	}
	else if error.find::<warp::reject::MethodNotAllowed>().is_some()
	{
		status_code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
		message = "method not allowed";
	}
	else if error.find::<warp::reject::PayloadTooLarge>().is_some()
	{
		status_code = warp::http::StatusCode::PAYLOAD_TOO_LARGE;
		message = "payload too large";
	}
	// If users are able to trigger errors we did not anticipate, log them so we can inspect this
	// more closely later
	else
	{
		status_code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
		message = "Internal server error";

		log::error!("unhandled rejection: {:#?}", error);
	}

	Ok(warp::reply::with_status(message, status_code))
}
