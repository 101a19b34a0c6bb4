/// All errors that may occur during initialization or while handling requests.
#[derive(Debug, thiserror::Error)]
pub enum Error
{
	#[error("could not read config file")]
	ReadConfigFile(#[source] std::io::Error),
	#[error("could not parse config file")]
	ParseConfigFile(#[source] serde_yaml::Error),
	#[error("missing required configuration value {0}")]
	MissingConfigValue(&'static str),
	#[error("invalid value for configuration value {key}: {reason}")]
	InvalidConfigValue
	{
		key: &'static str,
		reason: String,
	},

	#[error("could not create HTTP client")]
	CreateHttpClient(#[source] reqwest::Error),

	#[error("could not parse URL")]
	ParseUrl(#[source] url::ParseError),
	#[error("could not make GitHub API request")]
	MakeGitHubApiRequest(#[source] reqwest::Error),
	#[error("received GitHub API client error from {url} (status code {status_code}): \
		{response_body}")]
	ReceivedGitHubApiClientError
	{
		status_code: reqwest::StatusCode,
		url: url::Url,
		response_body: String,
	},
	#[error("could not decode GitHub API response body")]
	DecodeGitHubApiResponseBody(#[source] serde_json::Error),

	#[error("could not set up branch protection rule")]
	ProtectBranch(#[source] Box<crate::Error>),
	#[error("could not create notification issue")]
	CreateIssue(#[source] Box<crate::Error>),
	#[error("could not close notification issue")]
	CloseIssue(#[source] Box<crate::Error>),

	#[error("could not decode payload body")]
	DecodePayloadBody(#[source] serde_json::Error),
	#[error("missing payload signature")]
	MissingPayloadSignature,
	#[error("unsupported payload signature algorithm “{0}”")]
	UnsupportedSignatureAlgorithm(String),
	#[error("invalid payload signature")]
	InvalidPayloadSignature,
}

impl Error
{
	/// The HTTP status code to report to the sender of a webhook delivery if this error was caused
	/// by the request itself. Returns `None` for internal errors, whose details must not be exposed.
	pub fn rejection_status(&self) -> Option<warp::http::StatusCode>
	{
		match self
		{
			Self::MissingPayloadSignature
				| Self::UnsupportedSignatureAlgorithm(_)
				| Self::DecodePayloadBody(_) => Some(warp::http::StatusCode::BAD_REQUEST),
			Self::InvalidPayloadSignature => Some(warp::http::StatusCode::UNAUTHORIZED),
			_ => None,
		}
	}
}
