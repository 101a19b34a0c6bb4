/// Configuration of the GitHub API client.
#[derive(serde::Deserialize)]
pub struct Config
{
	/// The base URL of the GitHub API server with a trailing slash (optional, default:
	/// <https://api.github.com/>).
	#[serde(default = "github_com_api_base_url", deserialize_with = "deserialize_base_url")]
	pub base_url: url::Url,
	/// Personal access token or installation token used to authenticate all API requests. It needs
	/// permissions to administer the repositories it should protect and to write issues there.
	pub token: String,
}

#[doc(hidden)]
pub fn github_com_api_base_url() -> url::Url
{
	url::Url::parse("https://api.github.com/")
		.expect("this call is infallible because we know the URL to be well-formed")
}

/// Parse a base URL and make sure it ends with a slash. Without it, joining endpoint paths would
/// drop the last path segment (such as `/api/v3` of GitHub Enterprise Server installations).
pub fn parse_base_url(base_url: &str) -> Result<url::Url, url::ParseError>
{
	match base_url.ends_with('/')
	{
		true => url::Url::parse(base_url),
		false => url::Url::parse(&format!("{base_url}/")),
	}
}

#[doc(hidden)]
fn deserialize_base_url<'de, D>(deserializer: D) -> Result<url::Url, D::Error>
where
	D: serde::Deserializer<'de>
{
	let base_url = <String as serde::Deserialize>::deserialize(deserializer)?;
	parse_base_url(&base_url).map_err(serde::de::Error::custom)
}

/// A GitHub API client that authenticates with a static token.
///
/// The client can safely be shared between threads, which is achieved by internally using
/// thread-safe handles to the underlying data structures. This allows the client to be used in
/// request handlers asynchronously and concurrently.
///
/// The client never retries requests on its own. Callers that want retries wrap individual calls
/// with [crate::retry::retry].
#[derive(Clone)]
pub struct Client
{
	#[doc(hidden)]
	config: std::sync::Arc<Config>,
	#[doc(hidden)]
	reqwest_client: reqwest::Client,
}

impl Client
{
	/// Initialize a new GitHub API client with a given configuration.
	pub fn from_config(config: Config) -> Result<Self, crate::Error>
	{
		let reqwest_client = reqwest::ClientBuilder::new()
			// Set a recognizable user agent to get meaningful debugging information from GitHub
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build().map_err(crate::Error::CreateHttpClient)?;

		Ok(Self
		{
			config: std::sync::Arc::new(config),
			reqwest_client,
		})
	}

	/// Make an HTTP request to the GitHub API.
	///
	/// # Arguments
	/// - `method`: The HTTP method to use (example: [reqwest::Method::POST]).
	/// - `endpoint`: The API endpoint (without host and leading slash, example:
	///   `repos/example_organization/example_repository/issues`).
	/// - `body`: A serializable type containing the request body.
	pub async fn request<S, B, R>(&self, method: reqwest::Method, endpoint: S, body: Option<&B>)
		-> Result<R, crate::Error>
	where
		S: AsRef<str>,
		B: serde::Serialize,
		R: serde::de::DeserializeOwned,
	{
		// Build the API endpoint URL from the base URL and the endpoint path
		let url = self.config.base_url.join(endpoint.as_ref()).map_err(crate::Error::ParseUrl)?;
		let mut request = self.reqwest_client.request(method, url);

		if let Some(body) = body
		{
			// Append the request body if provided
			request = request.json(&body);
		}

		let response = request
			// Provide the access token using the Authentication header
			.bearer_auth(&self.config.token)
			// Request the v3 REST API, as recommended by GitHub’s documentation
			.header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
			.send().await.map_err(crate::Error::MakeGitHubApiRequest)?;

		// Return an error if there was a client error according to the response’s HTTP status
		if response.status().is_client_error()
		{
			let status_code = response.status();
			let url = response.url().to_owned();

			// Decode the body for debugging purposes
			let response_body =
				response.text().await.map_err(crate::Error::MakeGitHubApiRequest)?;

			return Err(crate::Error::ReceivedGitHubApiClientError{status_code, url, response_body});
		}

		let mut response_body = response
			// Return an error if there was a server error according to the response’s HTTP status
			.error_for_status().map_err(crate::Error::MakeGitHubApiRequest)?
			.bytes().await.map_err(crate::Error::MakeGitHubApiRequest)?;

		// Allow deserializing empty responses as empty dictionaries instead, as empty strings are
		// invalid JSON
		if response_body.is_empty()
		{
			response_body = "{}".as_bytes().into();
		}

		serde_json::from_slice(&response_body).map_err(crate::Error::DecodeGitHubApiResponseBody)
	}

	/// Make an HTTP PATCH request to the GitHub API (for arguments, see [Client::request]).
	pub async fn patch<S, B, R>(&self, endpoint: S, body: &B) -> Result<R, crate::Error>
	where
		S: AsRef<str>,
		B: serde::Serialize,
		R: serde::de::DeserializeOwned,
	{
		self.request(reqwest::Method::PATCH, endpoint, Some(body)).await
	}

	/// Make an HTTP POST request to the GitHub API (for arguments, see [Client::request]).
	pub async fn post<S, B, R>(&self, endpoint: S, body: &B) -> Result<R, crate::Error>
	where
		S: AsRef<str>,
		B: serde::Serialize,
		R: serde::de::DeserializeOwned,
	{
		self.request(reqwest::Method::POST, endpoint, Some(body)).await
	}

	/// Make an HTTP PUT request to the GitHub API (for arguments, see [Client::request]).
	pub async fn put<S, B, R>(&self, endpoint: S, body: &B) -> Result<R, crate::Error>
	where
		S: AsRef<str>,
		B: serde::Serialize,
		R: serde::de::DeserializeOwned,
	{
		self.request(reqwest::Method::PUT, endpoint, Some(body)).await
	}
}
