#[derive(serde::Deserialize)]
/// Top-level configuration of this application.
///
/// The configuration is either read from a YAML file or assembled from environment variables.
/// In both cases, it is validated once at startup so that a misconfigured deployment fails before
/// serving any request.
pub struct Config
{
	/// Address to listen on for incoming webhook events (optional, default: `127.0.0.1:2342`).
	#[serde(default = "default_listen_address")]
	pub listen_address: std::net::SocketAddr,
	/// The secret shared with GitHub to sign webhook payloads.
	pub webhook_secret: String,
	/// Configuration options specific to the GitHub API and authentication.
	pub github_api: crate::github_api::Config,
	/// Configuration of how newly created repositories are protected.
	pub guard: crate::guard::Config,
}

#[doc(hidden)]
fn default_listen_address() -> std::net::SocketAddr
{
	std::net::SocketAddr::from(([127, 0, 0, 1], 2342))
}

/// Environment variable pointing to a YAML configuration file. If unset, the configuration is read
/// from the other environment variables instead.
pub const CONFIG_FILE_VARIABLE: &str = "REPO_GUARD_CONFIG";

impl Config
{
	/// Read the configuration from the file named by `REPO_GUARD_CONFIG` if set, and from
	/// environment variables otherwise.
	pub fn load() -> Result<Self, crate::Error>
	{
		match std::env::var_os(CONFIG_FILE_VARIABLE)
		{
			Some(path) =>
			{
				log::info!("reading configuration from {}", path.to_string_lossy());
				Self::from_file(path)
			},
			None =>
			{
				log::info!("reading configuration from environment variables");
				Self::from_env()
			},
		}
	}

	/// Attempt to read and parse the configuration from a YAML file.
	///
	/// # Arguments
	/// `path`: Path to the configuration file in YAML format.
	pub fn from_file<P>(path: P) -> Result<Self, crate::Error>
	where
		P: AsRef<std::path::Path>
	{
		let file = std::fs::File::open(&path).map_err(crate::Error::ReadConfigFile)?;
		let config: Self = serde_yaml::from_reader(&file).map_err(crate::Error::ParseConfigFile)?;
		config.validate()
	}

	/// Assemble the configuration from environment variables.
	pub fn from_env() -> Result<Self, crate::Error>
	{
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Assemble the configuration from variables provided by a lookup function.
	///
	/// | Variable                              | Meaning                                           |
	/// |---------------------------------------|---------------------------------------------------|
	/// | `GITHUB_WEBHOOK_SECRET`               | webhook secret (required)                         |
	/// | `GITHUB_TOKEN`                        | GitHub API token (required)                       |
	/// | `MENTION_USER`                        | user to mention in issues (required)              |
	/// | `ENABLE_PROTECTION_FOR_PRIVATE_REPOS` | protect private repositories if `true`            |
	/// | `ISSUE_TITLE`                         | issue title template with `{branch}` placeholder  |
	/// | `CLOSE_ISSUE_AFTER_CREATION`          | keep notification issues open if `false`          |
	/// | `GITHUB_API_URL`                      | base URL of the GitHub API                        |
	/// | `LISTEN_ADDRESS`                      | address to listen on                              |
	pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
	where
		F: Fn(&str) -> Option<String>
	{
		let required = |key: &'static str|
			lookup(key).filter(|value| !value.is_empty())
				.ok_or(crate::Error::MissingConfigValue(key));

		let listen_address = match lookup("LISTEN_ADDRESS")
		{
			Some(listen_address) => listen_address.parse().map_err(
				|error: std::net::AddrParseError| crate::Error::InvalidConfigValue
				{
					key: "LISTEN_ADDRESS",
					reason: error.to_string(),
				})?,
			None => default_listen_address(),
		};

		let base_url = match lookup("GITHUB_API_URL")
		{
			Some(base_url) => crate::github_api::parse_base_url(&base_url).map_err(
				|error| crate::Error::InvalidConfigValue
				{
					key: "GITHUB_API_URL",
					reason: error.to_string(),
				})?,
			None => crate::github_api::github_com_api_base_url(),
		};

		let config = Self
		{
			listen_address,
			webhook_secret: required("GITHUB_WEBHOOK_SECRET")?,
			github_api: crate::github_api::Config
			{
				base_url,
				token: required("GITHUB_TOKEN")?,
			},
			guard: crate::guard::Config
			{
				mention_user: required("MENTION_USER")?,
				// Only an explicit opt-in enables protection for private repositories
				protect_private_repositories:
					lookup("ENABLE_PROTECTION_FOR_PRIVATE_REPOS").as_deref() == Some("true"),
				issue_title: lookup("ISSUE_TITLE")
					.filter(|issue_title| !issue_title.is_empty())
					.unwrap_or_else(crate::guard::default_issue_title),
				// Only an explicit opt-out keeps notification issues open
				close_issue_after_creation:
					lookup("CLOSE_ISSUE_AFTER_CREATION").as_deref() != Some("false"),
				protection_retry: crate::retry::Config::default(),
			},
		};

		config.validate()
	}

	/// Reject configurations with empty required values.
	fn validate(self) -> Result<Self, crate::Error>
	{
		if self.webhook_secret.is_empty()
		{
			return Err(crate::Error::MissingConfigValue("webhook_secret"));
		}

		if self.github_api.token.is_empty()
		{
			return Err(crate::Error::MissingConfigValue("github_api.token"));
		}

		if self.guard.mention_user.is_empty()
		{
			return Err(crate::Error::MissingConfigValue("guard.mention_user"));
		}

		Ok(self)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn lookup<'a>(variables: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a
	{
		move |key| variables.iter()
			.find(|(name, _)| *name == key)
			.map(|(_, value)| value.to_string())
	}

	const REQUIRED: [(&str, &str); 3] = [
		("GITHUB_WEBHOOK_SECRET", "secret"),
		("GITHUB_TOKEN", "token"),
		("MENTION_USER", "octocat"),
	];

	#[test]
	fn environment_defaults()
	{
		let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

		assert_eq!(config.listen_address, default_listen_address());
		assert_eq!(config.webhook_secret, "secret");
		assert_eq!(config.github_api.token, "token");
		assert_eq!(config.github_api.base_url.as_str(), "https://api.github.com/");
		assert_eq!(config.guard.mention_user, "octocat");
		assert!(!config.guard.protect_private_repositories);
		assert_eq!(config.guard.issue_title, "Branch protection for {branch} enabled");
		assert!(config.guard.close_issue_after_creation);
	}

	#[test]
	fn environment_missing_required_values()
	{
		for missing in ["GITHUB_WEBHOOK_SECRET", "GITHUB_TOKEN", "MENTION_USER"]
		{
			let variables: Vec<_> = REQUIRED.iter().copied()
				.filter(|(name, _)| *name != missing)
				.collect();

			match Config::from_lookup(lookup(&variables))
			{
				Err(crate::Error::MissingConfigValue(key)) => assert_eq!(key, missing),
				_ => panic!("expected {missing} to be reported as missing"),
			}
		}
	}

	#[test]
	fn environment_empty_required_value()
	{
		let mut variables = REQUIRED.to_vec();
		variables[2] = ("MENTION_USER", "");

		assert!(matches!(Config::from_lookup(lookup(&variables)),
			Err(crate::Error::MissingConfigValue("MENTION_USER"))));
	}

	#[test]
	fn environment_flags_need_exact_values()
	{
		let mut variables = REQUIRED.to_vec();
		variables.push(("ENABLE_PROTECTION_FOR_PRIVATE_REPOS", "yes"));
		variables.push(("CLOSE_ISSUE_AFTER_CREATION", "no"));

		let config = Config::from_lookup(lookup(&variables)).unwrap();
		assert!(!config.guard.protect_private_repositories);
		assert!(config.guard.close_issue_after_creation);

		let mut variables = REQUIRED.to_vec();
		variables.push(("ENABLE_PROTECTION_FOR_PRIVATE_REPOS", "true"));
		variables.push(("CLOSE_ISSUE_AFTER_CREATION", "false"));
		variables.push(("ISSUE_TITLE", "Protect {branch} now"));

		let config = Config::from_lookup(lookup(&variables)).unwrap();
		assert!(config.guard.protect_private_repositories);
		assert!(!config.guard.close_issue_after_creation);
		assert_eq!(config.guard.issue_title, "Protect {branch} now");
	}

	#[test]
	fn environment_optional_addresses()
	{
		let mut variables = REQUIRED.to_vec();
		variables.push(("GITHUB_API_URL", "https://github.example.com/api/v3"));
		variables.push(("LISTEN_ADDRESS", "0.0.0.0:8080"));

		let config = Config::from_lookup(lookup(&variables)).unwrap();
		assert_eq!(config.github_api.base_url.as_str(), "https://github.example.com/api/v3/");
		assert_eq!(config.listen_address.port(), 8080);

		let mut variables = REQUIRED.to_vec();
		variables.push(("LISTEN_ADDRESS", "localhost"));

		assert!(matches!(Config::from_lookup(lookup(&variables)),
			Err(crate::Error::InvalidConfigValue{key: "LISTEN_ADDRESS", ..})));
	}

	#[test]
	fn yaml_file()
	{
		let path = std::env::temp_dir().join(format!("repo-guard-config-{}.yaml",
			std::process::id()));

		std::fs::write(&path, "\
webhook_secret: secret
github_api:
  base_url: https://github.example.com/api/v3
  token: token
guard:
  mention_user: octocat
  close_issue_after_creation: false
  protection_retry:
    max_retries: 5
").unwrap();

		let config = Config::from_file(&path);
		std::fs::remove_file(&path).unwrap();
		let config = config.unwrap();

		assert_eq!(config.listen_address, default_listen_address());
		assert_eq!(config.github_api.base_url.as_str(), "https://github.example.com/api/v3/");
		assert!(!config.guard.close_issue_after_creation);
		assert_eq!(config.guard.protection_retry.max_retries, 5);
		assert_eq!(config.guard.protection_retry.min_delay_ms, 1000);
	}

	#[test]
	fn yaml_file_with_empty_token()
	{
		let path = std::env::temp_dir().join(format!("repo-guard-empty-token-{}.yaml",
			std::process::id()));

		std::fs::write(&path, "\
webhook_secret: secret
github_api:
  token: \"\"
guard:
  mention_user: octocat
").unwrap();

		let config = Config::from_file(&path);
		std::fs::remove_file(&path).unwrap();

		assert!(matches!(config, Err(crate::Error::MissingConfigValue("github_api.token"))));
	}

	#[test]
	fn missing_file()
	{
		assert!(matches!(Config::from_file("/nonexistent/repo-guard.yaml"),
			Err(crate::Error::ReadConfigFile(_))));
	}
}
