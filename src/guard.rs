/// Configuration of how newly created repositories are guarded.
#[derive(serde::Deserialize)]
pub struct Config
{
	/// Handle of the user to mention in notification issues, without the leading `@`.
	pub mention_user: String,
	/// Also protect the default branch of private repositories (optional, default: `false`).
	#[serde(default)]
	pub protect_private_repositories: bool,
	/// Title of notification issues. Every `{branch}` is replaced with the name of the protected
	/// branch (optional, default: `Branch protection for {branch} enabled`).
	#[serde(default = "default_issue_title")]
	pub issue_title: String,
	/// Close notification issues right after creating them (optional, default: `true`).
	#[serde(default = "default_close_issue_after_creation")]
	pub close_issue_after_creation: bool,
	/// Retry settings for setting up branch protection rules (optional, default: 3 retries).
	#[serde(default)]
	pub protection_retry: crate::retry::Config,
}

#[doc(hidden)]
pub fn default_issue_title() -> String
{
	"Branch protection for {branch} enabled".into()
}

#[doc(hidden)]
fn default_close_issue_after_creation() -> bool
{
	true
}

/// Message returned for repository events with actions other than `created`.
pub const IGNORED_ACTION_MESSAGE: &str = "not listening to this repository event action";
/// Message returned for private repositories if they aren’t configured to be protected.
pub const PRIVATE_REPOSITORY_MESSAGE: &str = "Repository is private, skipping";
/// Message returned after the default branch was protected and the notification was filed.
pub const PROTECTED_MESSAGE: &str = "OK";

/// The branch of a repository to protect, as derived from a webhook event payload.
#[derive(Debug)]
pub struct ProtectionTarget
{
	pub owner: String,
	pub repository: String,
	pub branch: String,
}

/// Reacts to repository creation events by protecting the default branch of the new repository
/// and filing an issue about it.
///
/// Cloning is cheap, as the configuration and the GitHub API client are shared between clones.
#[derive(Clone)]
pub struct Guard
{
	#[doc(hidden)]
	config: std::sync::Arc<Config>,
	#[doc(hidden)]
	github_api_client: crate::github_api::Client,
}

impl Guard
{
	pub fn new(config: Config, github_api_client: crate::github_api::Client) -> Self
	{
		Self
		{
			config: std::sync::Arc::new(config),
			github_api_client,
		}
	}

	/// Handle a decoded repository event. Returns a short message describing what was done.
	///
	/// Side effects happen strictly in order: the branch is protected first, and only once that
	/// succeeded, the notification issue is created and closed.
	pub async fn handle_repository_event(&self, payload: crate::RepositoryEventPayload)
		-> Result<&'static str, crate::Error>
	{
		if payload.action != "created"
		{
			log::debug!("repository event with action “{}”, ignoring", payload.action);
			return Ok(IGNORED_ACTION_MESSAGE);
		}

		let repository = payload.repository;

		if repository.private && !self.config.protect_private_repositories
		{
			log::info!("repository “{}/{}” is private, skipping", repository.owner.login,
				repository.name);
			return Ok(PRIVATE_REPOSITORY_MESSAGE);
		}

		let target = ProtectionTarget
		{
			owner: repository.owner.login,
			repository: repository.name,
			branch: repository.default_branch,
		};

		log::info!("repository “{}/{}” was created with default branch “{}”", target.owner,
			target.repository, target.branch);

		self.protect_branch(&target).await?;

		let issue_number = self.create_notification_issue(&target).await?;

		if self.config.close_issue_after_creation
		{
			self.close_issue(&target, issue_number).await?;
		}

		Ok(PROTECTED_MESSAGE)
	}

	/// Protect the branch by disallowing users from pushing directly (including administrators)
	/// and requiring at least one approving pull request review. Retried according to the
	/// configured policy, as setting the same protection rules again is harmless.
	async fn protect_branch(&self, target: &ProtectionTarget) -> Result<(), crate::Error>
	{
		let protect_branch_request = crate::ProtectBranchRequest
		{
			required_status_checks: None,
			enforce_admins: Some(true),
			required_pull_request_reviews: Some(crate::RequiredPullRequestReviews
			{
				dismiss_stale_reviews: false,
				require_code_owner_reviews: false,
				required_approving_review_count: 1,
			}),
			restrictions: None,
		};

		let endpoint = format!("repos/{}/{}/branches/{}/protection", target.owner,
			target.repository, target.branch);
		let endpoint = endpoint.as_str();
		let protect_branch_request = &protect_branch_request;
		let github_api_client = &self.github_api_client;
		let retry_policy = self.config.protection_retry.policy();

		crate::retry::retry(&retry_policy, "set up branch protection rule",
			move || github_api_client.put::<_, _, crate::IgnoreResponse>(endpoint,
				protect_branch_request))
			.await
			.map_err(Box::new).map_err(crate::Error::ProtectBranch)?;

		log::info!("set up branch protection rule for branch “{}” in repository “{}/{}”",
			target.branch, target.owner, target.repository);

		Ok(())
	}

	/// Notify the configured user of the newly set-up branch protection rules. Returns the number
	/// of the created issue.
	async fn create_notification_issue(&self, target: &ProtectionTarget)
		-> Result<u64, crate::Error>
	{
		let issue_title = render_issue_title(&self.config.issue_title, &target.branch);
		let issue_body = format!(
			"@{mention_user}\n\
			\n\
			Branch protection has been enabled for the `{branch}` branch.\n\
			\n\
			_This is an automated message from {name}._",
			mention_user = self.config.mention_user,
			branch = target.branch,
			name = env!("CARGO_PKG_NAME"));

		let create_issue_request_body = crate::CreateIssueRequest
		{
			title: &issue_title,
			body: Some(&issue_body),
		};

		let created_issue: crate::CreateIssueResponse = self.github_api_client
			.post(format!("repos/{}/{}/issues", target.owner, target.repository),
				&create_issue_request_body)
			.await
			.map_err(Box::new).map_err(crate::Error::CreateIssue)?;

		log::info!("created issue informing about branch protection: {}", created_issue.html_url);

		Ok(created_issue.number)
	}

	async fn close_issue(&self, target: &ProtectionTarget, issue_number: u64)
		-> Result<(), crate::Error>
	{
		let _: crate::IgnoreResponse = self.github_api_client
			.patch(format!("repos/{}/{}/issues/{issue_number}", target.owner, target.repository),
				&crate::UpdateIssueRequest{state: crate::IssueState::Closed})
			.await
			.map_err(Box::new).map_err(crate::Error::CloseIssue)?;

		log::info!("closed issue #{issue_number} in repository “{}/{}”", target.owner,
			target.repository);

		Ok(())
	}
}

/// Fill in the branch name for every `{branch}` placeholder of an issue title template.
pub fn render_issue_title(template: &str, branch: &str) -> String
{
	template.replace("{branch}", branch)
}
