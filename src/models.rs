/// Partial user data model as returned in responses from the GitHub API.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User
{
	/// The user’s handle.
	pub login: String,
	// We don’t need the other fields, so ignore them
}

/// Partial repository data model as provided in repository webhook events.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Repository
{
	/// The name of the repository.
	pub name: String,
	/// Handle of the user or organization owning the repository.
	pub owner: User,
	/// The name of the repository’s default branch (usually `main`).
	pub default_branch: String,
	/// Whether the repository is private.
	#[serde(default)]
	pub private: bool,
	// We don’t need the other fields, so ignore them
}

/// Webhook event payload for repository events as provided by the GitHub server.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RepositoryEventPayload
{
	/// The action that was performed (`created`, `deleted`, `archived`, …).
	pub action: String,
	/// The repository for which this event is reported.
	pub repository: Repository,
	// We don’t need the other fields, so ignore them
}

/// Partial data model for the parameters needed to make a GitHub API request to protect a branch.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProtectBranchRequest
{
	/// Field currently unsupported, so leave this at `None`.
	pub required_status_checks: Option<UnsupportedField>,
	/// Enforce all configured restrictions for administrators. Set to `Some(true)` to enforce
	/// required status checks for repository administrators. Set to `None` to disable.
	pub enforce_admins: Option<bool>,
	/// Require approving reviews on a pull request before merging. Set to `None` to disable.
	pub required_pull_request_reviews: Option<RequiredPullRequestReviews>,
	/// Field currently unsupported, so leave this at `None`.
	pub restrictions: Option<UnsupportedField>,
}

/// Review requirements for pull requests targeting a protected branch.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RequiredPullRequestReviews
{
	pub dismiss_stale_reviews: bool,
	pub require_code_owner_reviews: bool,
	pub required_approving_review_count: u8,
}

/// Partial data model for the parameters needed to make a GitHub API request to create a new issue.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateIssueRequest<'a>
{
	/// The title of the issue.
	pub title: &'a str,
	/// The contents of the issue.
	pub body: Option<&'a str>,
	// We don’t need to set the optional fields, so ignore them
}

/// Partial data model for the response of the GitHub API to a request to create a new issue.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateIssueResponse
{
	/// Repository-scoped number of the created issue.
	pub number: u64,
	/// User-facing URL of the created issue.
	pub html_url: url::Url,
	// We don’t need the other fields, so ignore them
}

/// State of an issue.
#[derive(Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState
{
	Closed,
}

/// Partial data model for the parameters needed to make a GitHub API request to update an issue.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateIssueRequest
{
	pub state: IssueState,
}

/// A field that is currently unsupported and needs to be set to `None` currently.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UnsupportedField;

/// Data model representing a response we’re going to ignore.
#[derive(Debug, serde::Deserialize)]
pub struct IgnoreResponse
{
}

#[cfg(test)]
mod tests
{
	use super::*;

	#[test]
	fn repository_event_payload_decodes_minimal_event()
	{
		let payload: RepositoryEventPayload = serde_json::from_value(serde_json::json!({
			"action": "created",
			"repository": {
				"name": "hello-world",
				"owner": {"login": "octo-org", "id": 1},
				"default_branch": "main",
				"private": true,
				"fork": false
			},
			"sender": {"login": "octocat"}
		})).unwrap();

		assert_eq!(payload.action, "created");
		assert_eq!(payload.repository.owner.login, "octo-org");
		assert_eq!(payload.repository.name, "hello-world");
		assert_eq!(payload.repository.default_branch, "main");
		assert!(payload.repository.private);
	}

	#[test]
	fn repository_is_public_unless_flagged()
	{
		let repository: Repository = serde_json::from_value(serde_json::json!({
			"name": "hello-world",
			"owner": {"login": "octo-org"},
			"default_branch": "trunk"
		})).unwrap();

		assert!(!repository.private);
	}

	#[test]
	fn protect_branch_request_serializes_nulls()
	{
		let request = ProtectBranchRequest
		{
			required_status_checks: None,
			enforce_admins: Some(true),
			required_pull_request_reviews: Some(RequiredPullRequestReviews
			{
				dismiss_stale_reviews: false,
				require_code_owner_reviews: false,
				required_approving_review_count: 1,
			}),
			restrictions: None,
		};

		assert_eq!(serde_json::to_value(&request).unwrap(), serde_json::json!({
			"required_status_checks": null,
			"enforce_admins": true,
			"required_pull_request_reviews": {
				"dismiss_stale_reviews": false,
				"require_code_owner_reviews": false,
				"required_approving_review_count": 1
			},
			"restrictions": null
		}));
	}

	#[test]
	fn close_request_serializes_state()
	{
		let request = UpdateIssueRequest{state: IssueState::Closed};
		assert_eq!(serde_json::to_value(&request).unwrap(), serde_json::json!({"state": "closed"}));
	}
}
