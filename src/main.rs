#[doc(hidden)]
mod config;
#[doc(hidden)]
mod error;
pub mod github_api;
pub mod guard;
#[doc(hidden)]
mod models;
pub mod retry;
pub mod webhook;

pub use config::Config;
pub use error::Error;
pub use models::*;

#[tokio::main]
async fn main() -> anyhow::Result<()>
{
	pretty_env_logger::init();

	// Pick up environment variables from a .env file in the working directory if there is one
	if let Err(error) = dotenvy::dotenv()
	{
		if !error.not_found()
		{
			return Err(anyhow::Error::from(error).context("could not load .env file"));
		}
	}

	let config = Config::load()?;

	let github_api_client = github_api::Client::from_config(config.github_api)?;
	let guard = guard::Guard::new(config.guard, github_api_client);

	let routes = webhook::routes(config.webhook_secret, guard);

	let (address, server) = warp::serve(routes)
		.try_bind_with_graceful_shutdown(config.listen_address, async
		{
			if let Err(error) = tokio::signal::ctrl_c().await
			{
				log::error!("could not listen for shutdown signal: {error}");
				std::future::pending::<()>().await;
			}
		})?;

	log::info!("listening for incoming webhook events on {address}");
	server.await;
	log::info!("shut down");

	Ok(())
}
