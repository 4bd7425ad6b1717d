use gitlab_ci_release::{create_release_application, error::Result, output::output_results};
use log::error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ Failed to make release");
            if let Some(body) = e.response_body() {
                eprintln!("{}", body);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let app = create_release_application()?;
    let outcome = app.run().await?;
    output_results(&outcome, app.output_path().as_deref());
    Ok(())
}
