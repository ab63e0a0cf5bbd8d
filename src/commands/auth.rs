use anyhow::Result;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    let account = ttsync_provider_google::authenticate().await?;
    println!("Signed in as {}", account.green());
    Ok(())
}
