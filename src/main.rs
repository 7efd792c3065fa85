use dotenv::dotenv;
use mathletter_server::{app::Application, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::load()?;
    Application::build(config).await
}
