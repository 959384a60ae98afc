use faceswap_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under
// large upload and image buffers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = faceswap_api::setup::initialize_app(config.clone()).await?;

    faceswap_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
