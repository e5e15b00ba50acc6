fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // File dialogs are spawned onto this runtime from the UI thread
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    image_board::run_app()?;
    Ok(())
}
