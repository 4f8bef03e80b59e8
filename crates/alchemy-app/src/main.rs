//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Alchemy Brush");

    pollster::block_on(alchemy_app::App::run());
}

#[cfg(not(feature = "native"))]
fn main() {
    pollster::block_on(alchemy_app::App::run());
}
