use cronhook::{app_info::AppInfo, boot::{boot, BootConfig}, jobs::default_registry};

#[tokio::main]
async fn main() {
    let app_info = AppInfo::new(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION"),
    );

    boot(BootConfig::new(app_info, default_registry())).await;
}
