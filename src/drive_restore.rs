use drive_restore_lib::drive_restore_opts::DriveRestoreOpts;

#[tokio::main]
async fn main() {
    env_logger::init();

    match DriveRestoreOpts::process_args().await {
        Ok(_) => {}
        Err(e) => {
            if !e.to_string().contains("Broken pipe") {
                panic!("{}", e);
            }
        }
    }
}
