fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides; GPU backends stay quiet unless something goes wrong
    let default = "info,haunted_house=info,wgpu_core=warn,wgpu_hal=warn,wgpu=warn,naga=warn";
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .init();

    haunted_house::run()
}
