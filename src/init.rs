use env_logger::Env;

/// 以指定的預設等級初始化日誌，可用 `RUST_LOG` 覆寫；重複呼叫時忽略
pub fn init_with_level(default_level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}
