use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// 初始化终端日志（输出到 stderr），只保留本 crate 的日志
pub fn init_logging(debug_enabled: bool) {
    let config = ConfigBuilder::new()
        .add_filter_allow_str("aem")
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let _ = TermLogger::init(
        LevelFilter::Debug,
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    set_debug_enabled(debug_enabled);

    if debug_enabled {
        log::debug!("debug logging enabled");
    }
}

/// 调试模式输出 debug 及以上级别，否则只输出警告和错误
pub fn set_debug_enabled(enabled: bool) {
    if enabled {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Warn);
    }
}
