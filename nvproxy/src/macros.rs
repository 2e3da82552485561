/// Structured log line: `[time][LEVEL][component][pid=..][tid=..] message`.
/// Time is RFC 3339 with milliseconds so lines from concurrent requests
/// sort.
///
/// ```ignore
/// nvproxy_log!(Level::Info, "versioning", "Built ioctl table for {}", version);
/// // [2025-04-25T16:32:10.118+02:00][INFO][versioning][pid=4568][tid=ThreadId(1)] Built ioctl table for 535.43.2
/// ```
#[macro_export]
macro_rules! nvproxy_log {
    ($level:expr, $component:literal, $fmt:literal $(, $($arg:tt)+)?) => {
        log::log!(
            $level,
            concat!("[{}][{}][", $component, "][pid={}][tid={:?}] ", $fmt),
            chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, false),
            $level,
            std::process::id(),
            std::thread::current().id()
            $(, $($arg)+)?
        );
    };
}

/// Table entry binding `key` to a handler function, named after the
/// expression that produced it.
///
/// ```ignore
/// (UVM_FREE, handler!(uvm_ioctl_simple::<UvmFreeParams>)),
/// (NV_ESC_RM_ALLOC, handler!(rm_alloc::<R535>)),
/// ```
#[macro_export]
macro_rules! handler {
    ($f:expr) => {
        $crate::table::Entry::Bind($crate::table::Handler::new(stringify!($f), $f))
    };
}
