//! Node.js built-in module names.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

static NODE_CORE_MODULES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "assert",
        "assert/strict",
        "async_hooks",
        "buffer",
        "child_process",
        "cluster",
        "console",
        "constants",
        "crypto",
        "dgram",
        "diagnostics_channel",
        "dns",
        "dns/promises",
        "domain",
        "events",
        "fs",
        "fs/promises",
        "http",
        "http2",
        "https",
        "inspector",
        "module",
        "net",
        "os",
        "path",
        "path/posix",
        "path/win32",
        "perf_hooks",
        "process",
        "punycode",
        "querystring",
        "readline",
        "readline/promises",
        "repl",
        "stream",
        "stream/promises",
        "string_decoder",
        "sys",
        "test",
        "timers",
        "timers/promises",
        "tls",
        "trace_events",
        "tty",
        "url",
        "util",
        "util/types",
        "v8",
        "vm",
        "wasi",
        "worker_threads",
        "zlib",
    ]
    .into_iter()
    .collect()
});

/// `fs`, `node:fs`, `fs/promises`, ...
pub fn is_node_core_module(specifier: &str) -> bool {
    let bare = specifier.strip_prefix("node:").unwrap_or(specifier);
    NODE_CORE_MODULES.contains(bare)
}
