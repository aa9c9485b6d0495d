//! Recipe implementations, one module per deprecated API

pub mod buffer_atob_btoa;
pub mod chalk;
pub mod create_require_from_path;
pub mod crypto_rsa_pss;
pub mod fs_access_mode_constants;
pub mod http_classes;
pub mod jest;
pub mod node_url;
pub mod process_main_module;
pub mod rmdir;
pub mod support;
pub mod tmpdir;
pub mod util_extend;
pub mod util_is;
pub mod util_log;
pub mod util_print;
pub mod util_types_is_native_error;
pub mod zlib_bytes_read;
