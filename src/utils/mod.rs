pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    encode_uri_component, get_full_url, get_media_base, get_relative_file_path, href_protocol,
    is_http_protocol, query_values,
};
