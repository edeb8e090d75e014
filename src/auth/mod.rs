//! Browser cookie loading for authenticated RPC traffic.
//!
//! The target application authenticates every RPC call with the browser
//! session's cookies; there is no API key. Users export their cookies in
//! the Netscape file format (browser extensions and most cookie managers
//! produce it) and this module loads them into the `reqwest` jar the RPC
//! client is built with.

mod cookies;

pub use cookies::{
    CookieError, CookieRecord, CookieParse, load_cookie_file, load_cookies_into_jar,
    parse_netscape_cookies,
};
