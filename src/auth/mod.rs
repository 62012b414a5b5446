mod cookie;
mod log_in;
mod log_out;
mod me;
mod middleware;
mod token;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::post_log_in;
pub use log_out::get_log_out;
pub use me::get_me_endpoint;
pub use middleware::auth_guard;

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
